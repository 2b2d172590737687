//! Service controller
//!
//! Runs every action against the gateway and records the outcome in the store.
//! No operation returns an error: failures end up in the store's error field and
//! are surfaced to listeners like any other change.
//!
//! Request windows follow one contract: a network operation starts by committing
//! `RequestStarted` (loading on, error cleared) and always ends by committing
//! `RequestFinished`, whatever the outcome. Two calls skip the start: the options
//! half of [`ServiceController::get_all`] and polling calls of
//! [`ServiceController::get_service`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hostdeck_api::{CreateServiceForm, NewServiceForm, ScaleServiceForm, UpdateServiceRequest};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionKind, BodyCallback, FailureCallback};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{Decoded, ServiceGateway};
use crate::http::HttpGateway;
use crate::metrics::{ClientMetrics, RequestTimer};
use crate::poll::PollHandle;
use crate::store::{Mutation, RequestFailure, Store, StoreState};

/// Recorded when the options document cannot be loaded.
pub const OPTIONS_ERROR_MESSAGE: &str = "Unable to load service options";

/// Status code that confirms a deletion.
const DELETE_CONFIRMED: u16 = 204;

/// Executes actions against a [`ServiceGateway`] and a [`Store`].
#[derive(Clone)]
pub struct ServiceController {
    store: Arc<Store>,
    gateway: Arc<dyn ServiceGateway>,
    metrics: Option<Arc<ClientMetrics>>,
}

impl ServiceController {
    /// Create a controller with a fresh store.
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self::with_store(Arc::new(Store::new()), gateway)
    }

    pub fn with_store(store: Arc<Store>, gateway: Arc<dyn ServiceGateway>) -> Self {
        Self {
            store,
            gateway,
            metrics: None,
        }
    }

    /// Record request metrics and store gauges into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<ClientMetrics>) -> Self {
        self.store.subscribe(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// Create a controller talking HTTP to the configured services resource,
    /// with metrics enabled.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let gateway = HttpGateway::new(config)?;
        let metrics = ClientMetrics::new()?;
        info!("Services resource: {}", config.base_url);
        Ok(Self::new(Arc::new(gateway)).with_metrics(Arc::new(metrics)))
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn metrics(&self) -> Option<&Arc<ClientMetrics>> {
        self.metrics.as_ref()
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        self.store.snapshot()
    }

    /// Run an action on a background task.
    pub fn dispatch(&self, action: Action) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.run(action).await })
    }

    /// Run an action to completion.
    pub async fn run(&self, action: Action) {
        debug!("Running action {:?}", action);
        match action {
            Action::GetAll => self.get_all().await,
            Action::GetAllOptions => self.get_all_options().await,
            Action::GetService {
                id,
                callback,
                polling,
            } => self.get_service(&id, callback, polling).await,
            Action::CreateService { form, callback } => self.create_service(form, callback).await,
            Action::UpdateService { form, callback } => self.update_service(form, callback).await,
            Action::DeleteService { id } => self.delete_service(&id).await,
            Action::ToggleNewService => self.toggle_new_service(),
            Action::AddService { form } => self.add_service(form),
            Action::ClearError => self.clear_error(),
        }
    }

    // ============== Request bookkeeping ==============

    fn begin(&self, action: ActionKind) {
        self.store.commit(action, Mutation::RequestStarted);
    }

    fn finish(&self, action: ActionKind) {
        self.store.commit(action, Mutation::RequestFinished);
    }

    fn fail(&self, action: ActionKind, failure: RequestFailure) {
        self.store.commit(action, Mutation::Failed(failure));
    }

    fn observe<T>(&self, timer: RequestTimer, result: &Result<T>) {
        let action = timer.action();
        let elapsed = timer.elapsed();
        match result {
            Ok(_) => debug!("{} exchange completed in {:?}", action, elapsed),
            Err(e) => warn!("{} exchange failed after {:?}: {}", action, elapsed, e),
        }
        if let Some(metrics) = &self.metrics {
            metrics.record(action, elapsed, result);
        }
    }

    // ============== Queries ==============

    /// Refresh services, then (only if that succeeded) the options catalog.
    pub async fn get_all(&self) {
        let action = ActionKind::GetAll;
        self.begin(action);

        let timer = RequestTimer::start(action);
        let result = self.gateway.list_services().await;
        self.observe(timer, &result);

        match result {
            Ok(services) => {
                info!("Loaded {} services", services.len());
                self.store.commit(action, Mutation::ServicesLoaded(services));
            }
            Err(e) => {
                self.fail(action, RequestFailure::from(&e));
                self.finish(action);
                return;
            }
        }

        self.fetch_options(action).await;
    }

    /// Reload the options catalog.
    pub async fn get_all_options(&self) {
        let action = ActionKind::GetAllOptions;
        self.begin(action);
        self.fetch_options(action).await;
    }

    async fn fetch_options(&self, action: ActionKind) {
        let timer = RequestTimer::start(action);
        let result = self.gateway.load_options().await;
        self.observe(timer, &result);

        match result {
            Ok(options) => self.store.commit(action, Mutation::OptionsLoaded(options)),
            Err(e) => self.store.commit(
                action,
                Mutation::Failed(RequestFailure::new(
                    e.status(),
                    Some(OPTIONS_ERROR_MESSAGE.to_string()),
                )),
            ),
        };

        self.finish(action);
    }

    /// Refresh one service in place.
    ///
    /// Polling calls leave loading and error untouched at the start so repeated
    /// background refreshes do not flicker; they still clear loading at the end.
    pub async fn get_service(&self, id: &str, callback: Option<BodyCallback>, polling: bool) {
        let action = ActionKind::GetService;
        if !polling {
            self.begin(action);
        }

        let seq = self.store.next_sequence();
        let timer = RequestTimer::start(action);
        let result = self.gateway.get_service(id).await;
        self.observe(timer, &result);

        let body = match result {
            Ok(Decoded { entity, body }) => {
                self.store.commit(
                    action,
                    Mutation::ServiceRefreshed {
                        service: entity,
                        seq,
                    },
                );
                body
            }
            Err(e) => {
                self.fail(action, RequestFailure::from(&e));
                e.body()
            }
        };

        self.finish(action);
        if let Some(callback) = callback {
            callback(body);
        }
    }

    // ============== Commands ==============

    /// Persist a service built from form input.
    ///
    /// On success the server entity joins the confirmed services and the
    /// provisional entry named by `form.temp_id` is dropped. The callback
    /// receives the parsed response body either way.
    pub async fn create_service(&self, form: CreateServiceForm, callback: Option<BodyCallback>) {
        let action = ActionKind::CreateService;

        let request = match form.to_request(self.store.snapshot().index()) {
            Ok(request) => request,
            Err(e) => {
                let err = ClientError::from(e);
                warn!("{} rejected: {}", action, err);
                self.fail(action, RequestFailure::from(&err));
                if let Some(callback) = callback {
                    callback(err.body());
                }
                return;
            }
        };

        self.begin(action);

        let timer = RequestTimer::start(action);
        let result = self.gateway.create_service(&request).await;
        self.observe(timer, &result);

        let body = match result {
            Ok(Decoded { entity, body }) => {
                info!("Created service {}", entity.id);
                self.store.commit(
                    action,
                    Mutation::ServiceCreated {
                        temp_id: form.temp_id,
                        service: entity,
                    },
                );
                body
            }
            Err(e) => {
                self.fail(action, RequestFailure::from(&e));
                e.body()
            }
        };

        self.finish(action);
        if let Some(callback) = callback {
            callback(body);
        }
    }

    /// Apply a host delta to a service's placement.
    ///
    /// Locations left at zero hosts are pruned. When no host remains anywhere
    /// the service is deleted instead of updated. The callback receives only
    /// the failure, if any.
    pub async fn update_service(&self, form: ScaleServiceForm, callback: Option<FailureCallback>) {
        let action = ActionKind::UpdateService;
        let failure = self.scale(action, &form).await;
        if let Some(callback) = callback {
            callback(failure);
        }
    }

    async fn scale(&self, action: ActionKind, form: &ScaleServiceForm) -> Option<RequestFailure> {
        let placement = {
            let snapshot = self.store.snapshot();
            let computed = snapshot
                .find_confirmed(&form.id)
                .ok_or_else(|| ClientError::UnknownService(form.id.clone()))
                .and_then(|service| {
                    let delta = form.to_delta(snapshot.index())?;
                    Ok(service.placement.merge(&delta).pruned())
                });

            match computed {
                Ok(placement) => placement,
                Err(e) => {
                    warn!("{} rejected: {}", action, e);
                    let failure = RequestFailure::from(&e);
                    self.fail(action, failure.clone());
                    return Some(failure);
                }
            }
        };

        if !placement.has_allocation() {
            info!("Service {} scaled to zero hosts, deleting it", form.id);
            return self.remove(&form.id).await;
        }

        self.begin(action);

        let seq = self.store.next_sequence();
        let request = UpdateServiceRequest { placement };
        let timer = RequestTimer::start(action);
        let result = self.gateway.update_service(&form.id, &request).await;
        self.observe(timer, &result);

        let failure = match result {
            Ok(service) => {
                self.store
                    .commit(action, Mutation::ServiceUpdated { service, seq });
                None
            }
            Err(e) => {
                let failure = RequestFailure::from(&e);
                self.fail(action, failure.clone());
                Some(failure)
            }
        };

        self.finish(action);
        failure
    }

    /// Delete a service; provisional services are dropped locally.
    pub async fn delete_service(&self, id: &str) {
        self.remove(id).await;
    }

    async fn remove(&self, id: &str) -> Option<RequestFailure> {
        let action = ActionKind::DeleteService;

        if self.store.snapshot().is_client_only(id) {
            debug!("Removing provisional service {}", id);
            self.store
                .commit(action, Mutation::LocalServiceRemoved(id.to_string()));
            self.finish(action);
            return None;
        }

        self.begin(action);

        let timer = RequestTimer::start(action);
        let result = self.gateway.delete_service(id).await;
        self.observe(timer, &result);

        let failure = match result {
            Ok(DELETE_CONFIRMED) => {
                info!("Deleted service {}", id);
                self.store
                    .commit(action, Mutation::ServiceDeleted(id.to_string()));
                None
            }
            Ok(status) => {
                warn!(
                    "Delete of {} answered {} instead of {}, keeping it",
                    id, status, DELETE_CONFIRMED
                );
                None
            }
            Err(e) => {
                let failure = RequestFailure::from(&e);
                self.fail(action, failure.clone());
                Some(failure)
            }
        };

        self.finish(action);
        failure
    }

    /// Show or hide the add-service form.
    pub fn toggle_new_service(&self) {
        self.store
            .commit(ActionKind::ToggleNewService, Mutation::AddFormToggled);
    }

    /// Add an unsaved service from form input.
    pub fn add_service(&self, form: NewServiceForm) {
        let action = ActionKind::AddService;
        let snapshot = self.store.snapshot();
        let id = snapshot.unique_temp_id(Utc::now().timestamp_millis());

        match form.to_provisional(snapshot.index(), id) {
            Ok(service) => {
                debug!("Added provisional service {}", service.id);
                self.store.commit(action, Mutation::LocalServiceAdded(service));
            }
            Err(e) => {
                let err = ClientError::from(e);
                warn!("{} rejected: {}", action, err);
                self.fail(action, RequestFailure::from(&err));
            }
        }
    }

    pub fn clear_error(&self) {
        self.store.commit(ActionKind::ClearError, Mutation::ErrorCleared);
    }

    /// Refresh one service on a fixed interval with polling semantics.
    ///
    /// The first refresh happens immediately. Polling stops when the handle is
    /// stopped or dropped.
    pub fn poll_service(&self, id: &str, every: Duration) -> PollHandle {
        let controller = self.clone();
        let id = id.to_string();
        info!("Polling service {} every {:?}", id, every);

        PollHandle::spawn(every, move || {
            let controller = controller.clone();
            let id = id.clone();
            async move { controller.get_service(&id, None, true).await }
        })
    }
}
