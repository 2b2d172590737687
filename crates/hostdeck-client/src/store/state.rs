//! Store snapshot and the reducer that produces it

use std::collections::HashMap;

use hostdeck_api::{CatalogIndex, OptionsCatalog, Service, is_temp_id, temp_id};
use tracing::{debug, warn};

use crate::error::ClientError;

/// A failed request as recorded in the store: the HTTP status when the server
/// answered, and a message when one is available.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl RequestFailure {
    pub fn new(status: Option<u16>, message: Option<String>) -> Self {
        Self { status, message }
    }
}

impl From<&ClientError> for RequestFailure {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Status {
                status, message, ..
            } => Self::new(Some(*status), message.clone()),
            other => Self::new(other.status(), Some(other.to_string())),
        }
    }
}

/// A single state change. Every change to [`StoreState`] goes through
/// [`StoreState::apply`].
#[derive(Clone, Debug)]
pub enum Mutation {
    /// Start of a request window: loading on, error cleared
    RequestStarted,
    /// End of a request window: loading off
    RequestFinished,
    ServicesLoaded(Vec<Service>),
    OptionsLoaded(OptionsCatalog),
    ServiceRefreshed { service: Service, seq: u64 },
    ServiceCreated {
        temp_id: Option<String>,
        service: Service,
    },
    ServiceUpdated { service: Service, seq: u64 },
    ServiceDeleted(String),
    LocalServiceRemoved(String),
    LocalServiceAdded(Service),
    AddFormToggled,
    Failed(RequestFailure),
    ErrorCleared,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::RequestStarted => "request_started",
            Mutation::RequestFinished => "request_finished",
            Mutation::ServicesLoaded(_) => "services_loaded",
            Mutation::OptionsLoaded(_) => "options_loaded",
            Mutation::ServiceRefreshed { .. } => "service_refreshed",
            Mutation::ServiceCreated { .. } => "service_created",
            Mutation::ServiceUpdated { .. } => "service_updated",
            Mutation::ServiceDeleted(_) => "service_deleted",
            Mutation::LocalServiceRemoved(_) => "local_service_removed",
            Mutation::LocalServiceAdded(_) => "local_service_added",
            Mutation::AddFormToggled => "add_form_toggled",
            Mutation::Failed(_) => "failed",
            Mutation::ErrorCleared => "error_cleared",
        }
    }
}

/// Snapshot of everything the client knows.
#[derive(Clone, Debug, Default)]
pub struct StoreState {
    services: Vec<Service>,
    added_services: Vec<Service>,
    options: OptionsCatalog,
    index: CatalogIndex,
    adding_service: bool,
    loading: bool,
    error: Option<RequestFailure>,
    /// Last applied request sequence per service id
    applied_seq: HashMap<String, u64>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services confirmed by the server, in server order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Client-only services, newest first.
    pub fn added_services(&self) -> &[Service] {
        &self.added_services
    }

    pub fn options(&self) -> &OptionsCatalog {
        &self.options
    }

    /// Label/code index of the current options.
    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn adding_service(&self) -> bool {
        self.adding_service
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&RequestFailure> {
        self.error.as_ref()
    }

    pub fn error_code(&self) -> Option<u16> {
        self.error.as_ref().and_then(|e| e.status)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.message.as_deref())
    }

    /// Client-only services followed by confirmed ones.
    pub fn all_services(&self) -> impl Iterator<Item = &Service> {
        self.added_services.iter().chain(self.services.iter())
    }

    pub fn find_service(&self, id: &str) -> Option<&Service> {
        self.all_services().find(|s| s.id == id)
    }

    pub fn find_confirmed(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_service(id).is_some()
    }

    /// Whether `id` names a service that only exists on the client.
    pub fn is_client_only(&self, id: &str) -> bool {
        is_temp_id(id) || self.added_services.iter().any(|s| s.id == id)
    }

    /// A temporary identifier derived from `millis` that no service uses yet.
    pub fn unique_temp_id(&self, millis: i64) -> String {
        let mut millis = millis;
        loop {
            let id = temp_id(millis);
            if !self.contains(&id) {
                return id;
            }
            millis += 1;
        }
    }

    /// Apply a mutation, producing the next snapshot.
    pub fn apply(mut self, mutation: Mutation) -> Self {
        match mutation {
            Mutation::RequestStarted => {
                self.loading = true;
                self.error = None;
            }
            Mutation::RequestFinished => {
                self.loading = false;
            }
            Mutation::ServicesLoaded(services) => {
                self.applied_seq
                    .retain(|id, _| services.iter().any(|s| &s.id == id));
                self.services = services;
            }
            Mutation::OptionsLoaded(options) => {
                self.index = CatalogIndex::new(&options);
                self.options = options;
            }
            Mutation::ServiceRefreshed { service, seq }
            | Mutation::ServiceUpdated { service, seq } => {
                self.replace_if_newer(service, seq);
            }
            Mutation::ServiceCreated { temp_id, service } => {
                if let Some(temp_id) = temp_id {
                    self.added_services.retain(|s| s.id != temp_id);
                }
                match self.services.iter_mut().find(|s| s.id == service.id) {
                    Some(existing) => *existing = service,
                    None => self.services.push(service),
                }
            }
            Mutation::ServiceDeleted(id) => {
                self.services.retain(|s| s.id != id);
                self.applied_seq.remove(&id);
            }
            Mutation::LocalServiceRemoved(id) => {
                self.added_services.retain(|s| s.id != id);
            }
            Mutation::LocalServiceAdded(service) => {
                if self.contains(&service.id) {
                    warn!("Service id {} already in use, provisional service dropped", service.id);
                } else {
                    self.added_services.insert(0, service);
                }
            }
            Mutation::AddFormToggled => {
                self.adding_service = !self.adding_service;
            }
            Mutation::Failed(failure) => {
                self.error = Some(failure);
            }
            Mutation::ErrorCleared => {
                self.error = None;
            }
        }
        self
    }

    /// Replace the confirmed entry with the same id in place, unless a response
    /// from a newer request was already applied to it.
    fn replace_if_newer(&mut self, service: Service, seq: u64) {
        let last = self.applied_seq.get(&service.id).copied().unwrap_or(0);
        if seq <= last {
            debug!(
                "Discarding stale response for {} (seq {} <= {})",
                service.id, seq, last
            );
            return;
        }

        if let Some(existing) = self.services.iter_mut().find(|s| s.id == service.id) {
            self.applied_seq.insert(service.id.clone(), seq);
            *existing = service;
        }
    }
}
