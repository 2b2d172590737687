//! Shared fixtures for controller tests: an in-memory gateway with scripted
//! replies that records every call it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hostdeck_api::{
    CatalogEntry, CreateServiceRequest, OptionsCatalog, Placement, Service, ServiceStatus,
    UpdateServiceRequest,
};
use hostdeck_client::error::{ClientError, Result};
use hostdeck_client::{Decoded, FnStoreListener, ServiceController, ServiceGateway, StoreEvent};
use serde_json::{Value, json};

/// Scripted outcome of one endpoint
#[derive(Clone, Debug)]
pub enum Reply<T> {
    Ok(T),
    Fail { status: u16, body: Value },
}

impl<T: Clone> Reply<T> {
    pub fn fail(status: u16, message: &str) -> Self {
        Reply::Fail {
            status,
            body: json!({ "message": message }),
        }
    }

    fn to_result(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail { status, body } => Err(ClientError::Status {
                status: *status,
                message: body
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from),
                body: body.clone(),
            }),
        }
    }
}

impl Reply<Service> {
    /// The reply as the JSON body a server would send.
    fn into_body(self) -> Reply<Value> {
        match self {
            Reply::Ok(service) => Reply::Ok(json!(service)),
            Reply::Fail { status, body } => Reply::Fail { status, body },
        }
    }
}

impl Reply<Value> {
    fn to_decoded(&self) -> Result<Decoded<Service>> {
        Ok(Decoded::from_body(self.to_result()?)?)
    }
}

/// A request received by the gateway
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List,
    Get(String),
    Create(CreateServiceRequest),
    Update(String, UpdateServiceRequest),
    Delete(String),
    Options,
}

pub struct ScriptedGateway {
    calls: Mutex<Vec<Call>>,
    list: Mutex<Reply<Vec<Service>>>,
    get: Mutex<Reply<Value>>,
    create: Mutex<Reply<Value>>,
    update: Mutex<Reply<Service>>,
    delete: Mutex<Reply<u16>>,
    options: Mutex<Reply<OptionsCatalog>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            list: Mutex::new(Reply::Ok(Vec::new())),
            get: Mutex::new(Reply::fail(404, "not found")),
            create: Mutex::new(Reply::fail(500, "not scripted")),
            update: Mutex::new(Reply::fail(500, "not scripted")),
            delete: Mutex::new(Reply::Ok(204)),
            options: Mutex::new(Reply::Ok(catalog())),
        }
    }

    pub fn list(&self, reply: Reply<Vec<Service>>) -> &Self {
        *self.list.lock().unwrap() = reply;
        self
    }

    pub fn get(&self, reply: Reply<Service>) -> &Self {
        self.get_body(reply.into_body())
    }

    /// Script the raw `GET <base>/<id>` body.
    pub fn get_body(&self, reply: Reply<Value>) -> &Self {
        *self.get.lock().unwrap() = reply;
        self
    }

    pub fn create(&self, reply: Reply<Service>) -> &Self {
        self.create_body(reply.into_body())
    }

    /// Script the raw `POST <base>` body.
    pub fn create_body(&self, reply: Reply<Value>) -> &Self {
        *self.create.lock().unwrap() = reply;
        self
    }

    pub fn update(&self, reply: Reply<Service>) -> &Self {
        *self.update.lock().unwrap() = reply;
        self
    }

    pub fn delete(&self, reply: Reply<u16>) -> &Self {
        *self.delete.lock().unwrap() = reply;
        self
    }

    pub fn options(&self, reply: Reply<OptionsCatalog>) -> &Self {
        *self.options.lock().unwrap() = reply;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ServiceGateway for ScriptedGateway {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.record(Call::List);
        self.list.lock().unwrap().to_result()
    }

    async fn get_service(&self, id: &str) -> Result<Decoded<Service>> {
        self.record(Call::Get(id.to_string()));
        self.get.lock().unwrap().to_decoded()
    }

    async fn create_service(&self, request: &CreateServiceRequest) -> Result<Decoded<Service>> {
        self.record(Call::Create(request.clone()));
        self.create.lock().unwrap().to_decoded()
    }

    async fn update_service(&self, id: &str, request: &UpdateServiceRequest) -> Result<Service> {
        self.record(Call::Update(id.to_string(), request.clone()));
        self.update.lock().unwrap().to_result()
    }

    async fn delete_service(&self, id: &str) -> Result<u16> {
        self.record(Call::Delete(id.to_string()));
        self.delete.lock().unwrap().to_result()
    }

    async fn load_options(&self) -> Result<OptionsCatalog> {
        self.record(Call::Options);
        self.options.lock().unwrap().to_result()
    }
}

pub fn catalog() -> OptionsCatalog {
    OptionsCatalog {
        games: vec![
            CatalogEntry::new("halo", "Halo"),
            CatalogEntry::new("gow", "Gears of War"),
        ],
        platforms: vec![
            CatalogEntry::new("ps4", "PS4"),
            CatalogEntry::new("xb1", "Xbox One"),
        ],
        providers: vec![
            CatalogEntry::new("A", "Amazon"),
            CatalogEntry::new("G", "Google"),
        ],
        locations: vec![
            CatalogEntry::new("X", "US East"),
            CatalogEntry::new("Y", "EU West"),
        ],
    }
}

pub fn service(id: &str, placement: Placement) -> Service {
    Service {
        id: id.to_string(),
        status: ServiceStatus::Active,
        platform: "ps4".to_string(),
        game: "halo".to_string(),
        version: "1.0".to_string(),
        placement,
        ..Default::default()
    }
}

/// Controller over a scripted gateway, with options already loaded.
pub async fn controller_with(gateway: Arc<ScriptedGateway>, services: Vec<Service>) -> ServiceController {
    gateway.list(Reply::Ok(services));
    let controller = ServiceController::new(gateway.clone());
    controller.get_all().await;
    gateway.clear_calls();
    controller
}

/// Records the `loading` flag of every notification.
pub fn record_loading(controller: &ServiceController) -> Arc<Mutex<Vec<bool>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    controller
        .store()
        .subscribe(Arc::new(FnStoreListener::new(move |event: &StoreEvent| {
            seen_clone.lock().unwrap().push(event.snapshot.loading());
        })));
    seen
}
