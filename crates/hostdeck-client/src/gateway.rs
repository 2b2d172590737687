//! Remote gateway abstraction
//!
//! The controller talks to the services API only through [`ServiceGateway`],
//! so the HTTP implementation can be swapped out.

use async_trait::async_trait;
use hostdeck_api::{CreateServiceRequest, OptionsCatalog, Service, UpdateServiceRequest};
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A typed entity together with the JSON body it was decoded from.
///
/// The body keeps fields the typed model does not know about.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub entity: T,
    pub body: serde_json::Value,
}

impl<T: DeserializeOwned> Decoded<T> {
    /// Decode `body`, keeping it alongside the entity.
    pub fn from_body(body: serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        let entity = T::deserialize(&body)?;
        Ok(Self { entity, body })
    }
}

/// Access to the services collection and the options document.
#[async_trait]
pub trait ServiceGateway: Send + Sync + 'static {
    /// `GET <base>`
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// `GET <base>/<id>`
    async fn get_service(&self, id: &str) -> Result<Decoded<Service>>;

    /// `POST <base>`
    async fn create_service(&self, request: &CreateServiceRequest) -> Result<Decoded<Service>>;

    /// `PUT <base>/<id>`
    async fn update_service(&self, id: &str, request: &UpdateServiceRequest) -> Result<Service>;

    /// `DELETE <base>/<id>`, returning the (2xx) status code of the response.
    ///
    /// Only `204` confirms the deletion; the caller decides what other codes mean.
    async fn delete_service(&self, id: &str) -> Result<u16>;

    /// Fetch the static options document.
    async fn load_options(&self) -> Result<OptionsCatalog>;
}
