//! Form input and its translation into API payloads
//!
//! Form fields hold display labels (`"PS4"`, `"Halo"`); translation resolves them
//! through a [`CatalogIndex`] into the codes the API expects.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogIndex, Category, LookupError};
use crate::model::{CreateServiceRequest, Service};
use crate::placement::Placement;

/// Input of the "add service" form: a provisional service kept on the client.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewServiceForm {
    pub platform: String,
    pub game: String,
    pub version: String,
}

impl NewServiceForm {
    pub fn new(platform: &str, game: &str, version: &str) -> Self {
        Self {
            platform: platform.to_string(),
            game: game.to_string(),
            version: version.to_string(),
        }
    }

    /// Build the unsaved service with the given client identifier.
    pub fn to_provisional(&self, index: &CatalogIndex, id: String) -> Result<Service, LookupError> {
        let platform = index.code_for(Category::Platform, &self.platform)?;
        let game = index.code_for(Category::Game, &self.game)?;
        Ok(Service::provisional(
            id,
            platform.to_string(),
            game.to_string(),
            self.version.clone(),
        ))
    }
}

/// Input of the "create service" form.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateServiceForm {
    /// Identifier of the provisional service this form persists, if any.
    pub temp_id: Option<String>,
    pub platform: String,
    pub game: String,
    pub version: String,
    pub provider: String,
    pub location: String,
    pub hosts: i64,
}

impl CreateServiceForm {
    pub fn to_request(&self, index: &CatalogIndex) -> Result<CreateServiceRequest, LookupError> {
        let platform = index.code_for(Category::Platform, &self.platform)?;
        let game = index.code_for(Category::Game, &self.game)?;
        let provider = index.code_for(Category::Provider, &self.provider)?;
        let location = index.code_for(Category::Location, &self.location)?;

        Ok(CreateServiceRequest {
            game: game.to_string(),
            platform: platform.to_string(),
            version: self.version.clone(),
            placement: Placement::single(provider, location, self.hosts),
        })
    }
}

/// Input of the "scale service" form: a signed host delta for one location.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScaleServiceForm {
    pub id: String,
    pub provider: String,
    pub location: String,
    pub hosts: i64,
}

impl ScaleServiceForm {
    pub fn new(id: &str, provider: &str, location: &str, hosts: i64) -> Self {
        Self {
            id: id.to_string(),
            provider: provider.to_string(),
            location: location.to_string(),
            hosts,
        }
    }

    /// The placement delta this form describes, in code form.
    pub fn to_delta(&self, index: &CatalogIndex) -> Result<Placement, LookupError> {
        let provider = index.code_for(Category::Provider, &self.provider)?;
        let location = index.code_for(Category::Location, &self.location)?;
        Ok(Placement::single(provider, location, self.hosts))
    }
}
