//! Service models
//!
//! This module defines the structures exchanged with the services REST API.

use serde::{Deserialize, Serialize};

use crate::placement::Placement;

/// Prefix of identifiers assigned to services that only exist on the client.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Whether an identifier was assigned by the client rather than the server.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Build a client-side identifier from a millisecond timestamp.
pub fn temp_id(millis: i64) -> String {
    format!("{}{}", TEMP_ID_PREFIX, millis)
}

/// Lifecycle status of a service
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Active,
    #[default]
    Inactive,
}

/// A deployable unit tracked by the API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub placement: Placement,
    /// Reserved by the API, carried through untouched.
    #[serde(default)]
    pub hosts: serde_json::Map<String, serde_json::Value>,
    /// Set on services that have not been persisted yet.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub client: bool,
}

impl Service {
    /// Create an unsaved, client-only service.
    pub fn provisional(id: String, platform: String, game: String, version: String) -> Self {
        Self {
            id,
            status: ServiceStatus::Inactive,
            platform,
            game,
            version,
            placement: Placement::new(),
            hosts: serde_json::Map::new(),
            client: true,
        }
    }

    pub fn is_client_only(&self) -> bool {
        self.client
    }
}

/// Body of `POST <base>`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub game: String,
    pub platform: String,
    pub version: String,
    pub placement: Placement,
}

/// Body of `PUT <base>/<id>`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub placement: Placement,
}

/// Error payload returned by the API on non-2xx responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
