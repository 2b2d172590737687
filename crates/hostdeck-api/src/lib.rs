//! Hostdeck API - data model shared by the hostdeck client
//!
//! This crate provides:
//! - Service and placement models as exchanged with the services REST API
//! - The options catalog and its bidirectional label/code index
//! - Form types carrying human-facing labels, and their translation into API payloads

pub mod catalog;
pub mod form;
pub mod model;
pub mod placement;

// Re-export commonly used types
pub use catalog::{CatalogEntry, CatalogIndex, Category, LookupError, OptionsCatalog};
pub use form::{CreateServiceForm, NewServiceForm, ScaleServiceForm};
pub use model::*;
pub use placement::Placement;
