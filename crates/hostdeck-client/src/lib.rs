//! Hostdeck Client - service store and REST gateway
//!
//! This crate provides:
//! - `ServiceGateway` abstraction with an HTTP implementation for the services API
//! - A reducer-style store holding services, provisional services, options and UI flags
//! - The action vocabulary and the controller that runs each action
//! - Background polling of single services
//! - Configuration loading, logging bootstrap and Prometheus metrics

pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod poll;
pub mod store;

pub use action::{Action, ActionKind, BodyCallback, FailureCallback};
pub use config::ClientConfig;
pub use controller::ServiceController;
pub use error::ClientError;
pub use gateway::{Decoded, ServiceGateway};
pub use http::{HttpGateway, OptionsSource};
pub use metrics::ClientMetrics;
pub use poll::PollHandle;
pub use store::{
    FnStoreListener, Mutation, RequestFailure, Store, StoreEvent, StoreListener, StoreState,
    SubscriptionId,
};
