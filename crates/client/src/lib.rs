//! HTTP client for the brief job service.
//!
//! [`BriefApi`] is the seam the tracker depends on; [`BriefApiClient`]
//! is its `reqwest` implementation.

pub mod api;
pub mod config;

pub use api::{BriefApi, BriefApiClient, HealthStatus, RequestError};
pub use config::ClientConfig;
