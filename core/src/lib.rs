//! Meshdash Core Library
//!
//! Opens the service mesh dashboards through a local tunnel into the cluster.
//! Provides functionality to:
//! - Run a `kubectl proxy` tunnel and map in-cluster services to local URLs
//! - Choose between a direct and an API-server-proxied control-plane client
//! - Verify cluster and control-plane health before showing anything
//! - Drive a dashboard session from start to serving
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: kubectl, HTTP and browser implementations
//! - `application`: Use case services

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    CheckResult, CheckStatus, ClusterEndpoint, KubeContext, PresentationMode, ServiceSelector,
};

// Re-export other commonly used types
pub use application::{ClientResolver, HealthVerifier, Session, SessionState};
pub use config::{DashboardOptions, ValidatedOptions};
pub use error::{Error, Result};
