//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod api;
mod browser;
mod cluster;
mod tunnel;

pub use api::{ApiClientFactory, ApiClientPort};
pub use browser::BrowserPort;
pub use cluster::ClusterApiPort;
pub use tunnel::{TunnelOpener, TunnelPort};
