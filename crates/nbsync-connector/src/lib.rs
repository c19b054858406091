//! # Connector Framework
//!
//! Shared building blocks for the nbsync inventory connectors.
//!
//! This crate provides:
//! - Device records for both sides of the sync (`SourceDevice`, `MonitoredDevice`)
//! - Capability-based inventory traits (`SourceInventory`, `MonitoringInventory`,
//!   `DeviceUpdateOp`, `DeviceProvisionOp`)
//! - Error types with transient/permanent classification
//! - HTTP connection settings and a small JSON transport over `reqwest`
//!
//! ## Example
//!
//! ```ignore
//! use nbsync_connector::prelude::*;
//!
//! let config = HttpConfig::new("https://netbox.example.com/api")
//!     .with_auth(AuthConfig::token("0123456789abcdef"));
//!
//! let transport = HttpTransport::new(config)?;
//! let body = transport.get_json(&transport.url("/dcim/devices/")).await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{AuthConfig, ConnectionSettings, HttpConfig};
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::http::{HttpMethod, HttpTransport};
    pub use crate::traits::{
        DeviceProvisionOp, DeviceUpdateOp, Inventory, MonitoringInventory, SourceInventory,
    };
    pub use crate::types::{
        CorrespondenceComponent, DeviceField, DeviceStatus, DeviceType, MonitoredDevice,
        MonitoredDeviceId, NewMonitoredDevice, SnmpPolicy, SourceDevice, SourceDeviceId,
    };
}
