//! # NetBox Connector
//!
//! Read-only connector for the NetBox asset inventory, the source of truth
//! for nbsync.
//!
//! Fetches the complete `dcim/devices` collection on every call, following
//! the `next` cursor until it is exhausted. Nothing is cached between calls.
//!
//! ## Example
//!
//! ```ignore
//! use nbsync_connector::prelude::*;
//! use nbsync_connector_netbox::NetBoxConnector;
//!
//! let config = HttpConfig::new("https://netbox.example.com/api")
//!     .with_auth(AuthConfig::token("0123456789abcdef"));
//!
//! let netbox = NetBoxConnector::new(config)?;
//! let devices = netbox.fetch_source_devices().await?;
//! ```

pub mod connector;
pub mod wire;

pub use connector::{NetBoxConnector, DEVICES_PATH};
