//! # LibreNMS Connector
//!
//! Read/write connector for the LibreNMS monitoring system.
//!
//! The correspondence identifier linking a LibreNMS device to its NetBox
//! record is stored as a device component of type `netbox_id` whose label is
//! the NetBox device id.
//!
//! ## Example
//!
//! ```ignore
//! use nbsync_connector::prelude::*;
//! use nbsync_connector_librenms::LibreNmsConnector;
//!
//! let config = HttpConfig::new("https://librenms.example.com/api/v0")
//!     .with_auth(AuthConfig::bearer("my-api-token"));
//!
//! let librenms = LibreNmsConnector::new(config)?;
//! let devices = librenms.fetch_monitored_devices().await?;
//! ```

pub mod connector;
pub mod wire;

pub use connector::LibreNmsConnector;
pub use wire::CORRESPONDENCE_COMPONENT_TYPE;
