//! NetBox connector implementation
//!
//! Implements `SourceInventory` over the NetBox REST API.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use nbsync_connector::config::HttpConfig;
use nbsync_connector::error::{ConnectorError, ConnectorResult};
use nbsync_connector::http::HttpTransport;
use nbsync_connector::traits::{Inventory, SourceInventory};
use nbsync_connector::types::SourceDevice;

use crate::wire::DevicePage;

/// Device collection endpoint, relative to the API base URL.
pub const DEVICES_PATH: &str = "/dcim/devices/";

/// Upper bound on the preallocation taken from the reported `count`.
const MAX_PREALLOCATED_DEVICES: usize = 1000;

/// Connector for the NetBox source of truth.
#[derive(Debug)]
pub struct NetBoxConnector {
    transport: HttpTransport,
    display_name: String,
}

impl NetBoxConnector {
    /// Create a new NetBox connector with the given configuration.
    pub fn new(config: HttpConfig) -> ConnectorResult<Self> {
        let display_name = format!("NetBox: {}", config.base_url);
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport,
            display_name,
        })
    }

    async fn fetch_page(&self, url: &str) -> ConnectorResult<DevicePage> {
        let body = self.transport.get_json(url).await?;
        serde_json::from_value(body).map_err(|e| ConnectorError::unexpected(url, e.to_string()))
    }
}

impl Inventory for NetBoxConnector {
    fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[async_trait]
impl SourceInventory for NetBoxConnector {
    #[instrument(skip(self))]
    async fn fetch_source_devices(&self) -> ConnectorResult<Vec<SourceDevice>> {
        let first_url = self.transport.url(DEVICES_PATH);
        let mut page = self.fetch_page(&first_url).await?;

        info!(count = page.count, "NetBox device count");

        let capacity = usize::try_from(page.count)
            .unwrap_or(usize::MAX)
            .min(MAX_PREALLOCATED_DEVICES);
        let mut devices: Vec<SourceDevice> = Vec::with_capacity(capacity);
        devices.extend(page.results.drain(..).map(SourceDevice::from));

        while let Some(next) = page.next.take() {
            debug!(next = %next, "NetBox pagination");
            page = self.fetch_page(&next).await?;
            devices.extend(page.results.drain(..).map(SourceDevice::from));
        }

        Ok(devices)
    }
}
