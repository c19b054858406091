//! LibreNMS connector implementation
//!
//! Implements the monitoring-side traits over the LibreNMS v0 API.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use nbsync_connector::config::HttpConfig;
use nbsync_connector::error::{ConnectorError, ConnectorResult};
use nbsync_connector::http::{HttpMethod, HttpTransport};
use nbsync_connector::traits::{
    DeviceProvisionOp, DeviceUpdateOp, Inventory, MonitoringInventory,
};
use nbsync_connector::types::{
    CorrespondenceComponent, DeviceField, MonitoredDevice, MonitoredDeviceId, NewMonitoredDevice,
    SourceDeviceId,
};

use crate::wire::{
    ensure_ok, parse_components, CreatedDevices, DeviceList, CORRESPONDENCE_COMPONENT_TYPE,
};

/// Connector for the LibreNMS monitoring system.
#[derive(Debug)]
pub struct LibreNmsConnector {
    transport: HttpTransport,
    display_name: String,
}

impl LibreNmsConnector {
    /// Create a new LibreNMS connector with the given configuration.
    pub fn new(config: HttpConfig) -> ConnectorResult<Self> {
        let display_name = format!("LibreNMS: {}", config.base_url);
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport,
            display_name,
        })
    }

    fn device_url(&self, device_id: MonitoredDeviceId) -> String {
        self.transport.url(&format!("/devices/{device_id}"))
    }

    async fn send(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> ConnectorResult<Value> {
        let reply = self.transport.send_json(method, url, body).await?;
        ensure_ok(url, &reply)?;
        Ok(reply)
    }
}

impl Inventory for LibreNmsConnector {
    fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[async_trait]
impl MonitoringInventory for LibreNmsConnector {
    #[instrument(skip(self))]
    async fn fetch_monitored_devices(&self) -> ConnectorResult<Vec<MonitoredDevice>> {
        let url = self.transport.url("/devices");
        let body = self.send(HttpMethod::Get, &url, None).await?;
        let list: DeviceList = serde_json::from_value(body)
            .map_err(|e| ConnectorError::unexpected(&url, e.to_string()))?;

        info!(
            count = list.count.unwrap_or(list.devices.len() as u64),
            "LibreNMS device count"
        );

        let mut devices = Vec::with_capacity(list.devices.len());
        for raw in list.devices {
            let device = MonitoredDevice::from(raw);
            let components = self.correspondence_components(device.id).await?;

            let linked = components.iter().find_map(CorrespondenceComponent::source_id);
            let device = match linked {
                Some(source_id) => device.with_correspondence(source_id),
                None => {
                    if !components.is_empty() {
                        warn!(
                            monitored_id = %device.id,
                            hostname = %device.hostname,
                            "Correspondence component has no usable label"
                        );
                    }
                    device
                }
            };
            devices.push(device);
        }

        Ok(devices)
    }

    async fn correspondence_components(
        &self,
        device_id: MonitoredDeviceId,
    ) -> ConnectorResult<Vec<CorrespondenceComponent>> {
        let url = format!(
            "{}/components?type={CORRESPONDENCE_COMPONENT_TYPE}",
            self.device_url(device_id)
        );
        let body = self.send(HttpMethod::Get, &url, None).await?;
        parse_components(&url, &body)
    }
}

#[async_trait]
impl DeviceUpdateOp for LibreNmsConnector {
    async fn update_field(
        &self,
        device_id: MonitoredDeviceId,
        field: &DeviceField,
    ) -> ConnectorResult<()> {
        let url = self.device_url(device_id);
        let body = json!({"field": field.name(), "data": field.data()});
        debug!(monitored_id = %device_id, field = field.name(), "Patching device field");
        self.send(HttpMethod::Patch, &url, Some(&body)).await?;
        Ok(())
    }

    async fn rename_device(
        &self,
        device_id: MonitoredDeviceId,
        new_hostname: &str,
    ) -> ConnectorResult<()> {
        let url = format!("{}/rename/{new_hostname}", self.device_url(device_id));
        self.send(HttpMethod::Patch, &url, None).await?;
        Ok(())
    }
}

#[async_trait]
impl DeviceProvisionOp for LibreNmsConnector {
    async fn create_device(
        &self,
        device: &NewMonitoredDevice,
    ) -> ConnectorResult<MonitoredDeviceId> {
        let url = self.transport.url("/devices");
        let body = json!({
            "hostname": device.hostname,
            "display": device.display,
            "location": device.location,
            "force_add": device.force_add,
            "snmp_disable": device.snmp_disable,
            "hardware": device.hardware,
        });
        let reply = self.send(HttpMethod::Post, &url, Some(&body)).await?;
        let created: CreatedDevices = serde_json::from_value(reply)
            .map_err(|e| ConnectorError::unexpected(&url, e.to_string()))?;

        created
            .devices
            .first()
            .map(|d| MonitoredDeviceId(d.device_id))
            .ok_or_else(|| ConnectorError::unexpected(&url, "reply lists no created device"))
    }

    async fn add_correspondence_component(
        &self,
        device_id: MonitoredDeviceId,
    ) -> ConnectorResult<String> {
        let url = format!(
            "{}/components/{CORRESPONDENCE_COMPONENT_TYPE}",
            self.device_url(device_id)
        );
        let reply = self.send(HttpMethod::Post, &url, None).await?;

        reply
            .get("components")
            .and_then(Value::as_object)
            .and_then(|components| components.keys().next().cloned())
            .ok_or_else(|| ConnectorError::unexpected(&url, "reply lists no component id"))
    }

    async fn set_correspondence_label(
        &self,
        device_id: MonitoredDeviceId,
        component_id: &str,
        source_id: SourceDeviceId,
    ) -> ConnectorResult<()> {
        let url = format!("{}/components", self.device_url(device_id));
        let mut body = serde_json::Map::new();
        body.insert(
            component_id.to_string(),
            json!({
                "type": CORRESPONDENCE_COMPONENT_TYPE,
                "label": source_id.to_string(),
                "status": null,
                "ignore": null,
                "disabled": null,
                "error": null,
            }),
        );
        self.send(HttpMethod::Put, &url, Some(&Value::Object(body)))
            .await?;
        Ok(())
    }
}
