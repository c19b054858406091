//! Inventory traits
//!
//! Capability-based trait definitions. The reconciliation engine only needs
//! reads from the source of truth, and reads, field updates and provisioning
//! on the monitoring side, so each concern is its own trait.

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::types::{
    CorrespondenceComponent, DeviceField, MonitoredDevice, MonitoredDeviceId, NewMonitoredDevice,
    SourceDevice, SourceDeviceId,
};

/// Base trait for all inventory connectors.
pub trait Inventory: Send + Sync {
    /// Display name for logs.
    fn display_name(&self) -> &str;
}

/// Read access to the source-of-truth inventory.
#[async_trait]
pub trait SourceInventory: Inventory {
    /// Fetch the full device collection, following pagination to the end.
    ///
    /// Addresses are returned as the source reports them (CIDR notation).
    async fn fetch_source_devices(&self) -> ConnectorResult<Vec<SourceDevice>>;
}

/// Read access to the monitoring inventory.
#[async_trait]
pub trait MonitoringInventory: Inventory {
    /// Fetch every monitored device with its correspondence identifier resolved.
    ///
    /// Fails as a whole if any device's correspondence lookup fails, so a
    /// partially-resolved list is never returned.
    async fn fetch_monitored_devices(&self) -> ConnectorResult<Vec<MonitoredDevice>>;

    /// Correspondence components currently attached to a device.
    async fn correspondence_components(
        &self,
        device_id: MonitoredDeviceId,
    ) -> ConnectorResult<Vec<CorrespondenceComponent>>;
}

/// Capability for correcting drift on an existing monitored device.
#[async_trait]
pub trait DeviceUpdateOp: MonitoringInventory {
    /// Update a single field by name/value.
    async fn update_field(
        &self,
        device_id: MonitoredDeviceId,
        field: &DeviceField,
    ) -> ConnectorResult<()>;

    /// Rename the device to a new fully-qualified hostname.
    async fn rename_device(
        &self,
        device_id: MonitoredDeviceId,
        new_hostname: &str,
    ) -> ConnectorResult<()>;
}

/// Capability for provisioning new monitored devices and linking them.
#[async_trait]
pub trait DeviceProvisionOp: MonitoringInventory {
    /// Create a device and return its monitoring-system identifier.
    async fn create_device(&self, device: &NewMonitoredDevice)
        -> ConnectorResult<MonitoredDeviceId>;

    /// Attach an empty correspondence component; returns its component id.
    async fn add_correspondence_component(
        &self,
        device_id: MonitoredDeviceId,
    ) -> ConnectorResult<String>;

    /// Store the source identifier as the component's label.
    async fn set_correspondence_label(
        &self,
        device_id: MonitoredDeviceId,
        component_id: &str,
        source_id: SourceDeviceId,
    ) -> ConnectorResult<()>;
}
