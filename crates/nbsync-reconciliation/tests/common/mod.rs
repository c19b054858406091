//! Shared in-memory inventories for reconciliation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use nbsync_connector::error::{ConnectorError, ConnectorResult};
use nbsync_connector::traits::{
    DeviceProvisionOp, DeviceUpdateOp, Inventory, MonitoringInventory, SourceInventory,
};
use nbsync_connector::types::{
    CorrespondenceComponent, DeviceField, DeviceStatus, DeviceType, MonitoredDevice,
    MonitoredDeviceId, NewMonitoredDevice, SnmpPolicy, SourceDevice, SourceDeviceId,
};

pub const DOMAIN: &str = "example.com";

// =============================================================================
// Builders
// =============================================================================

pub fn source_device(id: i64, name: &str) -> SourceDevice {
    SourceDevice {
        id: SourceDeviceId(id),
        name: name.to_string(),
        display: name.to_string(),
        role_id: 3,
        status: DeviceStatus::Active,
        primary_address: Some(format!("10.0.0.{id}/24")),
        site_name: "Main Campus".to_string(),
        location_name: None,
        device_type: DeviceType {
            manufacturer: "Cisco".to_string(),
            model: "C9300".to_string(),
        },
        snmp_policy: Some(SnmpPolicy::V2c),
    }
}

pub fn ping_only_device(id: i64, name: &str) -> SourceDevice {
    SourceDevice {
        snmp_policy: Some(SnmpPolicy::Disabled),
        device_type: DeviceType {
            manufacturer: "Epson".to_string(),
            model: "EB-L1100U".to_string(),
        },
        ..source_device(id, name)
    }
}

/// Monitored device that matches `source_device(_, name)` exactly.
pub fn monitored_device(id: i64, name: &str) -> MonitoredDevice {
    let mut device = MonitoredDevice::new(MonitoredDeviceId(id), format!("{name}.{DOMAIN}"));
    device.hardware = "Cisco C9300".to_string();
    device
}

// =============================================================================
// Mock NetBox
// =============================================================================

pub struct MockNetBox {
    devices: Mutex<Vec<SourceDevice>>,
    fail_fetch: AtomicBool,
    fetch_call_count: AtomicUsize,
}

impl MockNetBox {
    pub fn new(devices: Vec<SourceDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            fail_fetch: AtomicBool::new(false),
            fetch_call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_fetch_error(self) -> Self {
        self.fail_fetch.store(true, Ordering::SeqCst);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }
}

impl Inventory for MockNetBox {
    fn display_name(&self) -> &str {
        "Mock NetBox"
    }
}

#[async_trait]
impl SourceInventory for MockNetBox {
    async fn fetch_source_devices(&self) -> ConnectorResult<Vec<SourceDevice>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ConnectorError::TargetUnavailable {
                message: "502 Bad Gateway".to_string(),
            });
        }
        Ok(self.devices.lock().unwrap().clone())
    }
}

// =============================================================================
// Mock LibreNMS
// =============================================================================

/// Stateful LibreNMS stand-in: writes are applied so later cycles see them.
pub struct MockLibreNms {
    devices: Mutex<Vec<MonitoredDevice>>,
    components: Mutex<HashMap<MonitoredDeviceId, Vec<CorrespondenceComponent>>>,
    next_id: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_update: AtomicBool,
    fail_create: AtomicBool,
    fail_add_component: AtomicBool,
    fail_set_label: AtomicBool,
    update_call_count: AtomicUsize,
    rename_call_count: AtomicUsize,
    create_call_count: AtomicUsize,
    add_component_call_count: AtomicUsize,
    set_label_call_count: AtomicUsize,
}

impl MockLibreNms {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            components: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1000),
            fail_fetch: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_add_component: AtomicBool::new(false),
            fail_set_label: AtomicBool::new(false),
            update_call_count: AtomicUsize::new(0),
            rename_call_count: AtomicUsize::new(0),
            create_call_count: AtomicUsize::new(0),
            add_component_call_count: AtomicUsize::new(0),
            set_label_call_count: AtomicUsize::new(0),
        }
    }

    /// Add a device linked to `source_id`, or unsynced when `None`.
    pub fn with_device(self, device: MonitoredDevice, source_id: Option<i64>) -> Self {
        let id = device.id;
        self.devices.lock().unwrap().push(device);
        if let Some(source_id) = source_id {
            self.components.lock().unwrap().insert(
                id,
                vec![CorrespondenceComponent {
                    component_id: format!("c{}", id.0),
                    label: Some(source_id.to_string()),
                }],
            );
        }
        self
    }

    /// Add an empty correspondence component, as left by a half-finished create.
    pub fn with_empty_component(self, device_id: i64) -> Self {
        self.components.lock().unwrap().insert(
            MonitoredDeviceId(device_id),
            vec![CorrespondenceComponent {
                component_id: format!("c{device_id}"),
                label: Some(String::new()),
            }],
        );
        self
    }

    pub fn with_fetch_error(self) -> Self {
        self.fail_fetch.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_update_error(self) -> Self {
        self.fail_update.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_create_error(self) -> Self {
        self.fail_create.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_add_component_error(self) -> Self {
        self.fail_add_component.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_set_label_error(self) -> Self {
        self.fail_set_label.store(true, Ordering::SeqCst);
        self
    }

    pub fn clear_failures(&self) {
        self.fail_fetch.store(false, Ordering::SeqCst);
        self.fail_update.store(false, Ordering::SeqCst);
        self.fail_create.store(false, Ordering::SeqCst);
        self.fail_add_component.store(false, Ordering::SeqCst);
        self.fail_set_label.store(false, Ordering::SeqCst);
    }

    pub fn device(&self, id: MonitoredDeviceId) -> Option<MonitoredDevice> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn device_count(&self) -> usize {
        self.devices.lock().unwrap().len()
    }

    /// Correspondence label currently stored on a device.
    pub fn label(&self, id: MonitoredDeviceId) -> Option<String> {
        self.components
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|c| c.first())
            .and_then(|c| c.label.clone())
    }

    pub fn component_count(&self, id: MonitoredDeviceId) -> usize {
        self.components
            .lock()
            .unwrap()
            .get(&id)
            .map_or(0, Vec::len)
    }

    pub fn update_calls(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn rename_calls(&self) -> usize {
        self.rename_call_count.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn add_component_calls(&self) -> usize {
        self.add_component_call_count.load(Ordering::SeqCst)
    }

    pub fn set_label_calls(&self) -> usize {
        self.set_label_call_count.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.update_calls()
            + self.rename_calls()
            + self.create_calls()
            + self.add_component_calls()
            + self.set_label_calls()
    }

    fn unavailable() -> ConnectorError {
        ConnectorError::TargetUnavailable {
            message: "503 Service Unavailable".to_string(),
        }
    }

    fn with_device_mut(
        &self,
        id: MonitoredDeviceId,
        apply: impl FnOnce(&mut MonitoredDevice),
    ) -> ConnectorResult<()> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ConnectorError::ObjectNotFound {
                identifier: id.to_string(),
            })?;
        apply(device);
        Ok(())
    }
}

impl Inventory for MockLibreNms {
    fn display_name(&self) -> &str {
        "Mock LibreNMS"
    }
}

#[async_trait]
impl MonitoringInventory for MockLibreNms {
    async fn fetch_monitored_devices(&self) -> ConnectorResult<Vec<MonitoredDevice>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let devices = self.devices.lock().unwrap().clone();
        let components = self.components.lock().unwrap();
        Ok(devices
            .into_iter()
            .map(|device| {
                let linked = components
                    .get(&device.id)
                    .and_then(|c| c.iter().find_map(CorrespondenceComponent::source_id));
                match linked {
                    Some(source_id) => device.with_correspondence(source_id),
                    None => device,
                }
            })
            .collect())
    }

    async fn correspondence_components(
        &self,
        device_id: MonitoredDeviceId,
    ) -> ConnectorResult<Vec<CorrespondenceComponent>> {
        Ok(self
            .components
            .lock()
            .unwrap()
            .get(&device_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DeviceUpdateOp for MockLibreNms {
    async fn update_field(&self, device_id: MonitoredDeviceId, field: &DeviceField) -> ConnectorResult<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.with_device_mut(device_id, |device| match field {
            DeviceField::Disabled(disabled) => device.disabled = *disabled,
            DeviceField::Hardware(hardware) => device.hardware = hardware.clone(),
        })
    }

    async fn rename_device(&self, device_id: MonitoredDeviceId, new_hostname: &str) -> ConnectorResult<()> {
        self.rename_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.with_device_mut(device_id, |device| device.hostname = new_hostname.to_string())
    }
}

#[async_trait]
impl DeviceProvisionOp for MockLibreNms {
    async fn create_device(&self, device: &NewMonitoredDevice) -> ConnectorResult<MonitoredDeviceId> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let id = MonitoredDeviceId(self.next_id.fetch_add(1, Ordering::SeqCst) as i64);
        let mut created = MonitoredDevice::new(id, device.hostname.clone());
        created.hardware = device.hardware.clone();
        created.snmp_disabled = device.snmp_disable;
        self.devices.lock().unwrap().push(created);
        Ok(id)
    }

    async fn add_correspondence_component(&self, device_id: MonitoredDeviceId) -> ConnectorResult<String> {
        self.add_component_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_add_component.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let component_id = format!("c{}", device_id.0);
        self.components
            .lock()
            .unwrap()
            .entry(device_id)
            .or_default()
            .push(CorrespondenceComponent {
                component_id: component_id.clone(),
                label: Some(String::new()),
            });
        Ok(component_id)
    }

    async fn set_correspondence_label(
        &self,
        device_id: MonitoredDeviceId,
        component_id: &str,
        source_id: SourceDeviceId,
    ) -> ConnectorResult<()> {
        self.set_label_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_set_label.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut components = self.components.lock().unwrap();
        let component = components
            .get_mut(&device_id)
            .and_then(|c| c.iter_mut().find(|c| c.component_id == component_id))
            .ok_or_else(|| ConnectorError::ObjectNotFound {
                identifier: component_id.to_string(),
            })?;
        component.label = Some(source_id.to_string());
        Ok(())
    }
}
