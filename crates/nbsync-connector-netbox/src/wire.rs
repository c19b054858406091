//! NetBox REST response shapes.
//!
//! Only the fields the sync reads are modelled. A device missing one of the
//! required nested objects fails deserialization, which aborts the fetch as
//! an unexpected-shape error.

use serde::Deserialize;
use serde_json::Value;

use nbsync_connector::types::{
    DeviceStatus, DeviceType, SnmpPolicy, SourceDevice, SourceDeviceId,
};

/// Configuration-context key holding the SNMP policy.
pub const SNMP_VERSION_KEY: &str = "snmp-version";

/// One page of `GET /dcim/devices/`.
#[derive(Debug, Deserialize)]
pub struct DevicePage {
    pub count: u64,
    /// Absolute URL of the next page.
    pub next: Option<String>,
    pub results: Vec<NetBoxDevice>,
}

#[derive(Debug, Deserialize)]
pub struct NetBoxDevice {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    /// `device_role` before NetBox 3.6.
    #[serde(alias = "device_role")]
    pub role: NestedId,
    pub status: StatusValue,
    #[serde(default)]
    pub primary_ip: Option<IpAddressRef>,
    pub site: NestedName,
    #[serde(default)]
    pub location: Option<NestedName>,
    pub device_type: DeviceTypeRef,
    #[serde(default)]
    pub config_context: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct NestedId {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NestedName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct IpAddressRef {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceTypeRef {
    pub model: String,
    pub manufacturer: NestedName,
}

impl From<NetBoxDevice> for SourceDevice {
    fn from(device: NetBoxDevice) -> Self {
        let name = device.name.unwrap_or_default();
        let snmp_policy = device
            .config_context
            .as_ref()
            .and_then(|context| context.get(SNMP_VERSION_KEY))
            .and_then(Value::as_str)
            .map(SnmpPolicy::from_value);

        SourceDevice {
            id: SourceDeviceId(device.id),
            display: device.display.unwrap_or_else(|| name.clone()),
            name,
            role_id: device.role.id,
            status: DeviceStatus::from_value(&device.status.value),
            primary_address: device.primary_ip.map(|ip| ip.address),
            site_name: device.site.name,
            location_name: device.location.map(|location| location.name),
            device_type: DeviceType {
                manufacturer: device.device_type.manufacturer.name,
                model: device.device_type.model,
            },
            snmp_policy,
        }
    }
}
