//! LibreNMS API response shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use nbsync_connector::error::{ConnectorError, ConnectorResult};
use nbsync_connector::types::{CorrespondenceComponent, MonitoredDevice, MonitoredDeviceId};

/// Component type tag that carries the correspondence identifier.
pub const CORRESPONDENCE_COMPONENT_TYPE: &str = "netbox_id";

/// `GET /devices`.
#[derive(Debug, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub count: Option<u64>,
    pub devices: Vec<LibreNmsDevice>,
}

#[derive(Debug, Deserialize)]
pub struct LibreNmsDevice {
    pub device_id: i64,
    pub hostname: String,
    #[serde(default, deserialize_with = "flag")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "flag")]
    pub snmp_disable: bool,
    #[serde(default)]
    pub snmpver: Option<String>,
    #[serde(default)]
    pub hardware: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl From<LibreNmsDevice> for MonitoredDevice {
    fn from(device: LibreNmsDevice) -> Self {
        let mut monitored = MonitoredDevice::new(MonitoredDeviceId(device.device_id), device.hostname);
        monitored.disabled = device.disabled;
        monitored.snmp_disabled = device.snmp_disable;
        monitored.snmp_version = device.snmpver;
        monitored.hardware = device.hardware.unwrap_or_default();
        monitored.ip = device.ip;
        monitored
    }
}

/// `POST /devices` reply.
#[derive(Debug, Deserialize)]
pub struct CreatedDevices {
    pub devices: Vec<CreatedDevice>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedDevice {
    pub device_id: i64,
}

/// LibreNMS encodes 0/1 flags as integers, strings or booleans depending on version.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}

/// Reject replies whose envelope says `"status": "error"`.
pub fn ensure_ok(endpoint: &str, body: &Value) -> ConnectorResult<()> {
    match body.get("status").and_then(Value::as_str) {
        Some("error") => Err(ConnectorError::ApiError {
            endpoint: endpoint.to_string(),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }),
        _ => Ok(()),
    }
}

/// Extract correspondence components from a `components` reply.
///
/// LibreNMS returns an object keyed by component id, or an empty array when
/// the device has none.
pub fn parse_components(endpoint: &str, body: &Value) -> ConnectorResult<Vec<CorrespondenceComponent>> {
    let components = match body.get("components") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ConnectorError::unexpected(
                endpoint,
                format!("components has unexpected shape: {other}"),
            ))
        }
    };

    Ok(components
        .iter()
        .filter(|(_, component)| {
            component.get("type").and_then(Value::as_str) == Some(CORRESPONDENCE_COMPONENT_TYPE)
        })
        .map(|(component_id, component)| CorrespondenceComponent {
            component_id: component_id.clone(),
            label: match component.get("label") {
                Some(Value::String(label)) => Some(label.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            },
        })
        .collect())
}
