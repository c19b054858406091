//! Device records exchanged between connectors and the reconciliation engine.
//!
//! `SourceDevice` comes from NetBox (the source of truth) and is never written.
//! `MonitoredDevice` comes from LibreNMS and carries the optional
//! correspondence identifier that links it back to its source.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// NetBox device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDeviceId(pub i64);

impl fmt::Display for SourceDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceDeviceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SourceDeviceId)
    }
}

/// LibreNMS device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoredDeviceId(pub i64);

impl fmt::Display for MonitoredDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational status of a source device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Active,
    /// Any other NetBox status value (`offline`, `planned`, `decommissioning`, ...).
    Other(String),
}

impl DeviceStatus {
    /// Parse a NetBox status value.
    pub fn from_value(value: &str) -> Self {
        if value == "active" {
            DeviceStatus::Active
        } else {
            DeviceStatus::Other(value.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DeviceStatus::Active)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Other(value) => value,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SNMP policy from the device's configuration context (`snmp-version`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpPolicy {
    /// Ping-only monitoring.
    Disabled,
    V2c,
    V3,
    /// A value this engine has no rules for.
    Unsupported(String),
}

impl SnmpPolicy {
    pub fn from_value(value: &str) -> Self {
        match value {
            "disabled" => SnmpPolicy::Disabled,
            "v2c" => SnmpPolicy::V2c,
            "v3" => SnmpPolicy::V3,
            other => SnmpPolicy::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SnmpPolicy::Disabled => "disabled",
            SnmpPolicy::V2c => "v2c",
            SnmpPolicy::V3 => "v3",
            SnmpPolicy::Unsupported(value) => value,
        }
    }
}

impl fmt::Display for SnmpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manufacturer and model of a source device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub manufacturer: String,
    pub model: String,
}

/// Device record from the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDevice {
    pub id: SourceDeviceId,
    pub name: String,
    /// Display label; NetBox falls back to the name when unset.
    pub display: String,
    pub role_id: i64,
    pub status: DeviceStatus,
    /// Primary address. CIDR as fetched, host portion once filtered.
    pub primary_address: Option<String>,
    pub site_name: String,
    pub location_name: Option<String>,
    pub device_type: DeviceType,
    /// `None` when the configuration context has no `snmp-version` key.
    pub snmp_policy: Option<SnmpPolicy>,
}

impl SourceDevice {
    /// Hardware string as LibreNMS should show it: `manufacturer + " " + model`.
    pub fn hardware(&self) -> String {
        format!(
            "{} {}",
            self.device_type.manufacturer, self.device_type.model
        )
    }

    /// Whether NetBox returned a usable device name.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Fully-qualified hostname under the given DNS suffix.
    ///
    /// `None` for an unnamed device: no hostname can be derived from it.
    pub fn fqdn(&self, domain: &str) -> Option<String> {
        self.has_name().then(|| format!("{}.{}", self.name, domain))
    }

    /// Location label: site name, plus the sub-location when present.
    pub fn location_label(&self) -> String {
        match &self.location_name {
            Some(location) => format!("{} {}", self.site_name, location),
            None => self.site_name.clone(),
        }
    }
}

/// Device record from the monitoring system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredDevice {
    pub id: MonitoredDeviceId,
    /// Fully-qualified hostname.
    pub hostname: String,
    pub disabled: bool,
    pub snmp_disabled: bool,
    pub snmp_version: Option<String>,
    /// Free-text hardware string; empty when LibreNMS reports null.
    pub hardware: String,
    pub ip: Option<String>,
    correspondence: Option<SourceDeviceId>,
}

impl MonitoredDevice {
    /// Create a record with no correspondence identifier.
    pub fn new(id: MonitoredDeviceId, hostname: impl Into<String>) -> Self {
        Self {
            id,
            hostname: hostname.into(),
            disabled: false,
            snmp_disabled: false,
            snmp_version: None,
            hardware: String::new(),
            ip: None,
            correspondence: None,
        }
    }

    /// Attach the correspondence identifier read from the monitoring system.
    #[must_use]
    pub fn with_correspondence(mut self, source_id: SourceDeviceId) -> Self {
        self.correspondence = Some(source_id);
        self
    }

    /// The source device this record is linked to, if any.
    pub fn correspondence(&self) -> Option<SourceDeviceId> {
        self.correspondence
    }

    /// Whether the record has never been linked to a source device.
    pub fn is_unsynced(&self) -> bool {
        self.correspondence.is_none()
    }

    /// First dot-delimited segment of the hostname.
    pub fn host_label(&self) -> &str {
        self.hostname
            .split_once('.')
            .map_or(self.hostname.as_str(), |(label, _)| label)
    }
}

/// Request body for creating a monitored device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMonitoredDevice {
    pub hostname: String,
    pub display: String,
    pub location: String,
    pub hardware: String,
    pub force_add: bool,
    pub snmp_disable: bool,
}

impl NewMonitoredDevice {
    /// Ping-only device for a source record, registered under `hostname`.
    pub fn ping_only(source: &SourceDevice, hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            display: source.display.clone(),
            location: source.location_label(),
            hardware: source.hardware(),
            force_add: true,
            snmp_disable: true,
        }
    }
}

/// Single-field update on a monitored device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceField {
    Disabled(bool),
    Hardware(String),
}

impl DeviceField {
    /// Field name as the monitoring API expects it.
    pub fn name(&self) -> &'static str {
        match self {
            DeviceField::Disabled(_) => "disabled",
            DeviceField::Hardware(_) => "hardware",
        }
    }

    /// Field value as the monitoring API expects it.
    pub fn data(&self) -> Value {
        match self {
            DeviceField::Disabled(disabled) => Value::from(u8::from(*disabled)),
            DeviceField::Hardware(hardware) => Value::from(hardware.as_str()),
        }
    }
}

/// Correspondence component attached to a monitored device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondenceComponent {
    pub component_id: String,
    /// Raw label text; empty or absent until populated.
    pub label: Option<String>,
}

impl CorrespondenceComponent {
    /// The source id stored in the label, if it parses.
    pub fn source_id(&self) -> Option<SourceDeviceId> {
        self.label.as_deref().and_then(|label| label.parse().ok())
    }
}
