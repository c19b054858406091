//! Drift detection between a matched source/monitored pair.

use std::fmt;

use nbsync_connector::types::{MonitoredDevice, SnmpPolicy, SourceDevice};
use serde::Serialize;

/// Kind of attribute mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// Source is not active but the monitored device is enabled.
    Disable,
    /// Source is active but the monitored device is disabled.
    Enable,
    /// Source name differs from the monitored host label.
    Rename,
    /// Manufacturer and model differ from the monitored hardware string.
    Hardware,
    /// Ping-only policy but SNMP is enabled on the monitored device.
    SnmpDisable,
}

impl DriftKind {
    /// Monitored attribute the mismatch concerns.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Disable | Self::Enable => "disabled",
            Self::Rename => "hostname",
            Self::Hardware => "hardware",
            Self::SnmpDisable => "snmp_disable",
        }
    }
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Enable => write!(f, "enable"),
            Self::Rename => write!(f, "rename"),
            Self::Hardware => write!(f, "hardware"),
            Self::SnmpDisable => write!(f, "snmp_disable"),
        }
    }
}

/// One detected mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub kind: DriftKind,
    pub attribute: &'static str,
    pub source_value: String,
    pub monitored_value: String,
}

impl Mismatch {
    fn new(kind: DriftKind, source_value: impl Into<String>, monitored_value: impl Into<String>) -> Self {
        Self {
            kind,
            attribute: kind.attribute(),
            source_value: source_value.into(),
            monitored_value: monitored_value.into(),
        }
    }
}

/// Ordered mismatches for one pair. Empty means in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    mismatches: Vec<Mismatch>,
}

impl DriftReport {
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn kinds(&self) -> Vec<DriftKind> {
        self.mismatches.iter().map(|m| m.kind).collect()
    }

    pub fn contains(&self, kind: DriftKind) -> bool {
        self.mismatches.iter().any(|m| m.kind == kind)
    }
}

/// Compares a matched pair attribute by attribute.
///
/// Checks run in a fixed order and never short-circuit, so one report can
/// carry several kinds. Location and SNMP credentials are not compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftDetector;

impl DriftDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, source: &SourceDevice, monitored: &MonitoredDevice) -> DriftReport {
        let mut mismatches = Vec::new();
        let disabled = if monitored.disabled { "1" } else { "0" };

        if !source.status.is_active() && !monitored.disabled {
            mismatches.push(Mismatch::new(DriftKind::Disable, source.status.as_str(), disabled));
        }

        if source.status.is_active() && monitored.disabled {
            mismatches.push(Mismatch::new(DriftKind::Enable, source.status.as_str(), disabled));
        }

        if source.name != monitored.host_label() {
            mismatches.push(Mismatch::new(
                DriftKind::Rename,
                source.name.as_str(),
                monitored.hostname.as_str(),
            ));
        }

        let hardware = source.hardware();
        if hardware != monitored.hardware {
            mismatches.push(Mismatch::new(
                DriftKind::Hardware,
                hardware,
                monitored.hardware.as_str(),
            ));
        }

        if source.snmp_policy == Some(SnmpPolicy::Disabled) && !monitored.snmp_disabled {
            mismatches.push(Mismatch::new(DriftKind::SnmpDisable, "disabled", "0"));
        }

        DriftReport { mismatches }
    }
}
