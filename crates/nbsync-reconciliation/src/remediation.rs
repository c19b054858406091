//! Remediation planning and execution.
//!
//! Turns drift reports into single-field writes on the monitored device and
//! creation candidates into the three-step ping-only provisioning sequence.
//! Every write yields an outcome value; failures are recorded, never raised.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use nbsync_connector::error::ConnectorError;
use nbsync_connector::traits::{DeviceProvisionOp, DeviceUpdateOp};
use nbsync_connector::types::{
    DeviceField, MonitoredDevice, MonitoredDeviceId, NewMonitoredDevice, SnmpPolicy, SourceDevice,
    SourceDeviceId,
};

use crate::drift::{DriftKind, DriftReport};

// =============================================================================
// Update path
// =============================================================================

/// Write corresponding to one drift kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WriteAction {
    /// `PATCH /devices/{id}` with a single field.
    SetField { field: DeviceField },
    /// `PATCH /devices/{id}/rename/{hostname}`.
    Rename { new_hostname: String },
    /// Detected but no write is defined for it.
    Unsupported,
}

/// A write planned for a matched pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedWrite {
    pub drift: DriftKind,
    #[serde(flatten)]
    pub action: WriteAction,
}

/// Plan one write per mismatch, in detection order.
pub fn plan_updates(source: &SourceDevice, report: &DriftReport, domain: &str) -> Vec<PlannedWrite> {
    report
        .mismatches()
        .iter()
        .map(|mismatch| {
            let action = match mismatch.kind {
                DriftKind::Disable => WriteAction::SetField {
                    field: DeviceField::Disabled(true),
                },
                DriftKind::Enable => WriteAction::SetField {
                    field: DeviceField::Disabled(false),
                },
                DriftKind::Rename => match source.fqdn(domain) {
                    Some(new_hostname) => WriteAction::Rename { new_hostname },
                    None => {
                        warn!(source_id = %source.id, "NetBox device has no name, rename skipped");
                        WriteAction::Unsupported
                    }
                },
                DriftKind::Hardware => WriteAction::SetField {
                    field: DeviceField::Hardware(source.hardware()),
                },
                DriftKind::SnmpDisable => WriteAction::Unsupported,
            };
            PlannedWrite {
                drift: mismatch.kind,
                action,
            }
        })
        .collect()
}

/// Result of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    Success,
    Failure,
    /// Nothing was sent (unsupported write).
    Skipped,
}

/// Outcome of one planned write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub monitored_id: MonitoredDeviceId,
    pub drift: DriftKind,
    pub result: ActionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    /// Whether the write was only planned.
    pub dry_run: bool,
    pub executed_at: DateTime<Utc>,
}

impl WriteOutcome {
    pub fn success(monitored_id: MonitoredDeviceId, drift: DriftKind, dry_run: bool) -> Self {
        Self {
            monitored_id,
            drift,
            result: ActionResult::Success,
            error_message: None,
            error_code: None,
            dry_run,
            executed_at: Utc::now(),
        }
    }

    pub fn failure(monitored_id: MonitoredDeviceId, drift: DriftKind, error: &ConnectorError) -> Self {
        Self {
            monitored_id,
            drift,
            result: ActionResult::Failure,
            error_message: Some(error.to_string()),
            error_code: Some(error.error_code()),
            dry_run: false,
            executed_at: Utc::now(),
        }
    }

    pub fn skipped(monitored_id: MonitoredDeviceId, drift: DriftKind, dry_run: bool) -> Self {
        Self {
            monitored_id,
            drift,
            result: ActionResult::Skipped,
            error_message: None,
            error_code: None,
            dry_run,
            executed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == ActionResult::Success
    }

    pub fn is_failure(&self) -> bool {
        self.result == ActionResult::Failure
    }
}

// =============================================================================
// Create path
// =============================================================================

/// What to do for a creation candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePlan {
    /// Provision a new ping-only device.
    Create(NewMonitoredDevice),
    /// Link an unsynced device that already carries the expected hostname,
    /// typically left behind by an interrupted earlier create.
    Adopt {
        device_id: MonitoredDeviceId,
        hostname: String,
    },
    /// Only ping-only devices are provisioned.
    Skip { policy: Option<SnmpPolicy> },
    /// The source has no name to derive a hostname from.
    Unnamed,
}

/// Decide how a creation candidate is provisioned.
///
/// `unsynced` are monitored devices without a correspondence identifier that
/// are still available for adoption.
pub fn plan_create<'a>(
    source: &SourceDevice,
    unsynced: impl IntoIterator<Item = &'a MonitoredDevice>,
    domain: &str,
) -> CreatePlan {
    if source.snmp_policy != Some(SnmpPolicy::Disabled) {
        return CreatePlan::Skip {
            policy: source.snmp_policy.clone(),
        };
    }

    let Some(hostname) = source.fqdn(domain) else {
        return CreatePlan::Unnamed;
    };
    if let Some(existing) = unsynced
        .into_iter()
        .find(|device| device.hostname.eq_ignore_ascii_case(&hostname))
    {
        return CreatePlan::Adopt {
            device_id: existing.id,
            hostname: existing.hostname.clone(),
        };
    }

    CreatePlan::Create(NewMonitoredDevice::ping_only(source, hostname))
}

/// Step of the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateStep {
    CreateDevice,
    AttachComponent,
    SetLabel,
}

impl std::fmt::Display for CreateStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDevice => write!(f, "create_device"),
            Self::AttachComponent => write!(f, "attach_component"),
            Self::SetLabel => write!(f, "set_label"),
        }
    }
}

/// Outcome of provisioning one creation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateOutcome {
    /// The device exists and carries the correspondence identifier.
    Linked {
        source_id: SourceDeviceId,
        device_id: MonitoredDeviceId,
        adopted: bool,
    },
    /// Policy other than ping-only; the source stays a candidate.
    SkippedSnmpPolicy {
        source_id: SourceDeviceId,
        policy: Option<SnmpPolicy>,
    },
    /// No hostname can be derived; the source stays a candidate.
    SkippedUnnamed { source_id: SourceDeviceId },
    /// Dry run; nothing was written.
    Planned {
        source_id: SourceDeviceId,
        adopted: bool,
    },
    /// A step failed and the remaining steps were not attempted.
    Failed {
        source_id: SourceDeviceId,
        step: CreateStep,
        device_id: Option<MonitoredDeviceId>,
        error_message: String,
        error_code: &'static str,
    },
}

impl CreateOutcome {
    fn failed(
        source_id: SourceDeviceId,
        step: CreateStep,
        device_id: Option<MonitoredDeviceId>,
        error: &ConnectorError,
    ) -> Self {
        CreateOutcome::Failed {
            source_id,
            step,
            device_id,
            error_message: error.to_string(),
            error_code: error.error_code(),
        }
    }

    pub fn source_id(&self) -> SourceDeviceId {
        match self {
            CreateOutcome::Linked { source_id, .. }
            | CreateOutcome::SkippedSnmpPolicy { source_id, .. }
            | CreateOutcome::SkippedUnnamed { source_id }
            | CreateOutcome::Planned { source_id, .. }
            | CreateOutcome::Failed { source_id, .. } => *source_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CreateOutcome::Failed { .. })
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Executes planned writes against the monitoring system.
pub struct RemediationExecutor<M> {
    monitoring: Arc<M>,
    dry_run: bool,
}

impl<M> RemediationExecutor<M> {
    pub fn new(monitoring: Arc<M>, dry_run: bool) -> Self {
        Self {
            monitoring,
            dry_run,
        }
    }
}

impl<M: DeviceUpdateOp> RemediationExecutor<M> {
    /// Apply every planned write. A failed write does not stop the rest.
    pub async fn apply_updates(
        &self,
        monitored: &MonitoredDevice,
        writes: &[PlannedWrite],
    ) -> Vec<WriteOutcome> {
        let mut outcomes = Vec::with_capacity(writes.len());
        for write in writes {
            outcomes.push(self.apply_write(monitored, write).await);
        }
        outcomes
    }

    async fn apply_write(&self, monitored: &MonitoredDevice, write: &PlannedWrite) -> WriteOutcome {
        let device_id = monitored.id;

        let result = match &write.action {
            WriteAction::Unsupported => {
                warn!(
                    monitored_id = %device_id,
                    hostname = %monitored.hostname,
                    drift = %write.drift,
                    "No write defined for drift, leaving device as is"
                );
                return WriteOutcome::skipped(device_id, write.drift, self.dry_run);
            }
            _ if self.dry_run => {
                info!(
                    monitored_id = %device_id,
                    hostname = %monitored.hostname,
                    drift = %write.drift,
                    "Dry run, write not sent"
                );
                return WriteOutcome::success(device_id, write.drift, true);
            }
            WriteAction::SetField { field } => {
                self.monitoring.update_field(device_id, field).await
            }
            WriteAction::Rename { new_hostname } => {
                self.monitoring.rename_device(device_id, new_hostname).await
            }
        };

        match result {
            Ok(()) => {
                info!(
                    monitored_id = %device_id,
                    hostname = %monitored.hostname,
                    drift = %write.drift,
                    "Updated monitored device"
                );
                WriteOutcome::success(device_id, write.drift, false)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(
                        monitored_id = %device_id,
                        drift = %write.drift,
                        error = %e,
                        error_code = e.error_code(),
                        "Transient failure updating monitored device"
                    );
                } else {
                    error!(
                        monitored_id = %device_id,
                        drift = %write.drift,
                        error = %e,
                        error_code = e.error_code(),
                        "Failed to update monitored device"
                    );
                }
                WriteOutcome::failure(device_id, write.drift, &e)
            }
        }
    }
}

impl<M: DeviceProvisionOp> RemediationExecutor<M> {
    /// Run the provisioning sequence for one creation candidate.
    ///
    /// Each step aborts the rest on failure. Adopted devices are inspected
    /// first so a retried sequence converges instead of duplicating.
    pub async fn execute_create(&self, source: &SourceDevice, plan: CreatePlan) -> CreateOutcome {
        let source_id = source.id;

        match plan {
            CreatePlan::Skip { policy } => {
                warn!(
                    source_id = %source_id,
                    name = %source.name,
                    snmp_policy = policy.as_ref().map_or("none", SnmpPolicy::as_str),
                    "Creation for this SNMP policy is not supported, skipping"
                );
                CreateOutcome::SkippedSnmpPolicy { source_id, policy }
            }
            CreatePlan::Unnamed => {
                warn!(
                    source_id = %source_id,
                    display = %source.display,
                    "NetBox device has no name, not creating it"
                );
                CreateOutcome::SkippedUnnamed { source_id }
            }
            CreatePlan::Create(request) => {
                if self.dry_run {
                    info!(
                        source_id = %source_id,
                        hostname = %request.hostname,
                        "Dry run, device not created"
                    );
                    return CreateOutcome::Planned {
                        source_id,
                        adopted: false,
                    };
                }

                let device_id = match self.monitoring.create_device(&request).await {
                    Ok(id) => id,
                    Err(e) => {
                        error!(
                            source_id = %source_id,
                            hostname = %request.hostname,
                            error = %e,
                            error_code = e.error_code(),
                            "Failed to create monitored device"
                        );
                        return CreateOutcome::failed(source_id, CreateStep::CreateDevice, None, &e);
                    }
                };
                info!(
                    source_id = %source_id,
                    monitored_id = %device_id,
                    hostname = %request.hostname,
                    "Created monitored device"
                );

                self.link(source, device_id, false).await
            }
            CreatePlan::Adopt {
                device_id,
                hostname,
            } => {
                if self.dry_run {
                    info!(
                        source_id = %source_id,
                        monitored_id = %device_id,
                        hostname = %hostname,
                        "Dry run, unsynced device not adopted"
                    );
                    return CreateOutcome::Planned {
                        source_id,
                        adopted: true,
                    };
                }
                info!(
                    source_id = %source_id,
                    monitored_id = %device_id,
                    hostname = %hostname,
                    "Adopting unsynced device with matching hostname"
                );

                self.link(source, device_id, true).await
            }
        }
    }

    /// Attach and populate the correspondence component.
    async fn link(&self, source: &SourceDevice, device_id: MonitoredDeviceId, adopted: bool) -> CreateOutcome {
        let source_id = source.id;

        // A device created a moment ago has no components.
        let existing = if adopted {
            match self.monitoring.correspondence_components(device_id).await {
                Ok(components) => components,
                Err(e) => {
                    error!(
                        source_id = %source_id,
                        monitored_id = %device_id,
                        error = %e,
                        "Failed to read correspondence components"
                    );
                    return CreateOutcome::failed(
                        source_id,
                        CreateStep::AttachComponent,
                        Some(device_id),
                        &e,
                    );
                }
            }
        } else {
            Vec::new()
        };

        if existing.iter().any(|c| c.source_id() == Some(source_id)) {
            debug!(source_id = %source_id, monitored_id = %device_id, "Correspondence already set");
            return CreateOutcome::Linked {
                source_id,
                device_id,
                adopted,
            };
        }

        let component_id = match existing.first() {
            Some(component) => {
                debug!(
                    monitored_id = %device_id,
                    component_id = %component.component_id,
                    "Reusing existing correspondence component"
                );
                component.component_id.clone()
            }
            None => match self.monitoring.add_correspondence_component(device_id).await {
                Ok(component_id) => component_id,
                Err(e) => {
                    error!(
                        source_id = %source_id,
                        monitored_id = %device_id,
                        error = %e,
                        error_code = e.error_code(),
                        "Failed to attach correspondence component"
                    );
                    return CreateOutcome::failed(
                        source_id,
                        CreateStep::AttachComponent,
                        Some(device_id),
                        &e,
                    );
                }
            },
        };

        if let Err(e) = self
            .monitoring
            .set_correspondence_label(device_id, &component_id, source_id)
            .await
        {
            error!(
                source_id = %source_id,
                monitored_id = %device_id,
                component_id = %component_id,
                error = %e,
                error_code = e.error_code(),
                "Failed to set correspondence label"
            );
            return CreateOutcome::failed(source_id, CreateStep::SetLabel, Some(device_id), &e);
        }

        info!(
            source_id = %source_id,
            monitored_id = %device_id,
            adopted = adopted,
            "Linked monitored device to NetBox device"
        );
        CreateOutcome::Linked {
            source_id,
            device_id,
            adopted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftDetector;
    use nbsync_connector::types::{DeviceStatus, DeviceType};

    fn source(name: &str, policy: Option<SnmpPolicy>) -> SourceDevice {
        SourceDevice {
            id: SourceDeviceId(13),
            name: name.to_string(),
            display: name.to_string(),
            role_id: 6,
            status: DeviceStatus::Active,
            primary_address: Some("10.1.2.3".to_string()),
            site_name: "Main".to_string(),
            location_name: None,
            device_type: DeviceType {
                manufacturer: "Epson".to_string(),
                model: "EB-L1100U".to_string(),
            },
            snmp_policy: policy,
        }
    }

    /// Apply planned writes to a local copy the way the monitoring API would.
    fn simulate(monitored: &mut MonitoredDevice, writes: &[PlannedWrite]) {
        for write in writes {
            match &write.action {
                WriteAction::SetField {
                    field: DeviceField::Disabled(disabled),
                } => monitored.disabled = *disabled,
                WriteAction::SetField {
                    field: DeviceField::Hardware(hardware),
                } => monitored.hardware = hardware.clone(),
                WriteAction::Rename { new_hostname } => monitored.hostname = new_hostname.clone(),
                WriteAction::Unsupported => {}
            }
        }
    }

    #[test]
    fn test_plan_maps_each_kind() {
        let mut src = source("proj-101", Some(SnmpPolicy::Disabled));
        src.status = DeviceStatus::Other("offline".to_string());
        let monitored = MonitoredDevice::new(MonitoredDeviceId(4), "old.example.com")
            .with_correspondence(SourceDeviceId(13));

        let report = DriftDetector::new().detect(&src, &monitored);
        let writes = plan_updates(&src, &report, "example.com");

        assert_eq!(
            writes.iter().map(|w| w.action.clone()).collect::<Vec<_>>(),
            vec![
                WriteAction::SetField {
                    field: DeviceField::Disabled(true)
                },
                WriteAction::Rename {
                    new_hostname: "proj-101.example.com".to_string()
                },
                WriteAction::SetField {
                    field: DeviceField::Hardware("Epson EB-L1100U".to_string())
                },
                WriteAction::Unsupported,
            ]
        );
    }

    #[test]
    fn test_planned_writes_converge() {
        let detector = DriftDetector::new();
        let src = source("proj-101", Some(SnmpPolicy::V2c));
        let mut monitored = MonitoredDevice::new(MonitoredDeviceId(4), "projector.example.com")
            .with_correspondence(SourceDeviceId(13));
        monitored.disabled = true;
        monitored.hardware = "Unknown".to_string();

        let report = detector.detect(&src, &monitored);
        assert_eq!(report.len(), 3);

        simulate(&mut monitored, &plan_updates(&src, &report, "example.com"));
        assert!(detector.detect(&src, &monitored).is_empty());
    }

    #[test]
    fn test_plan_create_requires_ping_only_policy() {
        for policy in [None, Some(SnmpPolicy::V2c), Some(SnmpPolicy::V3)] {
            let plan = plan_create(&source("tv1", policy.clone()), [], "example.com");
            assert_eq!(plan, CreatePlan::Skip { policy });
        }
    }

    #[test]
    fn test_unnamed_source_is_neither_created_nor_renamed() {
        let src = source("", Some(SnmpPolicy::Disabled));
        let leftover = MonitoredDevice::new(MonitoredDeviceId(77), ".example.com");
        assert_eq!(plan_create(&src, [&leftover], "example.com"), CreatePlan::Unnamed);

        let monitored = MonitoredDevice::new(MonitoredDeviceId(4), "proj-101.example.com")
            .with_correspondence(SourceDeviceId(13));
        let report = DriftDetector::new().detect(&src, &monitored);
        assert!(report.contains(DriftKind::Rename));

        let writes = plan_updates(&src, &report, "example.com");
        assert!(writes
            .iter()
            .all(|w| !matches!(w.action, WriteAction::Rename { .. })));
        assert!(writes
            .iter()
            .any(|w| w.drift == DriftKind::Rename && w.action == WriteAction::Unsupported));
    }

    #[test]
    fn test_plan_create_adopts_matching_hostname() {
        let leftover = MonitoredDevice::new(MonitoredDeviceId(77), "TV1.example.com");
        let unrelated = MonitoredDevice::new(MonitoredDeviceId(78), "tv2.example.com");

        let plan = plan_create(
            &source("tv1", Some(SnmpPolicy::Disabled)),
            [&unrelated, &leftover],
            "example.com",
        );
        assert_eq!(
            plan,
            CreatePlan::Adopt {
                device_id: MonitoredDeviceId(77),
                hostname: "TV1.example.com".to_string()
            }
        );
    }

    #[test]
    fn test_plan_create_new_device() {
        let plan = plan_create(&source("tv1", Some(SnmpPolicy::Disabled)), [], "example.com");
        match plan {
            CreatePlan::Create(request) => {
                assert_eq!(request.hostname, "tv1.example.com");
                assert!(request.snmp_disable);
                assert!(request.force_add);
            }
            other => panic!("expected create, got {other:?}"),
        }
    }
}
