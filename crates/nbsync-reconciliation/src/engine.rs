//! Reconciliation engine orchestrator.
//!
//! One cycle: fetch NetBox, filter, fetch LibreNMS, resolve, apply drift
//! writes for matched pairs, report the rest, then provision candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use nbsync_connector::error::ConnectorError;
use nbsync_connector::traits::{DeviceProvisionOp, DeviceUpdateOp, SourceInventory};
use nbsync_connector::types::{MonitoredDeviceId, SourceDeviceId};

use crate::correspondence::resolve;
use crate::drift::DriftDetector;
use crate::eligibility::{EligibilityFilter, DEFAULT_ROLE_IDS};
use crate::remediation::{
    plan_create, plan_updates, CreateOutcome, CreatePlan, RemediationExecutor, WriteOutcome,
};
use crate::statistics::CycleStatistics;

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// DNS suffix appended to NetBox names to form LibreNMS hostnames.
    pub domain: String,
    /// NetBox role ids that are synced.
    #[serde(default = "default_allowed_role_ids")]
    pub allowed_role_ids: Vec<i64>,
    /// Plan and log writes without sending them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_allowed_role_ids() -> Vec<i64> {
    DEFAULT_ROLE_IDS.to_vec()
}

impl ReconciliationConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            allowed_role_ids: default_allowed_role_ids(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_allowed_role_ids(mut self, role_ids: Vec<i64>) -> Self {
        self.allowed_role_ids = role_ids;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A cycle that could not run to completion.
///
/// Only fetch failures abort a cycle; a partial inventory is never reconciled.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to fetch NetBox devices: {0}")]
    SourceFetch(#[source] ConnectorError),

    #[error("failed to fetch LibreNMS devices: {0}")]
    MonitoringFetch(#[source] ConnectorError),
}

impl CycleError {
    pub fn connector_error(&self) -> &ConnectorError {
        match self {
            CycleError::SourceFetch(e) | CycleError::MonitoringFetch(e) => e,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.connector_error().is_transient()
    }

    pub fn error_code(&self) -> &'static str {
        self.connector_error().error_code()
    }
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub dry_run: bool,
    pub statistics: CycleStatistics,
    /// Outcome of every planned write on a matched pair.
    pub writes: Vec<WriteOutcome>,
    /// Outcome of every creation candidate.
    pub creates: Vec<CreateOutcome>,
    /// Source ids claimed by more than one monitored device.
    pub conflicts: Vec<SourceDeviceId>,
    /// Monitored devices linked to no eligible source.
    pub orphaned: Vec<MonitoredDeviceId>,
}

impl CycleReport {
    pub fn failed_writes(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.writes.iter().filter(|w| w.is_failure())
    }

    pub fn create_for(&self, source_id: SourceDeviceId) -> Option<&CreateOutcome> {
        self.creates.iter().find(|c| c.source_id() == source_id)
    }
}

/// Reconciliation engine for one NetBox/LibreNMS pair.
pub struct ReconciliationEngine<S, M> {
    source: Arc<S>,
    monitoring: Arc<M>,
    filter: EligibilityFilter,
    detector: DriftDetector,
    executor: RemediationExecutor<M>,
    config: ReconciliationConfig,
}

impl<S, M> ReconciliationEngine<S, M>
where
    S: SourceInventory,
    M: DeviceUpdateOp + DeviceProvisionOp,
{
    pub fn new(source: Arc<S>, monitoring: Arc<M>, config: ReconciliationConfig) -> Self {
        Self {
            filter: EligibilityFilter::new(config.allowed_role_ids.iter().copied()),
            detector: DriftDetector::new(),
            executor: RemediationExecutor::new(Arc::clone(&monitoring), config.dry_run),
            source,
            monitoring,
            config,
        }
    }

    /// Run one full reconciliation cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();
        let mut stats = CycleStatistics::new();

        info!(
            run_id = %run_id,
            source = self.source.display_name(),
            monitoring = self.monitoring.display_name(),
            dry_run = self.config.dry_run,
            "Starting sync cycle"
        );

        let sources = self
            .source
            .fetch_source_devices()
            .await
            .map_err(CycleError::SourceFetch)?;
        stats.source_total = count(sources.len());

        let eligible = self.filter.filter(sources);
        stats.eligible = count(eligible.len());
        debug!(
            run_id = %run_id,
            fetched = stats.source_total,
            eligible = stats.eligible,
            "Filtered NetBox devices"
        );

        let monitored = self
            .monitoring
            .fetch_monitored_devices()
            .await
            .map_err(CycleError::MonitoringFetch)?;
        stats.monitored_total = count(monitored.len());

        let resolution = resolve(&eligible, &monitored);
        stats.record_resolution(&resolution);

        let mut writes = Vec::new();
        for (source, device) in resolution.matched() {
            let report = self.detector.detect(source, device);
            stats.record_drift(&report);

            if report.is_empty() {
                trace!(source_id = %source.id, monitored_id = %device.id, "Device in sync");
                continue;
            }

            for mismatch in report.mismatches() {
                debug!(
                    source_id = %source.id,
                    monitored_id = %device.id,
                    hostname = %device.hostname,
                    drift = %mismatch.kind,
                    source_value = %mismatch.source_value,
                    monitored_value = %mismatch.monitored_value,
                    "Drift detected"
                );
            }

            let planned = plan_updates(source, &report, &self.config.domain);
            for outcome in self.executor.apply_updates(device, &planned).await {
                stats.record_write(&outcome);
                writes.push(outcome);
            }
        }

        for device in resolution.unsynced() {
            trace!(
                monitored_id = %device.id,
                hostname = %device.hostname,
                ip = device.ip.as_deref().unwrap_or("-"),
                "LibreNMS device is not linked to NetBox"
            );
        }

        let orphaned: Vec<MonitoredDeviceId> = resolution
            .orphaned()
            .map(|device| {
                debug!(
                    monitored_id = %device.id,
                    hostname = %device.hostname,
                    ip = device.ip.as_deref().unwrap_or("-"),
                    linked_to = ?device.correspondence(),
                    "LibreNMS device is linked to no eligible NetBox device"
                );
                device.id
            })
            .collect();

        let conflicts: Vec<SourceDeviceId> = resolution
            .conflicts()
            .map(|(source_id, claimants)| {
                warn!(
                    source_id = %source_id,
                    monitored_ids = ?claimants.iter().map(|d| d.id.0).collect::<Vec<_>>(),
                    "Several LibreNMS devices claim the same NetBox device, leaving all untouched"
                );
                source_id
            })
            .collect();

        let mut adopted: HashSet<MonitoredDeviceId> = HashSet::new();
        let mut creates = Vec::new();
        for source in resolution.creation_candidates() {
            let plan = plan_create(
                source,
                resolution.unsynced().filter(|d| !adopted.contains(&d.id)),
                &self.config.domain,
            );
            if let CreatePlan::Adopt { device_id, .. } = &plan {
                adopted.insert(*device_id);
            }

            let outcome = self.executor.execute_create(source, plan).await;
            stats.record_create(&outcome);
            creates.push(outcome);
        }

        stats.duration_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            run_id = %run_id,
            eligible = stats.eligible,
            monitored = stats.monitored_total,
            matched = stats.matched,
            in_sync = stats.in_sync,
            unsynced = stats.unsynced,
            orphaned = stats.orphaned,
            conflicts = stats.conflicts,
            writes_applied = stats.writes_applied,
            writes_failed = stats.writes_failed,
            created = stats.devices_created,
            adopted = stats.devices_adopted,
            creates_skipped = stats.creates_skipped,
            creates_failed = stats.creates_failed,
            duration_ms = stats.duration_ms,
            "Sync cycle complete"
        );

        Ok(CycleReport {
            run_id,
            started_at,
            completed_at: Utc::now(),
            dry_run: self.config.dry_run,
            statistics: stats,
            writes,
            creates,
            conflicts,
            orphaned,
        })
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
