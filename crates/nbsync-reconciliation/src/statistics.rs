//! Cycle statistics.
//!
//! Counters accumulated while a cycle runs and logged when it completes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::correspondence::{CorrespondenceKind, Resolution};
use crate::drift::{DriftKind, DriftReport};
use crate::remediation::{ActionResult, CreateOutcome, WriteOutcome};

/// Statistics for one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStatistics {
    /// Devices returned by NetBox.
    #[serde(default)]
    pub source_total: u32,
    /// Devices left after the eligibility filter.
    #[serde(default)]
    pub eligible: u32,
    /// Devices returned by LibreNMS.
    #[serde(default)]
    pub monitored_total: u32,
    #[serde(default)]
    pub matched: u32,
    #[serde(default)]
    pub unsynced: u32,
    #[serde(default)]
    pub orphaned: u32,
    #[serde(default)]
    pub conflicts: u32,
    /// Eligible devices with no monitored record.
    #[serde(default)]
    pub creation_candidates: u32,
    /// Matched pairs with an empty drift report.
    #[serde(default)]
    pub in_sync: u32,
    /// Mismatches broken down by drift kind.
    #[serde(default)]
    pub drift_by_kind: HashMap<String, u32>,
    #[serde(default)]
    pub writes_applied: u32,
    #[serde(default)]
    pub writes_failed: u32,
    /// Detected drift with no write defined.
    #[serde(default)]
    pub writes_skipped: u32,
    #[serde(default)]
    pub devices_created: u32,
    #[serde(default)]
    pub devices_adopted: u32,
    #[serde(default)]
    pub creates_skipped: u32,
    #[serde(default)]
    pub creates_failed: u32,
    /// Creates that a dry run would have issued.
    #[serde(default)]
    pub creates_planned: u32,
    /// Total duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

impl CycleStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&mut self, resolution: &Resolution) {
        let count = |kind| u32::try_from(resolution.count(kind)).unwrap_or(u32::MAX);
        self.matched = count(CorrespondenceKind::Matched);
        self.unsynced = count(CorrespondenceKind::UnmatchedMonitored);
        self.orphaned = count(CorrespondenceKind::Orphaned);
        self.conflicts = count(CorrespondenceKind::Conflict);
        self.creation_candidates = count(CorrespondenceKind::UnmatchedSource);
    }

    pub fn record_drift(&mut self, report: &DriftReport) {
        if report.is_empty() {
            self.in_sync += 1;
        }
        for mismatch in report.mismatches() {
            *self
                .drift_by_kind
                .entry(mismatch.kind.to_string())
                .or_insert(0) += 1;
        }
    }

    pub fn record_write(&mut self, outcome: &WriteOutcome) {
        match outcome.result {
            ActionResult::Success => self.writes_applied += 1,
            ActionResult::Failure => self.writes_failed += 1,
            ActionResult::Skipped => self.writes_skipped += 1,
        }
    }

    pub fn record_create(&mut self, outcome: &CreateOutcome) {
        match outcome {
            CreateOutcome::Linked { adopted: true, .. } => self.devices_adopted += 1,
            CreateOutcome::Linked { adopted: false, .. } => self.devices_created += 1,
            CreateOutcome::SkippedSnmpPolicy { .. } | CreateOutcome::SkippedUnnamed { .. } => {
                self.creates_skipped += 1;
            }
            CreateOutcome::Planned { .. } => self.creates_planned += 1,
            CreateOutcome::Failed { .. } => self.creates_failed += 1,
        }
    }

    /// Get count for a specific drift kind.
    #[must_use]
    pub fn drift_count(&self, kind: DriftKind) -> u32 {
        self.drift_by_kind
            .get(&kind.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Whether any write or create failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.writes_failed > 0 || self.creates_failed > 0
    }
}
