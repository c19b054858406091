//! # Reconciliation Engine
//!
//! Keeps the LibreNMS device inventory in line with NetBox. NetBox is
//! authoritative; nothing is ever written back to it.
//!
//! ## Overview
//!
//! Each cycle:
//! - filters NetBox devices down to the synced roles with a primary address
//! - pairs them with LibreNMS devices through the `netbox_id` correspondence
//! - detects drift on status, hostname, hardware and SNMP policy
//! - writes single-field corrections to LibreNMS
//! - provisions ping-only devices for unmatched NetBox devices
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       SyncScheduler                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                    ReconciliationEngine                          │
//! │                                                                  │
//! │  ┌─────────────┐   ┌────────────────┐   ┌───────────────┐       │
//! │  │ Eligibility │──►│ Correspondence │──►│     Drift     │       │
//! │  │   Filter    │   │    Resolver    │   │   Detector    │       │
//! │  └─────────────┘   └────────────────┘   └───────────────┘       │
//! │                            │                    │                │
//! │                            ▼                    ▼                │
//! │                    ┌────────────────┐   ┌───────────────┐       │
//! │                    │  CreatePlan    │──►│  Remediation  │       │
//! │                    │                │   │   Executor    │       │
//! │                    └────────────────┘   └───────────────┘       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use nbsync_reconciliation::{ReconciliationConfig, ReconciliationEngine, SyncScheduler};
//!
//! let config = ReconciliationConfig::new("example.com").with_dry_run(true);
//! let engine = ReconciliationEngine::new(netbox, librenms, config);
//!
//! let report = engine.run_cycle().await?;
//! println!("{} writes applied", report.statistics.writes_applied);
//!
//! let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
//! SyncScheduler::new(engine).run(cancel_rx).await;
//! ```

pub mod correspondence;
pub mod drift;
pub mod eligibility;
pub mod engine;
pub mod remediation;
pub mod scheduler;
pub mod statistics;

pub use correspondence::{resolve, Correspondence, CorrespondenceKind, Resolution};
pub use drift::{DriftDetector, DriftKind, DriftReport, Mismatch};
pub use eligibility::{EligibilityFilter, DEFAULT_ROLE_IDS};
pub use engine::{CycleError, CycleReport, ReconciliationConfig, ReconciliationEngine};
pub use remediation::{
    plan_create, plan_updates, ActionResult, CreateOutcome, CreatePlan, CreateStep, PlannedWrite,
    RemediationExecutor, WriteAction, WriteOutcome,
};
pub use scheduler::{SyncScheduler, DEFAULT_SYNC_INTERVAL};
pub use statistics::CycleStatistics;
