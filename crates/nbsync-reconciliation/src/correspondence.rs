//! Correspondence resolution.
//!
//! Pairs eligible source devices with monitored devices through the
//! correspondence identifier stored on the monitored side. Every monitored
//! record and every eligible source lands in exactly one entry.

use std::collections::HashMap;

use nbsync_connector::types::{MonitoredDevice, SourceDevice, SourceDeviceId};
use serde::Serialize;

/// Result of resolving one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correspondence {
    /// Monitored record linked to an eligible source.
    Matched {
        source: SourceDevice,
        monitored: MonitoredDevice,
    },
    /// Monitored record with no correspondence identifier.
    UnmatchedMonitored(MonitoredDevice),
    /// Eligible source with no monitored record; a creation candidate.
    UnmatchedSource(SourceDevice),
    /// Monitored record whose identifier names no eligible source.
    Orphaned(MonitoredDevice),
    /// Several monitored records carry the same identifier.
    Conflict {
        source_id: SourceDeviceId,
        monitored: Vec<MonitoredDevice>,
    },
}

impl Correspondence {
    pub fn kind(&self) -> CorrespondenceKind {
        match self {
            Correspondence::Matched { .. } => CorrespondenceKind::Matched,
            Correspondence::UnmatchedMonitored(_) => CorrespondenceKind::UnmatchedMonitored,
            Correspondence::UnmatchedSource(_) => CorrespondenceKind::UnmatchedSource,
            Correspondence::Orphaned(_) => CorrespondenceKind::Orphaned,
            Correspondence::Conflict { .. } => CorrespondenceKind::Conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrespondenceKind {
    Matched,
    UnmatchedMonitored,
    UnmatchedSource,
    Orphaned,
    Conflict,
}

/// All entries of one resolution pass.
///
/// Monitored-side entries come first in monitored order, followed by the
/// creation candidates in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    entries: Vec<Correspondence>,
}

impl Resolution {
    pub fn entries(&self) -> &[Correspondence] {
        &self.entries
    }

    pub fn count(&self, kind: CorrespondenceKind) -> usize {
        self.entries.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn matched(&self) -> impl Iterator<Item = (&SourceDevice, &MonitoredDevice)> {
        self.entries.iter().filter_map(|entry| match entry {
            Correspondence::Matched { source, monitored } => Some((source, monitored)),
            _ => None,
        })
    }

    pub fn unsynced(&self) -> impl Iterator<Item = &MonitoredDevice> {
        self.entries.iter().filter_map(|entry| match entry {
            Correspondence::UnmatchedMonitored(monitored) => Some(monitored),
            _ => None,
        })
    }

    pub fn creation_candidates(&self) -> impl Iterator<Item = &SourceDevice> {
        self.entries.iter().filter_map(|entry| match entry {
            Correspondence::UnmatchedSource(source) => Some(source),
            _ => None,
        })
    }

    pub fn orphaned(&self) -> impl Iterator<Item = &MonitoredDevice> {
        self.entries.iter().filter_map(|entry| match entry {
            Correspondence::Orphaned(monitored) => Some(monitored),
            _ => None,
        })
    }

    pub fn conflicts(&self) -> impl Iterator<Item = (SourceDeviceId, &[MonitoredDevice])> {
        self.entries.iter().filter_map(|entry| match entry {
            Correspondence::Conflict {
                source_id,
                monitored,
            } => Some((*source_id, monitored.as_slice())),
            _ => None,
        })
    }
}

/// Resolve eligible sources against the monitored inventory.
pub fn resolve(sources: &[SourceDevice], monitored: &[MonitoredDevice]) -> Resolution {
    let by_source_id: HashMap<SourceDeviceId, &SourceDevice> =
        sources.iter().map(|s| (s.id, s)).collect();

    let mut claims: HashMap<SourceDeviceId, Vec<&MonitoredDevice>> = HashMap::new();
    for device in monitored {
        if let Some(source_id) = device.correspondence() {
            claims.entry(source_id).or_default().push(device);
        }
    }

    let mut entries = Vec::with_capacity(monitored.len() + sources.len());

    for device in monitored {
        let Some(source_id) = device.correspondence() else {
            entries.push(Correspondence::UnmatchedMonitored(device.clone()));
            continue;
        };

        let Some(claimants) = claims.get(&source_id) else {
            continue;
        };
        if claimants.len() > 1 {
            // Emit the conflict once, at the first claimant.
            if claimants[0].id == device.id {
                entries.push(Correspondence::Conflict {
                    source_id,
                    monitored: claimants.iter().map(|d| (*d).clone()).collect(),
                });
            }
            continue;
        }

        match by_source_id.get(&source_id) {
            Some(source) => entries.push(Correspondence::Matched {
                source: (*source).clone(),
                monitored: device.clone(),
            }),
            None => entries.push(Correspondence::Orphaned(device.clone())),
        }
    }

    for source in sources {
        if !claims.contains_key(&source.id) {
            entries.push(Correspondence::UnmatchedSource(source.clone()));
        }
    }

    Resolution { entries }
}
