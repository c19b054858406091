//! Eligibility filter.
//!
//! Reduces the source-of-truth collection to the devices that belong in the
//! monitoring system: role on the allow-list and a primary address present.

use std::collections::BTreeSet;

use nbsync_connector::types::SourceDevice;
use tracing::trace;

/// Role ids synced when no allow-list is configured.
pub const DEFAULT_ROLE_IDS: [i64; 4] = [3, 4, 6, 11];

/// Role allow-list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilter {
    allowed_role_ids: BTreeSet<i64>,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_IDS)
    }
}

impl EligibilityFilter {
    #[must_use]
    pub fn new(allowed_role_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed_role_ids: allowed_role_ids.into_iter().collect(),
        }
    }

    pub fn allowed_role_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.allowed_role_ids.iter().copied()
    }

    /// Role on the allow-list AND primary address present.
    #[must_use]
    pub fn is_eligible(&self, device: &SourceDevice) -> bool {
        self.allowed_role_ids.contains(&device.role_id) && device.primary_address.is_some()
    }

    /// Keep eligible devices and strip the mask suffix from their addresses.
    ///
    /// Ineligible devices are dropped without error.
    #[must_use]
    pub fn filter(&self, devices: Vec<SourceDevice>) -> Vec<SourceDevice> {
        devices
            .into_iter()
            .filter_map(|mut device| {
                if !self.is_eligible(&device) {
                    trace!(
                        source_id = %device.id,
                        name = %device.name,
                        role_id = device.role_id,
                        has_address = device.primary_address.is_some(),
                        "Skipping ineligible NetBox device"
                    );
                    return None;
                }
                device.primary_address = device
                    .primary_address
                    .as_deref()
                    .map(|address| strip_mask(address).to_string());
                Some(device)
            })
            .collect()
    }
}

/// Host portion of an address in CIDR notation.
#[must_use]
pub fn strip_mask(address: &str) -> &str {
    address
        .split_once('/')
        .map_or(address, |(host, _)| host)
}
