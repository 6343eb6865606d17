//! Expansion configuration.

use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;

/// Knobs that bound and shape recurrence expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Months past the anchor date used as the ceiling when neither the caller
    /// nor the rule supplies an end.
    pub default_lookahead_months: u32,
    /// Upper limit on instances pulled from the rule engine per expansion.
    pub max_instances: u16,
    pub dst_policy: DstPolicy,
}

impl ExpansionConfig {
    pub const BOOKING_LOOKAHEAD_MONTHS: u32 = 2;
    pub const CONTAINER_LOOKAHEAD_MONTHS: u32 = 6;
    pub const DEFAULT_MAX_INSTANCES: u16 = 500;

    /// Defaults used when a single booking or recurring booking is created.
    pub fn for_booking() -> Self {
        Self {
            default_lookahead_months: Self::BOOKING_LOOKAHEAD_MONTHS,
            max_instances: Self::DEFAULT_MAX_INSTANCES,
            dst_policy: DstPolicy::default(),
        }
    }

    /// Defaults used when materializing a container's (hub's) whole calendar.
    pub fn for_container() -> Self {
        Self {
            default_lookahead_months: Self::CONTAINER_LOOKAHEAD_MONTHS,
            ..Self::for_booking()
        }
    }

    pub fn with_lookahead_months(mut self, months: u32) -> Self {
        self.default_lookahead_months = months;
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self::for_booking()
    }
}
