//! Reward tier table.
//!
//! Fixed thresholds: 5 referrals unlocks three months of the basic plan,
//! 10 unlocks six months, 20 unlocks six months of pro. A tier is granted
//! at most once per referrer; the grant itself is enforced by the store's
//! `(email, tier)` uniqueness, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RewardTier {
    #[serde(rename = "basic_3_months")]
    Basic3Months,
    #[serde(rename = "basic_6_months")]
    Basic6Months,
    #[serde(rename = "pro_6_months")]
    Pro6Months,
}

impl RewardTier {
    /// All tiers in ascending threshold order.
    pub const ALL: [RewardTier; 3] = [
        RewardTier::Basic3Months,
        RewardTier::Basic6Months,
        RewardTier::Pro6Months,
    ];

    /// Referral count at which this tier unlocks.
    pub fn threshold(&self) -> i64 {
        match self {
            RewardTier::Basic3Months => 5,
            RewardTier::Basic6Months => 10,
            RewardTier::Pro6Months => 20,
        }
    }

    /// Stable identifier stored in the `rewards.tier` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardTier::Basic3Months => "basic_3_months",
            RewardTier::Basic6Months => "basic_6_months",
            RewardTier::Pro6Months => "pro_6_months",
        }
    }

    /// Highest tier whose threshold is at or below `count`, if any.
    pub fn highest_reached(count: i64) -> Option<RewardTier> {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| count >= tier.threshold())
    }
}

impl fmt::Display for RewardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
