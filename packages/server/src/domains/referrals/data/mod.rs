use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::ReferralSummary;
use super::models::Reward;

/// Reward API data type
///
/// Public representation of a granted reward (for JSON responses)
#[derive(Debug, Clone, Serialize)]
pub struct RewardData {
    /// Stable tier identifier, e.g. "basic_3_months"
    pub tier: String,

    /// Referral count at the moment the tier was granted
    pub referral_count: i32,

    /// When the reward was granted
    pub earned_at: DateTime<Utc>,

    /// Whether the reward has been claimed
    pub claimed: bool,
}

impl From<Reward> for RewardData {
    fn from(reward: Reward) -> Self {
        Self {
            tier: reward.tier,
            referral_count: reward.referral_count,
            earned_at: reward.earned_at,
            claimed: reward.claimed,
        }
    }
}

/// Referral summary API data type
#[derive(Debug, Clone, Serialize)]
pub struct ReferralSummaryData {
    pub referral_code: String,
    pub referral_count: i64,
    /// Granted rewards, newest first
    pub rewards: Vec<RewardData>,
}

impl From<ReferralSummary> for ReferralSummaryData {
    fn from(summary: ReferralSummary) -> Self {
        Self {
            referral_code: summary.referral_code,
            referral_count: summary.referral_count,
            rewards: summary.rewards.into_iter().map(RewardData::from).collect(),
        }
    }
}
