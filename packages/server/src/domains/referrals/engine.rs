//! Referral engine.
//!
//! Owns the waitlist/referral policy: one referral credit per new
//! participant, fixed tier thresholds, and at-most-once grants per
//! (referrer, tier). The engine itself holds no state and takes no locks;
//! every invariant rests on a single constrained insert in the store, so
//! the operations are safe to call concurrently from any number of
//! request handlers.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::error::ReferralError;
use super::models::Reward;
use super::store::ReferralStore;
use super::tier::RewardTier;

const CODE_LENGTH: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Result of processing a referral. Unknown codes, self-referrals and
/// replayed deliveries come back all-none; they are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralOutcome {
    pub credited_referrer: Option<String>,
    pub reward_granted: Option<RewardTier>,
}

impl ReferralOutcome {
    fn none() -> Self {
        Self {
            credited_referrer: None,
            reward_granted: None,
        }
    }
}

/// Read-only projection of a participant's referral standing.
#[derive(Debug, Clone)]
pub struct ReferralSummary {
    pub referral_code: String,
    pub referral_count: i64,
    pub rewards: Vec<Reward>,
}

pub struct ReferralEngine {
    store: Arc<dyn ReferralStore>,
}

impl ReferralEngine {
    pub fn new(store: Arc<dyn ReferralStore>) -> Self {
        Self { store }
    }

    /// Add an email to the waitlist and issue its referral code.
    ///
    /// The caller validates email format; this layer only cares about
    /// identity. Codes are generated until one clears the store's
    /// uniqueness check (at 36^8 codes a collision retry is rare enough
    /// that the loop is effectively single-pass).
    ///
    /// A known email is only rejected once it holds a code: if an earlier
    /// attempt committed the participant row and then lost the store before
    /// code issuance, the retry resumes issuance instead of stranding the
    /// email as registered-but-codeless.
    pub async fn register_participant(&self, email: &str) -> Result<String, ReferralError> {
        if !self.store.insert_participant(email).await?
            && self.store.code_for_email(email).await?.is_some()
        {
            return Err(ReferralError::AlreadyRegistered);
        }

        loop {
            let code = generate_code();
            if self.store.insert_referral_code(email, &code).await? {
                info!(email, code = %code, "participant registered");
                return Ok(code);
            }
            debug!(code = %code, "referral code collision, regenerating");
        }
    }

    /// Credit a referrer for `new_email` joining and run the tier check.
    ///
    /// Preconditions: `new_email` is already registered (registration and
    /// referral processing are separate steps so a referral failure can
    /// never undo a join). Guarded no-ops:
    /// - no code supplied, or the code resolves to nobody
    /// - the code belongs to `new_email` itself
    /// - `new_email` already carries a credit for a different referrer
    ///
    /// A replay of the same delivery re-runs the tier check so a retry can
    /// complete a grant that a mid-operation store failure left behind; the
    /// outcome then reports the completed tier without re-reporting the
    /// credit.
    pub async fn record_referral(
        &self,
        new_email: &str,
        referral_code: Option<&str>,
    ) -> Result<ReferralOutcome, ReferralError> {
        if !self.store.participant_exists(new_email).await? {
            return Err(ReferralError::NotFound);
        }

        let Some(code) = referral_code else {
            return Ok(ReferralOutcome::none());
        };

        let Some(referrer) = self.store.email_for_code(code).await? else {
            debug!(code, "referral code does not resolve, skipping");
            return Ok(ReferralOutcome::none());
        };

        if referrer == new_email {
            debug!(email = new_email, "self-referral, skipping");
            return Ok(ReferralOutcome::none());
        }

        if !self
            .store
            .insert_referral_edge(&referrer, new_email, code)
            .await?
        {
            return self.finish_replayed_referral(&referrer, new_email).await;
        }

        let count = self.store.count_referrals(&referrer).await?;
        let reward_granted = self.grant_crossed_tier(&referrer, count).await?;

        info!(
            referrer = %referrer,
            referred = new_email,
            count,
            reward = reward_granted.map(|t| t.as_str()),
            "referral credited"
        );

        Ok(ReferralOutcome {
            credited_referrer: Some(referrer),
            reward_granted,
        })
    }

    /// A participant's code, credited referral count and granted rewards.
    pub async fn referral_summary(&self, email: &str) -> Result<ReferralSummary, ReferralError> {
        let Some(referral_code) = self.store.code_for_email(email).await? else {
            return Err(ReferralError::NotFound);
        };

        let referral_count = self.store.count_referrals(email).await?;
        let rewards = self.store.rewards_for(email).await?;

        Ok(ReferralSummary {
            referral_code,
            referral_count,
            rewards,
        })
    }

    /// A replayed delivery: the edge already exists. When it belongs to this
    /// referrer, the credit stands but an earlier attempt may have lost the
    /// store between the edge insert and the reward insert, so the tier
    /// check runs again. The `(email, tier)` unique key makes the re-attempt
    /// a no-op when nothing was actually lost.
    async fn finish_replayed_referral(
        &self,
        referrer: &str,
        new_email: &str,
    ) -> Result<ReferralOutcome, ReferralError> {
        let existing = self.store.referrer_of(new_email).await?;
        if existing.as_deref() != Some(referrer) {
            debug!(email = new_email, "already credited to another referrer, skipping");
            return Ok(ReferralOutcome::none());
        }

        let count = self.store.count_referrals(referrer).await?;
        let reward_granted = self.grant_crossed_tier(referrer, count).await?;
        if let Some(tier) = reward_granted {
            info!(referrer = %referrer, tier = tier.as_str(), "tier grant completed on replay");
        }

        Ok(ReferralOutcome {
            credited_referrer: None,
            reward_granted,
        })
    }

    /// Grant the highest tier reached by `count` if it has not been granted
    /// yet. Normal operation crosses at most one threshold per referral;
    /// the `(email, tier)` unique key absorbs any replay or race.
    async fn grant_crossed_tier(
        &self,
        referrer: &str,
        count: i64,
    ) -> Result<Option<RewardTier>, ReferralError> {
        let Some(tier) = RewardTier::highest_reached(count) else {
            return Ok(None);
        };

        if self.store.insert_reward(referrer, tier, count).await? {
            Ok(Some(tier))
        } else {
            Ok(None)
        }
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_the_alphabet() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
