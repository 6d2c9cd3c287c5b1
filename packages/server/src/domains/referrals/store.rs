//! Persistence seam for the referral engine.
//!
//! Uniqueness conflicts are reported as boolean "inserted or already there"
//! results rather than errors, because every race the engine cares about
//! (duplicate signup, replayed referral, double grant) is resolved by a
//! single constrained insert. `StoreError` is reserved for the store being
//! genuinely unreachable; callers may retry the whole operation.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::models::{Participant, ReferralCode, ReferralEdge, Reward};
use super::tier::RewardTier;

/// Transient backing-store failure. Never partially applied: each write is
/// a single atomic statement.
#[derive(Error, Debug)]
#[error("referral store unavailable")]
pub struct StoreError(#[from] pub anyhow::Error);

#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// Add an email to the waitlist. Returns false if already present.
    async fn insert_participant(&self, email: &str) -> Result<bool, StoreError>;

    /// Whether an email is on the waitlist.
    async fn participant_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Bind a generated code to a participant. Returns false on code
    /// collision so the caller can generate a fresh one.
    async fn insert_referral_code(&self, email: &str, code: &str) -> Result<bool, StoreError>;

    /// The code owned by a participant, if one was issued.
    async fn code_for_email(&self, email: &str) -> Result<Option<String>, StoreError>;

    /// The participant owning a code, if the code exists.
    async fn email_for_code(&self, code: &str) -> Result<Option<String>, StoreError>;

    /// Record a referral edge. Returns false if the referred email already
    /// carries a credit (one credit per new participant).
    async fn insert_referral_edge(
        &self,
        referrer_email: &str,
        referred_email: &str,
        referral_code: &str,
    ) -> Result<bool, StoreError>;

    /// Referrer already credited for a referred email, if any.
    async fn referrer_of(&self, referred_email: &str) -> Result<Option<String>, StoreError>;

    /// Total edges credited to a referrer.
    async fn count_referrals(&self, referrer_email: &str) -> Result<i64, StoreError>;

    /// Grant a tier reward. Returns false if the tier was already granted.
    async fn insert_reward(
        &self,
        email: &str,
        tier: RewardTier,
        referral_count: i64,
    ) -> Result<bool, StoreError>;

    /// All rewards granted to a referrer, newest first.
    async fn rewards_for(&self, email: &str) -> Result<Vec<Reward>, StoreError>;
}

/// PostgreSQL-backed store. Thin delegation to the model layer; all
/// invariants live in the schema's unique constraints.
pub struct PgReferralStore {
    pool: PgPool,
}

impl PgReferralStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralStore for PgReferralStore {
    async fn insert_participant(&self, email: &str) -> Result<bool, StoreError> {
        Participant::insert(email, &self.pool).await.map_err(Into::into)
    }

    async fn participant_exists(&self, email: &str) -> Result<bool, StoreError> {
        Participant::exists(email, &self.pool).await.map_err(Into::into)
    }

    async fn insert_referral_code(&self, email: &str, code: &str) -> Result<bool, StoreError> {
        ReferralCode::insert(email, code, &self.pool)
            .await
            .map_err(Into::into)
    }

    async fn code_for_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        let row = ReferralCode::find_by_email(email, &self.pool).await?;
        Ok(row.map(|r| r.code))
    }

    async fn email_for_code(&self, code: &str) -> Result<Option<String>, StoreError> {
        let row = ReferralCode::find_by_code(code, &self.pool).await?;
        Ok(row.map(|r| r.email))
    }

    async fn insert_referral_edge(
        &self,
        referrer_email: &str,
        referred_email: &str,
        referral_code: &str,
    ) -> Result<bool, StoreError> {
        ReferralEdge::insert(referrer_email, referred_email, referral_code, &self.pool)
            .await
            .map_err(Into::into)
    }

    async fn referrer_of(&self, referred_email: &str) -> Result<Option<String>, StoreError> {
        let row = ReferralEdge::find_by_referred(referred_email, &self.pool).await?;
        Ok(row.map(|edge| edge.referrer_email))
    }

    async fn count_referrals(&self, referrer_email: &str) -> Result<i64, StoreError> {
        ReferralEdge::count_for_referrer(referrer_email, &self.pool)
            .await
            .map_err(Into::into)
    }

    async fn insert_reward(
        &self,
        email: &str,
        tier: RewardTier,
        referral_count: i64,
    ) -> Result<bool, StoreError> {
        Reward::insert(email, tier, referral_count, &self.pool)
            .await
            .map_err(Into::into)
    }

    async fn rewards_for(&self, email: &str) -> Result<Vec<Reward>, StoreError> {
        Reward::find_for_email(email, &self.pool)
            .await
            .map_err(Into::into)
    }
}
