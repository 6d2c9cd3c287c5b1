use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::referrals::tier::RewardTier;

/// Reward model - SQL persistence layer
///
/// `tier` holds the stable tier identifier (see [`RewardTier::as_str`]).
/// The `(email, tier)` unique key makes every grant idempotent: two
/// concurrent tier checks can both attempt the insert and exactly one wins.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Reward {
    pub id: Uuid,
    pub email: String,
    pub tier: String,
    pub referral_count: i32,
    pub earned_at: DateTime<Utc>,
    pub claimed: bool,
}

impl Reward {
    /// Grant a tier reward. Returns false if this tier was already granted.
    pub async fn insert(
        email: &str,
        tier: RewardTier,
        referral_count: i64,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO rewards (email, tier, referral_count)
             VALUES ($1, $2, $3)
             ON CONFLICT (email, tier) DO NOTHING",
        )
        .bind(email)
        .bind(tier.as_str())
        .bind(referral_count as i32)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// All rewards granted to a referrer, newest first
    pub async fn find_for_email(email: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM rewards WHERE email = $1 ORDER BY earned_at DESC",
        )
        .bind(email)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
