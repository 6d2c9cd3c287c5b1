use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Referral edge model - SQL persistence layer
///
/// A row in `referrals` records that `referrer_email` brought
/// `referred_email` onto the waitlist. The unique constraint on
/// `referred_email` caps every new participant at one referral credit,
/// which also makes replayed deliveries harmless.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ReferralEdge {
    pub id: Uuid,
    pub referrer_email: String,
    pub referred_email: String,
    pub referral_code: String,
    pub created_at: DateTime<Utc>,
}

impl ReferralEdge {
    /// Insert an edge. Returns false if the referred email is already credited.
    pub async fn insert(
        referrer_email: &str,
        referred_email: &str,
        referral_code: &str,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO referrals (referrer_email, referred_email, referral_code)
             VALUES ($1, $2, $3)
             ON CONFLICT (referred_email) DO NOTHING",
        )
        .bind(referrer_email)
        .bind(referred_email)
        .bind(referral_code)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// The edge crediting a referred email, if one exists
    pub async fn find_by_referred(referred_email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM referrals WHERE referred_email = $1")
            .bind(referred_email)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Total successful referrals credited to a referrer
    pub async fn count_for_referrer(referrer_email: &str, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM referrals WHERE referrer_email = $1")
            .bind(referrer_email)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
