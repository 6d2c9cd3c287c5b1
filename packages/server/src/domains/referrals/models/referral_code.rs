use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Referral code model - SQL persistence layer
///
/// One code per participant, generated at registration and never recycled.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ReferralCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl ReferralCode {
    /// Insert a freshly generated code for `email`.
    ///
    /// Returns false when the code collides with an existing one, so the
    /// caller can generate another. A conflict on the email column (the
    /// participant somehow already has a code) is a hard error instead.
    pub async fn insert(email: &str, code: &str, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO referral_codes (email, code) VALUES ($1, $2)
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(email)
        .bind(code)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Find the code owned by a participant
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM referral_codes WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Resolve a code to its owner
    pub async fn find_by_code(code: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM referral_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
