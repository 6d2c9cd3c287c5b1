use anyhow::Result;
use sqlx::PgPool;

/// Participant model - SQL persistence layer
///
/// A row in `email_waiting_list`. The email is the participant's identity;
/// the unique constraint on it is what makes concurrent duplicate signups
/// resolve to exactly one row.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Participant {
    pub id: i64,
    pub email: String,
}

impl Participant {
    /// Insert a new participant. Returns false if the email is already present.
    pub async fn insert(email: &str, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO email_waiting_list (email) VALUES ($1)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether an email is on the waitlist
    pub async fn exists(email: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM email_waiting_list WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
