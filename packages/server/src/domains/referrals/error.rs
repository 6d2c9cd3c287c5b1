use thiserror::Error;

use super::store::StoreError;

/// Referral domain errors surfaced to the presentation layer.
///
/// Guarded no-ops (unknown code, self-referral, replayed referral) are not
/// errors; they come back as an all-none `ReferralOutcome` so a failed
/// referral can never block the underlying waitlist join.
#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("email is already on the waitlist")]
    AlreadyRegistered,

    #[error("email is not on the waitlist")]
    NotFound,

    #[error("referral store unavailable")]
    StoreUnavailable(#[from] StoreError),
}
