// HTTP routes
pub mod health;
pub mod referrals;
pub mod waitlist;

pub use health::*;
pub use referrals::*;
pub use waitlist::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::domains::referrals::ReferralError;

/// Error body shared by all endpoints
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    message: &str,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}

/// Map domain errors onto HTTP statuses and user-facing messages.
pub(crate) fn referral_error_response(err: ReferralError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ReferralError::AlreadyRegistered => error_response(
            StatusCode::CONFLICT,
            "This email is already on our waitlist",
        ),
        ReferralError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "No waitlist entry for this email")
        }
        ReferralError::StoreUnavailable(ref source) => {
            tracing::error!(error = %source, "referral store unavailable");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, please try again",
            )
        }
    }
}
