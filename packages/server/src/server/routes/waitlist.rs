use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::is_valid_email;
use crate::domains::referrals::RewardTier;
use crate::server::app::AppState;
use crate::server::routes::{error_response, referral_error_response, ErrorResponse};

#[derive(Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Serialize)]
pub struct JoinWaitlistResponse {
    pub success: bool,
    /// The new participant's own referral code, for the share link
    pub referral_code: String,
    /// Tier the referrer just earned from this signup, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_earned: Option<RewardTier>,
}

/// Join the waitlist, optionally crediting the referrer whose code was in
/// the signup link.
///
/// Registration and referral processing are deliberately decoupled: once
/// the email is on the list the response is a success, even if crediting
/// the referrer fails. A referral error here is logged and dropped.
pub async fn join_waitlist_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<JoinWaitlistRequest>,
) -> Result<Json<JoinWaitlistResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !is_valid_email(&request.email) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Please enter a valid email address",
        ));
    }

    let referral_code = state
        .engine
        .register_participant(&request.email)
        .await
        .map_err(referral_error_response)?;

    let reward_earned = match state
        .engine
        .record_referral(&request.email, request.referral_code.as_deref())
        .await
    {
        Ok(outcome) => outcome.reward_granted,
        Err(err) => {
            warn!(error = %err, email = %request.email, "referral processing failed after join");
            None
        }
    };

    Ok(Json(JoinWaitlistResponse {
        success: true,
        referral_code,
        reward_earned,
    }))
}
