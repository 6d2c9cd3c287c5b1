use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::referrals::{ReferralSummaryData, RewardTier};
use crate::server::app::AppState;
use crate::server::routes::{referral_error_response, ErrorResponse};

#[derive(Deserialize)]
pub struct ProcessReferralRequest {
    pub email: String,
    pub referral_code: String,
}

#[derive(Serialize)]
pub struct ProcessReferralResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credited_referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_earned: Option<RewardTier>,
}

/// Credit a referrer for an already-registered email.
///
/// An unknown or self-owned code is a successful no-op response, never an
/// error; only an unregistered email or a store outage fails.
pub async fn process_referral_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ProcessReferralRequest>,
) -> Result<Json<ProcessReferralResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state
        .engine
        .record_referral(&request.email, Some(&request.referral_code))
        .await
        .map_err(referral_error_response)?;

    Ok(Json(ProcessReferralResponse {
        success: true,
        credited_referrer: outcome.credited_referrer,
        reward_earned: outcome.reward_granted,
    }))
}

/// A participant's referral code, credited count and granted rewards.
pub async fn referral_summary_handler(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ReferralSummaryData>, (StatusCode, Json<ErrorResponse>)> {
    let summary = state
        .engine
        .referral_summary(&email)
        .await
        .map_err(referral_error_response)?;

    Ok(Json(ReferralSummaryData::from(summary)))
}
