use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::rate_limit::check_rate_limit;
use crate::models::auth::AuthenticatedUser;
use crate::models::order::{RedeemRequest, RedemptionResult};
use crate::models::user::UserRole;
use crate::models::week::service_date;
use crate::routes::require_any_role;
use crate::services::kiosk::KioskService;
use crate::services::metrics::REDEMPTIONS_COUNTER;
use crate::AppState;

/// POST /kiosk/redeem — kitchen stations and admins.
pub async fn redeem(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<RedeemRequest>,
) -> AppResult<Json<RedemptionResult>> {
    require_any_role(&user, &[UserRole::Kitchen, UserRole::Admin])?;

    // Generous per-token limit; a second station racing a first one still
    // gets through and sees AlreadyRedeemed.
    let mut redis = state.redis.clone();
    check_rate_limit(&mut redis, &format!("kiosk:{}", body.token_id), 10, 60).await?;

    let date = body
        .date
        .unwrap_or_else(|| service_date(Utc::now(), state.config.utc_offset_minutes));

    let result = KioskService::redeem(&state.db, &body.token_id, date).await;

    let outcome = match &result {
        Ok(RedemptionResult::Redeemed { .. }) => "redeemed",
        Ok(RedemptionResult::AlreadyRedeemed { .. }) => "already_redeemed",
        Ok(RedemptionResult::NotOrdered { .. }) => "not_ordered",
        Err(_) => "error",
    };
    REDEMPTIONS_COUNTER.with_label_values(&[outcome]).inc();

    result.map(Json)
}
