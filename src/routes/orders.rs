use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::models::auth::AuthenticatedUser;
use crate::models::menu::WeekQuery;
use crate::models::order::{OrderRecord, SubmitOrderRequest};
use crate::models::week::{service_date, WeekKey};
use crate::services::metrics::ORDERS_SUBMITTED_COUNTER;
use crate::services::order::OrderService;
use crate::AppState;

/// GET /orders?week=&year= — the caller's own order for the week.
pub async fn get_own_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<WeekQuery>,
) -> AppResult<Json<OrderRecord>> {
    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let week_key = params.resolve(WeekKey::next(today));
    let order = OrderService::get(&state.db, user.user_id, week_key).await?;
    Ok(Json(order))
}

/// PUT /orders — submit or replace the caller's selections for the week.
pub async fn submit_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SubmitOrderRequest>,
) -> AppResult<Json<OrderRecord>> {
    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let week_key = match (body.week, body.year) {
        (Some(week), Some(year)) => WeekKey { week, year },
        _ => WeekKey::next(today),
    };

    let order = OrderService::submit(&state.db, user.user_id, week_key, body.selections).await?;
    ORDERS_SUBMITTED_COUNTER.inc();
    Ok(Json(order))
}
