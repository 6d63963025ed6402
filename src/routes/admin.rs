use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::auth::AuthenticatedUser;
use crate::models::menu::{MenuRecord, PublishMenuRequest, SetWindowRequest, WeekQuery};
use crate::models::user::{AssignTokenRequest, UserRole};
use crate::models::week::{service_date, WeekKey};
use crate::routes::require_any_role;
use crate::services::admin::AdminService;
use crate::services::menu::MenuService;
use crate::services::metrics::MENUS_PUBLISHED_COUNTER;
use crate::services::order::OrderService;
use crate::AppState;

/// POST /admin/menus — publish next week's menu and announce it.
pub async fn publish_menu(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PublishMenuRequest>,
) -> AppResult<Json<MenuRecord>> {
    require_any_role(&user, &[UserRole::Admin])?;

    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let menu = AdminService::publish_menu_and_notify(
        &state.db,
        state.email.as_deref(),
        &state.notifications,
        &state.config,
        body.options,
        user.user_id,
        today,
    )
    .await?;
    MENUS_PUBLISHED_COUNTER.inc();
    Ok(Json(menu))
}

/// POST /admin/window/close — close next week's order window, report counts.
pub async fn close_window(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Value>> {
    require_any_role(&user, &[UserRole::Admin])?;

    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let (week_key, orders) =
        AdminService::close_window_for_next_week(&state.db, &state.notifications, today).await?;
    Ok(Json(json!({
        "week": week_key.week,
        "year": week_key.year,
        "orders": orders,
    })))
}

/// PUT /admin/window — open or close an arbitrary week's window (reopen
/// support for late submissions).
pub async fn set_window(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SetWindowRequest>,
) -> AppResult<Json<Value>> {
    require_any_role(&user, &[UserRole::Admin])?;

    let week_key = WeekKey {
        week: body.week,
        year: body.year,
    };
    MenuService::set_open(&state.db, week_key, body.open).await?;
    Ok(Json(json!({
        "week": week_key.week,
        "year": week_key.year,
        "open": body.open,
    })))
}

/// GET /admin/orders/count?week=&year=
pub async fn count_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<WeekQuery>,
) -> AppResult<Json<Value>> {
    require_any_role(&user, &[UserRole::Admin, UserRole::Kitchen])?;

    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let week_key = params.resolve(WeekKey::next(today));
    let count = OrderService::count(&state.db, week_key).await?;
    Ok(Json(json!({
        "week": week_key.week,
        "year": week_key.year,
        "orders": count,
    })))
}

/// GET /admin/orders/summary?week=&year= — per-day option tallies for
/// kitchen prep.
pub async fn order_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<WeekQuery>,
) -> AppResult<Json<Value>> {
    require_any_role(&user, &[UserRole::Admin, UserRole::Kitchen])?;

    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let week_key = params.resolve(WeekKey::next(today));
    let summary = OrderService::day_summary(&state.db, week_key).await?;
    Ok(Json(json!({
        "week": week_key.week,
        "year": week_key.year,
        "days": summary,
    })))
}

/// PUT /admin/users/{id}/nfc-token — assign or clear a kiosk token.
pub async fn assign_nfc_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AssignTokenRequest>,
) -> AppResult<Json<Value>> {
    require_any_role(&user, &[UserRole::Admin])?;

    AdminService::assign_nfc_token(&state.db, user_id, body.token).await?;
    Ok(Json(json!({ "ok": true })))
}
