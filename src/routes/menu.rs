use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::models::auth::AuthenticatedUser;
use crate::models::menu::{MenuRecord, WeekQuery};
use crate::models::week::{service_date, WeekKey};
use crate::services::menu::MenuService;
use crate::AppState;

/// GET /menus?week=&year= — all authenticated users. Defaults to the week
/// currently being ordered (next week).
pub async fn get_menu(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<WeekQuery>,
) -> AppResult<Json<MenuRecord>> {
    let today = service_date(Utc::now(), state.config.utc_offset_minutes);
    let week_key = params.resolve(WeekKey::next(today));
    let menu = MenuService::get(&state.db, week_key).await?;
    Ok(Json(menu))
}
