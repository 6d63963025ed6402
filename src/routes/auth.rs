use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::models::auth::AuthenticatedUser;
use crate::models::user::{User, UserProfile};
use crate::AppState;

/// GET /auth/me — profile behind the session token.
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let row = sqlx::query_as::<_, User>(
        r#"SELECT id, email, first_name, last_name, role, nfc_token, blocked, is_active,
                  created_at, updated_at
           FROM users
           WHERE id = $1 AND is_active = TRUE"#,
    )
    .bind(user.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("user"))?;

    Ok(Json(row.into()))
}
