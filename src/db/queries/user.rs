// src/db/queries/user.rs
use axum::extract::{Path, State};
use sqlx::PgPool;

use crate::app_state::AppState;
use crate::db::models::user::UserProfile;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;

/// Roles whose members receive feedback notifications and are excluded from
/// the employee statistics listing.
pub const MANAGER_ROLES: [&str; 3] = ["Admin", "BusinessOwner", "Manager"];

/// Directory lookup used for notification text. Absence of a match (or a
/// lookup failure) falls back to the raw company id.
pub async fn display_name(pool: &PgPool, company_id: &str) -> String {
    match sqlx::query_scalar::<_, String>("SELECT full_name FROM users WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(pool)
        .await
    {
        Ok(Some(name)) => name,
        Ok(None) => company_id.to_string(),
        Err(e) => {
            tracing::warn!(company_id, error = %e, "display name lookup failed");
            company_id.to_string()
        }
    }
}

/// Company ids of every user holding a manager role.
pub async fn manager_company_ids(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let roles: Vec<String> = MANAGER_ROLES.iter().map(|r| r.to_string()).collect();
    sqlx::query_scalar::<_, String>("SELECT company_id FROM users WHERE role = ANY($1)")
        .bind(roles)
        .fetch_all(pool)
        .await
}

#[utoipa::path(
    get,
    path = "/users/{company_id}",
    params(
        ("company_id" = String, Path, description = "Company id of the user")
    ),
    responses(
        (status = 200, description = "User profile retrieved", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<UserProfile>, ApiResponse<()>> {
    let user = sqlx::query_as::<_, UserProfile>(
        "SELECT id, company_id, full_name, role FROM users WHERE company_id = $1",
    )
    .bind(&company_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("user"))?;

    Ok(ApiResponse::ok("User profile retrieved", user))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_user),
    components(schemas(UserProfile)),
    tags(
        (name = "Users", description = "User directory lookups")
    )
)]
pub struct UserDoc;
