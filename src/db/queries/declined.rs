// src/db/queries/declined.rs
use axum::extract::{Path, State};

use crate::app_state::AppState;
use crate::db::models::declined::DeclinedEntry;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;

const DECLINED_COLUMNS: &str = "id, request_id, title, description, assignee, assigned_by, \
     declined_on, declined_reason, alternative_date, created_at";

#[utoipa::path(
    get,
    path = "/requests/declined",
    responses(
        (status = 200, description = "All declined entries", body = Vec<DeclinedEntry>)
    ),
    tag = "Declined"
)]
pub async fn get_declined_entries(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<DeclinedEntry>>, ApiResponse<()>> {
    let entries = sqlx::query_as::<_, DeclinedEntry>(&format!(
        "SELECT {DECLINED_COLUMNS} FROM declined_entries ORDER BY declined_on DESC"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Declined entries", entries))
}

/// Remove an audit entry, typically after its task has been reallocated.
#[utoipa::path(
    delete,
    path = "/requests/declined/{id}",
    params(
        ("id" = i32, Path, description = "Declined entry ID")
    ),
    responses(
        (status = 200, description = "Declined entry deleted"),
        (status = 404, description = "Declined entry not found")
    ),
    tag = "Declined"
)]
pub async fn delete_declined_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let deleted = sqlx::query("DELETE FROM declined_entries WHERE id = $1")
        .bind(entry_id)
        .execute(&state.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(TaskError::NotFound("declined entry").into());
    }

    Ok(ApiResponse::ok("Declined entry deleted", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_declined_entries, delete_declined_entry),
    components(schemas(DeclinedEntry)),
    tags(
        (name = "Declined", description = "Declined request audit entries")
    )
)]
pub struct DeclinedDoc;
