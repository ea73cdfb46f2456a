// src/db/queries/collaboration.rs
use axum::extract::State;

use crate::app_state::AppState;
use crate::db::models::collaboration::Collaboration;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    get,
    path = "/collaborations",
    responses(
        (status = 200, description = "All active collaborations", body = Vec<Collaboration>)
    ),
    tag = "Collaborations"
)]
pub async fn get_collaborations(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Collaboration>>, ApiResponse<()>> {
    let collaborations = sqlx::query_as::<_, Collaboration>(
        "SELECT id, request_id, task_name, assigned_by, assignee, deadline, created_at \
         FROM collaborations ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Collaborations", collaborations))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_collaborations),
    components(schemas(Collaboration)),
    tags(
        (name = "Collaborations", description = "Live view of ongoing tasks")
    )
)]
pub struct CollaborationDoc;
