// src/db/queries/feedback.rs
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use sqlx::QueryBuilder;

use crate::app_state::AppState;
use crate::db::models::feedback::{Feedback, NewFeedback, UpdateFeedback};
use crate::db::queries::user::{display_name, manager_company_ids};
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;
use crate::utils::notification::notify_feedback_submitted;

const FEEDBACK_COLUMNS: &str =
    "id, title, description, category, status, employee, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/feedback",
    request_body = NewFeedback,
    responses(
        (status = 201, description = "Feedback submitted", body = Feedback),
        (status = 400, description = "Missing required field")
    ),
    tag = "Feedback"
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(payload): Json<NewFeedback>,
) -> Result<ApiResponse<Feedback>, ApiResponse<()>> {
    payload.validate()?;

    // Prefer the display name the client sent, then the directory, then the
    // raw company id.
    let employee_name = match payload.user.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => display_name(&state.pool, &payload.employee).await,
    };
    let manager_ids = manager_company_ids(&state.pool).await?;

    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let feedback = sqlx::query_as::<_, Feedback>(&format!(
        "INSERT INTO feedback (title, description, category, status, employee, created_at, updated_at) \
         VALUES ($1, $2, $3, 'processing', $4, $5, $5) RETURNING {FEEDBACK_COLUMNS}"
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.category.as_str())
    .bind(&payload.employee)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let created = notify_feedback_submitted(&mut tx, &feedback, &employee_name, manager_ids).await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    tracing::info!(feedback_id = feedback.id, employee = %feedback.employee, "feedback submitted");
    Ok(ApiResponse::created("Feedback submitted", feedback))
}

#[utoipa::path(
    get,
    path = "/feedback",
    responses(
        (status = 200, description = "All feedback entries", body = Vec<Feedback>)
    ),
    tag = "Feedback"
)]
pub async fn get_feedbacks(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Feedback>>, ApiResponse<()>> {
    let feedbacks = sqlx::query_as::<_, Feedback>(&format!(
        "SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY created_at DESC"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Feedback retrieved", feedbacks))
}

#[utoipa::path(
    put,
    path = "/feedback/{feedback_id}",
    params(
        ("feedback_id" = i32, Path, description = "Feedback ID")
    ),
    request_body = UpdateFeedback,
    responses(
        (status = 200, description = "Feedback updated", body = Feedback),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Feedback not found")
    ),
    tag = "Feedback"
)]
pub async fn update_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i32>,
    Json(payload): Json<UpdateFeedback>,
) -> Result<ApiResponse<Feedback>, ApiResponse<()>> {
    let has_field = payload.title.is_some()
        || payload.description.is_some()
        || payload.category.is_some()
        || payload.status.is_some();
    if !has_field {
        return Err(TaskError::Validation("no fields provided for update".to_string()).into());
    }

    let mut query = QueryBuilder::new("UPDATE feedback SET updated_at = ");
    query.push_bind(Utc::now().naive_utc());
    if let Some(title) = &payload.title {
        query.push(", title = ");
        query.push_bind(title);
    }
    if let Some(description) = &payload.description {
        query.push(", description = ");
        query.push_bind(description);
    }
    if let Some(category) = &payload.category {
        query.push(", category = ");
        query.push_bind(category.as_str());
    }
    if let Some(status) = &payload.status {
        query.push(", status = ");
        query.push_bind(status.as_str());
    }
    query.push(" WHERE id = ");
    query.push_bind(feedback_id);
    query.push(format!(" RETURNING {FEEDBACK_COLUMNS}"));

    let feedback = query
        .build_query_as::<Feedback>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or(TaskError::NotFound("feedback"))?;

    Ok(ApiResponse::ok("Feedback updated", feedback))
}

#[utoipa::path(
    put,
    path = "/feedback/{feedback_id}/complete",
    params(
        ("feedback_id" = i32, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Feedback marked as completed", body = Feedback),
        (status = 404, description = "Feedback not found")
    ),
    tag = "Feedback"
)]
pub async fn complete_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i32>,
) -> Result<ApiResponse<Feedback>, ApiResponse<()>> {
    let feedback = sqlx::query_as::<_, Feedback>(&format!(
        "UPDATE feedback SET status = 'completed', updated_at = $1 WHERE id = $2 \
         RETURNING {FEEDBACK_COLUMNS}"
    ))
    .bind(Utc::now().naive_utc())
    .bind(feedback_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("feedback"))?;

    Ok(ApiResponse::ok("Feedback marked as completed", feedback))
}

#[utoipa::path(
    delete,
    path = "/feedback/{feedback_id}",
    params(
        ("feedback_id" = i32, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Feedback deleted"),
        (status = 404, description = "Feedback not found")
    ),
    tag = "Feedback"
)]
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let deleted = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(feedback_id)
        .execute(&state.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(TaskError::NotFound("feedback").into());
    }

    Ok(ApiResponse::ok("Feedback deleted", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_feedback,
        get_feedbacks,
        update_feedback,
        complete_feedback,
        delete_feedback
    ),
    components(schemas(Feedback, NewFeedback, UpdateFeedback)),
    tags(
        (name = "Feedback", description = "Employee feedback endpoints")
    )
)]
pub struct FeedbackDoc;
