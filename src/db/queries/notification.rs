// src/db/queries/notification.rs
use axum::extract::{Path, State};
use axum::Json;

use crate::app_state::AppState;
use crate::db::models::notification::{substitute_user_token, NewNotification, Notification};
use crate::db::queries::user::display_name;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;
use crate::utils::notification::NotificationBuilder;

const NOTIFICATION_COLUMNS: &str =
    "id, company_id, user_id, kind, title, message, read, metadata, created_at";

/// How many notifications a single history fetch returns.
const HISTORY_LIMIT: i64 = 50;

#[utoipa::path(
    get,
    path = "/notifications/{id}",
    params(
        ("id" = String, Path, description = "Recipient company id")
    ),
    responses(
        (status = 200, description = "Notifications for the recipient", body = Vec<Notification>)
    ),
    tag = "Notifications"
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<Notification>>, ApiResponse<()>> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
         WHERE company_id = $1 ORDER BY created_at DESC LIMIT $2"
    ))
    .bind(&company_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Notifications retrieved", notifications))
}

/// Idempotent: marking an already-read notification succeeds unchanged.
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i32>,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    let notification = sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET read = true WHERE id = $1 RETURNING {NOTIFICATION_COLUMNS}"
    ))
    .bind(notification_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("notification"))?;

    Ok(ApiResponse::ok("Notification marked as read", notification))
}

#[utoipa::path(
    put,
    path = "/notifications/{id}/read-all",
    params(
        ("id" = String, Path, description = "Recipient company id")
    ),
    responses(
        (status = 200, description = "All notifications marked as read", body = u64)
    ),
    tag = "Notifications"
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<u64>, ApiResponse<()>> {
    let updated =
        sqlx::query("UPDATE notifications SET read = true WHERE company_id = $1 AND read = false")
            .bind(&company_id)
            .execute(&state.pool)
            .await?;

    Ok(ApiResponse::ok(
        "All notifications marked as read",
        updated.rows_affected(),
    ))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let deleted = sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(notification_id)
        .execute(&state.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(TaskError::NotFound("notification").into());
    }

    Ok(ApiResponse::ok("Notification deleted", ()))
}

/// Manual creation used by the UI. The actor's company id in the message is
/// swapped for their directory name when one exists.
#[utoipa::path(
    post,
    path = "/notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Invalid notification payload")
    ),
    tag = "Notifications"
)]
pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<NewNotification>,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    let actor_name = display_name(&state.pool, &payload.user_id).await;
    let message = substitute_user_token(&payload.message, &payload.user_id, &actor_name);

    let mut conn = state.pool.acquire().await?;
    let stored = NotificationBuilder::new(payload.kind, payload.title)
        .message(message)
        .actor(payload.user_id)
        .recipient(payload.company_id)
        .metadata(payload.metadata.unwrap_or_else(|| serde_json::json!({})))
        .store(&mut conn)
        .await?;

    state.events.publish_notifications(&stored);

    let notification = stored
        .into_iter()
        .next()
        .ok_or(TaskError::NotFound("notification"))?;
    Ok(ApiResponse::created("Notification created", notification))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        get_notifications,
        mark_notification_read,
        mark_all_notifications_read,
        delete_notification,
        create_notification
    ),
    components(schemas(Notification, NewNotification)),
    tags(
        (name = "Notifications", description = "Notification fan-out endpoints")
    )
)]
pub struct NotificationDoc;
