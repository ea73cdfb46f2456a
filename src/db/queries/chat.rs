// src/db/queries/chat.rs
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;

use crate::app_state::AppState;
use crate::db::models::chat::{
    mark_messages_read, Attachment, Chat, ChatKind, ChatMessage, MarkReadRequest, NewChat,
    NewChatMessage, TaskChatRequest,
};
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;
use crate::utils::notification::notify_chat_message;

const CHAT_COLUMNS: &str =
    "id, name, kind, participants, task_id, messages, last_message, created_at, updated_at";

async fn fetch_chat_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    chat_id: i32,
) -> Result<Chat, TaskError> {
    sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1 FOR UPDATE"
    ))
    .bind(chat_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(TaskError::NotFound("chat"))
}

async fn find_task_chat(pool: &sqlx::PgPool, task_id: i32) -> Result<Option<Chat>, TaskError> {
    Ok(sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE task_id = $1"
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?)
}

#[utoipa::path(
    post,
    path = "/chat",
    request_body = NewChat,
    responses(
        (status = 201, description = "Chat created", body = Chat),
        (status = 400, description = "Chat needs at least one participant")
    ),
    tag = "Chat"
)]
pub async fn create_chat(
    State(state): State<AppState>,
    Json(payload): Json<NewChat>,
) -> Result<ApiResponse<Chat>, ApiResponse<()>> {
    if payload.participants.is_empty() {
        return Err(
            TaskError::Validation("chat needs at least one participant".to_string()).into(),
        );
    }

    let now = Utc::now().naive_utc();
    let chat = sqlx::query_as::<_, Chat>(&format!(
        "INSERT INTO chats (name, kind, participants, task_id, messages, last_message, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, '[]', $5, $5, $5) RETURNING {CHAT_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(payload.kind.as_str())
    .bind(&payload.participants)
    .bind(payload.task_id)
    .bind(now)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            TaskError::Validation("a chat already exists for this task".to_string())
        }
        _ => TaskError::Storage(e),
    })?;

    Ok(ApiResponse::created("Chat created", chat))
}

/// Get-or-create for a task's conversation: first match by task id wins,
/// otherwise a task-scoped chat is created lazily.
#[utoipa::path(
    post,
    path = "/chat/task",
    request_body = TaskChatRequest,
    responses(
        (status = 200, description = "Existing chat returned", body = Chat),
        (status = 201, description = "Chat created for the task", body = Chat)
    ),
    tag = "Chat"
)]
pub async fn get_or_create_task_chat(
    State(state): State<AppState>,
    Json(payload): Json<TaskChatRequest>,
) -> Result<ApiResponse<Chat>, ApiResponse<()>> {
    if let Some(chat) = find_task_chat(&state.pool, payload.task_id).await? {
        return Ok(ApiResponse::ok("Chat retrieved", chat));
    }

    // task_id carries a unique constraint, so concurrent creates race on the
    // insert and exactly one wins; the loser re-reads the winner's row.
    let now = Utc::now().naive_utc();
    let inserted = sqlx::query_as::<_, Chat>(&format!(
        "INSERT INTO chats (name, kind, participants, task_id, messages, last_message, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, '[]', $5, $5, $5) \
         ON CONFLICT (task_id) DO NOTHING RETURNING {CHAT_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(ChatKind::Task.as_str())
    .bind(&payload.participants)
    .bind(payload.task_id)
    .bind(now)
    .fetch_optional(&state.pool)
    .await?;

    if let Some(chat) = inserted {
        return Ok(ApiResponse::created("Chat created", chat));
    }

    let chat = find_task_chat(&state.pool, payload.task_id)
        .await?
        .ok_or(TaskError::NotFound("chat"))?;
    Ok(ApiResponse::ok("Chat retrieved", chat))
}

#[utoipa::path(
    get,
    path = "/chat/task/{task_id}",
    params(
        ("task_id" = i32, Path, description = "Task request ID")
    ),
    responses(
        (status = 200, description = "Chat for the task", body = Chat),
        (status = 404, description = "No chat exists for the task")
    ),
    tag = "Chat"
)]
pub async fn get_task_chat(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<ApiResponse<Chat>, ApiResponse<()>> {
    let chat = find_task_chat(&state.pool, task_id)
        .await?
        .ok_or(TaskError::NotFound("chat"))?;

    Ok(ApiResponse::ok("Chat retrieved", chat))
}

#[utoipa::path(
    get,
    path = "/chat/id/{chat_id}",
    params(
        ("chat_id" = i32, Path, description = "Chat ID")
    ),
    responses(
        (status = 200, description = "Chat retrieved", body = Chat),
        (status = 404, description = "Chat not found")
    ),
    tag = "Chat"
)]
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i32>,
) -> Result<ApiResponse<Chat>, ApiResponse<()>> {
    let chat = sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"
    ))
    .bind(chat_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("chat"))?;

    Ok(ApiResponse::ok("Chat retrieved", chat))
}

#[utoipa::path(
    get,
    path = "/chat/user/{company_id}",
    params(
        ("company_id" = String, Path, description = "Participant company id")
    ),
    responses(
        (status = 200, description = "Chats the user participates in", body = Vec<Chat>)
    ),
    tag = "Chat"
)]
pub async fn get_user_chats(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<Chat>>, ApiResponse<()>> {
    let chats = sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE $1 = ANY(participants) ORDER BY last_message DESC"
    ))
    .bind(&company_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Chats retrieved", chats))
}

#[utoipa::path(
    post,
    path = "/chat/{chat_id}/messages",
    params(
        ("chat_id" = i32, Path, description = "Chat ID")
    ),
    request_body = NewChatMessage,
    responses(
        (status = 201, description = "Message posted", body = ChatMessage),
        (status = 400, description = "Message content is empty"),
        (status = 404, description = "Chat not found")
    ),
    tag = "Chat"
)]
pub async fn post_message(
    State(state): State<AppState>,
    Path(chat_id): Path<i32>,
    Json(payload): Json<NewChatMessage>,
) -> Result<ApiResponse<ChatMessage>, ApiResponse<()>> {
    if payload.content.trim().is_empty() {
        return Err(TaskError::Validation("message content is required".to_string()).into());
    }

    let mut tx = state.pool.begin().await?;
    let chat = fetch_chat_for_update(&mut tx, chat_id).await?;

    let message = ChatMessage::new(payload.sender, payload.content, payload.attachments);
    let mut messages = chat.messages.0.clone();
    messages.push(message.clone());

    sqlx::query("UPDATE chats SET messages = $1, last_message = $2, updated_at = $2 WHERE id = $3")
        .bind(sqlx::types::Json(&messages))
        .bind(message.created_at)
        .bind(chat_id)
        .execute(&mut *tx)
        .await?;

    let created = notify_chat_message(&mut tx, &chat, &message).await?;

    tx.commit().await?;
    state.events.publish_message(chat_id, &message);
    state.events.publish_notifications(&created);

    Ok(ApiResponse::created("Message posted", message))
}

/// Idempotent: repeated calls leave the same read sets behind.
#[utoipa::path(
    put,
    path = "/chat/{chat_id}/read",
    params(
        ("chat_id" = i32, Path, description = "Chat ID")
    ),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Messages marked as read", body = Chat),
        (status = 404, description = "Chat not found")
    ),
    tag = "Chat"
)]
pub async fn mark_chat_read(
    State(state): State<AppState>,
    Path(chat_id): Path<i32>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<ApiResponse<Chat>, ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    let mut chat = fetch_chat_for_update(&mut tx, chat_id).await?;

    let mut messages = chat.messages.0.clone();
    if mark_messages_read(&mut messages, &payload.company_id) {
        let now = Utc::now().naive_utc();
        sqlx::query("UPDATE chats SET messages = $1, updated_at = $2 WHERE id = $3")
            .bind(sqlx::types::Json(&messages))
            .bind(now)
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        chat.updated_at = now;
    }
    chat.messages = sqlx::types::Json(messages);

    tx.commit().await?;
    Ok(ApiResponse::ok("Messages marked as read", chat))
}

/// Destructive and irreversible: the message log is emptied in place.
#[utoipa::path(
    put,
    path = "/chat/{chat_id}/clear",
    params(
        ("chat_id" = i32, Path, description = "Chat ID")
    ),
    responses(
        (status = 200, description = "Chat cleared"),
        (status = 404, description = "Chat not found")
    ),
    tag = "Chat"
)]
pub async fn clear_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let cleared = sqlx::query("UPDATE chats SET messages = '[]', updated_at = $1 WHERE id = $2")
        .bind(Utc::now().naive_utc())
        .bind(chat_id)
        .execute(&state.pool)
        .await?;
    if cleared.rows_affected() == 0 {
        return Err(TaskError::NotFound("chat").into());
    }

    Ok(ApiResponse::ok("Chat cleared", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_chat,
        get_or_create_task_chat,
        get_task_chat,
        get_chat,
        get_user_chats,
        post_message,
        mark_chat_read,
        clear_chat
    ),
    components(schemas(Chat, ChatMessage, Attachment, NewChat, TaskChatRequest, NewChatMessage, MarkReadRequest)),
    tags(
        (name = "Chat", description = "Per-task and group conversations")
    )
)]
pub struct ChatDoc;
