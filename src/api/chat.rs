use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::chat::*;

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(create_chat))
        .route("/chat/task", post(get_or_create_task_chat))
        .route("/chat/task/{task_id}", get(get_task_chat))
        .route("/chat/id/{chat_id}", get(get_chat))
        .route("/chat/user/{company_id}", get(get_user_chats))
        .route("/chat/{chat_id}/messages", post(post_message))
        .route("/chat/{chat_id}/read", put(mark_chat_read))
        .route("/chat/{chat_id}/clear", put(clear_chat))
}
