use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::notification::*;

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", post(create_notification))
        .route(
            "/notifications/{id}",
            get(get_notifications).delete(delete_notification),
        )
        .route("/notifications/{id}/read", put(mark_notification_read))
        .route(
            "/notifications/{id}/read-all",
            put(mark_all_notifications_read),
        )
}
