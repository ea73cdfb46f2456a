use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::feedback::*;

pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", post(create_feedback).get(get_feedbacks))
        .route(
            "/feedback/{feedback_id}",
            put(update_feedback).delete(delete_feedback),
        )
        .route("/feedback/{feedback_id}/complete", put(complete_feedback))
}
