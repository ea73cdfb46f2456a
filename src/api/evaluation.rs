use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::evaluation::*;

pub fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/evaluations", post(create_evaluation))
        .route("/evaluations/all", get(get_evaluations))
        .route(
            "/evaluations/{id}",
            get(get_evaluations_for_month)
                .put(update_evaluation)
                .delete(delete_evaluation),
        )
}
