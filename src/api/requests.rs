use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::declined::*;
use crate::db::queries::requests::*;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/requests/ongoing", get(get_ongoing_requests))
        .route("/requests/declined", get(get_declined_entries))
        .route(
            "/requests/declined/{id}",
            get(get_declined_requests_for).delete(delete_declined_entry),
        )
        .route("/requests/pending/{company_id}", get(get_pending_requests))
        .route(
            "/requests/completed/{company_id}",
            get(get_completed_requests),
        )
        .route(
            "/requests/assigned/{company_id}",
            get(get_assigned_requests),
        )
        .route(
            "/requests/ongoing/{company_id}",
            get(get_ongoing_requests_for),
        )
        .route(
            "/requests/{request_id}",
            get(get_request).put(edit_request).delete(delete_request),
        )
        .route("/requests/{request_id}/accept", put(accept_request))
        .route("/requests/{request_id}/decline", put(decline_request))
        .route("/requests/{request_id}/complete", put(complete_request))
        .route("/requests/{request_id}/progress", put(update_progress))
}
