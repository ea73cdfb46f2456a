use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::collaboration::*;

pub fn collaboration_routes() -> Router<AppState> {
    Router::new().route("/collaborations", get(get_collaborations))
}
