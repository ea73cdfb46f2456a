use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::stats::*;

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/employees", get(get_employee_overview))
        .route("/stats/{company_id}", get(get_employee_stats))
}
