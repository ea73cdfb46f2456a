use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::user::get_user;

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/{company_id}", get(get_user))
}
