use sqlx::PgPool;

use crate::realtime::EventHub;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub events: EventHub,
}
