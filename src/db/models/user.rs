// src/db/models/user.rs
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory entry for an employee. Authentication lives elsewhere; the core
/// only reads names and roles from here.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub company_id: String,
    pub full_name: String,
    pub role: String,
}
