// src/db/models/collaboration.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Denormalized live view of an ongoing request, kept for listing purposes.
/// Created on pending→ongoing, removed on ongoing→completed; `request_id`
/// ties it to exactly one request.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct Collaboration {
    pub id: i32,
    pub request_id: i32,
    pub task_name: String,
    pub assigned_by: String,
    pub assignee: String,
    pub deadline: NaiveDate,
    pub created_at: NaiveDateTime,
}
