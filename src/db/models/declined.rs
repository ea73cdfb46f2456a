// src/db/models/declined.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Audit snapshot taken when a request is declined. Immutable once written,
/// except for deletion after the task has been reallocated.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct DeclinedEntry {
    pub id: i32,
    pub request_id: i32,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub assigned_by: String,
    pub declined_on: NaiveDateTime,
    pub declined_reason: String,
    pub alternative_date: NaiveDate,
    pub created_at: NaiveDateTime,
}
