// src/db/models/evaluation.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A manager's monthly grading of an employee.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct Evaluation {
    pub id: i32,
    pub employee: String,
    pub grade: String,
    pub notes: String,
    pub further_action: String,
    pub month: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewEvaluation {
    pub employee: String,
    pub grade: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub further_action: String,
    pub month: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateEvaluation {
    pub grade: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub further_action: String,
}
