// src/db/models/feedback.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EnumParseError;
use crate::utils::error::TaskError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum FeedbackCategory {
    #[serde(rename = "system issue")]
    SystemIssue,
    #[serde(rename = "system misuse")]
    SystemMisuse,
    #[serde(rename = "general")]
    General,
    #[serde(rename = "other")]
    Other,
}

impl FeedbackCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::SystemIssue => "system issue",
            FeedbackCategory::SystemMisuse => "system misuse",
            FeedbackCategory::General => "general",
            FeedbackCategory::Other => "other",
        }
    }
}

impl TryFrom<String> for FeedbackCategory {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "system issue" => Ok(FeedbackCategory::SystemIssue),
            "system misuse" => Ok(FeedbackCategory::SystemMisuse),
            "general" => Ok(FeedbackCategory::General),
            "other" => Ok(FeedbackCategory::Other),
            _ => Err(EnumParseError::new("feedback category", value)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Processing,
    Completed,
}

impl FeedbackStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Processing => "processing",
            FeedbackStatus::Completed => "completed",
        }
    }
}

impl TryFrom<String> for FeedbackStatus {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "processing" => Ok(FeedbackStatus::Processing),
            "completed" => Ok(FeedbackStatus::Completed),
            _ => Err(EnumParseError::new("feedback status", value)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct Feedback {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub category: FeedbackCategory,
    #[sqlx(try_from = "String")]
    pub status: FeedbackStatus,
    pub employee: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewFeedback {
    pub title: String,
    pub description: String,
    pub category: FeedbackCategory,
    pub employee: String,
    /// Display name supplied by the client; falls back to a directory lookup.
    pub user: Option<String>,
}

impl NewFeedback {
    pub fn validate(&self) -> Result<(), TaskError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("employee", &self.employee),
        ] {
            if value.trim().is_empty() {
                return Err(TaskError::Validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateFeedback {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<FeedbackCategory>,
    pub status: Option<FeedbackStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_spaced_labels() {
        assert_eq!(
            FeedbackCategory::try_from("system issue".to_string()).unwrap(),
            FeedbackCategory::SystemIssue
        );
        assert!(FeedbackCategory::try_from("complaint".to_string()).is_err());
    }

    #[test]
    fn category_serializes_with_spaces() {
        let json = serde_json::to_string(&FeedbackCategory::SystemMisuse).unwrap();
        assert_eq!(json, "\"system misuse\"");
    }

    #[test]
    fn new_feedback_requires_title_description_employee() {
        let feedback = NewFeedback {
            title: "Broken export".to_string(),
            description: "Export button does nothing".to_string(),
            category: FeedbackCategory::SystemIssue,
            employee: "TS1001".to_string(),
            user: None,
        };
        assert!(feedback.validate().is_ok());

        let blank = NewFeedback {
            title: String::new(),
            ..feedback
        };
        assert!(blank.validate().is_err());
    }
}
