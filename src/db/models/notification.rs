// src/db/models/notification.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::EnumParseError;

/// What kind of lifecycle event a notification reports.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Request,
    Accept,
    Decline,
    MarkAsDone,
    Feedback,
    ProgressUpdate,
    Chat,
}

impl NotificationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Request => "request",
            NotificationKind::Accept => "accept",
            NotificationKind::Decline => "decline",
            NotificationKind::MarkAsDone => "mark_as_done",
            NotificationKind::Feedback => "feedback",
            NotificationKind::ProgressUpdate => "progress_update",
            NotificationKind::Chat => "chat",
        }
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "request" => Ok(NotificationKind::Request),
            "accept" => Ok(NotificationKind::Accept),
            "decline" => Ok(NotificationKind::Decline),
            "mark_as_done" => Ok(NotificationKind::MarkAsDone),
            "feedback" => Ok(NotificationKind::Feedback),
            "progress_update" => Ok(NotificationKind::ProgressUpdate),
            "chat" => Ok(NotificationKind::Chat),
            _ => Err(EnumParseError::new("notification kind", value)),
        }
    }
}

/// A single fan-out message to one recipient. `company_id` is the recipient,
/// `user_id` the actor the message is about.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub company_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub metadata: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewNotification {
    pub company_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub metadata: Option<Value>,
}

/// Replace every occurrence of the actor's company id in a message with the
/// directory display name. Best-effort text substitution; callers fall back
/// to the raw id when no name is known.
pub fn substitute_user_token(message: &str, user_id: &str, full_name: &str) -> String {
    if user_id.is_empty() || !message.contains(user_id) {
        return message.to_string();
    }
    message.replace(user_id, full_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_text() {
        for kind in [
            NotificationKind::Request,
            NotificationKind::Accept,
            NotificationKind::Decline,
            NotificationKind::MarkAsDone,
            NotificationKind::Feedback,
            NotificationKind::ProgressUpdate,
            NotificationKind::Chat,
        ] {
            assert_eq!(
                NotificationKind::try_from(kind.as_str().to_string()).unwrap(),
                kind
            );
        }
        assert!(NotificationKind::try_from("reminder".to_string()).is_err());
    }

    #[test]
    fn kind_serializes_in_snake_case() {
        let json = serde_json::to_string(&NotificationKind::MarkAsDone).unwrap();
        assert_eq!(json, "\"mark_as_done\"");
    }

    #[test]
    fn substitution_replaces_every_occurrence() {
        let message = "TS1001 assigned TS1001 a task";
        assert_eq!(
            substitute_user_token(message, "TS1001", "Jordan Lee"),
            "Jordan Lee assigned Jordan Lee a task"
        );
    }

    #[test]
    fn substitution_leaves_unmatched_messages_alone() {
        let message = "A task was assigned";
        assert_eq!(
            substitute_user_token(message, "TS1001", "Jordan Lee"),
            message
        );
        assert_eq!(substitute_user_token(message, "", "Jordan Lee"), message);
    }
}
