// src/db/models/chat.rs
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::EnumParseError;

/// How many characters of a message body make it into the notification text.
const PREVIEW_LEN: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Direct,
    Group,
    Task,
}

impl ChatKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Direct => "direct",
            ChatKind::Group => "group",
            ChatKind::Task => "task",
        }
    }
}

impl TryFrom<String> for ChatKind {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "direct" => Ok(ChatKind::Direct),
            "group" => Ok(ChatKind::Group),
            "task" => Ok(ChatKind::Task),
            _ => Err(EnumParseError::new("chat kind", value)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// One entry in a chat's message log. Messages are append-only; read state
/// is tracked per participant in `read_by`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub read_by: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl ChatMessage {
    /// A freshly posted message counts as read by its sender.
    pub fn new(sender: String, content: String, attachments: Vec<Attachment>) -> Self {
        let read_by = vec![sender.clone()];
        Self {
            id: Uuid::new_v4(),
            sender,
            content,
            attachments,
            read_by,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Short excerpt used in chat notifications.
    pub fn preview(&self) -> String {
        let mut preview: String = self.content.chars().take(PREVIEW_LEN).collect();
        if self.content.chars().count() > PREVIEW_LEN {
            preview.push_str("...");
        }
        preview
    }
}

/// A conversation scoped to a set of participants, optionally tied to a task.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct Chat {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: ChatKind,
    pub participants: Vec<String>,
    pub task_id: Option<i32>,
    #[schema(value_type = Vec<ChatMessage>)]
    pub messages: Json<Vec<ChatMessage>>,
    pub last_message: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Chat {
    /// Everyone in the chat except the message sender.
    pub fn other_participants(&self, sender: &str) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.as_str() != sender)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewChat {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    pub participants: Vec<String>,
    pub task_id: Option<i32>,
}

/// Payload for the get-or-create flow backing a task's conversation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskChatRequest {
    pub task_id: i32,
    pub name: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewChatMessage {
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadRequest {
    pub company_id: String,
}

/// Add `reader` to every message's read set. Returns whether anything
/// changed, so callers can skip the write on a repeat call.
pub fn mark_messages_read(messages: &mut [ChatMessage], reader: &str) -> bool {
    let mut changed = false;
    for message in messages.iter_mut() {
        if !message.read_by.iter().any(|r| r == reader) {
            message.read_by.push(reader.to_string());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: &str, content: &str) -> ChatMessage {
        ChatMessage::new(sender.to_string(), content.to_string(), Vec::new())
    }

    #[test]
    fn new_message_is_read_by_its_sender() {
        let msg = message("TS1001", "status?");
        assert_eq!(msg.read_by, vec!["TS1001".to_string()]);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut messages = vec![message("TS1001", "first"), message("TS1002", "second")];

        assert!(mark_messages_read(&mut messages, "TS3000"));
        let after_first: Vec<Vec<String>> =
            messages.iter().map(|m| m.read_by.clone()).collect();

        assert!(!mark_messages_read(&mut messages, "TS3000"));
        let after_second: Vec<Vec<String>> =
            messages.iter().map(|m| m.read_by.clone()).collect();

        assert_eq!(after_first, after_second);
        assert!(messages[0].read_by.contains(&"TS3000".to_string()));
    }

    #[test]
    fn mark_read_skips_the_sender_without_duplicating() {
        let mut messages = vec![message("TS1001", "hello")];
        mark_messages_read(&mut messages, "TS1001");
        assert_eq!(messages[0].read_by, vec!["TS1001".to_string()]);
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(80);
        let msg = message("TS1001", &long);
        assert_eq!(msg.preview(), format!("{}...", "x".repeat(50)));

        let short = message("TS1001", "on my way");
        assert_eq!(short.preview(), "on my way");
    }

    #[test]
    fn other_participants_excludes_the_sender() {
        let chat = Chat {
            id: 1,
            name: "Quarterly report".to_string(),
            kind: ChatKind::Task,
            participants: vec![
                "TS1001".to_string(),
                "TS2001".to_string(),
                "TS3001".to_string(),
            ],
            task_id: Some(7),
            messages: Json(Vec::new()),
            last_message: Utc::now().naive_utc(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };
        assert_eq!(
            chat.other_participants("TS2001"),
            vec!["TS1001".to_string(), "TS3001".to_string()]
        );
    }
}
