use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::PgConnection;

use crate::db::models::chat::{Chat, ChatMessage};
use crate::db::models::feedback::Feedback;
use crate::db::models::notification::{Notification, NotificationKind};
use crate::db::models::requests::TaskRequest;

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while fanning out notifications
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("notification has no recipient")]
    MissingRecipient,
}

/// Builder for the durable half of the fan-out: one notification row per
/// recipient, written with the caller's transaction so lifecycle writes and
/// their notifications commit together. The realtime push happens after
/// commit, from the rows this returns.
pub struct NotificationBuilder {
    kind: NotificationKind,
    title: String,
    message: String,
    actor: String,
    recipients: Vec<String>,
    metadata: Value,
}

impl NotificationBuilder {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: String::new(),
            actor: String::new(),
            recipients: Vec::new(),
            metadata: json!({}),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The user the notification is about.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn recipient(mut self, company_id: impl Into<String>) -> Self {
        self.recipients.push(company_id.into());
        self
    }

    pub fn recipients(mut self, company_ids: Vec<String>) -> Self {
        self.recipients.extend(company_ids);
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    fn ensure_recipients(&self) -> NotificationResult<()> {
        if self.recipients.is_empty() {
            return Err(NotificationError::MissingRecipient);
        }
        Ok(())
    }

    /// Persist one row per recipient and return them in recipient order.
    pub async fn store(self, conn: &mut PgConnection) -> NotificationResult<Vec<Notification>> {
        self.ensure_recipients()?;
        let now = Utc::now().naive_utc();
        let mut stored = Vec::with_capacity(self.recipients.len());
        for recipient in &self.recipients {
            let notification = sqlx::query_as::<_, Notification>(
                r#"
                INSERT INTO notifications (company_id, user_id, kind, title, message, read, metadata, created_at)
                VALUES ($1, $2, $3, $4, $5, false, $6, $7)
                RETURNING id, company_id, user_id, kind, title, message, read, metadata, created_at
                "#,
            )
            .bind(recipient)
            .bind(&self.actor)
            .bind(self.kind.as_str())
            .bind(&self.title)
            .bind(&self.message)
            .bind(&self.metadata)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?;
            stored.push(notification);
        }
        Ok(stored)
    }
}

/// Tell the assignee a new task landed on their desk.
pub async fn notify_task_requested(
    conn: &mut PgConnection,
    request: &TaskRequest,
    assigned_by_name: &str,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::Request, "New Task Request")
        .message(format!(
            "{} has assigned you a new task: {}",
            assigned_by_name, request.task_name
        ))
        .actor(request.assigned_by.clone())
        .recipient(request.assignee.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
            "priority": request.priority.as_str(),
            "deadline": request.deadline,
        }))
        .store(conn)
        .await
}

/// Reallocation re-triggers the request notification with its own title.
pub async fn notify_task_reallocated(
    conn: &mut PgConnection,
    request: &TaskRequest,
    assigned_by_name: &str,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::Request, "Task Reallocated")
        .message(format!(
            "{} has reallocated the task: {}",
            assigned_by_name, request.task_name
        ))
        .actor(request.assigned_by.clone())
        .recipient(request.assignee.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
            "priority": request.priority.as_str(),
            "deadline": request.deadline,
        }))
        .store(conn)
        .await
}

pub async fn notify_task_accepted(
    conn: &mut PgConnection,
    request: &TaskRequest,
    assignee_name: &str,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::Accept, "Task Accepted")
        .message(format!(
            "{} has accepted the task: {}",
            assignee_name, request.task_name
        ))
        .actor(request.assignee.clone())
        .recipient(request.assigned_by.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
        }))
        .store(conn)
        .await
}

pub async fn notify_task_declined(
    conn: &mut PgConnection,
    request: &TaskRequest,
    assignee_name: &str,
    reason: &str,
    alternative_date: NaiveDate,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::Decline, "Task Declined")
        .message(format!(
            "{} has declined the task: {}. Reason: {}",
            assignee_name, request.task_name, reason
        ))
        .actor(request.assignee.clone())
        .recipient(request.assigned_by.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
            "reason": reason,
            "alternative_date": alternative_date,
        }))
        .store(conn)
        .await
}

pub async fn notify_task_completed(
    conn: &mut PgConnection,
    request: &TaskRequest,
    assignee_name: &str,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::MarkAsDone, "Task Completed")
        .message(format!(
            "{} has completed the task: {}",
            assignee_name, request.task_name
        ))
        .actor(request.assignee.clone())
        .recipient(request.assigned_by.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
        }))
        .store(conn)
        .await
}

pub async fn notify_progress_update(
    conn: &mut PgConnection,
    request: &TaskRequest,
    updated_by: &str,
    progress: i32,
    comment: &str,
) -> NotificationResult<Vec<Notification>> {
    NotificationBuilder::new(NotificationKind::ProgressUpdate, "Task Progress Updated")
        .message(format!(
            "Task \"{}\" progress updated to {}%",
            request.task_name, progress
        ))
        .actor(updated_by.to_string())
        .recipient(request.assigned_by.clone())
        .metadata(json!({
            "request_id": request.id,
            "task_name": request.task_name,
            "progress": progress,
            "comment": comment,
        }))
        .store(conn)
        .await
}

/// One notification per participant other than the sender.
pub async fn notify_chat_message(
    conn: &mut PgConnection,
    chat: &Chat,
    message: &ChatMessage,
) -> NotificationResult<Vec<Notification>> {
    let recipients = chat.other_participants(&message.sender);
    if recipients.is_empty() {
        return Ok(Vec::new());
    }
    NotificationBuilder::new(NotificationKind::Chat, "New Message")
        .message(format!(
            "New message in {}: {}",
            chat.name,
            message.preview()
        ))
        .actor(message.sender.clone())
        .recipients(recipients)
        .metadata(json!({
            "chat_id": chat.id,
            "message_id": message.id,
        }))
        .store(conn)
        .await
}

/// Feedback goes to everyone with a manager role.
pub async fn notify_feedback_submitted(
    conn: &mut PgConnection,
    feedback: &Feedback,
    employee_name: &str,
    manager_ids: Vec<String>,
) -> NotificationResult<Vec<Notification>> {
    if manager_ids.is_empty() {
        return Ok(Vec::new());
    }
    NotificationBuilder::new(NotificationKind::Feedback, "New Feedback Submitted")
        .message(format!(
            "New feedback submitted by {}: {}",
            employee_name, feedback.title
        ))
        .actor(feedback.employee.clone())
        .recipients(manager_ids)
        .metadata(json!({
            "feedback_id": feedback.id,
            "title": feedback.title,
            "category": feedback.category.as_str(),
            "employee": feedback.employee,
        }))
        .store(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_at_least_one_recipient() {
        let builder = NotificationBuilder::new(NotificationKind::Accept, "Task Accepted")
            .message("accepted")
            .actor("TS1001");
        assert!(matches!(
            builder.ensure_recipients(),
            Err(NotificationError::MissingRecipient)
        ));
    }

    #[test]
    fn builder_collects_recipients_in_order() {
        let builder = NotificationBuilder::new(NotificationKind::Chat, "New Message")
            .recipient("TS1001")
            .recipients(vec!["TS1002".to_string(), "TS1003".to_string()]);
        assert!(builder.ensure_recipients().is_ok());
        assert_eq!(builder.recipients, vec!["TS1001", "TS1002", "TS1003"]);
    }
}
