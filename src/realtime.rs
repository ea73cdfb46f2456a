//! Push channel for notifications and chat messages.
//!
//! Events fan out over a single broadcast channel; each websocket connection
//! carries a [`ClientScope`] and the transport drops anything outside it, so
//! routing is decided server-side rather than by the client.

use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::db::models::chat::ChatMessage;
use crate::db::models::notification::Notification;

/// One event on the push channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A persisted notification, delivered only to its recipient.
    Notification(Notification),
    /// A chat message, delivered to connections subscribed to the chat.
    NewMessage { chat_id: i32, message: ChatMessage },
}

/// What a single connection is allowed to receive.
#[derive(Debug, Clone)]
pub struct ClientScope {
    pub company_id: String,
    pub chats: HashSet<i32>,
}

impl ClientScope {
    pub fn new(company_id: impl Into<String>, chats: HashSet<i32>) -> Self {
        Self {
            company_id: company_id.into(),
            chats,
        }
    }

    /// Parse the `chats` query parameter (comma-separated chat ids).
    /// Unparseable tokens are skipped.
    pub fn parse(company_id: impl Into<String>, chats: Option<&str>) -> Self {
        let chats = chats
            .unwrap_or_default()
            .split(',')
            .filter_map(|token| token.trim().parse::<i32>().ok())
            .collect();
        Self::new(company_id, chats)
    }

    /// Server-side routing decision for one event.
    pub fn wants(&self, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::Notification(notification) => {
                notification.company_id == self.company_id
            }
            RealtimeEvent::NewMessage { chat_id, .. } => self.chats.contains(chat_id),
        }
    }
}

/// Cloneable handle publishing events to every connected client task.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    /// Best-effort publish; having no connected clients is not an error.
    pub fn publish(&self, event: RealtimeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn publish_notifications(&self, notifications: &[Notification]) {
        for notification in notifications {
            self.publish(RealtimeEvent::Notification(notification.clone()));
        }
    }

    pub fn publish_message(&self, chat_id: i32, message: &ChatMessage) {
        self.publish(RealtimeEvent::NewMessage {
            chat_id,
            message: message.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::notification::NotificationKind;
    use chrono::Utc;
    use serde_json::json;

    fn notification(recipient: &str) -> Notification {
        Notification {
            id: 1,
            company_id: recipient.to_string(),
            user_id: "TS2001".to_string(),
            kind: NotificationKind::Accept,
            title: "Task Accepted".to_string(),
            message: "accepted".to_string(),
            read: false,
            metadata: json!({}),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn chat_message(sender: &str) -> ChatMessage {
        ChatMessage::new(sender.to_string(), "hello".to_string(), Vec::new())
    }

    #[test]
    fn scope_parses_comma_separated_chat_ids() {
        let scope = ClientScope::parse("TS1001", Some("1, 2,junk,3"));
        assert_eq!(scope.chats, HashSet::from([1, 2, 3]));

        let empty = ClientScope::parse("TS1001", None);
        assert!(empty.chats.is_empty());
    }

    #[test]
    fn notifications_reach_only_their_recipient() {
        let scope = ClientScope::parse("TS1001", None);
        assert!(scope.wants(&RealtimeEvent::Notification(notification("TS1001"))));
        assert!(!scope.wants(&RealtimeEvent::Notification(notification("TS9999"))));
    }

    #[test]
    fn chat_events_reach_only_subscribed_connections() {
        let scope = ClientScope::parse("TS1001", Some("5"));
        let subscribed = RealtimeEvent::NewMessage {
            chat_id: 5,
            message: chat_message("TS2001"),
        };
        let other = RealtimeEvent::NewMessage {
            chat_id: 6,
            message: chat_message("TS2001"),
        };
        assert!(scope.wants(&subscribed));
        assert!(!scope.wants(&other));
    }

    #[test]
    fn hub_delivers_published_notifications() {
        tokio_test::block_on(async {
            let hub = EventHub::new(8);
            let mut rx = hub.subscribe();
            hub.publish_notifications(&[notification("TS1001")]);

            match rx.recv().await.unwrap() {
                RealtimeEvent::Notification(n) => assert_eq!(n.company_id, "TS1001"),
                other => panic!("unexpected event: {other:?}"),
            }
        });
    }

    #[test]
    fn hub_survives_publishing_with_no_subscribers() {
        let hub = EventHub::new(8);
        hub.publish_message(3, &chat_message("TS1001"));
    }

    #[test]
    fn events_serialize_with_tagged_shape() {
        let event = RealtimeEvent::NewMessage {
            chat_id: 4,
            message: chat_message("TS1001"),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "new_message");
        assert_eq!(value["data"]["chat_id"], 4);
    }
}
