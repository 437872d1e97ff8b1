use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single message inside a conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A conversation between participants, optionally tied to a listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: i64,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
    #[serde(rename = "unreadCount", default)]
    pub unread_count: u64,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Conversation {
    /// A conversation is unread while it has not been marked read and the
    /// backend still reports unread messages in it.
    pub fn is_unread(&self) -> bool {
        !self.is_read && self.unread_count > 0
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
        self.unread_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_unread_state() {
        let mut conversation: Conversation = serde_json::from_value(json!({
            "id": 3,
            "unreadCount": 2,
            "participants": [{"id": 1, "username": "adam"}]
        }))
        .unwrap();

        assert!(conversation.is_unread());
        assert!(conversation.messages.is_empty());
        assert!(conversation.fields.contains_key("participants"));

        conversation.mark_read();
        assert!(!conversation.is_unread());
        assert_eq!(conversation.unread_count, 0);
    }
}
