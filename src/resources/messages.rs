use std::sync::{PoisonError, RwLock};

use serde_json::json;

use super::base::{require_token, write, LoadStatus, ResourceError, StatusCell};
use crate::api::{endpoints, ApiClient};
use crate::models::{Conversation, Message};
use crate::session::SessionHandle;

const FETCH_ALL_FAILED: &str = "Failed to load conversations";
const FETCH_ONE_FAILED: &str = "Failed to load the conversation";
const SEND_FAILED: &str = "Failed to send the message";
const MARK_READ_FAILED: &str = "Failed to mark the conversation as read";

#[derive(Debug, Default)]
struct Inbox {
    conversations: Vec<Conversation>,
    current: Option<Conversation>,
}

/// Conversations of the logged-in user and the one currently open.
pub struct MessagesStore {
    api: ApiClient,
    session: SessionHandle,
    inbox: RwLock<Inbox>,
    status: StatusCell,
}

impl MessagesStore {
    pub fn new(api: ApiClient, session: SessionHandle) -> Self {
        MessagesStore {
            api,
            session,
            inbox: RwLock::default(),
            status: StatusCell::default(),
        }
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.with_inbox(|inbox| inbox.conversations.clone())
    }

    pub fn current_conversation(&self) -> Option<Conversation> {
        self.with_inbox(|inbox| inbox.current.clone())
    }

    /// Number of conversations that still hold unread messages.
    pub fn unread_count(&self) -> usize {
        self.with_inbox(|inbox| {
            inbox
                .conversations
                .iter()
                .filter(|c| c.is_unread())
                .count()
        })
    }

    pub fn status(&self) -> LoadStatus {
        self.status.get()
    }

    fn with_inbox<T>(&self, f: impl FnOnce(&Inbox) -> T) -> T {
        f(&self
            .inbox
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    pub async fn fetch_conversations(&self) -> Result<Vec<Conversation>, ResourceError> {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let conversations: Vec<Conversation> = self
                    .api
                    .get_json(endpoints::CONVERSATIONS)
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_ALL_FAILED))?;
                write(&self.inbox, |i| i.conversations = conversations.clone());
                Ok(conversations)
            })
            .await
    }

    /// Loads a conversation with its messages and makes it the current one.
    pub async fn fetch_conversation(&self, id: i64) -> Result<Conversation, ResourceError> {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let conversation: Conversation = self
                    .api
                    .get_json(&endpoints::conversation(id))
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_ONE_FAILED))?;
                write(&self.inbox, |i| i.current = Some(conversation.clone()));
                Ok(conversation)
            })
            .await
    }

    /// Sends a message. It is appended to the current conversation when that
    /// is the one it was sent to.
    pub async fn send_message(
        &self,
        conversation_id: i64,
        text: &str,
    ) -> Result<Message, ResourceError> {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let message: Message = self
                    .api
                    .post_json(
                        &endpoints::conversation_messages(conversation_id),
                        &json!({ "text": text }),
                    )
                    .await
                    .map_err(|e| ResourceError::api(e, SEND_FAILED))?;
                write(&self.inbox, |i| {
                    if let Some(current) = i.current.as_mut() {
                        if current.id == conversation_id {
                            current.messages.push(message.clone());
                        }
                    }
                });
                Ok(message)
            })
            .await
    }

    /// Marks a conversation read on the server and locally. Does not touch
    /// the loading flag.
    pub async fn mark_as_read(&self, conversation_id: i64) -> Result<(), ResourceError> {
        let result = match require_token(&self.session) {
            Ok(()) => self
                .api
                .post_empty(&endpoints::conversation_mark_as_read(conversation_id))
                .await
                .map_err(|e| ResourceError::api(e, MARK_READ_FAILED)),
            Err(e) => Err(e),
        };
        self.status.record(result)?;

        write(&self.inbox, |i| {
            i.conversations
                .iter_mut()
                .chain(i.current.iter_mut())
                .filter(|c| c.id == conversation_id)
                .for_each(Conversation::mark_read);
        });
        Ok(())
    }
}
