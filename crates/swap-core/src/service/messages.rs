//! Direct messages between matched users.

use tracing::info;

use super::{new_id, now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::messaging::{build_inbox, InboxEntry, Message, SessionRequest};
use crate::store::SwapStore;
use crate::swipe::match_key;
use crate::validation::{self, MAX_MESSAGE_LENGTH};

/// Longest match preview, in characters.
const PREVIEW_LENGTH: usize = 80;

impl<S: SwapStore> SkillSwap<S> {
    /// Send a text message to a matched user.
    pub async fn send_message(&self, sender_id: &str, receiver_id: &str, text: &str) -> Result<Message> {
        let text = validation::require_text("message", text, MAX_MESSAGE_LENGTH)?;
        self.deliver(sender_id, receiver_id, text, None).await
    }

    /// Messages between two users, oldest first.
    pub async fn conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        self.store.list_conversation(a, b).await
    }

    /// The latest message of each of the user's conversations.
    pub async fn inbox(&self, user_id: &str) -> Result<Vec<InboxEntry>> {
        let messages = self.store.list_messages_for(user_id).await?;
        Ok(build_inbox(user_id, &messages))
    }

    /// Write a direct message. Messaging is unlocked by a match.
    pub(super) async fn deliver(
        &self,
        sender_id: &str,
        receiver_id: &str,
        text: String,
        session: Option<SessionRequest>,
    ) -> Result<Message> {
        if sender_id == receiver_id {
            return Err(SwapError::Invalid("cannot message yourself".to_string()));
        }

        let key = match_key(sender_id, receiver_id);
        let matched = self
            .store
            .get_match(&key)
            .await?
            .is_some_and(|record| record.includes(sender_id) && record.includes(receiver_id));
        if !matched {
            return Err(SwapError::Forbidden(format!(
                "{} and {} have not matched",
                sender_id, receiver_id
            )));
        }

        let message = Message {
            id: new_id(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            text,
            created_at: now(),
            session,
        };
        self.store.insert_message(&message).await?;
        self.store.set_match_last_message(&key, &preview(&message.text)).await?;

        info!(
            message_id = %message.id,
            sender = %sender_id,
            receiver = %receiver_id,
            session = message.session.is_some(),
            "Sent message"
        );
        Ok(message)
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LENGTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_LENGTH - 1).collect();
    format!("{}…", cut)
}
