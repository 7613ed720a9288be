//! Group chat, typing indicators and live subscriptions.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{new_id, now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::events::{GroupEvent, GroupSubscription};
use crate::messaging::{GroupMessage, GroupMessageKind, TypingStatus};
use crate::profile::Profile;
use crate::store::SwapStore;
use crate::validation::{self, MAX_MESSAGE_LENGTH};

impl<S: SwapStore> SkillSwap<S> {
    /// Post a member's message to a group chat.
    ///
    /// Posting also clears the sender's typing status.
    pub async fn post_group_message(&self, group_id: &str, sender_id: &str, text: &str) -> Result<GroupMessage> {
        let text = validation::require_text("message", text, MAX_MESSAGE_LENGTH)?;
        let group = self.require_group(group_id).await?;
        if !group.is_member(sender_id) {
            return Err(SwapError::Forbidden(
                "only members can post in a group".to_string(),
            ));
        }
        let sender = self.require_profile(sender_id).await?;

        self.clear_typing(group_id, sender_id).await?;
        self.post_as(group_id, &sender, text, GroupMessageKind::Message).await
    }

    /// A group's chat, oldest first.
    pub async fn group_messages(&self, group_id: &str) -> Result<Vec<GroupMessage>> {
        self.require_group(group_id).await?;
        self.store.list_group_messages(group_id).await
    }

    /// Mark a member as typing, or refresh the mark.
    pub async fn set_typing(&self, group_id: &str, user_id: &str) -> Result<TypingStatus> {
        let group = self.require_group(group_id).await?;
        if !group.is_member(user_id) {
            return Err(SwapError::Forbidden(
                "only members can type in a group".to_string(),
            ));
        }
        let profile = self.require_profile(user_id).await?;

        let status = TypingStatus {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            user_name: profile.display_name().to_string(),
            updated_at: now(),
        };
        self.store.upsert_typing(&status).await?;
        self.store.feed().publish(GroupEvent::TypingChanged {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            typing: true,
        });
        Ok(status)
    }

    /// Remove a typing mark. Clearing an absent mark is a no-op.
    pub async fn clear_typing(&self, group_id: &str, user_id: &str) -> Result<()> {
        if self.store.delete_typing(group_id, user_id).await? {
            self.store.feed().publish(GroupEvent::TypingChanged {
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
                typing: false,
            });
        }
        Ok(())
    }

    /// Members typing in a group as seen by `viewer_id` at `now`.
    ///
    /// The viewer and marks older than the typing TTL are left out.
    pub async fn typing_users(&self, group_id: &str, viewer_id: &str, now: DateTime<Utc>) -> Result<Vec<TypingStatus>> {
        let ttl = chrono::Duration::from_std(self.settings.typing_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(3));

        let statuses = self.store.list_typing(group_id).await?;
        Ok(statuses
            .into_iter()
            .filter(|s| s.user_id != viewer_id && !s.is_stale(now, ttl))
            .collect())
    }

    /// Live events of one group. Dropping the subscription unsubscribes.
    pub async fn subscribe(&self, group_id: &str) -> Result<GroupSubscription> {
        self.require_group(group_id).await?;
        Ok(self.store.feed().subscribe(group_id))
    }

    /// Append a chat entry and notify subscribers.
    pub(super) async fn post_as(
        &self,
        group_id: &str,
        sender: &Profile,
        text: String,
        kind: GroupMessageKind,
    ) -> Result<GroupMessage> {
        let message = GroupMessage {
            id: new_id(),
            group_id: group_id.to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            text,
            kind,
            created_at: now(),
        };
        self.store.insert_group_message(&message).await?;
        debug!(group_id = %group_id, message_id = %message.id, kind = kind.as_str(), "Posted group message");

        self.store.feed().publish(GroupEvent::MessagePosted {
            message: message.clone(),
        });
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::testing::service_with;
    use super::super::ServiceSettings;
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_only_members_post() {
        let service = service_with(&["amy", "bob"]).await;
        let group = service.create_group("amy", "Go Study", "").await.unwrap();

        let err = service.post_group_message(&group.id, "bob", "hi").await.unwrap_err();
        assert!(matches!(err, SwapError::Forbidden(_)));

        let message = service.post_group_message(&group.id, "amy", " hi all ").await.unwrap();
        assert_eq!(message.text, "hi all");
        assert_eq!(message.kind, GroupMessageKind::Message);
        assert_eq!(message.sender_name, "amy@uni.edu");
    }

    #[tokio::test]
    async fn test_subscribers_receive_posts() {
        let service = service_with(&["amy"]).await;
        let group = service.create_group("amy", "Go Study", "").await.unwrap();
        let other = service.create_group("amy", "Other", "").await.unwrap();

        let mut events = service.subscribe(&group.id).await.unwrap();
        service.post_group_message(&other.id, "amy", "elsewhere").await.unwrap();
        let posted = service.post_group_message(&group.id, "amy", "hello").await.unwrap();

        assert_eq!(events.next().await, Some(GroupEvent::MessagePosted { message: posted }));
    }

    #[tokio::test]
    async fn test_typing_excludes_viewer_and_stale_marks() {
        let store = Arc::new(MemoryStore::new());
        let settings = ServiceSettings {
            typing_ttl: Duration::from_secs(3),
        };
        let service = SkillSwap::with_settings(Arc::clone(&store), settings);
        for id in ["amy", "bob"] {
            service
                .create_profile(id, &format!("{id}@uni.edu"), super::super::testing::draft(&["Go"], &["Rust"], &["Mornings"]))
                .await
                .unwrap();
        }
        let group = service.create_group("amy", "Go Study", "").await.unwrap();
        service.join_group(&group.id, "bob").await.unwrap();

        service.set_typing(&group.id, "amy").await.unwrap();
        service.set_typing(&group.id, "bob").await.unwrap();

        let now = Utc::now();
        let typing = service.typing_users(&group.id, "amy", now).await.unwrap();
        assert_eq!(typing.len(), 1);
        assert_eq!(typing[0].user_id, "bob");

        let later = now + chrono::Duration::seconds(10);
        assert!(service.typing_users(&group.id, "amy", later).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_posting_clears_typing() {
        let service = service_with(&["amy", "bob"]).await;
        let group = service.create_group("amy", "Go Study", "").await.unwrap();
        service.join_group(&group.id, "bob").await.unwrap();

        let mut events = service.subscribe(&group.id).await.unwrap();
        service.set_typing(&group.id, "amy").await.unwrap();
        service.post_group_message(&group.id, "amy", "done").await.unwrap();

        assert!(service.typing_users(&group.id, "bob", Utc::now()).await.unwrap().is_empty());

        let expected = |typing| GroupEvent::TypingChanged {
            group_id: group.id.clone(),
            user_id: "amy".to_string(),
            typing,
        };
        assert_eq!(events.next().await, Some(expected(true)));
        assert_eq!(events.next().await, Some(expected(false)));
        assert!(matches!(events.next().await, Some(GroupEvent::MessagePosted { .. })));
    }

    #[tokio::test]
    async fn test_non_member_cannot_type() {
        let service = service_with(&["amy", "bob"]).await;
        let group = service.create_group("amy", "Go Study", "").await.unwrap();
        let err = service.set_typing(&group.id, "bob").await.unwrap_err();
        assert!(matches!(err, SwapError::Forbidden(_)));
    }
}
