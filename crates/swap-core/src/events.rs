//! Push notifications for group chat.
//!
//! Stores own a [`ChangeFeed`]; the service publishes a [`GroupEvent`]
//! after every successful group-chat or typing write, and clients hold a
//! [`GroupSubscription`] for the group they are looking at.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::messaging::GroupMessage;

/// Default number of buffered events per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// A change in a group's chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GroupEvent {
    /// A member or system message was appended.
    MessagePosted { message: GroupMessage },
    /// A member started or stopped typing.
    TypingChanged {
        group_id: String,
        user_id: String,
        typing: bool,
    },
    /// The group was deleted by its creator.
    GroupDeleted { group_id: String },
}

impl GroupEvent {
    pub fn group_id(&self) -> &str {
        match self {
            GroupEvent::MessagePosted { message } => &message.group_id,
            GroupEvent::TypingChanged { group_id, .. } => group_id,
            GroupEvent::GroupDeleted { group_id } => group_id,
        }
    }

    /// Short name, used as the SSE event type.
    pub fn name(&self) -> &'static str {
        match self {
            GroupEvent::MessagePosted { .. } => "message_posted",
            GroupEvent::TypingChanged { .. } => "typing_changed",
            GroupEvent::GroupDeleted { .. } => "group_deleted",
        }
    }
}

/// Fan-out of group events to live subscribers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<GroupEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns how many subscribers were listening.
    ///
    /// Events published while nobody listens are dropped.
    pub fn publish(&self, event: GroupEvent) -> usize {
        let group_id = event.group_id().to_string();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(group_id = %group_id, receivers, "Published group event");
                receivers
            }
            Err(_) => 0,
        }
    }

    /// Subscribe to one group's events.
    pub fn subscribe(&self, group_id: &str) -> GroupSubscription {
        GroupSubscription {
            group_id: group_id.to_string(),
            receiver: self.sender.subscribe(),
        }
    }
}

/// A live stream of one group's events. Dropping it unsubscribes.
#[derive(Debug)]
pub struct GroupSubscription {
    group_id: String,
    receiver: broadcast::Receiver<GroupEvent>,
}

impl GroupSubscription {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Wait for the next event of this group.
    ///
    /// A lagging subscriber skips what it missed and keeps going. Returns
    /// `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<GroupEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.group_id() == self.group_id => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(group_id = %self.group_id, skipped, "Group subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::GroupMessageKind;
    use chrono::{TimeZone, Utc};

    fn posted(group_id: &str, text: &str) -> GroupEvent {
        GroupEvent::MessagePosted {
            message: GroupMessage {
                id: format!("{group_id}-{text}"),
                group_id: group_id.to_string(),
                sender_id: "amy".to_string(),
                sender_name: "Amy".to_string(),
                text: text.to_string(),
                kind: GroupMessageKind::Message,
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            },
        }
    }

    #[tokio::test]
    async fn test_subscription_filters_by_group() {
        let feed = ChangeFeed::default();
        let mut sub = feed.subscribe("g1");

        assert_eq!(feed.publish(posted("g2", "other")), 1);
        feed.publish(posted("g1", "hello"));

        let event = sub.next().await.unwrap();
        assert_eq!(event, posted("g1", "hello"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let feed = ChangeFeed::default();
        assert_eq!(feed.publish(posted("g1", "lost")), 0);

        let mut sub = feed.subscribe("g1");
        feed.publish(posted("g1", "seen"));
        assert_eq!(sub.next().await, Some(posted("g1", "seen")));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let feed = ChangeFeed::default();
        let sub = feed.subscribe("g1");
        assert_eq!(feed.publish(posted("g1", "heard")), 1);
        drop(sub);
        assert_eq!(feed.publish(posted("g1", "unheard")), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_recovers() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe("g1");

        for i in 0..5 {
            feed.publish(posted("g1", &i.to_string()));
        }

        // The oldest events were overwritten; the newest are still delivered.
        assert_eq!(sub.next().await, Some(posted("g1", "3")));
        assert_eq!(sub.next().await, Some(posted("g1", "4")));
    }
}
