//! Direct messages, study-session requests and group chat records.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a study-session request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Accepted => "accepted",
            SessionStatus::Declined => "declined",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SessionStatus::Pending),
            "accepted" => Some(SessionStatus::Accepted),
            "declined" => Some(SessionStatus::Declined),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }

    /// Whether the session took place or is going to.
    pub fn is_agreed(&self) -> bool {
        matches!(self, SessionStatus::Accepted | SessionStatus::Completed)
    }
}

/// What a student proposes when asking for a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProposal {
    pub title: String,
    pub proposed_time: String,
    pub place: String,
    /// Credits the helper earns on completion.
    #[serde(default)]
    pub credits: i64,
}

/// Structured payload carried by a session-request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub title: String,
    pub proposed_time: String,
    pub place: String,
    pub credits: i64,
    pub status: SessionStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<SessionProposal> for SessionRequest {
    fn from(proposal: SessionProposal) -> Self {
        Self {
            title: proposal.title,
            proposed_time: proposal.proposed_time,
            place: proposal.place,
            credits: proposal.credits,
            status: SessionStatus::Pending,
            completed_at: None,
        }
    }
}

/// A direct message between two matched users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub session: Option<SessionRequest>,
}

impl Message {
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other participant, seen from `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.sender_id == user_id {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

/// Latest message of one conversation, for the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxEntry {
    pub peer_id: String,
    pub last_message: Message,
}

/// Group one user's messages into conversations, newest first.
pub fn build_inbox(user_id: &str, messages: &[Message]) -> Vec<InboxEntry> {
    let mut latest: HashMap<&str, &Message> = HashMap::new();

    for message in messages.iter().filter(|m| m.involves(user_id)) {
        let peer = message.counterpart(user_id);
        let newer = latest
            .get(peer)
            .map_or(true, |current| message.created_at >= current.created_at);
        if newer {
            latest.insert(peer, message);
        }
    }

    let mut inbox: Vec<InboxEntry> = latest
        .into_iter()
        .map(|(peer, message)| InboxEntry {
            peer_id: peer.to_string(),
            last_message: message.clone(),
        })
        .collect();

    inbox.sort_by(|a, b| {
        b.last_message
            .created_at
            .cmp(&a.last_message.created_at)
            .then_with(|| a.peer_id.cmp(&b.peer_id))
    });
    inbox
}

/// Kind of a group chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMessageKind {
    /// Written by a member.
    Message,
    /// Join/leave notices.
    System,
}

impl GroupMessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMessageKind::Message => "message",
            GroupMessageKind::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message" => Some(GroupMessageKind::Message),
            "system" => Some(GroupMessageKind::System),
            _ => None,
        }
    }
}

/// A message in a study group's chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub id: String,
    pub group_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub kind: GroupMessageKind,
    pub created_at: DateTime<Utc>,
}

/// A member currently typing in a group chat. Keyed by `(group_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatus {
    pub group_id: String,
    pub user_id: String,
    pub user_name: String,
    pub updated_at: DateTime<Utc>,
}

impl TypingStatus {
    /// Whether the status is older than `ttl` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.updated_at > ttl
    }
}

/// Weekly session count of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub sessions: u32,
}

/// Sunday 00:00 UTC of the week containing `now`.
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_sunday = i64::from(now.weekday().num_days_from_sunday());
    let day = now.date_naive() - Duration::days(days_since_sunday);
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Count agreed sessions per participant and keep the top `limit`.
pub fn leaderboard(messages: &[Message], since: DateTime<Utc>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut counts: HashMap<&str, u32> = HashMap::new();

    let agreed = messages.iter().filter(|m| {
        m.created_at >= since && m.session.as_ref().is_some_and(|s| s.status.is_agreed())
    });
    for message in agreed {
        for user in [message.sender_id.as_str(), message.receiver_id.as_str()] {
            *counts.entry(user).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(user_id, sessions)| LeaderboardEntry {
            user_id: user_id.to_string(),
            sessions,
        })
        .collect();
    entries.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.user_id.cmp(&b.user_id)));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(id: &str, from: &str, to: &str, at: DateTime<Utc>) -> Message {
        Message {
            id: id.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            text: format!("text {id}"),
            created_at: at,
            session: None,
        }
    }

    fn session(status: SessionStatus) -> Option<SessionRequest> {
        Some(SessionRequest {
            title: "Calculus".to_string(),
            proposed_time: "Mon 10:00".to_string(),
            place: "Library".to_string(),
            credits: 5,
            status,
            completed_at: None,
        })
    }

    #[test]
    fn test_start_of_week_is_sunday_midnight() {
        // 2024-05-15 was a Wednesday
        let wednesday = Utc.with_ymd_and_hms(2024, 5, 15, 13, 45, 0).unwrap();
        let start = start_of_week(wednesday);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap());

        let sunday = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
        assert_eq!(start_of_week(sunday), Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_inbox_keeps_latest_per_peer() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let messages = vec![
            message("1", "me", "bob", t0),
            message("2", "bob", "me", t0 + Duration::minutes(5)),
            message("3", "me", "cat", t0 + Duration::minutes(1)),
            message("4", "bob", "cat", t0 + Duration::minutes(9)),
        ];

        let inbox = build_inbox("me", &messages);
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].peer_id, "bob");
        assert_eq!(inbox[0].last_message.id, "2");
        assert_eq!(inbox[1].peer_id, "cat");
    }

    #[test]
    fn test_leaderboard_counts_both_participants() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 13, 10, 0, 0).unwrap();
        let since = start_of_week(t0);

        let mut accepted = message("1", "amy", "bob", t0);
        accepted.session = session(SessionStatus::Accepted);
        let mut completed = message("2", "cat", "bob", t0);
        completed.session = session(SessionStatus::Completed);
        let mut pending = message("3", "amy", "cat", t0);
        pending.session = session(SessionStatus::Pending);
        let mut last_week = message("4", "amy", "cat", since - Duration::hours(1));
        last_week.session = session(SessionStatus::Accepted);
        let plain = message("5", "amy", "bob", t0);

        let board = leaderboard(&[accepted, completed, pending, last_week, plain], since, 10);
        assert_eq!(
            board,
            vec![
                LeaderboardEntry { user_id: "bob".to_string(), sessions: 2 },
                LeaderboardEntry { user_id: "amy".to_string(), sessions: 1 },
                LeaderboardEntry { user_id: "cat".to_string(), sessions: 1 },
            ]
        );

        assert_eq!(leaderboard(&[], since, 5), vec![]);
    }

    #[test]
    fn test_typing_staleness() {
        let now = Utc::now();
        let status = TypingStatus {
            group_id: "g".to_string(),
            user_id: "u".to_string(),
            user_name: "U".to_string(),
            updated_at: now - Duration::seconds(4),
        };
        assert!(status.is_stale(now, Duration::seconds(3)));
        assert!(!status.is_stale(now, Duration::seconds(5)));
    }
}
