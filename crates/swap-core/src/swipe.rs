//! Swipe decisions and mutual matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Accept,
    Reject,
}

impl Direction {
    /// Stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Accept => "accept",
            Direction::Reject => "reject",
        }
    }

    /// Parse a stored or user-supplied direction.
    ///
    /// Older clients stored card-swipe directions, where "right" meant accept.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "accept" | "right" | "like" => Some(Direction::Accept),
            "reject" | "left" | "pass" => Some(Direction::Reject),
            _ => None,
        }
    }
}

/// Skill lists of one party at the time of a swipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSnapshot {
    pub offered: Vec<String>,
    pub needed: Vec<String>,
}

impl SkillSnapshot {
    pub fn of(profile: &Profile) -> Self {
        Self {
            offered: profile.skills_offered.clone(),
            needed: profile.skills_needed.clone(),
        }
    }
}

/// One user's decision about another. Keyed by `(swiper_id, swiped_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swipe {
    pub swiper_id: String,
    pub swiped_id: String,
    pub direction: Direction,
    pub swiper_skills: SkillSnapshot,
    pub swiped_skills: SkillSnapshot,
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn new(swiper: &Profile, swiped: &Profile, direction: Direction, now: DateTime<Utc>) -> Self {
        Self {
            swiper_id: swiper.id.clone(),
            swiped_id: swiped.id.clone(),
            direction,
            swiper_skills: SkillSnapshot::of(swiper),
            swiped_skills: SkillSnapshot::of(swiped),
            created_at: now,
        }
    }

    /// Document key of this swipe.
    pub fn key(&self) -> String {
        swipe_key(&self.swiper_id, &self.swiped_id)
    }

    pub fn is_accept(&self) -> bool {
        self.direction == Direction::Accept
    }
}

/// A mutual acceptance between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Sorted pair key, see [`match_key`].
    pub id: String,
    /// Participant ids in sorted order.
    pub users: [String; 2],
    pub created_at: DateTime<Utc>,
    /// Preview of the latest direct message.
    pub last_message: Option<String>,
}

impl Match {
    pub fn new(a: &str, b: &str, now: DateTime<Utc>) -> Self {
        let users = sorted_pair(a, b);
        Self {
            id: match_key(a, b),
            users,
            created_at: now,
            last_message: None,
        }
    }

    pub fn includes(&self, user_id: &str) -> bool {
        self.users.iter().any(|id| id == user_id)
    }

    /// The participant that is not `user_id`.
    pub fn other(&self, user_id: &str) -> &str {
        if self.users[0] == user_id {
            &self.users[1]
        } else {
            &self.users[0]
        }
    }
}

/// Result of recording a swipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwipeOutcome {
    /// The swipe was stored; no match (yet).
    Recorded,
    /// Both sides accepted.
    Matched { record: Match },
}

/// Key of the swipe `swiper -> swiped`.
pub fn swipe_key(swiper_id: &str, swiped_id: &str) -> String {
    format!("{}_{}", swiper_id, swiped_id)
}

/// Order-independent key of the match between two users.
pub fn match_key(a: &str, b: &str) -> String {
    let [first, second] = sorted_pair(a, b);
    format!("{}_{}", first, second)
}

fn sorted_pair(a: &str, b: &str) -> [String; 2] {
    if a <= b {
        [a.to_string(), b.to_string()]
    } else {
        [b.to_string(), a.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_key_is_order_independent() {
        assert_eq!(match_key("alice", "bob"), "alice_bob");
        assert_eq!(match_key("bob", "alice"), "alice_bob");
    }

    #[test]
    fn test_match_participants() {
        let record = Match::new("zed", "amy", Utc::now());
        assert_eq!(record.users, ["amy".to_string(), "zed".to_string()]);
        assert!(record.includes("zed"));
        assert!(!record.includes("bob"));
        assert_eq!(record.other("amy"), "zed");
        assert_eq!(record.other("zed"), "amy");
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("accept"), Some(Direction::Accept));
        assert_eq!(Direction::parse("Right"), Some(Direction::Accept));
        assert_eq!(Direction::parse("left"), Some(Direction::Reject));
        assert_eq!(Direction::parse("maybe"), None);
    }

    #[test]
    fn test_swipe_key() {
        assert_eq!(swipe_key("a", "b"), "a_b");
    }
}
