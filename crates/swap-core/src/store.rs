//! The storage seam.
//!
//! Every persistence need of the service goes through [`SwapStore`]. The
//! in-memory implementation lives in [`crate::memory`]; the SQLite one in
//! the `database` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::credit::CreditTransaction;
use crate::error::Result;
use crate::events::ChangeFeed;
use crate::group::{Group, Invitation, InvitationStatus};
use crate::messaging::{GroupMessage, Message, SessionRequest, SessionStatus, TypingStatus};
use crate::moderation::{Feedback, Report};
use crate::profile::Profile;
use crate::swipe::{Match, Swipe};

/// Document storage used by [`crate::SkillSwap`].
///
/// Implementations only persist; every precondition that is not about a
/// single write belongs to the service.
#[async_trait]
pub trait SwapStore: Send + Sync {
    // Profiles

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>>;

    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Insert or overwrite a profile.
    ///
    /// On overwrite the stored `credits` and `created_at` are kept: the
    /// balance belongs to [`SwapStore::apply_credit_transaction`].
    async fn upsert_profile(&self, profile: &Profile) -> Result<()>;

    /// Hard-delete a profile. Returns false if there was none.
    async fn delete_profile(&self, id: &str) -> Result<bool>;

    // Swipes and matches

    /// Write a swipe, overwriting any earlier swipe with the same key.
    async fn put_swipe(&self, swipe: &Swipe) -> Result<()>;

    async fn get_swipe(&self, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>>;

    async fn list_swipes_by(&self, swiper_id: &str) -> Result<Vec<Swipe>>;

    /// Create a match unless one with the same id exists.
    ///
    /// Returns true if this call created it.
    async fn insert_match(&self, record: &Match) -> Result<bool>;

    async fn get_match(&self, id: &str) -> Result<Option<Match>>;

    async fn list_matches_for(&self, user_id: &str) -> Result<Vec<Match>>;

    async fn set_match_last_message(&self, id: &str, preview: &str) -> Result<()>;

    // Direct messages

    async fn insert_message(&self, message: &Message) -> Result<()>;

    async fn get_message(&self, id: &str) -> Result<Option<Message>>;

    /// Replace the session payload of a message if its stored status is
    /// still `expected`. Returns false when another write got there first.
    async fn update_session(
        &self,
        message_id: &str,
        expected: SessionStatus,
        session: &SessionRequest,
    ) -> Result<bool>;

    /// Messages between two users, oldest first.
    async fn list_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>>;

    /// Every message a user sent or received, oldest first.
    async fn list_messages_for(&self, user_id: &str) -> Result<Vec<Message>>;

    /// Messages carrying a session payload created at or after `since`.
    async fn list_session_messages_since(&self, since: DateTime<Utc>) -> Result<Vec<Message>>;

    // Groups

    async fn insert_group(&self, group: &Group) -> Result<()>;

    async fn get_group(&self, id: &str) -> Result<Option<Group>>;

    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Add a member with set-union semantics. Returns false if already a member.
    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<bool>;

    /// Returns false if the user was not a member.
    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> Result<bool>;

    async fn delete_group(&self, id: &str) -> Result<bool>;

    async fn insert_group_message(&self, message: &GroupMessage) -> Result<()>;

    /// A group's chat, oldest first.
    async fn list_group_messages(&self, group_id: &str) -> Result<Vec<GroupMessage>>;

    // Invitations

    async fn insert_invitation(&self, invitation: &Invitation) -> Result<()>;

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>>;

    async fn list_pending_invitations(&self, invitee_id: &str) -> Result<Vec<Invitation>>;

    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<()>;

    async fn delete_invitation(&self, id: &str) -> Result<bool>;

    // Credits

    /// Apply a ledger entry atomically.
    ///
    /// For `Spend`, the payer's balance must cover the amount
    /// ([`crate::SwapError::InsufficientCredits`] otherwise) and is
    /// debited. The recipient is credited in both kinds and the entry is
    /// appended. Either everything is written or nothing is.
    async fn apply_credit_transaction(&self, transaction: &CreditTransaction) -> Result<()>;

    /// Ledger entries where the user is either party, newest first.
    async fn list_transactions_for(&self, user_id: &str) -> Result<Vec<CreditTransaction>>;

    // Feedback and reports

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()>;

    async fn list_feedback_for(&self, user_id: &str) -> Result<Vec<Feedback>>;

    async fn insert_report(&self, report: &Report) -> Result<()>;

    // Typing status

    /// Insert or refresh a typing status.
    async fn upsert_typing(&self, status: &TypingStatus) -> Result<()>;

    async fn delete_typing(&self, group_id: &str, user_id: &str) -> Result<bool>;

    async fn list_typing(&self, group_id: &str) -> Result<Vec<TypingStatus>>;

    /// Change feed for real-time group subscriptions.
    fn feed(&self) -> &ChangeFeed;
}
