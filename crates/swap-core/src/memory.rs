//! In-memory [`SwapStore`] used by tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::credit::{CreditTransaction, TransactionKind};
use crate::error::{Result, SwapError};
use crate::events::ChangeFeed;
use crate::group::{Group, Invitation, InvitationStatus};
use crate::messaging::{GroupMessage, Message, SessionRequest, SessionStatus, TypingStatus};
use crate::moderation::{Feedback, Report};
use crate::profile::Profile;
use crate::store::SwapStore;
use crate::swipe::{Match, Swipe};

type PairKey = (String, String);

#[derive(Debug, Default)]
struct Collections {
    profiles: HashMap<String, Profile>,
    swipes: HashMap<PairKey, Swipe>,
    matches: HashMap<String, Match>,
    messages: Vec<Message>,
    groups: HashMap<String, Group>,
    group_messages: Vec<GroupMessage>,
    invitations: HashMap<String, Invitation>,
    transactions: Vec<CreditTransaction>,
    feedback: Vec<Feedback>,
    reports: Vec<Report>,
    typing: HashMap<PairKey, TypingStatus>,
}

/// A [`SwapStore`] holding everything in process memory.
///
/// One lock guards all collections, so every call is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All submitted reports, oldest first.
    pub async fn reports(&self) -> Vec<Report> {
        self.inner.read().await.reports.clone()
    }
}

fn pair(a: &str, b: &str) -> PairKey {
    (a.to_string(), b.to_string())
}

#[async_trait]
impl SwapStore for MemoryStore {
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        Ok(self.inner.read().await.profiles.get(id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self.inner.read().await.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        let mut inner = self.inner.write().await;
        let mut stored = profile.clone();
        if let Some(existing) = inner.profiles.get(&profile.id) {
            stored.credits = existing.credits;
            stored.created_at = existing.created_at;
        }
        inner.profiles.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn delete_profile(&self, id: &str) -> Result<bool> {
        Ok(self.inner.write().await.profiles.remove(id).is_some())
    }

    async fn put_swipe(&self, swipe: &Swipe) -> Result<()> {
        self.inner
            .write()
            .await
            .swipes
            .insert(pair(&swipe.swiper_id, &swipe.swiped_id), swipe.clone());
        Ok(())
    }

    async fn get_swipe(&self, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>> {
        Ok(self.inner.read().await.swipes.get(&pair(swiper_id, swiped_id)).cloned())
    }

    async fn list_swipes_by(&self, swiper_id: &str) -> Result<Vec<Swipe>> {
        let inner = self.inner.read().await;
        let mut swipes: Vec<Swipe> = inner
            .swipes
            .values()
            .filter(|s| s.swiper_id == swiper_id)
            .cloned()
            .collect();
        swipes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.swiped_id.cmp(&b.swiped_id)));
        Ok(swipes)
    }

    async fn insert_match(&self, record: &Match) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.matches.contains_key(&record.id) {
            return Ok(false);
        }
        inner.matches.insert(record.id.clone(), record.clone());
        Ok(true)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>> {
        Ok(self.inner.read().await.matches.get(id).cloned())
    }

    async fn list_matches_for(&self, user_id: &str) -> Result<Vec<Match>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Match> = inner
            .matches
            .values()
            .filter(|m| m.includes(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn set_match_last_message(&self, id: &str, preview: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .matches
            .get_mut(id)
            .ok_or_else(|| SwapError::not_found("Match", id))?;
        record.last_message = Some(preview.to_string());
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<()> {
        self.inner.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn update_session(
        &self,
        message_id: &str,
        expected: SessionStatus,
        session: &SessionRequest,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let message = inner
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| SwapError::not_found("Message", message_id))?;

        let current = message.session.as_ref().map(|s| s.status);
        if current != Some(expected) {
            return Ok(false);
        }
        message.session = Some(session.clone());
        Ok(true)
    }

    async fn list_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect();
        messages.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        Ok(messages)
    }

    async fn list_messages_for(&self, user_id: &str) -> Result<Vec<Message>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        messages.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        Ok(messages)
    }

    async fn list_session_messages_since(&self, since: DateTime<Utc>) -> Result<Vec<Message>> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.session.is_some() && m.created_at >= since)
            .cloned()
            .collect())
    }

    async fn insert_group(&self, group: &Group) -> Result<()> {
        self.inner.write().await.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.inner.read().await.groups.get(id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self.inner.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let group = inner
            .groups
            .get_mut(group_id)
            .ok_or_else(|| SwapError::not_found("Group", group_id))?;
        if group.is_member(user_id) {
            return Ok(false);
        }
        group.members.push(user_id.to_string());
        Ok(true)
    }

    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let group = inner
            .groups
            .get_mut(group_id)
            .ok_or_else(|| SwapError::not_found("Group", group_id))?;
        let before = group.members.len();
        group.members.retain(|id| id != user_id);
        Ok(group.members.len() != before)
    }

    async fn delete_group(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.groups.remove(id).is_some();
        if removed {
            inner.group_messages.retain(|m| m.group_id != id);
            inner.invitations.retain(|_, inv| inv.group_id != id);
            inner.typing.retain(|(group_id, _), _| group_id != id);
        }
        Ok(removed)
    }

    async fn insert_group_message(&self, message: &GroupMessage) -> Result<()> {
        self.inner.write().await.group_messages.push(message.clone());
        Ok(())
    }

    async fn list_group_messages(&self, group_id: &str) -> Result<Vec<GroupMessage>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<GroupMessage> = inner
            .group_messages
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> Result<()> {
        self.inner
            .write()
            .await
            .invitations
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>> {
        Ok(self.inner.read().await.invitations.get(id).cloned())
    }

    async fn list_pending_invitations(&self, invitee_id: &str) -> Result<Vec<Invitation>> {
        let inner = self.inner.read().await;
        let mut invitations: Vec<Invitation> = inner
            .invitations
            .values()
            .filter(|inv| inv.invitee_id == invitee_id && inv.status == InvitationStatus::Pending)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(invitations)
    }

    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let invitation = inner
            .invitations
            .get_mut(id)
            .ok_or_else(|| SwapError::not_found("Invitation", id))?;
        invitation.status = status;
        Ok(())
    }

    async fn delete_invitation(&self, id: &str) -> Result<bool> {
        Ok(self.inner.write().await.invitations.remove(id).is_some())
    }

    async fn apply_credit_transaction(&self, transaction: &CreditTransaction) -> Result<()> {
        let mut inner = self.inner.write().await;

        let credited = inner
            .profiles
            .get(&transaction.to_user_id)
            .ok_or_else(|| SwapError::not_found("User", &transaction.to_user_id))?
            .credits
            .checked_add(transaction.amount)
            .ok_or_else(|| {
                SwapError::Invalid(format!("balance of {} would overflow", transaction.to_user_id))
            })?;

        if transaction.kind == TransactionKind::Spend {
            let payer = inner
                .profiles
                .get_mut(&transaction.from_user_id)
                .ok_or_else(|| SwapError::not_found("User", &transaction.from_user_id))?;
            if payer.credits < transaction.amount {
                return Err(SwapError::InsufficientCredits {
                    user_id: payer.id.clone(),
                    balance: payer.credits,
                    requested: transaction.amount,
                });
            }
            payer.credits -= transaction.amount;
        }

        if let Some(recipient) = inner.profiles.get_mut(&transaction.to_user_id) {
            recipient.credits = credited;
        }
        inner.transactions.push(transaction.clone());
        Ok(())
    }

    async fn list_transactions_for(&self, user_id: &str) -> Result<Vec<CreditTransaction>> {
        let inner = self.inner.read().await;
        // Newest first; entries are appended in time order.
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter(|t| t.from_user_id == user_id || t.to_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()> {
        self.inner.write().await.feedback.push(feedback.clone());
        Ok(())
    }

    async fn list_feedback_for(&self, user_id: &str) -> Result<Vec<Feedback>> {
        let inner = self.inner.read().await;
        Ok(inner
            .feedback
            .iter()
            .rev()
            .filter(|f| f.to_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_report(&self, report: &Report) -> Result<()> {
        self.inner.write().await.reports.push(report.clone());
        Ok(())
    }

    async fn upsert_typing(&self, status: &TypingStatus) -> Result<()> {
        self.inner
            .write()
            .await
            .typing
            .insert(pair(&status.group_id, &status.user_id), status.clone());
        Ok(())
    }

    async fn delete_typing(&self, group_id: &str, user_id: &str) -> Result<bool> {
        Ok(self.inner.write().await.typing.remove(&pair(group_id, user_id)).is_some())
    }

    async fn list_typing(&self, group_id: &str) -> Result<Vec<TypingStatus>> {
        let inner = self.inner.read().await;
        let mut statuses: Vec<TypingStatus> = inner
            .typing
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(statuses)
    }

    fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileDraft;

    fn profile(id: &str, credits: i64) -> Profile {
        let mut profile = Profile::new(id, &format!("{id}@uni.edu"), ProfileDraft::default(), Utc::now());
        profile.credits = credits;
        profile
    }

    fn spend(from: &str, to: &str, amount: i64) -> CreditTransaction {
        CreditTransaction {
            id: format!("{from}-{to}-{amount}"),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            amount,
            kind: TransactionKind::Spend,
            reason: "session".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_balance() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("amy", 10)).await.unwrap();

        let mut edited = profile("amy", 0);
        edited.bio = "new bio".to_string();
        store.upsert_profile(&edited).await.unwrap();

        let stored = store.get_profile("amy").await.unwrap().unwrap();
        assert_eq!(stored.credits, 10);
        assert_eq!(stored.bio, "new bio");
    }

    #[tokio::test]
    async fn test_failed_spend_changes_nothing() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("amy", 3)).await.unwrap();
        store.upsert_profile(&profile("bob", 0)).await.unwrap();

        let err = store.apply_credit_transaction(&spend("amy", "bob", 5)).await.unwrap_err();
        assert!(matches!(err, SwapError::InsufficientCredits { balance: 3, requested: 5, .. }));

        assert_eq!(store.get_profile("amy").await.unwrap().unwrap().credits, 3);
        assert_eq!(store.get_profile("bob").await.unwrap().unwrap().credits, 0);
        assert!(store.list_transactions_for("amy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spend_to_missing_recipient_changes_nothing() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("amy", 10)).await.unwrap();

        let err = store.apply_credit_transaction(&spend("amy", "ghost", 5)).await.unwrap_err();
        assert!(matches!(err, SwapError::NotFound { .. }));
        assert_eq!(store.get_profile("amy").await.unwrap().unwrap().credits, 10);
    }

    #[tokio::test]
    async fn test_overflowing_credit_changes_nothing() {
        let store = MemoryStore::new();
        store.upsert_profile(&profile("amy", 10)).await.unwrap();
        store.upsert_profile(&profile("bob", i64::MAX)).await.unwrap();

        let err = store.apply_credit_transaction(&spend("amy", "bob", 1)).await.unwrap_err();
        assert!(matches!(err, SwapError::Invalid(_)));
        assert_eq!(store.get_profile("amy").await.unwrap().unwrap().credits, 10);
        assert_eq!(store.get_profile("bob").await.unwrap().unwrap().credits, i64::MAX);
        assert!(store.list_transactions_for("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_match_is_idempotent() {
        let store = MemoryStore::new();
        let record = Match::new("amy", "bob", Utc::now());
        assert!(store.insert_match(&record).await.unwrap());
        assert!(!store.insert_match(&record).await.unwrap());
        assert_eq!(store.list_matches_for("bob").await.unwrap().len(), 1);
    }
}
