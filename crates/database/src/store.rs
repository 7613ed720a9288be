//! [`SwapStore`] over SQLite.

use chrono::{DateTime, Utc};
use swap_core::{
    async_trait, ChangeFeed, CreditTransaction, Feedback, Group, GroupMessage, Invitation,
    InvitationStatus, Match, Message, Profile, Report, SessionRequest, SessionStatus, SwapStore, Swipe,
    TypingStatus,
};

use crate::{credit, group, message, moderation, profile, swipe, typing, Database};

type Result<T> = swap_core::Result<T>;

#[async_trait]
impl SwapStore for Database {
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        Ok(profile::get_profile(self.pool(), id).await?)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        Ok(profile::list_profiles(self.pool()).await?)
    }

    async fn upsert_profile(&self, record: &Profile) -> Result<()> {
        Ok(profile::upsert_profile(self.pool(), record).await?)
    }

    async fn delete_profile(&self, id: &str) -> Result<bool> {
        Ok(profile::delete_profile(self.pool(), id).await?)
    }

    async fn put_swipe(&self, record: &Swipe) -> Result<()> {
        Ok(swipe::put_swipe(self.pool(), record).await?)
    }

    async fn get_swipe(&self, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>> {
        Ok(swipe::get_swipe(self.pool(), swiper_id, swiped_id).await?)
    }

    async fn list_swipes_by(&self, swiper_id: &str) -> Result<Vec<Swipe>> {
        Ok(swipe::list_swipes_by(self.pool(), swiper_id).await?)
    }

    async fn insert_match(&self, record: &Match) -> Result<bool> {
        Ok(swipe::insert_match(self.pool(), record).await?)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>> {
        Ok(swipe::get_match(self.pool(), id).await?)
    }

    async fn list_matches_for(&self, user_id: &str) -> Result<Vec<Match>> {
        Ok(swipe::list_matches_for(self.pool(), user_id).await?)
    }

    async fn set_match_last_message(&self, id: &str, preview: &str) -> Result<()> {
        Ok(swipe::set_last_message(self.pool(), id, preview).await?)
    }

    async fn insert_message(&self, record: &Message) -> Result<()> {
        Ok(message::insert_message(self.pool(), record).await?)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        Ok(message::get_message(self.pool(), id).await?)
    }

    async fn update_session(
        &self,
        message_id: &str,
        expected: SessionStatus,
        session: &SessionRequest,
    ) -> Result<bool> {
        Ok(message::update_session(self.pool(), message_id, expected, session).await?)
    }

    async fn list_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        Ok(message::list_conversation(self.pool(), a, b).await?)
    }

    async fn list_messages_for(&self, user_id: &str) -> Result<Vec<Message>> {
        Ok(message::list_messages_for(self.pool(), user_id).await?)
    }

    async fn list_session_messages_since(&self, since: DateTime<Utc>) -> Result<Vec<Message>> {
        Ok(message::list_session_messages_since(self.pool(), since).await?)
    }

    async fn insert_group(&self, record: &Group) -> Result<()> {
        Ok(group::insert_group(self.pool(), record).await?)
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        Ok(group::get_group(self.pool(), id).await?)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(group::list_groups(self.pool()).await?)
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        Ok(group::add_member(self.pool(), group_id, user_id).await?)
    }

    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        Ok(group::remove_member(self.pool(), group_id, user_id).await?)
    }

    async fn delete_group(&self, id: &str) -> Result<bool> {
        Ok(group::delete_group(self.pool(), id).await?)
    }

    async fn insert_group_message(&self, record: &GroupMessage) -> Result<()> {
        Ok(group::insert_group_message(self.pool(), record).await?)
    }

    async fn list_group_messages(&self, group_id: &str) -> Result<Vec<GroupMessage>> {
        Ok(group::list_group_messages(self.pool(), group_id).await?)
    }

    async fn insert_invitation(&self, record: &Invitation) -> Result<()> {
        Ok(group::insert_invitation(self.pool(), record).await?)
    }

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>> {
        Ok(group::get_invitation(self.pool(), id).await?)
    }

    async fn list_pending_invitations(&self, invitee_id: &str) -> Result<Vec<Invitation>> {
        Ok(group::list_pending_invitations(self.pool(), invitee_id).await?)
    }

    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<()> {
        Ok(group::set_invitation_status(self.pool(), id, status).await?)
    }

    async fn delete_invitation(&self, id: &str) -> Result<bool> {
        Ok(group::delete_invitation(self.pool(), id).await?)
    }

    async fn apply_credit_transaction(&self, transaction: &CreditTransaction) -> Result<()> {
        Ok(credit::apply_transaction(self.pool(), transaction).await?)
    }

    async fn list_transactions_for(&self, user_id: &str) -> Result<Vec<CreditTransaction>> {
        Ok(credit::list_transactions_for(self.pool(), user_id).await?)
    }

    async fn insert_feedback(&self, record: &Feedback) -> Result<()> {
        Ok(moderation::insert_feedback(self.pool(), record).await?)
    }

    async fn list_feedback_for(&self, user_id: &str) -> Result<Vec<Feedback>> {
        Ok(moderation::list_feedback_for(self.pool(), user_id).await?)
    }

    async fn insert_report(&self, record: &Report) -> Result<()> {
        Ok(moderation::insert_report(self.pool(), record).await?)
    }

    async fn upsert_typing(&self, status: &TypingStatus) -> Result<()> {
        Ok(typing::upsert_typing(self.pool(), status).await?)
    }

    async fn delete_typing(&self, group_id: &str, user_id: &str) -> Result<bool> {
        Ok(typing::delete_typing(self.pool(), group_id, user_id).await?)
    }

    async fn list_typing(&self, group_id: &str) -> Result<Vec<TypingStatus>> {
        Ok(typing::list_typing(self.pool(), group_id).await?)
    }

    fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}
