//! Study-session requests carried by direct messages.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{now, SkillSwap};
use crate::credit::{CreditTransfer, MAX_TRANSFER_AMOUNT};
use crate::error::{Result, SwapError};
use crate::messaging::{
    leaderboard, start_of_week, LeaderboardEntry, Message, SessionProposal, SessionRequest,
    SessionStatus,
};
use crate::store::SwapStore;
use crate::validation::{self, MAX_TITLE_LENGTH};

impl<S: SwapStore> SkillSwap<S> {
    /// Ask a matched helper for a study session.
    pub async fn request_session(
        &self,
        student_id: &str,
        helper_id: &str,
        proposal: SessionProposal,
    ) -> Result<Message> {
        let title = validation::require_text("session title", &proposal.title, MAX_TITLE_LENGTH)?;
        if !(0..=MAX_TRANSFER_AMOUNT).contains(&proposal.credits) {
            return Err(SwapError::Invalid(format!(
                "session credits must be between 0 and {}",
                MAX_TRANSFER_AMOUNT
            )));
        }

        let request = SessionRequest {
            title: title.clone(),
            proposed_time: proposal.proposed_time.trim().to_string(),
            place: proposal.place.trim().to_string(),
            ..SessionRequest::from(proposal)
        };
        let text = format!("Session request: {}", title);
        self.deliver(student_id, helper_id, text, Some(request)).await
    }

    /// Accept or decline a pending request. Only the helper may respond.
    pub async fn respond_to_session(&self, message_id: &str, responder_id: &str, accept: bool) -> Result<Message> {
        let (mut message, mut request) = self.load_session(message_id, responder_id).await?;
        if request.status != SessionStatus::Pending {
            return Err(SwapError::Invalid(format!(
                "session request is already {}",
                request.status.as_str()
            )));
        }

        request.status = if accept {
            SessionStatus::Accepted
        } else {
            SessionStatus::Declined
        };
        if !self
            .store
            .update_session(message_id, SessionStatus::Pending, &request)
            .await?
        {
            return Err(SwapError::Invalid("session request was already answered".to_string()));
        }
        info!(message_id = %message_id, status = request.status.as_str(), "Answered session request");

        message.session = Some(request);
        Ok(message)
    }

    /// Mark an accepted session as done and pay the helper.
    ///
    /// The helper earns the agreed credits on behalf of the student; the
    /// student's balance is not debited. The status moves to completed
    /// before any credit is minted, so a session pays out at most once.
    pub async fn complete_session(&self, message_id: &str, helper_id: &str) -> Result<Message> {
        let (mut message, mut request) = self.load_session(message_id, helper_id).await?;
        if request.status != SessionStatus::Accepted {
            return Err(SwapError::Invalid(format!(
                "only accepted sessions can be completed, this one is {}",
                request.status.as_str()
            )));
        }

        let accepted = request.clone();
        request.status = SessionStatus::Completed;
        request.completed_at = Some(now());
        if !self
            .store
            .update_session(message_id, SessionStatus::Accepted, &request)
            .await?
        {
            return Err(SwapError::Invalid("session was already completed".to_string()));
        }

        if request.credits > 0 {
            let payment = self
                .earn(CreditTransfer {
                    from: message.sender_id.clone(),
                    to: helper_id.to_string(),
                    amount: request.credits,
                    reason: format!("Session: {}", request.title),
                })
                .await;

            if let Err(err) = payment {
                // Put the request back so the helper can retry.
                if let Err(revert) = self
                    .store
                    .update_session(message_id, SessionStatus::Completed, &accepted)
                    .await
                {
                    warn!(message_id = %message_id, "Failed to reopen unpaid session: {}", revert);
                }
                return Err(err);
            }
        }
        info!(message_id = %message_id, helper = %helper_id, credits = request.credits, "Completed session");

        message.session = Some(request);
        Ok(message)
    }

    /// Agreed sessions per user since Sunday 00:00 UTC, most active first.
    pub async fn weekly_leaderboard(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let since = start_of_week(now);
        let messages = self.store.list_session_messages_since(since).await?;
        Ok(leaderboard(&messages, since, limit))
    }

    /// Load a session message the caller is the receiver of.
    async fn load_session(&self, message_id: &str, receiver_id: &str) -> Result<(Message, SessionRequest)> {
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| SwapError::not_found("Message", message_id))?;

        let request = message
            .session
            .clone()
            .ok_or_else(|| SwapError::Invalid(format!("message {} is not a session request", message_id)))?;

        if message.receiver_id != receiver_id {
            return Err(SwapError::Forbidden(
                "only the requested helper can act on a session request".to_string(),
            ));
        }

        Ok((message, request))
    }
}
