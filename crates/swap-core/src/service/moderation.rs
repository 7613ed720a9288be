//! Feedback between users and abuse reports.

use tracing::info;

use super::{new_id, now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::moderation::{average_rating, Feedback, Report, ReportStatus, ReportTarget};
use crate::store::SwapStore;
use crate::validation::{self, MAX_BIO_LENGTH};

impl<S: SwapStore> SkillSwap<S> {
    /// Rate another user.
    pub async fn give_feedback(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<Feedback> {
        validation::validate_rating(rating)?;
        if from_user_id == to_user_id {
            return Err(SwapError::Invalid("cannot rate yourself".to_string()));
        }
        self.require_profile(from_user_id).await?;
        self.require_profile(to_user_id).await?;

        let comment = comment.trim();
        if comment.chars().count() > MAX_BIO_LENGTH {
            return Err(validation::ValidationError::TooLong {
                field: "comment".to_string(),
                max: MAX_BIO_LENGTH,
                actual: comment.chars().count(),
            }
            .into());
        }

        let feedback = Feedback {
            id: new_id(),
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: now(),
        };
        self.store.insert_feedback(&feedback).await?;
        info!(feedback_id = %feedback.id, to = %to_user_id, rating, "Recorded feedback");
        Ok(feedback)
    }

    /// Feedback a user received, newest first.
    pub async fn feedback_for(&self, user_id: &str) -> Result<Vec<Feedback>> {
        self.store.list_feedback_for(user_id).await
    }

    /// Mean rating a user received, if any.
    pub async fn rating_of(&self, user_id: &str) -> Result<Option<f64>> {
        let feedback = self.feedback_for(user_id).await?;
        Ok(average_rating(&feedback))
    }

    /// Report a user or a group for review.
    pub async fn submit_report(&self, reporter_id: &str, target: ReportTarget, reason: &str) -> Result<Report> {
        let reason = validation::require_text("reason", reason, MAX_BIO_LENGTH)?;
        self.require_profile(reporter_id).await?;
        match &target {
            ReportTarget::User(id) => {
                self.require_profile(id).await?;
            }
            ReportTarget::Group(id) => {
                self.require_group(id).await?;
            }
        }

        let report = Report {
            id: new_id(),
            target,
            reporter_id: reporter_id.to_string(),
            reason,
            status: ReportStatus::Open,
            created_at: now(),
        };
        self.store.insert_report(&report).await?;
        info!(
            report_id = %report.id,
            target_kind = report.target.kind(),
            target_id = %report.target.id(),
            "Submitted report"
        );
        Ok(report)
    }
}
