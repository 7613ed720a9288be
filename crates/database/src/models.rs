//! Database rows and their conversion into domain records.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use swap_core::messaging::GroupMessageKind;
use swap_core::swipe::SkillSnapshot;
use swap_core::{
    CreditTransaction, Direction, Feedback, GroupMessage, Invitation, InvitationStatus, Match,
    Message, Profile, Report, ReportStatus, ReportTarget, SessionRequest, Swipe, TransactionKind,
    TypingStatus,
};

use crate::error::{DatabaseError, Result};

fn invalid(entity: &'static str, column: &'static str, value: &str) -> DatabaseError {
    DatabaseError::InvalidValue {
        entity,
        column,
        value: value.to_string(),
    }
}

/// A row of `profiles`.
#[derive(Debug, FromRow)]
pub(crate) struct ProfileRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub skills_offered: Json<Vec<String>>,
    pub skills_needed: Json<Vec<String>>,
    pub availability: Json<Vec<String>>,
    pub bio: String,
    pub photo_url: Option<String>,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            email: row.email,
            name: row.name,
            username: row.username,
            skills_offered: row.skills_offered.0,
            skills_needed: row.skills_needed.0,
            availability: row.availability.0,
            bio: row.bio,
            photo_url: row.photo_url,
            credits: row.credits,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row of `swipes`.
#[derive(Debug, FromRow)]
pub(crate) struct SwipeRow {
    pub swiper_id: String,
    pub swiped_id: String,
    pub direction: String,
    pub swiper_skills: Json<SkillSnapshot>,
    pub swiped_skills: Json<SkillSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SwipeRow> for Swipe {
    type Error = DatabaseError;

    fn try_from(row: SwipeRow) -> Result<Self> {
        let direction =
            Direction::parse(&row.direction).ok_or_else(|| invalid("Swipe", "direction", &row.direction))?;
        Ok(Swipe {
            swiper_id: row.swiper_id,
            swiped_id: row.swiped_id,
            direction,
            swiper_skills: row.swiper_skills.0,
            swiped_skills: row.swiped_skills.0,
            created_at: row.created_at,
        })
    }
}

/// A row of `matches`.
#[derive(Debug, FromRow)]
pub(crate) struct MatchRow {
    pub id: String,
    pub user_a: String,
    pub user_b: String,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<String>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            id: row.id,
            users: [row.user_a, row.user_b],
            created_at: row.created_at,
            last_message: row.last_message,
        }
    }
}

/// A row of `messages`.
#[derive(Debug, FromRow)]
pub(crate) struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub session: Option<Json<SessionRequest>>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            text: row.text,
            created_at: row.created_at,
            session: row.session.map(|json| json.0),
        }
    }
}

/// A row of `study_groups`, without its members.
#[derive(Debug, FromRow)]
pub(crate) struct GroupRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// A row of `group_messages`.
#[derive(Debug, FromRow)]
pub(crate) struct GroupMessageRow {
    pub id: String,
    pub group_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GroupMessageRow> for GroupMessage {
    type Error = DatabaseError;

    fn try_from(row: GroupMessageRow) -> Result<Self> {
        let kind = GroupMessageKind::parse(&row.kind).ok_or_else(|| invalid("GroupMessage", "kind", &row.kind))?;
        Ok(GroupMessage {
            id: row.id,
            group_id: row.group_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            text: row.text,
            kind,
            created_at: row.created_at,
        })
    }
}

/// A row of `invitations`.
#[derive(Debug, FromRow)]
pub(crate) struct InvitationRow {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub inviter_id: String,
    pub invitee_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = DatabaseError;

    fn try_from(row: InvitationRow) -> Result<Self> {
        let status =
            InvitationStatus::parse(&row.status).ok_or_else(|| invalid("Invitation", "status", &row.status))?;
        Ok(Invitation {
            id: row.id,
            group_id: row.group_id,
            group_name: row.group_name,
            inviter_id: row.inviter_id,
            invitee_id: row.invitee_id,
            status,
            created_at: row.created_at,
        })
    }
}

/// A row of `credit_transactions`.
#[derive(Debug, FromRow)]
pub(crate) struct TransactionRow {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: i64,
    pub kind: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for CreditTransaction {
    type Error = DatabaseError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let kind =
            TransactionKind::parse(&row.kind).ok_or_else(|| invalid("CreditTransaction", "kind", &row.kind))?;
        Ok(CreditTransaction {
            id: row.id,
            from_user_id: row.from_user_id,
            to_user_id: row.to_user_id,
            amount: row.amount,
            kind,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

/// A row of `feedback`.
#[derive(Debug, FromRow)]
pub(crate) struct FeedbackRow {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            from_user_id: row.from_user_id,
            to_user_id: row.to_user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// A row of `reports`.
#[derive(Debug, FromRow)]
pub(crate) struct ReportRow {
    pub id: String,
    pub target_kind: String,
    pub target_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = DatabaseError;

    fn try_from(row: ReportRow) -> Result<Self> {
        let target = ReportTarget::from_parts(&row.target_kind, row.target_id)
            .ok_or_else(|| invalid("Report", "target_kind", &row.target_kind))?;
        let status = ReportStatus::parse(&row.status).ok_or_else(|| invalid("Report", "status", &row.status))?;
        Ok(Report {
            id: row.id,
            target,
            reporter_id: row.reporter_id,
            reason: row.reason,
            status,
            created_at: row.created_at,
        })
    }
}

/// A row of `typing_status`.
#[derive(Debug, FromRow)]
pub(crate) struct TypingRow {
    pub group_id: String,
    pub user_id: String,
    pub user_name: String,
    pub updated_at: DateTime<Utc>,
}

impl From<TypingRow> for TypingStatus {
    fn from(row: TypingRow) -> Self {
        TypingStatus {
            group_id: row.group_id,
            user_id: row.user_id,
            user_name: row.user_name,
            updated_at: row.updated_at,
        }
    }
}

/// Convert fallible rows, stopping at the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}
