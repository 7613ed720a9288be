//! SQLite persistence layer for SkillSwap.
//!
//! This crate stores profiles, swipes, matches, messages, groups and the
//! credit ledger using SQLx with SQLite, and implements
//! [`swap_core::SwapStore`] on [`Database`].
//!
//! # Example
//!
//! ```no_run
//! use database::Database;
//! use swap_core::SkillSwap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:skillswap.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let service = SkillSwap::new(db);
//!     let deck = service.ranked_deck("amy").await?;
//!     println!("{} candidates", deck.len());
//!
//!     Ok(())
//! }
//! ```

pub mod credit;
pub mod error;
pub mod group;
pub mod message;
pub mod moderation;
pub mod profile;
pub mod swipe;
pub mod typing;

mod models;
mod store;

pub use error::{DatabaseError, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use swap_core::ChangeFeed;

/// Database connection wrapper.
///
/// Clones share the pool and the change feed.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/skillswap.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self {
            pool,
            feed: ChangeFeed::default(),
        })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that a connection can run a query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use swap_core::{
        CreditTransaction, CreditTransfer, Direction, GroupMessageKind, Profile, ProfileDraft,
        ReportTarget, SessionProposal, SessionStatus, SkillSwap, SwapError, SwapStore,
        SwipeOutcome, TransactionKind,
    };

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn draft() -> ProfileDraft {
        ProfileDraft {
            skills_offered: vec!["Go".to_string()],
            skills_needed: vec!["Rust".to_string()],
            availability: vec!["Mornings".to_string()],
            bio: "Student".to_string(),
            ..Default::default()
        }
    }

    async fn service_with(ids: &[&str]) -> SkillSwap<Database> {
        let service = SkillSwap::new(test_db().await);
        for id in ids {
            service
                .create_profile(id, &format!("{id}@uni.edu"), draft())
                .await
                .unwrap();
        }
        service
    }

    async fn grant(db: &Database, id: &str, credits: i64) {
        sqlx::query("UPDATE profiles SET credits = ? WHERE id = ?")
            .bind(credits)
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_profile_crud() {
        let db = test_db().await;

        // Create
        let mut record = Profile::new("u1", "u1@uni.edu", draft(), Utc::now());
        record.credits = 7;
        db.upsert_profile(&record).await.unwrap();

        // Read
        let fetched = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(fetched.skills_offered, vec!["Go".to_string()]);
        assert_eq!(fetched.credits, 7);

        // Update keeps the balance
        let mut edited = fetched.clone();
        edited.bio = "Changed".to_string();
        edited.credits = 0;
        db.upsert_profile(&edited).await.unwrap();
        let fetched = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(fetched.bio, "Changed");
        assert_eq!(fetched.credits, 7);

        // List
        assert_eq!(db.list_profiles().await.unwrap().len(), 1);

        // Delete
        assert!(db.delete_profile("u1").await.unwrap());
        assert!(!db.delete_profile("u1").await.unwrap());
        assert!(db.get_profile("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mutual_match_is_written_once() {
        let service = service_with(&["amy", "bob"]).await;

        service.record_swipe("bob", "amy", Direction::Accept).await.unwrap();
        let outcome = service.record_swipe("amy", "bob", Direction::Accept).await.unwrap();
        assert!(matches!(outcome, SwipeOutcome::Matched { .. }));
        service.record_swipe("bob", "amy", Direction::Accept).await.unwrap();

        let matches = service.matches_for("amy").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "amy_bob");
        assert_eq!(matches[0].users, ["amy".to_string(), "bob".to_string()]);

        let swipe = service.store().get_swipe("amy", "bob").await.unwrap().unwrap();
        assert_eq!(swipe.swiped_skills.offered, vec!["Go".to_string()]);
    }

    #[tokio::test]
    async fn test_messages_and_sessions_round_trip() {
        let service = service_with(&["stu", "helper"]).await;
        service.record_swipe("stu", "helper", Direction::Accept).await.unwrap();
        service.record_swipe("helper", "stu", Direction::Accept).await.unwrap();

        service.send_message("stu", "helper", "hi").await.unwrap();
        let request = service
            .request_session(
                "stu",
                "helper",
                SessionProposal {
                    title: "Rust basics".to_string(),
                    proposed_time: "Fri 16:00".to_string(),
                    place: "Cafe".to_string(),
                    credits: 3,
                },
            )
            .await
            .unwrap();
        service.respond_to_session(&request.id, "helper", true).await.unwrap();
        service.complete_session(&request.id, "helper").await.unwrap();

        let conversation = service.conversation("helper", "stu").await.unwrap();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].text, "hi");
        let session = conversation[1].session.as_ref().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);

        assert_eq!(service.balance("helper").await.unwrap(), 3);
        let board = service.weekly_leaderboard(Utc::now(), 10).await.unwrap();
        assert_eq!(board.len(), 2);

        let record = service.matches_for("stu").await.unwrap().remove(0);
        assert_eq!(record.last_message.as_deref(), Some("Session request: Rust basics"));
    }

    #[tokio::test]
    async fn test_failed_spend_rolls_back() {
        let service = service_with(&["amy", "bob"]).await;
        grant(service.store(), "amy", 3).await;

        let err = service
            .spend(CreditTransfer {
                from: "amy".to_string(),
                to: "bob".to_string(),
                amount: 5,
                reason: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::InsufficientCredits { balance: 3, requested: 5, .. }));

        assert_eq!(service.balance("amy").await.unwrap(), 3);
        assert_eq!(service.balance("bob").await.unwrap(), 0);
        assert!(service.transactions("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spend_then_earn_round_trips_balance() {
        let service = service_with(&["amy", "bob"]).await;
        grant(service.store(), "amy", 10).await;

        let transfer = |from: &str, to: &str| CreditTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: 4,
            reason: "notes".to_string(),
        };
        service.spend(transfer("amy", "bob")).await.unwrap();
        service.earn(transfer("bob", "amy")).await.unwrap();

        assert_eq!(service.balance("amy").await.unwrap(), 10);
        assert_eq!(service.balance("bob").await.unwrap(), 4);

        let ledger = service.transactions("amy").await.unwrap();
        let kinds: Vec<TransactionKind> = ledger.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Earn, TransactionKind::Spend]);
    }

    #[tokio::test]
    async fn test_transaction_to_unknown_user_writes_nothing() {
        let db = test_db().await;
        let entry = CreditTransaction {
            id: "t1".to_string(),
            from_user_id: "amy".to_string(),
            to_user_id: "ghost".to_string(),
            amount: 1,
            kind: TransactionKind::Earn,
            reason: String::new(),
            created_at: Utc::now(),
        };

        let err = db.apply_credit_transaction(&entry).await.unwrap_err();
        assert!(matches!(err, SwapError::NotFound { .. }));
        assert!(db.list_transactions_for("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_earn_keeps_profile_readable() {
        let db = test_db().await;
        db.upsert_profile(&Profile::new("bob", "bob@uni.edu", draft(), Utc::now()))
            .await
            .unwrap();
        grant(&db, "bob", i64::MAX).await;

        let entry = CreditTransaction {
            id: "t1".to_string(),
            from_user_id: "amy".to_string(),
            to_user_id: "bob".to_string(),
            amount: 1,
            kind: TransactionKind::Earn,
            reason: String::new(),
            created_at: Utc::now(),
        };
        let err = db.apply_credit_transaction(&entry).await.unwrap_err();
        assert!(matches!(err, SwapError::Invalid(_)));

        let stored = db.get_profile("bob").await.unwrap().unwrap();
        assert_eq!(stored.credits, i64::MAX);
        assert_eq!(db.list_profiles().await.unwrap().len(), 1);
        assert!(db.list_transactions_for("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_lifecycle_cascades() {
        let service = service_with(&["amy", "bob"]).await;
        let group = service.create_group("amy", "Rust Club", "Borrowck support").await.unwrap();

        service.join_group(&group.id, "bob").await.unwrap();
        service.join_group(&group.id, "bob").await.unwrap();
        let stored = service.get_group(&group.id).await.unwrap();
        assert_eq!(stored.members, vec!["amy".to_string(), "bob".to_string()]);

        service.set_typing(&group.id, "bob").await.unwrap();
        service.post_group_message(&group.id, "amy", "welcome").await.unwrap();
        let chat = service.group_messages(&group.id).await.unwrap();
        assert_eq!(chat.len(), 2);
        assert_eq!(chat[0].kind, GroupMessageKind::System);
        assert_eq!(chat[1].text, "welcome");

        let typing = service.typing_users(&group.id, "amy", Utc::now()).await.unwrap();
        assert_eq!(typing.len(), 1);
        let later = Utc::now() + Duration::seconds(30);
        assert!(service.typing_users(&group.id, "amy", later).await.unwrap().is_empty());

        service.delete_group(&group.id, "amy").await.unwrap();
        assert!(service.store().get_group(&group.id).await.unwrap().is_none());
        assert!(service.store().list_group_messages(&group.id).await.unwrap().is_empty());
        assert!(service.store().list_typing(&group.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invitations_and_reports() {
        let service = service_with(&["amy", "bob"]).await;
        let group = service.create_group("amy", "Rust Club", "").await.unwrap();

        let invitation = service.invite(&group.id, "amy", "bob").await.unwrap();
        let pending = service.pending_invitations("bob").await.unwrap();
        assert_eq!(pending, vec![invitation.clone()]);

        service.accept_invitation(&invitation.id, "bob").await.unwrap();
        assert!(service.pending_invitations("bob").await.unwrap().is_empty());
        assert!(service.get_group(&group.id).await.unwrap().is_member("bob"));

        service
            .submit_report("bob", ReportTarget::User("amy".to_string()), "spam")
            .await
            .unwrap();
        let open = moderation::list_open_reports(service.store().pool()).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].target, ReportTarget::User("amy".to_string()));

        service.give_feedback("bob", "amy", 4, "helpful").await.unwrap();
        assert_eq!(service.rating_of("amy").await.unwrap(), Some(4.0));
    }
}
