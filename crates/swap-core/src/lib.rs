//! Core of SkillSwap, a skill exchange for university students.
//!
//! Students list the skills they offer and need, swipe through a ranked
//! deck of peers, message the ones they matched with, study together in
//! groups, and pay each other in credits. This crate provides:
//!
//! - [`Profile`] and the normalization of loosely typed profile documents
//! - [`rank_candidates`] - the compatibility score and deck order
//! - [`SwapStore`] - the storage seam, with [`MemoryStore`] for tests
//! - [`ChangeFeed`] - live group-chat events
//! - [`SkillSwap`] - every multi-step operation of the product
//!
//! # Example
//!
//! ```rust
//! use swap_core::{Direction, MemoryStore, ProfileDraft, SkillSwap, SwipeOutcome};
//!
//! # async fn example() -> swap_core::Result<()> {
//! let service = SkillSwap::new(MemoryStore::new());
//! let draft = ProfileDraft {
//!     skills_offered: vec!["Go".to_string()],
//!     skills_needed: vec!["Rust".to_string()],
//!     availability: vec!["Mornings".to_string()],
//!     bio: "CS sophomore".to_string(),
//!     ..Default::default()
//! };
//! service.create_profile("amy", "amy@uni.edu", draft.clone()).await?;
//! service.create_profile("bob", "bob@uni.edu", draft).await?;
//!
//! service.record_swipe("amy", "bob", Direction::Accept).await?;
//! let outcome = service.record_swipe("bob", "amy", Direction::Accept).await?;
//! assert!(matches!(outcome, SwipeOutcome::Matched { .. }));
//! # Ok(())
//! # }
//! ```

pub mod credit;
pub mod error;
pub mod events;
pub mod group;
pub mod memory;
pub mod messaging;
pub mod moderation;
pub mod profile;
pub mod ranking;
pub mod service;
pub mod store;
pub mod swipe;
pub mod validation;

pub use credit::{CreditTransaction, CreditTransfer, TransactionKind};
pub use error::{Result, SwapError};
pub use events::{ChangeFeed, GroupEvent, GroupSubscription};
pub use group::{Group, Invitation, InvitationStatus};
pub use memory::MemoryStore;
pub use messaging::{
    GroupMessage, GroupMessageKind, InboxEntry, LeaderboardEntry, Message, SessionProposal,
    SessionRequest, SessionStatus, TypingStatus,
};
pub use moderation::{Feedback, Report, ReportStatus, ReportTarget};
pub use profile::{Profile, ProfileDraft, ProfileError};
pub use ranking::{rank_candidates, RankedCandidate};
pub use service::{SearchResults, ServiceSettings, SkillSwap};
pub use store::SwapStore;
pub use swipe::{match_key, Direction, Match, Swipe, SwipeOutcome};
pub use validation::ValidationError;

// Re-export async_trait for store implementations
pub use async_trait::async_trait;
