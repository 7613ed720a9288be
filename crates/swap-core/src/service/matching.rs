//! The ranked deck, swipes and mutual matches.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::profile::Profile;
use crate::ranking::{rank_candidates, RankedCandidate};
use crate::store::SwapStore;
use crate::swipe::{Direction, Match, Swipe, SwipeOutcome};

impl<S: SwapStore> SkillSwap<S> {
    /// Every profile the user has not swiped on yet, best match first.
    pub async fn ranked_deck(&self, user_id: &str) -> Result<Vec<RankedCandidate>> {
        let active = self.require_profile(user_id).await?;
        let swiped: HashSet<String> = self
            .store
            .list_swipes_by(user_id)
            .await?
            .into_iter()
            .map(|swipe| swipe.swiped_id)
            .collect();
        let profiles = self.store.list_profiles().await?;

        let deck = rank_candidates(&active, &profiles, &swiped);
        debug!(user_id = %user_id, candidates = deck.len(), "Ranked deck");
        Ok(deck)
    }

    /// Record a swipe and materialize the match if both sides accepted.
    ///
    /// The swipe and the match are separate writes. Concurrent accepts from
    /// both sides converge because the match write is insert-if-absent.
    pub async fn record_swipe(
        &self,
        swiper_id: &str,
        swiped_id: &str,
        direction: Direction,
    ) -> Result<SwipeOutcome> {
        if swiper_id == swiped_id {
            return Err(SwapError::Invalid("cannot swipe on yourself".to_string()));
        }

        let swiper = self.require_profile(swiper_id).await?;
        let swiped = self.require_profile(swiped_id).await?;

        let swipe = Swipe::new(&swiper, &swiped, direction, now());
        self.store.put_swipe(&swipe).await?;
        debug!(swiper = %swiper_id, swiped = %swiped_id, direction = direction.as_str(), "Recorded swipe");

        if !swipe.is_accept() {
            return Ok(SwipeOutcome::Recorded);
        }

        let reverse_accepted = self
            .store
            .get_swipe(swiped_id, swiper_id)
            .await?
            .is_some_and(|reverse| reverse.is_accept());
        if !reverse_accepted {
            return Ok(SwipeOutcome::Recorded);
        }

        let candidate = Match::new(swiper_id, swiped_id, now());
        if self.store.insert_match(&candidate).await? {
            info!(match_id = %candidate.id, "New match");
        }

        // Re-read so a concurrent writer's record is the one returned.
        let record = self
            .store
            .get_match(&candidate.id)
            .await?
            .unwrap_or(candidate);
        if !(record.includes(swiper_id) && record.includes(swiped_id)) {
            return Err(SwapError::Invalid(format!(
                "match key {} belongs to another pair",
                record.id
            )));
        }
        Ok(SwipeOutcome::Matched { record })
    }

    /// Matches that include the user.
    pub async fn matches_for(&self, user_id: &str) -> Result<Vec<Match>> {
        self.store.list_matches_for(user_id).await
    }

    /// Profiles the user has accepted, in swipe order.
    ///
    /// Accepted users who have since closed their account are skipped.
    pub async fn connections(&self, user_id: &str) -> Result<Vec<Profile>> {
        let swipes = self.store.list_swipes_by(user_id).await?;

        let mut profiles = Vec::new();
        for swipe in swipes.iter().filter(|s| s.is_accept()) {
            if let Some(profile) = self.store.get_profile(&swipe.swiped_id).await? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }
}
