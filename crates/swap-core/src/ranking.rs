//! Compatibility scoring and deck ordering.

use std::collections::HashSet;

use serde::Serialize;

use crate::profile::Profile;

/// Weight of each needed skill the candidate offers.
pub const SKILL_WEIGHT: u32 = 2;

/// Weight of each shared availability slot.
pub const AVAILABILITY_WEIGHT: u32 = 1;

/// A candidate profile together with its compatibility score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub profile: Profile,
    pub score: u32,
}

/// Compatibility of `candidate` for `active`.
///
/// Counts, for each of the active user's needed skills, whether the
/// candidate offers it, and for each active availability slot, whether the
/// candidate shares it. Matching is exact and case-sensitive, and
/// duplicate entries on the active side are counted each time.
pub fn score(active: &Profile, candidate: &Profile) -> u32 {
    let skill_hits = overlap(&active.skills_needed, &candidate.skills_offered);
    let slot_hits = overlap(&active.availability, &candidate.availability);

    SKILL_WEIGHT
        .saturating_mul(skill_hits)
        .saturating_add(AVAILABILITY_WEIGHT.saturating_mul(slot_hits))
}

fn overlap(ours: &[String], theirs: &[String]) -> u32 {
    let hits = ours.iter().filter(|entry| theirs.contains(entry)).count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

/// Score and order every candidate for the active user.
///
/// The active user and anyone already swiped on are left out. Nothing is
/// filtered by score: zero-score candidates come last. Equal scores are
/// ordered by ascending id so the deck is stable across calls.
pub fn rank_candidates<'a, I>(
    active: &Profile,
    candidates: I,
    swiped_ids: &HashSet<String>,
) -> Vec<RankedCandidate>
where
    I: IntoIterator<Item = &'a Profile>,
{
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != active.id)
        .filter(|candidate| !swiped_ids.contains(&candidate.id))
        .map(|candidate| RankedCandidate {
            score: score(active, candidate),
            profile: candidate.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.profile.id.cmp(&b.profile.id))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileDraft;
    use chrono::Utc;

    fn profile(id: &str, offered: &[&str], needed: &[&str], availability: &[&str]) -> Profile {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Profile::new(
            id,
            &format!("{id}@uni.edu"),
            ProfileDraft {
                skills_offered: to_vec(offered),
                skills_needed: to_vec(needed),
                availability: to_vec(availability),
                bio: "bio".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_reference_scenario() {
        let active = profile("me", &[], &["Python"], &["Morning"]);
        let x = profile("x", &["Python", "Go"], &[], &["Morning", "Evening"]);
        let y = profile("y", &["Rust"], &[], &["Evening"]);

        assert_eq!(score(&active, &x), 3);
        assert_eq!(score(&active, &y), 0);

        let ranked = rank_candidates(&active, [&y, &x], &HashSet::new());
        let ids: Vec<&str> = ranked.iter().map(|c| c.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].score, 0);
    }

    #[test]
    fn test_disjoint_profiles_score_zero() {
        let active = profile("me", &["Go"], &["Chemistry"], &["Weekends"]);
        let other = profile("o", &["Physics"], &["Go"], &["Weekdays"]);
        assert_eq!(score(&active, &other), 0);
    }

    #[test]
    fn test_empty_fields_score_zero() {
        let active = profile("me", &[], &[], &[]);
        let other = profile("o", &["Go"], &["Rust"], &["Mornings"]);
        assert_eq!(score(&active, &other), 0);
        assert_eq!(score(&other, &active), 0);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let active = profile("me", &[], &["python"], &["mornings"]);
        let other = profile("o", &["Python"], &[], &["Mornings"]);
        assert_eq!(score(&active, &other), 0);
    }

    #[test]
    fn test_duplicates_inflate_score() {
        let active = profile("me", &[], &["Python", "Python"], &["Mornings", "Mornings"]);
        let other = profile("o", &["Python"], &[], &["Mornings"]);
        assert_eq!(score(&active, &other), 2 * 2 + 2);
    }

    #[test]
    fn test_excludes_self_and_swiped() {
        let active = profile("me", &[], &["Go"], &[]);
        let a = profile("a", &["Go"], &[], &[]);
        let b = profile("b", &["Go"], &[], &[]);
        let c = profile("c", &[], &[], &[]);

        let swiped: HashSet<String> = ["a".to_string()].into_iter().collect();
        let ranked = rank_candidates(&active, [&active, &a, &b, &c], &swiped);
        let ids: Vec<&str> = ranked.iter().map(|c| c.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let active = profile("me", &[], &["Go"], &[]);
        let z = profile("z", &["Go"], &[], &[]);
        let m = profile("m", &["Go"], &[], &[]);
        let a = profile("a", &[], &[], &[]);

        let ranked = rank_candidates(&active, [&z, &a, &m], &HashSet::new());
        let ids: Vec<&str> = ranked.iter().map(|c| c.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "z", "a"]);
    }
}
