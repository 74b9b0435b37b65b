use crate::core::{
    filters::{clears_threshold, is_eligible_candidate, round_score},
    scoring::calculate_match_score,
};
use crate::models::{MatchPolicy, MatchResult, Profile, ScoringWeights};

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility (not self, has skill data)
/// 2. Weighted scoring across the four sub-scorers
/// 3. Threshold filter on the unrounded score
/// 4. Stable ranking and truncation
///
/// The matcher holds no state beyond its policy, so one instance can be
/// shared across threads and reused for every member of a batch.
#[derive(Debug, Clone)]
pub struct Matcher {
    policy: MatchPolicy,
}

/// Candidate that survived scoring, before rounding
struct Scored<'a> {
    candidate: &'a Profile,
    total: f64,
    reasons: Vec<String>,
}

impl Matcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            policy: MatchPolicy {
                weights,
                ..MatchPolicy::default()
            },
        }
    }

    pub fn with_default_policy() -> Self {
        Self {
            policy: MatchPolicy::default(),
        }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Find the best matches for a user within a pool of profiles
    ///
    /// # Arguments
    /// * `user` - The member looking for connections
    /// * `pool` - Every profile, which may include `user` itself
    ///
    /// # Returns
    /// Up to `max_results` matches, best first, with scores rounded to
    /// two decimals. Equal scores keep their pool order.
    pub fn find_matches(&self, user: &Profile, pool: &[Profile]) -> Vec<MatchResult> {
        let mut scored: Vec<Scored<'_>> = pool
            .iter()
            .filter(|candidate| is_eligible_candidate(user, candidate))
            .filter_map(|candidate| {
                let composite = calculate_match_score(user, candidate, &self.policy.weights);

                if clears_threshold(composite.total, self.policy.min_score) {
                    Some(Scored {
                        candidate,
                        total: composite.total,
                        reasons: composite.reasons,
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable, so ties keep pool order
        scored.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.truncate(self.policy.max_results);

        scored
            .into_iter()
            .map(|s| MatchResult::snapshot(s.candidate, round_score(s.total), s.reasons))
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceLevel;

    fn create_candidate(id: &str, offering: &[&str], seeking: &[&str]) -> Profile {
        let mut profile = Profile::new(id);
        profile.full_name = Some(format!("User {}", id));
        profile.skills_offering = Some(offering.iter().map(|s| s.to_string()).collect());
        profile.skills_seeking = Some(seeking.iter().map(|s| s.to_string()).collect());
        profile
    }

    fn create_user() -> Profile {
        create_candidate("current_user", &["Design", "Marketing"], &["Finance"])
    }

    #[test]
    fn test_find_matches_basic() {
        let matcher = Matcher::with_default_policy();
        let user = create_user();

        let pool = vec![
            user.clone(),
            create_candidate("1", &["Finance"], &["Design"]), // Two-way match
            create_candidate("2", &[], &["Legal"]),           // Nothing in common
            Profile::new("3"),                                // No skill data
        ];

        let matches = matcher.find_matches(&user, &pool);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate_id, "1");
        assert_eq!(matches[0].candidate_name, "User 1");
    }

    #[test]
    fn test_matches_sorted_by_score() {
        let matcher = Matcher::with_default_policy();
        let user = create_user();

        let pool = vec![
            create_candidate("1", &[], &["Design"]),
            create_candidate("2", &["Finance"], &["Design", "Marketing"]),
        ];

        let matches = matcher.find_matches(&user, &pool);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].candidate_id, "2");
        assert!(matches[0].score >= matches[1].score);
    }

    #[test]
    fn test_respects_result_cap() {
        let matcher = Matcher::with_default_policy();
        let user = create_user();

        let pool: Vec<Profile> = (0..20)
            .map(|i| create_candidate(&i.to_string(), &["Finance"], &["Design"]))
            .collect();

        let matches = matcher.find_matches(&user, &pool);

        assert_eq!(matches.len(), 5);
        // Equal scores keep pool order
        let ids: Vec<&str> = matches.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_neutral_candidate_sits_on_threshold() {
        let matcher = Matcher::with_default_policy();
        let user = create_candidate("u", &[], &[]);

        // 0.3*0.5 + 0.2*0.5 + 0.1*0.5 == 0.3, which is not strictly above
        let neutral = create_candidate("neutral", &[], &[]);

        // Same, but compatible experience lifts it to 0.35
        let mut experienced_user = user.clone();
        experienced_user.experience_level = Some(ExperienceLevel::Mid);
        let mut senior = create_candidate("senior", &[], &[]);
        senior.experience_level = Some(ExperienceLevel::Senior);

        assert!(matcher.find_matches(&user, &[neutral.clone()]).is_empty());

        let matches = matcher.find_matches(&experienced_user, &[neutral, senior]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate_id, "senior");
        assert_eq!(matches[0].score, 0.35);
    }

    #[test]
    fn test_custom_policy() {
        let matcher = Matcher::new(MatchPolicy {
            min_score: 0.0,
            max_results: 2,
            ..MatchPolicy::default()
        });
        let user = create_candidate("u", &[], &[]);
        let pool: Vec<Profile> = (0..4).map(|i| create_candidate(&i.to_string(), &[], &[])).collect();

        assert_eq!(matcher.find_matches(&user, &pool).len(), 2);
    }
}
