use crate::models::{ExperienceLevel, Profile, ScoringWeights, SubScore};

/// Purpose pairs that signal a mutually useful connection.
/// The left label is read from the seeking user, the right from the candidate.
pub const COMPLEMENTARY_PURPOSES: &[(&str, &str)] = &[
    ("Looking to hire candidates", "Looking to get hired"),
    ("Looking for a mentor", "Looking for a mentee"),
    ("Starting a business", "Wants to invest in a business"),
    ("Networking", "Networking"),
];

/// Business needs of the seeking user satisfied by a candidate's purpose
pub const COMPLEMENTARY_NEEDS: &[(&str, &str)] = &[
    ("Funding", "Wants to invest in a business"),
    ("Expertise", "Looking for a mentor"),
    ("To Hire", "Looking to hire candidates"),
];

/// Experience levels that work well together, in either order
pub const COMPATIBLE_LEVELS: &[(ExperienceLevel, ExperienceLevel)] = &[
    (ExperienceLevel::Entry, ExperienceLevel::Mid),
    (ExperienceLevel::Entry, ExperienceLevel::Senior),
    (ExperienceLevel::Mid, ExperienceLevel::Senior),
    (ExperienceLevel::Retired, ExperienceLevel::Senior),
    (ExperienceLevel::Retired, ExperienceLevel::Mid),
];

const PAIR_WEIGHT: f64 = 1.0;
const SHARED_PURPOSE_WEIGHT: f64 = 0.5;
const SHARED_NEED_WEIGHT: f64 = 0.3;
/// Raw purpose and business scores are divided by this before clamping
const SATURATION: f64 = 2.0;

/// Composite score and reasons for one user/candidate pair
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScore {
    /// Unrounded weighted sum of the sub-scores
    pub total: f64,
    pub reasons: Vec<String>,
}

/// Calculate the weighted compatibility of a candidate (0-1)
///
/// Scoring formula:
/// total = (
///     skills * 0.4 +        # Offered skills meet sought skills
///     purpose * 0.3 +       # Complementary or shared purposes
///     business * 0.2 +      # Needs met by the other side's purposes
///     experience * 0.1      # Compatible career stages
/// )
///
/// Reasons are collected in that order from every sub-scorer that
/// contributed a non-zero score.
pub fn calculate_match_score(
    user: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> CompositeScore {
    let parts = [
        (calculate_skills_score(user, candidate), weights.skills),
        (calculate_purpose_score(user, candidate), weights.purpose),
        (calculate_business_score(user, candidate), weights.business),
        (calculate_experience_score(user, candidate), weights.experience),
    ];

    let mut total = 0.0;
    let mut reasons = Vec::new();

    for (sub, weight) in parts {
        total += sub.score * weight;
        if sub.score > 0.0 {
            reasons.extend(sub.reasons);
        }
    }

    CompositeScore { total, reasons }
}

/// Calculate skills score (0-1)
///
/// Counts the user's offered skills the candidate is seeking, plus the
/// candidate's offered skills the user is seeking. Each direction only
/// counts when both of its lists are non-empty. The count is normalized
/// by the larger of the user's own two skill lists.
pub fn calculate_skills_score(user: &Profile, candidate: &Profile) -> SubScore {
    let user_offering = user.offering();
    let user_seeking = user.seeking();
    let candidate_offering = candidate.offering();
    let candidate_seeking = candidate.seeking();

    let mut raw = 0.0;
    let mut reasons = Vec::new();

    if !user_offering.is_empty() && !candidate_seeking.is_empty() {
        for skill in user_offering {
            if candidate_seeking.contains(skill) {
                raw += 1.0;
                reasons.push(format!("Your {} skills match their needs", skill));
            }
        }
    }

    if !candidate_offering.is_empty() && !user_seeking.is_empty() {
        for skill in candidate_offering {
            if user_seeking.contains(skill) {
                raw += 1.0;
                reasons.push(format!("They offer {} which you're seeking", skill));
            }
        }
    }

    let max_possible = user_offering.len().max(user_seeking.len());
    let score = if max_possible > 0 {
        (raw / max_possible as f64).min(1.0)
    } else {
        0.0
    };

    SubScore::new(score, reasons)
}

/// Calculate purpose score (0-1)
///
/// Neutral 0.5 when neither side declared a purpose.
pub fn calculate_purpose_score(user: &Profile, candidate: &Profile) -> SubScore {
    if user.purposes.is_empty() && candidate.purposes.is_empty() {
        return SubScore::neutral("No purpose data to match");
    }

    let mut raw = 0.0;
    let mut reasons = Vec::new();

    for (user_purpose, other_purpose) in COMPLEMENTARY_PURPOSES {
        if has_label(&user.purposes, user_purpose) && has_label(&candidate.purposes, other_purpose) {
            raw += PAIR_WEIGHT;
            reasons.push(format!("{} matches with {}", user_purpose, other_purpose));
        }
    }

    for purpose in &user.purposes {
        if candidate.purposes.contains(purpose) {
            raw += SHARED_PURPOSE_WEIGHT;
            reasons.push(format!("Both interested in {}", purpose));
        }
    }

    SubScore::new((raw / SATURATION).min(1.0), reasons)
}

/// Calculate business needs score (0-1)
///
/// A need is met when the candidate declares the matching purpose.
/// Neutral 0.5 when neither side declared a need.
pub fn calculate_business_score(user: &Profile, candidate: &Profile) -> SubScore {
    if user.business_needs.is_empty() && candidate.business_needs.is_empty() {
        return SubScore::neutral("No business needs to match");
    }

    let mut raw = 0.0;
    let mut reasons = Vec::new();

    for (need, purpose) in COMPLEMENTARY_NEEDS {
        if has_label(&user.business_needs, need) && has_label(&candidate.purposes, purpose) {
            raw += PAIR_WEIGHT;
            reasons.push(format!("Your {} need matches their {} purpose", need, purpose));
        }
    }

    for need in &user.business_needs {
        if candidate.business_needs.contains(need) {
            raw += SHARED_NEED_WEIGHT;
            reasons.push(format!("Both need {}", need));
        }
    }

    SubScore::new((raw / SATURATION).min(1.0), reasons)
}

/// Calculate experience level score (0-1)
pub fn calculate_experience_score(user: &Profile, candidate: &Profile) -> SubScore {
    let (user_level, other_level) = match (user.experience_level, candidate.experience_level) {
        (Some(a), Some(b)) => (a, b),
        _ => return SubScore::neutral("Experience level not specified"),
    };

    // Compatible pairs win over an exact match
    if levels_compatible(user_level, other_level) {
        return SubScore::new(
            1.0,
            vec![format!(
                "{} and {} experience levels are compatible",
                user_level, other_level
            )],
        );
    }

    if user_level == other_level {
        return SubScore::new(
            0.8,
            vec![format!("Both have {} experience level", user_level)],
        );
    }

    SubScore::new(0.3, vec!["Experience levels may not be ideal match".to_string()])
}

#[inline]
fn levels_compatible(a: ExperienceLevel, b: ExperienceLevel) -> bool {
    COMPATIBLE_LEVELS
        .iter()
        .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
}

#[inline]
fn has_label(labels: &[String], label: &str) -> bool {
    labels.iter().any(|l| l == label)
}
