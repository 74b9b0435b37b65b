use crate::models::Profile;

/// Check whether a candidate may be scored against the seeking user
///
/// A member never matches themselves, and a candidate with no skill
/// data at all cannot take part in matching regardless of other fields.
#[inline]
pub fn is_eligible_candidate(user: &Profile, candidate: &Profile) -> bool {
    if candidate.id == user.id {
        return false;
    }

    candidate.has_skill_data()
}

/// Check if the composite score clears the inclusion threshold
///
/// The comparison is strict and always made on the unrounded score.
#[inline]
pub fn clears_threshold(score: f64, min_score: f64) -> bool {
    score > min_score
}

/// Round a score to two decimal places for display and storage
#[inline]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
