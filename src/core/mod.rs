// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{clears_threshold, is_eligible_candidate, round_score};
pub use matcher::Matcher;
pub use scoring::{
    calculate_business_score, calculate_experience_score, calculate_match_score,
    calculate_purpose_score, calculate_skills_score, CompositeScore,
};
