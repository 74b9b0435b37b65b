//! Culture Match - compatibility matching for the Culture Connection app
//!
//! This library scores how well two members complement each other from
//! the skills they offer and seek, their declared purposes, their business
//! needs and their experience level, and ranks the best matches for a
//! member against the whole profile pool.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, Matcher};
pub use models::{ExperienceLevel, MatchPolicy, MatchResult, Profile, ScoringWeights, UserMatchRecord};
pub use services::MatchingJob;
