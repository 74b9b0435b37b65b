// Model exports
pub mod document;
pub mod domain;
pub mod records;

pub use document::{profile_from_document, profiles_from_export, DocumentError};
pub use domain::{ExperienceLevel, MatchPolicy, MatchResult, Profile, ScoringWeights, SubScore};
pub use records::{
    FailureStage, MatchNotification, NotificationTarget, RunSummary, UserFailure, UserMatchRecord,
    FALLBACK_TOPIC,
};
