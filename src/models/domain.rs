use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Self-reported career stage of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Retired,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Retired => "Retired",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(ExperienceLevel::Entry),
            "Mid" => Ok(ExperienceLevel::Mid),
            "Senior" => Ok(ExperienceLevel::Senior),
            "Retired" => Ok(ExperienceLevel::Retired),
            other => Err(format!("unknown experience level: {}", other)),
        }
    }
}

/// Member profile as captured by the registration flow
///
/// Skill lists distinguish "absent" (`None`) from "present but empty"
/// (`Some(vec![])`); only a profile with both skill fields absent is
/// barred from matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "skillsOffering", default)]
    pub skills_offering: Option<Vec<String>>,
    #[serde(rename = "skillsSeeking", default)]
    pub skills_seeking: Option<Vec<String>>,
    #[serde(default)]
    pub purposes: Vec<String>,
    #[serde(rename = "businessNeeds", default)]
    pub business_needs: Vec<String>,
    #[serde(rename = "experienceLevel", default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(rename = "fcmToken", default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Name shown to other members, defaulting to "Unknown"
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }

    /// Skills offered, treating an absent field as empty
    pub fn offering(&self) -> &[String] {
        self.skills_offering.as_deref().unwrap_or(&[])
    }

    /// Skills sought, treating an absent field as empty
    pub fn seeking(&self) -> &[String] {
        self.skills_seeking.as_deref().unwrap_or(&[])
    }

    /// True unless both skill fields are absent
    pub fn has_skill_data(&self) -> bool {
        self.skills_offering.is_some() || self.skills_seeking.is_some()
    }
}

/// Output of a single sub-scorer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubScore {
    /// Normalized score in [0, 1]
    pub score: f64,
    pub reasons: Vec<String>,
}

impl SubScore {
    pub fn new(score: f64, reasons: Vec<String>) -> Self {
        Self { score, reasons }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Neutral score used when neither side supplied data
    pub fn neutral(reason: &str) -> Self {
        Self {
            score: 0.5,
            reasons: vec![reason.to_string()],
        }
    }
}

/// A candidate that cleared the match threshold
///
/// Carries a snapshot of the candidate's matching fields so a stored
/// record stays readable after the live profile changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "userId")]
    pub candidate_id: String,
    #[serde(rename = "name")]
    pub candidate_name: String,
    /// Composite score rounded to 2 decimals
    pub score: f64,
    pub reasons: Vec<String>,
    #[serde(rename = "skillsOffering")]
    pub skills_offering: Vec<String>,
    #[serde(rename = "skillsSeeking")]
    pub skills_seeking: Vec<String>,
    pub purposes: Vec<String>,
    #[serde(rename = "businessNeeds")]
    pub business_needs: Vec<String>,
    #[serde(rename = "experienceLevel", default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
}

impl MatchResult {
    pub fn snapshot(candidate: &Profile, score: f64, reasons: Vec<String>) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.display_name().to_string(),
            score,
            reasons,
            skills_offering: candidate.offering().to_vec(),
            skills_seeking: candidate.seeking().to_vec(),
            purposes: candidate.purposes.clone(),
            business_needs: candidate.business_needs.clone(),
            experience_level: candidate.experience_level,
        }
    }
}

/// Scoring weights for the four sub-scorers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skills: f64,
    pub purpose: f64,
    pub business: f64,
    pub experience: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.purpose + self.business + self.experience
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            purpose: 0.3,
            business: 0.2,
            experience: 0.1,
        }
    }
}

/// Threshold, result cap and weights applied by the matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub weights: ScoringWeights,
    /// Candidates must score strictly above this
    pub min_score: f64,
    pub max_results: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_score: 0.3,
            max_results: 5,
        }
    }
}
