use crate::models::{MatchResult, Profile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Topic used when a member has no push token on file
pub const FALLBACK_TOPIC: &str = "general";

/// Stored match list for one member
///
/// Written as a full replacement on every run; matches from earlier runs
/// are never merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMatchRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalMatches")]
    pub total_matches: usize,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl UserMatchRecord {
    pub fn new(user: &Profile, matches: Vec<MatchResult>, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id.clone(),
            full_name: user.display_name().to_string(),
            total_matches: matches.len(),
            matches,
            updated_at,
        }
    }
}

/// Where a notification should be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum NotificationTarget {
    Token(String),
    Topic(String),
}

/// "New matches" push payload handed to a notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchNotification {
    pub user_id: String,
    pub target: NotificationTarget,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl MatchNotification {
    pub fn new_matches(user: &Profile, match_count: usize) -> Self {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "new_matches".to_string());
        data.insert("userId".to_string(), user.id.clone());
        data.insert("matchCount".to_string(), match_count.to_string());

        // Topic broadcasts carry the intended recipient so clients can filter
        let target = match &user.fcm_token {
            Some(token) => NotificationTarget::Token(token.clone()),
            None => {
                data.insert("targetUserId".to_string(), user.id.clone());
                NotificationTarget::Topic(FALLBACK_TOPIC.to_string())
            }
        };

        Self {
            user_id: user.id.clone(),
            target,
            title: "New Matches Found!".to_string(),
            body: format!("You have {} new potential connections", match_count),
            data,
        }
    }
}

/// Stage of the batch job a per-user failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Persist,
    Notify,
}

/// A failure isolated to one member during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFailure {
    pub user_id: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Outcome of one batch matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_users: usize,
    pub users_processed: usize,
    pub skipped_users: usize,
    pub users_with_matches: usize,
    pub total_matches: usize,
    pub records_saved: usize,
    pub notifications_sent: usize,
    pub failures: Vec<UserFailure>,
    /// Set when the run stopped at its deadline before reaching every member
    #[serde(default)]
    pub timed_out: bool,
}

impl RunSummary {
    pub fn started(total_users: usize) -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            total_users,
            users_processed: 0,
            skipped_users: 0,
            users_with_matches: 0,
            total_matches: 0,
            records_saved: 0,
            notifications_sent: 0,
            failures: Vec::new(),
            timed_out: false,
        }
    }

    pub fn failures_at(&self, stage: FailureStage) -> impl Iterator<Item = &UserFailure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }
}
