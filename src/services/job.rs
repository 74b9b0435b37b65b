use crate::core::Matcher;
use crate::models::{
    FailureStage, MatchNotification, Profile, RunSummary, UserFailure, UserMatchRecord,
};
use crate::services::{MatchNotifier, MatchStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that end a bounded run as a whole
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Matching task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Batch job that refreshes the match list of every member
///
/// Matching itself cannot fail; store and notifier errors are isolated
/// to the member they occurred for and reported in the summary.
#[derive(Clone)]
pub struct MatchingJob {
    matcher: Matcher,
    store: Arc<dyn MatchStore>,
    notifier: Arc<dyn MatchNotifier>,
    notifications_enabled: bool,
}

impl MatchingJob {
    pub fn new(
        matcher: Matcher,
        store: Arc<dyn MatchStore>,
        notifier: Arc<dyn MatchNotifier>,
    ) -> Self {
        Self {
            matcher,
            store,
            notifier,
            notifications_enabled: true,
        }
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    /// Run matching for every profile in the pool
    pub fn run(&self, profiles: &[Profile]) -> RunSummary {
        self.run_until(profiles, None)
    }

    /// Run matching, stopping between members once `deadline` has passed
    ///
    /// Members not reached keep their previous records and the summary is
    /// flagged `timed_out`.
    pub fn run_until(&self, profiles: &[Profile], deadline: Option<Instant>) -> RunSummary {
        let mut summary = RunSummary::started(profiles.len());

        tracing::info!(run_id = %summary.run_id, "Starting matching run over {} profiles", profiles.len());

        if profiles.len() < 2 {
            tracing::info!("Not enough users for matching");
            summary.finished_at = Utc::now();
            return summary;
        }

        for user in profiles {
            if matches!(deadline, Some(deadline) if Instant::now() >= deadline) {
                tracing::warn!(
                    run_id = %summary.run_id,
                    "Deadline reached after {} of {} users, stopping",
                    summary.users_processed + summary.skipped_users,
                    profiles.len()
                );
                summary.timed_out = true;
                break;
            }

            if !user.has_skill_data() {
                tracing::debug!("Skipping user {} - missing skills data", user.id);
                summary.skipped_users += 1;
                continue;
            }

            summary.users_processed += 1;

            let matches = self.matcher.find_matches(user, profiles);
            if matches.is_empty() {
                tracing::debug!("No matches for user {}", user.id);
                continue;
            }

            let match_count = matches.len();
            summary.users_with_matches += 1;
            summary.total_matches += match_count;

            let record = UserMatchRecord::new(user, matches, Utc::now());
            if let Err(e) = self.store.replace(record) {
                tracing::warn!("Failed to save matches for user {}: {}", user.id, e);
                summary.failures.push(UserFailure {
                    user_id: user.id.clone(),
                    stage: FailureStage::Persist,
                    message: e.to_string(),
                });
                continue;
            }
            summary.records_saved += 1;

            if !self.notifications_enabled {
                continue;
            }

            let notification = MatchNotification::new_matches(user, match_count);
            match self.notifier.notify(&notification) {
                Ok(()) => summary.notifications_sent += 1,
                Err(e) => {
                    tracing::warn!("Failed to notify user {}: {}", user.id, e);
                    summary.failures.push(UserFailure {
                        user_id: user.id.clone(),
                        stage: FailureStage::Notify,
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.finished_at = Utc::now();

        tracing::info!(
            run_id = %summary.run_id,
            "Matching completed. Found {} users with matches, saved {}, sent {} notifications, {} failures",
            summary.users_with_matches,
            summary.records_saved,
            summary.notifications_sent,
            summary.failures.len()
        );

        summary
    }

    /// Run on the blocking pool, stopping once `timeout` has elapsed
    ///
    /// The deadline is checked between members, so a run that overruns
    /// returns a partial summary and keeps whatever records it already saved.
    pub async fn run_bounded(
        self: Arc<Self>,
        profiles: Arc<Vec<Profile>>,
        timeout: Duration,
    ) -> Result<RunSummary, JobError> {
        let deadline = Instant::now() + timeout;
        let summary =
            tokio::task::spawn_blocking(move || self.run_until(&profiles, Some(deadline))).await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryMatchStore, LogNotifier};

    fn skilled(id: &str, offering: &[&str], seeking: &[&str]) -> Profile {
        let mut profile = Profile::new(id);
        profile.skills_offering = Some(offering.iter().map(|s| s.to_string()).collect());
        profile.skills_seeking = Some(seeking.iter().map(|s| s.to_string()).collect());
        profile
    }

    #[test]
    fn test_small_pool_short_circuits() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier));

        let summary = job.run(&[skilled("a", &["Design"], &[])]);

        assert_eq!(summary.total_users, 1);
        assert_eq!(summary.users_processed, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_users_without_skills_are_skipped() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier));

        let pool = vec![
            skilled("a", &["Design"], &[]),
            skilled("b", &[], &["Design"]),
            Profile::new("c"),
        ];

        let summary = job.run(&pool);

        assert_eq!(summary.skipped_users, 1);
        assert_eq!(summary.users_processed, 2);
        // "a" offers what "b" seeks, which scores in both directions
        assert_eq!(summary.users_with_matches, 2);
        assert_eq!(summary.notifications_sent, 2);
        assert_eq!(store.get("a").unwrap().unwrap().matches[0].candidate_id, "b");
        assert_eq!(store.get("b").unwrap().unwrap().matches[0].candidate_id, "a");
        assert!(store.get("c").unwrap().is_none());
    }

    #[test]
    fn test_pair_with_one_unskilled_member_yields_nothing() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier));

        let summary = job.run(&[skilled("a", &["Design"], &["Finance"]), Profile::new("b")]);

        assert_eq!(summary.total_users, 2);
        assert_eq!(summary.skipped_users, 1);
        assert_eq!(summary.users_processed, 1);
        assert_eq!(summary.users_with_matches, 0);
        assert_eq!(summary.notifications_sent, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_passed_deadline_stops_before_first_user() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier));

        let pool = vec![skilled("a", &["Design"], &[]), skilled("b", &[], &["Design"])];
        let summary = job.run_until(&pool, Some(Instant::now()));

        assert!(summary.timed_out);
        assert_eq!(summary.users_processed, 0);
        assert!(store.is_empty());

        let summary = job.run_until(&pool, None);
        assert!(!summary.timed_out);
        assert_eq!(summary.records_saved, 2);
    }

    #[test]
    fn test_notifications_can_be_disabled() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier))
            .with_notifications(false);

        let pool = vec![skilled("a", &["Design"], &[]), skilled("b", &[], &["Design"])];
        let summary = job.run(&pool);

        assert_eq!(summary.records_saved, 2);
        assert_eq!(summary.notifications_sent, 0);
    }

    #[tokio::test]
    async fn test_run_bounded_completes() {
        let store = Arc::new(InMemoryMatchStore::new());
        let job = Arc::new(MatchingJob::new(Matcher::default(), store.clone(), Arc::new(LogNotifier)));

        let pool = Arc::new(vec![skilled("a", &["Design"], &[]), skilled("b", &[], &["Design"])]);
        let summary = job.run_bounded(pool, Duration::from_secs(5)).await.unwrap();

        assert!(!summary.timed_out);
        assert_eq!(summary.records_saved, 2);
        assert_eq!(store.len(), 2);
    }
}
