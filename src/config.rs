use crate::models::{MatchPolicy, ScoringWeights};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Slack for float error when summing the configured weights
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[serde(default)]
    #[validate(nested)]
    pub job: JobSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_score: f64,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1))]
    pub max_results: usize,
    #[serde(default)]
    #[validate(nested)]
    pub weights: WeightsConfig,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
            weights: WeightsConfig::default(),
        }
    }
}

impl MatchingSettings {
    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            weights: self.weights.scoring_weights(),
            min_score: self.min_score,
            max_results: self.max_results,
        }
    }
}

fn default_min_score() -> f64 {
    0.3
}

fn default_max_results() -> usize {
    5
}

/// Sub-scorer weights; their sum may not exceed 1 so composite scores stay in [0, 1]
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_weight_sum"))]
pub struct WeightsConfig {
    #[serde(default = "default_skills_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub skills: f64,
    #[serde(default = "default_purpose_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub purpose: f64,
    #[serde(default = "default_business_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub business: f64,
    #[serde(default = "default_experience_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub experience: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skills: default_skills_weight(),
            purpose: default_purpose_weight(),
            business: default_business_weight(),
            experience: default_experience_weight(),
        }
    }
}

impl WeightsConfig {
    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights {
            skills: self.skills,
            purpose: self.purpose,
            business: self.business,
            experience: self.experience,
        }
    }
}

fn validate_weight_sum(weights: &WeightsConfig) -> Result<(), ValidationError> {
    let sum = weights.scoring_weights().sum();
    if sum > 1.0 + WEIGHT_SUM_TOLERANCE {
        let mut error = ValidationError::new("weight_sum");
        error.message = Some(Cow::from(format!("weights sum to {}, at most 1.0 allowed", sum)));
        return Err(error);
    }
    Ok(())
}

fn default_skills_weight() -> f64 {
    0.4
}

fn default_purpose_weight() -> f64 {
    0.3
}

fn default_business_weight() -> f64 {
    0.2
}

fn default_experience_weight() -> f64 {
    0.1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JobSettings {
    /// Profile export read by the batch run
    #[serde(default = "default_profiles_path")]
    pub profiles_path: PathBuf,
    /// Where match records are written, if anywhere
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            profiles_path: default_profiles_path(),
            output_path: None,
            timeout_secs: default_timeout_secs(),
            notifications_enabled: true,
        }
    }
}

fn default_profiles_path() -> PathBuf {
    PathBuf::from("data/profiles.json")
}

fn default_timeout_secs() -> u64 {
    540
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CULTURE__)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CULTURE__MATCHING__MIN_SCORE -> matching.min_score
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, SettingsError> {
        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CULTURE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.skills, 0.4);
        assert_eq!(weights.purpose, 0.3);
        assert_eq!(weights.business, 0.2);
        assert_eq!(weights.experience, 0.1);
    }

    #[test]
    fn test_default_policy_matches_matcher_defaults() {
        assert_eq!(MatchingSettings::default().policy(), MatchPolicy::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    // Loading reads CULTURE__ variables, so tests that load or set them take turns
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets an environment variable until dropped
    struct ScopedVar(&'static str);

    impl ScopedVar {
        fn set(key: &'static str, value: &str) -> Self {
            std::env::set_var(key, value);
            Self(key)
        }
    }

    impl Drop for ScopedVar {
        fn drop(&mut self) {
            std::env::remove_var(self.0);
        }
    }

    fn load_toml(contents: &str) -> Result<Settings, SettingsError> {
        let path = std::env::temp_dir().join(format!("culture-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();

        let settings = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();
        settings
    }

    #[test]
    fn test_load_from_file() {
        let _guard = lock_env();
        let settings = load_toml(
            "[matching]\nmin_score = 0.5\nmax_results = 3\n\n[matching.weights]\nskills = 0.5\nexperience = 0.0\n\n[job]\ntimeout_secs = 60\n",
        )
        .unwrap();

        assert_eq!(settings.matching.min_score, 0.5);
        assert_eq!(settings.matching.max_results, 3);
        assert_eq!(settings.matching.weights.skills, 0.5);
        assert_eq!(settings.matching.weights.purpose, 0.3);
        assert_eq!(settings.matching.weights.experience, 0.0);
        assert_eq!(settings.job.timeout_secs, 60);
        assert!(settings.job.notifications_enabled);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let _guard = lock_env();
        let _min_score = ScopedVar::set("CULTURE__MATCHING__MIN_SCORE", "0.45");
        let _timeout = ScopedVar::set("CULTURE__JOB__TIMEOUT_SECS", "30");

        let settings = load_toml("[matching]\nmin_score = 0.5\n\n[job]\ntimeout_secs = 60\n").unwrap();

        assert_eq!(settings.matching.min_score, 0.45);
        assert_eq!(settings.job.timeout_secs, 30);
        assert_eq!(settings.matching.policy().min_score, 0.45);
    }

    #[test]
    fn test_weights_summing_past_one_rejected() {
        let _guard = lock_env();
        let result = load_toml(
            "[matching.weights]\nskills = 1.0\npurpose = 1.0\nbusiness = 1.0\nexperience = 1.0\n",
        );

        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_weights_may_sum_below_one() {
        let mut settings = Settings::default();
        settings.matching.weights.experience = 0.0;
        assert!(settings.validate().is_ok());

        // Default weights sum to just under 1.0 in floating point
        assert!(WeightsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_settings_rejected() {
        let mut settings = Settings::default();
        settings.matching.min_score = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.matching.weights.business = -0.1;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.matching.max_results = 0;
        assert!(settings.validate().is_err());

        assert!(Settings::default().validate().is_ok());
    }
}
