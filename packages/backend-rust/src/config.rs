use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_EXERCISE_POLICY_PATH: &str = "ml_models/exercise_policy.json";
const DEFAULT_INTERVENTION_POLICY_PATH: &str = "ml_models/intervention_policy.json";
const DEFAULT_PENDING_TTL_SECS: u64 = 30 * 60;
const DEFAULT_PENDING_MAX_ENTRIES: usize = 10_000;
const DEFAULT_CLEANUP_SCHEDULE: &str = "0 */5 * * * *";
const DEFAULT_LOG_DIR: &str = "./logs";

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

#[derive(Debug, Clone)]
pub struct Config {
    pub exercise_policy_path: PathBuf,
    pub intervention_policy_path: PathBuf,
    pub pending_ttl: Duration,
    pub pending_max_entries: usize,
    pub cleanup_schedule: String,
    pub cleanup_enabled: bool,
    pub experience_log_path: Option<PathBuf>,
    pub fallback_seed: Option<u64>,
    pub log_level: String,
    /// Set when `ENABLE_FILE_LOGS` is on
    pub file_log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise_policy_path: PathBuf::from(DEFAULT_EXERCISE_POLICY_PATH),
            intervention_policy_path: PathBuf::from(DEFAULT_INTERVENTION_POLICY_PATH),
            pending_ttl: Duration::from_secs(DEFAULT_PENDING_TTL_SECS),
            pending_max_entries: DEFAULT_PENDING_MAX_ENTRIES,
            cleanup_schedule: DEFAULT_CLEANUP_SCHEDULE.to_string(),
            cleanup_enabled: true,
            experience_log_path: None,
            fallback_seed: None,
            log_level: "info".to_string(),
            file_log_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let exercise_policy_path = std::env::var("EXERCISE_POLICY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.exercise_policy_path);

        let intervention_policy_path = std::env::var("INTERVENTION_POLICY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.intervention_policy_path);

        let pending_ttl = std::env::var("PENDING_TTL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.pending_ttl);

        let pending_max_entries = std::env::var("PENDING_MAX_ENTRIES")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&value| value > 0)
            .unwrap_or(defaults.pending_max_entries);

        let cleanup_schedule = std::env::var("PENDING_CLEANUP_SCHEDULE")
            .unwrap_or(defaults.cleanup_schedule);

        let cleanup_enabled = std::env::var("ENABLE_PENDING_CLEANUP_WORKER")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let experience_log_path = std::env::var("EXPERIENCE_LOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let fallback_seed = std::env::var("FALLBACK_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_log_dir = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false)
            .then(|| {
                std::env::var("LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
            });

        Self {
            exercise_policy_path,
            intervention_policy_path,
            pending_ttl,
            pending_max_entries,
            cleanup_schedule,
            cleanup_enabled,
            experience_log_path,
            fallback_seed,
            log_level,
            file_log_dir,
        }
    }
}
