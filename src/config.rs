// Configuration module for reading Snake.toml
// Environment variables may override the turn recorder settings

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable that enables turn recording to the given path
pub const RECORD_PATH_ENV: &str = "KAA_RECORD_PATH";

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub selection: SelectionConfig,
    pub appearance: AppearanceConfig,
    pub recording: RecordingConfig,
}

/// Response-time constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    pub polling_interval_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }

    /// Search deadline: one polling interval ahead of the poller's cutoff so a
    /// truncated decision is published before the poller gives up
    pub fn search_budget_ms(&self) -> u64 {
        self.effective_budget_ms().saturating_sub(self.polling_interval_ms)
    }
}

/// Reachability search execution
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub parallel: bool,
    pub min_cpus_for_parallel: usize,
    /// Heap pops between deadline checks
    pub deadline_check_interval: usize,
}

/// Move selection
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    pub avoid_tight_spaces: bool,
    /// Fixed seed for reproducible tie-breaks; mixed with the turn number
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Snake appearance reported on GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    #[serde(default)]
    pub taunt: Option<String>,
}

/// Turn recording configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecordingConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 500,
                network_overhead_ms: 100,
                polling_interval_ms: 5,
            },
            search: SearchConfig {
                parallel: true,
                min_cpus_for_parallel: 2,
                deadline_check_interval: 32,
            },
            selection: SelectionConfig {
                avoid_tight_spaces: true,
                rng_seed: None,
            },
            appearance: AppearanceConfig {
                author: "kaa".to_string(),
                color: "#3E8914".to_string(),
                head: "tongue".to_string(),
                tail: "round-bum".to_string(),
                taunt: Some("sssss".to_string()),
            },
            recording: RecordingConfig {
                enabled: false,
                log_file_path: "kaa_turns.jsonl".to_string(),
            },
        }
    }

    /// Applies overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_record_path(env::var(RECORD_PATH_ENV).ok())
    }

    fn with_record_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            self.recording.enabled = true;
            self.recording.log_file_path = path;
        }
        self
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default()
            .unwrap_or_else(|e| {
                log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
                Self::default_hardcoded()
            })
            .with_env_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.effective_budget_ms(), 400);
    }

    #[test]
    fn test_search_deadline_precedes_poller_cutoff() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.search_budget_ms(), 395);
        assert!(config.timing.search_budget_ms() < config.timing.effective_budget_ms());

        let mut config = Config::default_hardcoded();
        config.timing.polling_interval_ms = 1_000;
        assert_eq!(config.timing.search_budget_ms(), 0);
    }

    #[test]
    fn test_effective_budget_saturates() {
        let mut config = Config::default_hardcoded();
        config.timing.network_overhead_ms = 900;
        assert_eq!(config.timing.effective_budget_ms(), 0);
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(
            file_config.timing.response_time_budget_ms,
            hardcoded_config.timing.response_time_budget_ms
        );
        assert_eq!(
            file_config.timing.network_overhead_ms,
            hardcoded_config.timing.network_overhead_ms
        );
        assert_eq!(
            file_config.timing.polling_interval_ms,
            hardcoded_config.timing.polling_interval_ms
        );
        assert_eq!(file_config.search.parallel, hardcoded_config.search.parallel);
        assert_eq!(
            file_config.search.min_cpus_for_parallel,
            hardcoded_config.search.min_cpus_for_parallel
        );
        assert_eq!(
            file_config.search.deadline_check_interval,
            hardcoded_config.search.deadline_check_interval
        );
        assert_eq!(
            file_config.selection.avoid_tight_spaces,
            hardcoded_config.selection.avoid_tight_spaces
        );
        assert_eq!(file_config.selection.rng_seed, hardcoded_config.selection.rng_seed);
        assert_eq!(file_config.appearance.color, hardcoded_config.appearance.color);
        assert_eq!(file_config.appearance.taunt, hardcoded_config.appearance.taunt);
        assert_eq!(file_config.recording.enabled, hardcoded_config.recording.enabled);
        assert_eq!(
            file_config.recording.log_file_path,
            hardcoded_config.recording.log_file_path
        );
    }

    #[test]
    fn test_optional_fields_default_when_missing() {
        let config = Config::from_toml_str(
            r##"
            [timing]
            response_time_budget_ms = 300
            network_overhead_ms = 50
            polling_interval_ms = 10

            [search]
            parallel = false
            min_cpus_for_parallel = 4
            deadline_check_interval = 8

            [selection]
            avoid_tight_spaces = false

            [appearance]
            author = "a"
            color = "#000000"
            head = "default"
            tail = "default"

            [recording]
            enabled = false
            log_file_path = "x.jsonl"
            "##,
        )
        .unwrap();

        assert_eq!(config.selection.rng_seed, None);
        assert_eq!(config.appearance.taunt, None);
        assert_eq!(config.timing.effective_budget_ms(), 250);
        assert_eq!(config.appearance.color, "#000000");
    }

    #[test]
    fn test_record_path_override_enables_recording() {
        let config = Config::default_hardcoded().with_record_path(Some("/tmp/turns.jsonl".to_string()));
        assert!(config.recording.enabled);
        assert_eq!(config.recording.log_file_path, "/tmp/turns.jsonl");

        let config = Config::default_hardcoded().with_record_path(Some("  ".to_string()));
        assert!(!config.recording.enabled);

        let config = Config::default_hardcoded().with_record_path(None);
        assert!(!config.recording.enabled);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        assert!(Config::from_file("nonexistent.toml").is_err());
        assert!(Config::from_toml_str("[timing]\nresponse_time_budget_ms = \"soon\"").is_err());
    }
}
