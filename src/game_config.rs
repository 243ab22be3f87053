// game_config.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "game_config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub country_api_base: String,
    pub min_population: u64,
    pub progress_path: String,
    pub feedback_clear_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            country_api_base: "https://restcountries.com/v3.1/region".to_string(),
            min_population: 100_000,
            progress_path: "progress.json".to_string(),
            feedback_clear_ms: 1500,
            request_timeout_secs: 10,
        }
    }
}

impl GameConfig {
    pub fn load_from_file(filename: &str) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(filename)?;
        let config: GameConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Defaults, then `game_config.json` if present, then `HANGMAN_*`
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_else(|err| {
                warn!(error = %err, file = DEFAULT_CONFIG_FILE, "ignoring unreadable config file");
                Self::default()
            })
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("HANGMAN_COUNTRY_API_BASE") {
            self.country_api_base = v;
        }
        if let Some(v) = lookup("HANGMAN_PROGRESS_PATH") {
            self.progress_path = v;
        }
        if let Some(v) = lookup("HANGMAN_MIN_POPULATION") {
            match v.parse() {
                Ok(parsed) => self.min_population = parsed,
                Err(_) => warn!(value = %v, "HANGMAN_MIN_POPULATION is not a number"),
            }
        }
        if let Some(v) = lookup("HANGMAN_FEEDBACK_CLEAR_MS") {
            match v.parse() {
                Ok(parsed) => self.feedback_clear_ms = parsed,
                Err(_) => warn!(value = %v, "HANGMAN_FEEDBACK_CLEAR_MS is not a number"),
            }
        }
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_clear_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
