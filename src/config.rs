//! Terminal game configuration, read once from the environment.

use std::env;
use std::path::PathBuf;

use crate::core::{EngineConfig, SpawnPolicy};

/// Settings for the interactive terminal game
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Fixed seed for a reproducible game; entropy when `None`.
    pub seed: Option<u64>,
    pub spawn_policy: SpawnPolicy,
    /// Where the best score is kept between runs.
    pub best_score_path: Option<PathBuf>,
    /// Log file; the game logs nowhere when `None`.
    pub log_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            spawn_policy: SpawnPolicy::OnChange,
            best_score_path: default_best_score_path(),
            log_path: None,
        }
    }
}

impl GameConfig {
    /// Create from `TWENTY48_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let seed = non_empty("TWENTY48_SEED").and_then(|s| s.parse().ok());
        let spawn_policy = non_empty("TWENTY48_SPAWN_POLICY")
            .and_then(|s| SpawnPolicy::from_str(&s))
            .unwrap_or_default();
        let best_score_path = non_empty("TWENTY48_BEST_SCORE_PATH")
            .map(PathBuf::from)
            .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join(".tui-2048-best")));
        let log_path = non_empty("TWENTY48_LOG_PATH").map(PathBuf::from);

        Self {
            seed,
            spawn_policy,
            best_score_path,
            log_path,
        }
    }

    pub fn engine_config(&self, best_score: u32) -> EngineConfig {
        EngineConfig {
            spawn_policy: self.spawn_policy,
            best_score,
            ..EngineConfig::default()
        }
    }
}

fn default_best_score_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".tui-2048-best"))
}
