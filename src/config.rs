// Configuration loading and parsing (prop-assistant.toml).
//
// Every knob has a compiled-in default so the pipeline runs with no config
// file at all; a file overrides selectively. Scoring weights default per
// sport and are resolved through `Config::weights()`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board::Direction;
use crate::scoring::scorer::ScoreWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

/// The sport variant being analyzed. Selects the default weight profile,
/// recency window, and stat-definition registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nba,
    Nhl,
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Strong-candidate thresholds applied after scoring, before assembly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum final score for a candidate to qualify.
    pub min_score: f64,
    /// Minimum hits inside the recency window.
    pub min_recent_hits: usize,
    /// Restrict to a single bet direction (e.g. the unders-only strategy).
    pub direction: Option<Direction>,
    /// Keep only candidates matching a positional tendency rule.
    pub positional_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            min_score: 70.0,
            min_recent_hits: 5,
            direction: None,
            positional_only: false,
        }
    }
}

/// Ticket generation shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TicketSettings {
    pub num_tickets: usize,
    pub games_per_ticket: usize,
    /// Per-game pick count is drawn uniformly from this inclusive range.
    pub picks_per_game_min: usize,
    pub picks_per_game_max: usize,
    /// Games with fewer qualifying candidates than this are not sampled.
    pub min_candidates_per_game: usize,
    /// Order candidates by position priority before score (positional
    /// ticket strategy).
    pub positional_ordering: bool,
}

impl Default for TicketSettings {
    fn default() -> Self {
        TicketSettings {
            num_tickets: 3,
            games_per_ticket: 4,
            picks_per_game_min: 5,
            picks_per_game_max: 6,
            min_candidates_per_game: 3,
            positional_ordering: false,
        }
    }
}

/// Input/output artifact locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub board: String,
    pub gamelogs: String,
    pub recommendations: String,
    pub outliers: String,
    pub tickets_dir: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            board: "data/props.json".into(),
            gamelogs: "data/gamelogs.json".into(),
            recommendations: "data/recommendations.json".into(),
            outliers: "data/outliers.json".into(),
            tickets_dir: "tickets_dir".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sport: Sport,
    /// Apply the contextual multipliers to base scores.
    pub apply_context: bool,
    /// Weight profile override; defaults per sport when absent.
    pub scoring: Option<ScoreWeights>,
    pub filter: FilterConfig,
    pub tickets: TicketSettings,
    pub data: DataPaths,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sport: Sport::Nba,
            apply_context: true,
            scoring: None,
            filter: FilterConfig::default(),
            tickets: TicketSettings::default(),
            data: DataPaths::default(),
        }
    }
}

impl Config {
    /// The resolved scoring weight profile for this run.
    pub fn weights(&self) -> ScoreWeights {
        self.scoring
            .clone()
            .unwrap_or_else(|| ScoreWeights::defaults(self.sport))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate configuration from a TOML file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load from an optional path; compiled-in defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_config_from(p),
        None => {
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let weights = config.weights();

    if weights.window == 0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.window".into(),
            message: "must be greater than 0".into(),
        });
    }

    let weight_fields: &[(&str, f64)] = &[
        ("scoring.historical", weights.historical),
        ("scoring.recent", weights.recent),
        ("scoring.consistency", weights.consistency),
        ("scoring.margin_scale", weights.margin_scale),
        ("scoring.margin_cap", weights.margin_cap),
    ];
    for (name, val) in weight_fields {
        if *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    if weights.sample_bonus_cap < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.sample_bonus_cap".into(),
            message: format!("must be >= 0, got {}", weights.sample_bonus_cap),
        });
    }
    if weights.sample_saturation == 0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.sample_saturation".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.filter.min_score < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "filter.min_score".into(),
            message: format!("must be >= 0, got {}", config.filter.min_score),
        });
    }

    let tickets = &config.tickets;
    let count_fields: &[(&str, usize)] = &[
        ("tickets.num_tickets", tickets.num_tickets),
        ("tickets.games_per_ticket", tickets.games_per_ticket),
        ("tickets.picks_per_game_min", tickets.picks_per_game_min),
        ("tickets.picks_per_game_max", tickets.picks_per_game_max),
        ("tickets.min_candidates_per_game", tickets.min_candidates_per_game),
    ];
    for (name, val) in count_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }
    if tickets.picks_per_game_min > tickets.picks_per_game_max {
        return Err(ConfigError::ValidationError {
            field: "tickets.picks_per_game_min".into(),
            message: format!(
                "must be <= picks_per_game_max ({} > {})",
                tickets.picks_per_game_min, tickets.picks_per_game_max
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
