// Game-log data contracts and loading.
//
// The retrieval layer writes one JSON document mapping player name to an
// ordered (most-recent-first) list of per-game rows. Rows come from two
// different upstream APIs with different key conventions, so the well-known
// fields are matched by alias and every remaining key is kept raw for the
// stat extractor to interpret.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One completed game for one player.
///
/// `stats` keeps the raw field values untouched; whether a field is numeric
/// is decided at extraction time, not at load time.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Raw game date string (parsed lazily; unparseable dates degrade to
    /// "unknown" rest state rather than failing the load).
    pub date: String,
    /// Matchup descriptor, e.g. "LAL vs. BOS" or "LAL @ BOS".
    pub matchup: String,
    /// Minutes played, converted from numeric or "MM:SS" form.
    pub minutes: Option<f64>,
    /// Raw stat name -> raw value.
    pub stats: HashMap<String, serde_json::Value>,
}

/// All game logs for a pipeline run, keyed by player name.
pub type GameLogs = HashMap<String, Vec<GameRecord>>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GamelogError {
    #[error("failed to read game logs {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse game logs {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

/// One raw game row. The NBA game-log API uses upper-snake keys (GAME_DATE,
/// MATCHUP, MIN); the NHL API uses camelCase (gameDate, toi). Aliases cover
/// both; everything else lands in `stats`.
#[derive(Debug, Deserialize)]
struct RawGameRow {
    #[serde(alias = "GAME_DATE", alias = "gameDate", default)]
    date: Option<String>,
    #[serde(alias = "MATCHUP", alias = "opponent", default)]
    matchup: Option<String>,
    #[serde(alias = "MIN", alias = "toi", default)]
    minutes: Option<serde_json::Value>,
    #[serde(flatten)]
    stats: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Minutes conversion
// ---------------------------------------------------------------------------

/// Convert a raw minutes value to fractional minutes.
///
/// Accepts plain numbers (`34`, `33.5`) and "MM:SS" strings (`"18:42"`,
/// NHL time-on-ice style). Anything else is treated as unrecorded.
pub fn parse_minutes(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().filter(|m| m.is_finite() && *m >= 0.0),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Some((mm, ss)) = s.split_once(':') {
                let mins: f64 = mm.trim().parse().ok()?;
                let secs: f64 = ss.trim().parse().ok()?;
                if mins < 0.0 || !(0.0..60.0).contains(&secs) {
                    return None;
                }
                Some(mins + secs / 60.0)
            } else {
                s.parse::<f64>().ok().filter(|m| m.is_finite() && *m >= 0.0)
            }
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn convert_row(raw: RawGameRow) -> GameRecord {
    GameRecord {
        date: raw.date.unwrap_or_default(),
        matchup: raw.matchup.unwrap_or_default(),
        minutes: raw.minutes.as_ref().and_then(parse_minutes),
        stats: raw.stats,
    }
}

/// Parse game logs from an in-memory JSON value. Malformed rows are skipped
/// with a warning; only a structurally unreadable document is an error.
fn from_value(doc: serde_json::Value) -> Result<GameLogs, serde_json::Error> {
    let per_player: HashMap<String, Vec<serde_json::Value>> = serde_json::from_value(doc)?;

    let mut logs = GameLogs::new();
    for (player, rows) in per_player {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<RawGameRow>(row) {
                Ok(raw) => records.push(convert_row(raw)),
                Err(e) => {
                    warn!("skipping malformed game row for '{player}': {e}");
                }
            }
        }
        logs.insert(player, records);
    }
    Ok(logs)
}

/// Load all game logs from a JSON file.
pub fn load_gamelogs(path: &Path) -> Result<GameLogs, GamelogError> {
    let text = std::fs::read_to_string(path).map_err(|e| GamelogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let doc: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| GamelogError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
    from_value(doc).map_err(|e| GamelogError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
