// Props-board data contracts: the sportsbook lines the scoring engine
// consumes, and the flat candidate records it evaluates.
//
// The retrieval layer writes one JSON document keyed by game slug; each game
// carries its display name and the per-player markets with every available
// line and its per-direction payout odds.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Bet direction
// ---------------------------------------------------------------------------

/// Direction of a prop wager against its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Over,
    Under,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => write!(f, "OVER"),
            Direction::Under => write!(f, "UNDER"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board document (serde models)
// ---------------------------------------------------------------------------

/// The full props board: game slug -> game entry. BTreeMap keeps iteration
/// order stable across runs.
pub type PropsBoard = BTreeMap<String, GameEntry>;

#[derive(Debug, Clone, Deserialize)]
pub struct GameEntry {
    pub game_name: String,
    #[serde(default)]
    pub start_time: Option<String>,
    pub props: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: Option<String>,
    /// Stat definition name -> market.
    pub props: BTreeMap<String, MarketEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    #[serde(rename = "marketId", deserialize_with = "string_or_number")]
    pub market_id: String,
    #[serde(rename = "swishStatId", deserialize_with = "string_or_number", default)]
    pub stat_id: String,
    #[serde(rename = "allLines")]
    pub lines: Vec<LineEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineEntry {
    pub line: f64,
    #[serde(rename = "lineId", deserialize_with = "string_or_number")]
    pub line_id: String,
    #[serde(rename = "overOdds", default)]
    pub over_odds: Option<f64>,
    #[serde(rename = "underOdds", default)]
    pub under_odds: Option<f64>,
}

/// Upstream identifiers arrive as either JSON strings or numbers depending
/// on the endpoint version; normalize both to strings.
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("failed to read props board {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse props board {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Load a props board from a JSON file. A document that fails to parse at
/// all is fatal; per-candidate problems are handled during flattening.
pub fn load_board(path: &Path) -> Result<PropsBoard, BoardError> {
    let text = std::fs::read_to_string(path).map_err(|e| BoardError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| BoardError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Flat candidates
// ---------------------------------------------------------------------------

/// One bettable outcome: a (player, stat, line, direction) with its payout
/// odds and the upstream identifiers that must be echoed into ticket output
/// unchanged for downstream settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropCandidate {
    pub player: String,
    pub team: String,
    pub position: Option<String>,
    pub game: String,
    pub game_name: String,
    /// Canonical stat definition name (see `scoring::stats`).
    pub stat: String,
    pub line: f64,
    pub direction: Direction,
    pub odds: f64,
    pub market_id: String,
    pub line_id: String,
    pub stat_id: String,
}

/// Flatten a board into candidates, one per (line, direction) with odds on
/// offer. Entries missing required identifiers fail individually with a
/// warning; the rest of the board is unaffected.
pub fn flatten_candidates(board: &PropsBoard) -> Vec<PropCandidate> {
    let mut candidates = Vec::new();

    for (slug, game) in board {
        for player in &game.props {
            if player.name.is_empty() {
                warn!("skipping unnamed player entry in game '{slug}'");
                continue;
            }
            for (stat_key, market) in &player.props {
                if market.market_id.is_empty() {
                    warn!(
                        "skipping market '{stat_key}' for '{}': missing market id",
                        player.name
                    );
                    continue;
                }
                let stat = crate::scoring::stats::normalize_name(stat_key);
                for line in &market.lines {
                    if line.line_id.is_empty() {
                        warn!(
                            "skipping line {} on '{stat_key}' for '{}': missing line id",
                            line.line, player.name
                        );
                        continue;
                    }
                    let mut push = |direction, odds: Option<f64>| {
                        if let Some(odds) = odds.filter(|o| o.is_finite() && *o > 0.0) {
                            candidates.push(PropCandidate {
                                player: player.name.clone(),
                                team: player.team.clone(),
                                position: player.position.clone(),
                                game: slug.clone(),
                                game_name: game.game_name.clone(),
                                stat: stat.clone(),
                                line: line.line,
                                direction,
                                odds,
                                market_id: market.market_id.clone(),
                                line_id: line.line_id.clone(),
                                stat_id: market.stat_id.clone(),
                            });
                        }
                    };
                    push(Direction::Over, line.over_odds);
                    push(Direction::Under, line.under_odds);
                }
            }
        }
    }

    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_board() -> PropsBoard {
        serde_json::from_value(json!({
            "lal-bos-2025-04-09": {
                "game_name": "Lakers @ Celtics",
                "start_time": "2025-04-09T23:30:00Z",
                "props": [
                    {
                        "name": "Jayson Tatum",
                        "team": "Celtics",
                        "position": "PF",
                        "props": {
                            "points": {
                                "marketId": 9001,
                                "swishStatId": "17",
                                "allLines": [
                                    {"line": 27.5, "lineId": "L1",
                                     "overOdds": 1.87, "underOdds": 1.93},
                                    {"line": 30.5, "lineId": "L2",
                                     "overOdds": 2.45, "underOdds": null}
                                ]
                            }
                        }
                    }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn identifiers_accept_strings_and_numbers() {
        let board = sample_board();
        let market = &board["lal-bos-2025-04-09"].props[0].props["points"];
        assert_eq!(market.market_id, "9001");
        assert_eq!(market.stat_id, "17");
    }

    #[test]
    fn flatten_emits_one_candidate_per_offered_direction() {
        let board = sample_board();
        let candidates = flatten_candidates(&board);

        // 27.5 has both directions, 30.5 only OVER.
        assert_eq!(candidates.len(), 3);

        let over = candidates
            .iter()
            .find(|c| c.line == 27.5 && c.direction == Direction::Over)
            .unwrap();
        assert_eq!(over.player, "Jayson Tatum");
        assert_eq!(over.game, "lal-bos-2025-04-09");
        assert_eq!(over.market_id, "9001");
        assert_eq!(over.line_id, "L1");
        assert!((over.odds - 1.87).abs() < 1e-10);

        assert!(!candidates
            .iter()
            .any(|c| c.line == 30.5 && c.direction == Direction::Under));
    }

    #[test]
    fn missing_line_id_fails_only_that_line() {
        let board: PropsBoard = serde_json::from_value(json!({
            "g": {
                "game_name": "G",
                "props": [{
                    "name": "P",
                    "team": "T",
                    "props": {
                        "assists": {
                            "marketId": "m",
                            "swishStatId": "s",
                            "allLines": [
                                {"line": 5.5, "lineId": "", "overOdds": 1.8},
                                {"line": 6.5, "lineId": "ok", "overOdds": 2.0}
                            ]
                        }
                    }
                }]
            }
        }))
        .unwrap();

        let candidates = flatten_candidates(&board);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].line_id, "ok");
    }

    #[test]
    fn non_positive_odds_are_not_offered() {
        let board: PropsBoard = serde_json::from_value(json!({
            "g": {
                "game_name": "G",
                "props": [{
                    "name": "P",
                    "team": "T",
                    "props": {
                        "points": {
                            "marketId": "m",
                            "swishStatId": "s",
                            "allLines": [
                                {"line": 10.5, "lineId": "l", "overOdds": 0.0, "underOdds": 1.9}
                            ]
                        }
                    }
                }]
            }
        }))
        .unwrap();

        let candidates = flatten_candidates(&board);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].direction, Direction::Under);
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Over).unwrap(), "\"OVER\"");
        assert_eq!(Direction::Under.to_string(), "UNDER");
    }
}
