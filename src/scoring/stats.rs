// Stat definitions and per-game value extraction.
//
// A stat definition name resolves to one or more raw game-log fields through
// a per-sport static registry. Composite definitions are sums of their
// constituents and are fail-closed: if any constituent is absent or
// non-numeric the whole definition is unavailable for that game, never zero.

use crate::config::Sport;
use crate::gamelog::GameRecord;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// NBA definitions: sportsbook stat name -> game-log fields.
const NBA_DEFINITIONS: &[(&str, &[&str])] = &[
    ("points", &["PTS"]),
    ("assists", &["AST"]),
    ("rebounds", &["REB"]),
    ("steals", &["STL"]),
    ("blocks", &["BLK"]),
    ("turnovers", &["TOV"]),
    ("fg_made", &["FGM"]),
    ("fg_attempted", &["FGA"]),
    ("three_attempted", &["FG3A"]),
    ("threes_made", &["FG3M"]),
    ("ft_made", &["FTM"]),
    ("ft_attempted", &["FTA"]),
    ("points+assists", &["PTS", "AST"]),
    ("points+rebounds", &["PTS", "REB"]),
    ("points+rebounds+assists", &["PTS", "REB", "AST"]),
    ("steals+blocks", &["STL", "BLK"]),
];

/// NHL definitions. The book also offers first-period variants; those are
/// not present in standard game logs, so they are intentionally unregistered
/// and resolve to unavailable.
const NHL_DEFINITIONS: &[(&str, &[&str])] = &[
    ("goals", &["goals"]),
    ("assists", &["assists"]),
    ("points", &["points"]),
    ("shots", &["shots"]),
    ("goals+assists", &["goals", "assists"]),
];

fn registry(sport: Sport) -> &'static [(&'static str, &'static [&'static str])] {
    match sport {
        Sport::Nba => NBA_DEFINITIONS,
        Sport::Nhl => NHL_DEFINITIONS,
    }
}

/// Resolve a definition name to its constituent raw fields.
/// Unknown names resolve to `None` (and therefore extract as unavailable).
pub fn resolve(sport: Sport, name: &str) -> Option<&'static [&'static str]> {
    registry(sport)
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, fields)| *fields)
}

/// Canonicalize a sportsbook stat name: lowercase, composite parts joined
/// with bare `+`, remaining spaces as underscores. "Three Attempted" and
/// "Points + Rebounds" become `three_attempted` and `points+rebounds`.
pub fn normalize_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    lower
        .split('+')
        .map(|part| part.trim().replace(' ', "_"))
        .collect::<Vec<_>>()
        .join("+")
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Sum the given raw fields for one game. `None` if any field is absent or
/// non-numeric.
pub fn extract(record: &GameRecord, fields: &[&str]) -> Option<f64> {
    let mut total = 0.0;
    for field in fields {
        let v = record.stats.get(*field)?.as_f64()?;
        if !v.is_finite() {
            return None;
        }
        total += v;
    }
    Some(total)
}

/// Resolve and extract in one step.
pub fn value(sport: Sport, record: &GameRecord, name: &str) -> Option<f64> {
    let fields = resolve(sport, name)?;
    extract(record, fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
