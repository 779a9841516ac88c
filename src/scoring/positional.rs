// Positional rule engine: fixed position/stat tendency tables, positional
// norm z-scores, and outlier flagging.
//
// The tables are static data so sport- or position-specific variants are
// additional entries, not new code paths. Positions or stats absent from a
// table never match: absence is not a signal.

use serde::{Deserialize, Serialize};

use crate::board::Direction;

/// Threshold below which a norm's standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// |z| beyond this many standard deviations from the positional norm flags
/// an outlier.
pub const OUTLIER_THRESHOLD: f64 = 2.0;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Center,
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "SF")]
    SmallForward,
}

impl Position {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Center),
            "PG" => Some(Position::PointGuard),
            "SG" => Some(Position::ShootingGuard),
            "PF" => Some(Position::PowerForward),
            "SF" => Some(Position::SmallForward),
            _ => None,
        }
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::PowerForward => "PF",
            Position::SmallForward => "SF",
        }
    }

    /// Ticket-ordering priority: clearest positional patterns first.
    pub fn priority(&self) -> u8 {
        match self {
            Position::Center => 1,
            Position::PointGuard => 2,
            Position::PowerForward => 3,
            Position::ShootingGuard => 4,
            Position::SmallForward => 5,
        }
    }

    /// Confidence bonus by pattern clarity. Small forwards are too
    /// versatile to reward.
    pub fn confidence_multiplier(&self) -> f64 {
        match self {
            Position::Center => 1.05,
            Position::PointGuard => 1.04,
            Position::PowerForward => 1.03,
            Position::ShootingGuard => 1.02,
            Position::SmallForward => 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

use Direction::{Over, Under};
use Position::{Center, PointGuard, PowerForward, ShootingGuard};

/// Position x stat -> expected bet direction. Small forwards are
/// intentionally absent.
const RULES: &[(Position, &str, Direction)] = &[
    (Center, "assists", Under),
    (Center, "rebounds", Over),
    (Center, "blocks", Over),
    (Center, "three_attempted", Under),
    (Center, "steals", Under),
    (Center, "turnovers", Under),
    (PointGuard, "assists", Over),
    (PointGuard, "steals", Over),
    (PointGuard, "rebounds", Under),
    (PointGuard, "blocks", Under),
    (ShootingGuard, "fg_attempted", Over),
    (ShootingGuard, "three_attempted", Over),
    (ShootingGuard, "assists", Under),
    (ShootingGuard, "rebounds", Under),
    (PowerForward, "rebounds", Over),
    (PowerForward, "assists", Under),
    (PowerForward, "blocks", Over),
];

/// Position x stat -> league-norm (mean, std) for outlier detection.
const NORMS: &[(Position, &str, f64, f64)] = &[
    (Center, "assists", 2.5, 1.5),
    (Center, "rebounds", 10.0, 2.5),
    (Center, "blocks", 1.5, 0.8),
    (Center, "three_attempted", 1.5, 1.0),
    (Center, "steals", 0.8, 0.4),
    (Center, "turnovers", 1.5, 0.5),
    (PointGuard, "assists", 6.5, 2.0),
    (PointGuard, "steals", 1.2, 0.5),
    (PointGuard, "rebounds", 3.5, 1.0),
    (PointGuard, "blocks", 0.3, 0.2),
    (ShootingGuard, "fg_attempted", 14.0, 3.0),
    (ShootingGuard, "three_attempted", 6.0, 2.0),
    (ShootingGuard, "assists", 3.5, 1.5),
    (ShootingGuard, "rebounds", 3.5, 1.0),
    (PowerForward, "rebounds", 7.5, 2.0),
    (PowerForward, "assists", 2.5, 1.2),
    (PowerForward, "blocks", 0.8, 0.5),
];

/// Human-readable justification for each rule.
const RULE_TEXT: &[(Position, &str, Direction, &str)] = &[
    (Center, "assists", Under, "Centers rarely handle the ball - low assists expected"),
    (Center, "rebounds", Over, "Centers are primary rebounders"),
    (Center, "blocks", Over, "Centers provide rim protection"),
    (Center, "three_attempted", Under, "Most centers don't shoot from deep"),
    (Center, "steals", Under, "Centers positioned in paint, not perimeter"),
    (Center, "turnovers", Under, "Fewer touches means fewer turnovers"),
    (PointGuard, "assists", Over, "Point guards are primary ball handlers"),
    (PointGuard, "steals", Over, "PGs guard opposing ball handlers"),
    (PointGuard, "rebounds", Under, "Smallest players on court"),
    (PointGuard, "blocks", Under, "Too short for rim protection"),
    (ShootingGuard, "fg_attempted", Over, "Shooting guards are volume scorers"),
    (ShootingGuard, "three_attempted", Over, "Spot-up shooting role"),
    (ShootingGuard, "assists", Under, "Off-ball movement, not playmaking"),
    (ShootingGuard, "rebounds", Under, "Perimeter players don't crash boards"),
    (PowerForward, "rebounds", Over, "Power forwards are secondary rebounders"),
    (PowerForward, "assists", Under, "Limited playmaking role"),
    (PowerForward, "blocks", Over, "Help-side rim protection"),
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// The direction the tendency table expects for this position/stat pair.
pub fn expected_direction(position: Position, stat: &str) -> Option<Direction> {
    RULES
        .iter()
        .find(|(p, s, _)| *p == position && *s == stat)
        .map(|(_, _, d)| *d)
}

fn norm(position: Position, stat: &str) -> Option<(f64, f64)> {
    NORMS
        .iter()
        .find(|(p, s, _, _)| *p == position && *s == stat)
        .map(|(_, _, mean, std)| (*mean, *std))
}

fn rule_text(position: Position, stat: &str, direction: Direction) -> &'static str {
    RULE_TEXT
        .iter()
        .find(|(p, s, d, _)| *p == position && *s == stat && *d == direction)
        .map(|(_, _, _, text)| *text)
        .unwrap_or("Positional tendency")
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The positional assessment of one scored candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionalFlag {
    pub position: Position,
    /// True only when the bet direction equals the table's expected
    /// direction for this position/stat.
    pub matches_rule: bool,
    pub rule: Option<String>,
    pub priority: u8,
    pub confidence_multiplier: f64,
    /// Z-score of the player's season average against the positional norm,
    /// when a norm exists.
    pub z_score: Option<f64>,
    pub is_outlier: bool,
    pub outlier_reason: Option<String>,
}

/// Evaluate a candidate's (position, stat, direction) against the tendency
/// and norm tables, using the player's season average for the stat.
pub fn evaluate(
    position: Position,
    stat: &str,
    direction: Direction,
    season_avg: f64,
) -> PositionalFlag {
    let matches_rule = expected_direction(position, stat) == Some(direction);
    let rule = matches_rule.then(|| rule_text(position, stat, direction).to_string());

    let z_score = norm(position, stat).and_then(|(mean, std)| {
        (std > STDEV_EPSILON).then(|| (season_avg - mean) / std)
    });
    let is_outlier = z_score.is_some_and(|z| z.abs() > OUTLIER_THRESHOLD);
    let outlier_reason = if is_outlier {
        let z = z_score.unwrap_or_default();
        let (mean, _) = norm(position, stat).unwrap_or_default();
        let side = if z > 0.0 { "above" } else { "below" };
        Some(format!(
            "season avg {:.1} is {:.1} std devs {} the {} norm ({:.1})",
            season_avg,
            z.abs(),
            side,
            position.abbrev(),
            mean
        ))
    } else {
        None
    };

    PositionalFlag {
        position,
        matches_rule,
        rule,
        priority: position.priority(),
        confidence_multiplier: position.confidence_multiplier(),
        z_score,
        is_outlier,
        outlier_reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
