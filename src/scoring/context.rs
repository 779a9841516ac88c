// Contextual factors: situational signals derived from a player's ordered
// game-log sequence, each mapped to a multiplicative score adjustment
// conditioned on bet direction.
//
// Every derivation degrades to an explicit "unknown" state with a neutral
// 1.0 multiplier; missing or unparseable data never raises an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::gamelog::GameRecord;

// ---------------------------------------------------------------------------
// Multiplier constants
// ---------------------------------------------------------------------------

/// Home game bonus, applied uniformly regardless of bet direction.
pub const HOME_MULTIPLIER: f64 = 1.04;
/// Back-to-back fatigue: penalize overs, favor unders.
pub const B2B_OVER_MULTIPLIER: f64 = 0.95;
pub const B2B_UNDER_MULTIPLIER: f64 = 1.03;
/// Two or more rest days favor all bets equally.
pub const RESTED_MULTIPLIER: f64 = 1.03;
/// Minutes trend aligned with / against the bet direction.
pub const TREND_WITH_MULTIPLIER: f64 = 1.03;
pub const TREND_AGAINST_MULTIPLIER: f64 = 0.98;

/// Relative minutes change beyond this band classifies as up/down.
const TREND_BAND: f64 = 0.05;
/// Number of most-recent games in the short-term minutes average.
const TREND_RECENT_GAMES: usize = 3;

// ---------------------------------------------------------------------------
// Classified states
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestState {
    BackToBack,
    Rested,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinutesTrend {
    Up,
    Down,
    Stable,
    Unknown,
}

/// The full contextual breakdown for one candidate, reported alongside the
/// combined effect so each factor stays traceable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextAdjustment {
    pub venue: Venue,
    pub rest: RestState,
    pub minutes_trend: MinutesTrend,
    pub home_multiplier: f64,
    pub rest_multiplier: f64,
    pub minutes_multiplier: f64,
}

impl ContextAdjustment {
    /// The product applied to the base score. Factors compose
    /// multiplicatively, never additively.
    pub fn combined(&self) -> f64 {
        self.home_multiplier * self.rest_multiplier * self.minutes_multiplier
    }

    pub fn neutral() -> Self {
        ContextAdjustment {
            venue: Venue::Unknown,
            rest: RestState::Unknown,
            minutes_trend: MinutesTrend::Unknown,
            home_multiplier: 1.0,
            rest_multiplier: 1.0,
            minutes_multiplier: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Classify home/away from the matchup descriptor. The two markers are
/// mutually exclusive; anything ambiguous is unknown.
pub fn classify_venue(matchup: &str) -> Venue {
    let home = matchup.contains(" vs.");
    let away = matchup.contains(" @ ");
    match (home, away) {
        (true, false) => Venue::Home,
        (false, true) => Venue::Away,
        _ => Venue::Unknown,
    }
}

/// Parse a game date. Accepts ISO (`2025-04-09`) and the game-log API form
/// (`APR 09, 2025`, any month casing).
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    let (month, rest) = s.split_once(' ')?;
    let mut fixed = String::with_capacity(s.len());
    let mut chars = month.chars();
    let first = chars.next()?;
    fixed.extend(first.to_uppercase());
    fixed.push_str(&chars.as_str().to_lowercase());
    fixed.push(' ');
    fixed.push_str(rest);
    NaiveDate::parse_from_str(&fixed, "%b %d, %Y").ok()
}

/// Classify rest state from the two most recent game dates.
pub fn classify_rest(games: &[GameRecord]) -> RestState {
    if games.len() < 2 {
        return RestState::Unknown;
    }
    let (Some(latest), Some(previous)) = (
        parse_game_date(&games[0].date),
        parse_game_date(&games[1].date),
    ) else {
        return RestState::Unknown;
    };
    let gap = (latest - previous).num_days();
    if gap < 0 {
        // Out-of-order dates: the sequence contract is broken, don't guess.
        RestState::Unknown
    } else if gap <= 1 {
        RestState::BackToBack
    } else {
        RestState::Rested
    }
}

/// Classify the minutes trend: the mean of the 3 most recent recorded
/// minute values against the season mean over all recorded values.
pub fn classify_minutes_trend(games: &[GameRecord]) -> MinutesTrend {
    let minutes: Vec<f64> = games.iter().filter_map(|g| g.minutes).collect();
    if minutes.len() < TREND_RECENT_GAMES {
        return MinutesTrend::Unknown;
    }
    let recent_avg =
        minutes[..TREND_RECENT_GAMES].iter().sum::<f64>() / TREND_RECENT_GAMES as f64;
    let season_avg = minutes.iter().sum::<f64>() / minutes.len() as f64;
    if season_avg <= 0.0 {
        return MinutesTrend::Unknown;
    }
    let change = (recent_avg - season_avg) / season_avg;
    if change > TREND_BAND {
        MinutesTrend::Up
    } else if change < -TREND_BAND {
        MinutesTrend::Down
    } else {
        MinutesTrend::Stable
    }
}

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

pub fn venue_multiplier(venue: Venue) -> f64 {
    match venue {
        Venue::Home => HOME_MULTIPLIER,
        Venue::Away | Venue::Unknown => 1.0,
    }
}

pub fn rest_multiplier(rest: RestState, direction: Direction) -> f64 {
    match (rest, direction) {
        (RestState::BackToBack, Direction::Over) => B2B_OVER_MULTIPLIER,
        (RestState::BackToBack, Direction::Under) => B2B_UNDER_MULTIPLIER,
        (RestState::Rested, _) => RESTED_MULTIPLIER,
        (RestState::Unknown, _) => 1.0,
    }
}

pub fn minutes_multiplier(trend: MinutesTrend, direction: Direction) -> f64 {
    match (trend, direction) {
        (MinutesTrend::Up, Direction::Over) | (MinutesTrend::Down, Direction::Under) => {
            TREND_WITH_MULTIPLIER
        }
        (MinutesTrend::Up, Direction::Under) | (MinutesTrend::Down, Direction::Over) => {
            TREND_AGAINST_MULTIPLIER
        }
        (MinutesTrend::Stable | MinutesTrend::Unknown, _) => 1.0,
    }
}

/// Derive the full contextual breakdown for one candidate from the player's
/// game-log sequence (most recent first).
pub fn assess(games: &[GameRecord], direction: Direction) -> ContextAdjustment {
    let Some(latest) = games.first() else {
        return ContextAdjustment::neutral();
    };
    let venue = classify_venue(&latest.matchup);
    let rest = classify_rest(games);
    let trend = classify_minutes_trend(games);
    ContextAdjustment {
        venue,
        rest,
        minutes_trend: trend,
        home_multiplier: venue_multiplier(venue),
        rest_multiplier: rest_multiplier(rest, direction),
        minutes_multiplier: minutes_multiplier(trend, direction),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
