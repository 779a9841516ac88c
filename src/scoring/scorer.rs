// Prop confidence scoring.
//
// Combines hit-rate history, recent form, favorable-line margin, value
// consistency, and a sample-size bonus into a single confidence score,
// optionally adjusted by the contextual multipliers. Weights are a fixed
// per-sport heuristic profile carried in configuration, not code paths.

use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::config::Sport;
use crate::gamelog::GameRecord;
use crate::scoring::context::{self, ContextAdjustment};
use crate::scoring::stats;

// ---------------------------------------------------------------------------
// Weight profiles
// ---------------------------------------------------------------------------

/// Scoring weight profile. Two built-in variants exist; the recency window
/// and every weight are configuration, with the invariant that recent form
/// is weighted at least as heavily as full-season history for the
/// short-window sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Recency window: number of most-recent valid games in the
    /// recent-form sub-score.
    pub window: usize,
    /// Weight on the full-history hit rate (percentage points).
    pub historical: f64,
    /// Weight on the recent-window hit rate.
    pub recent: f64,
    /// Weight on the consistency measure.
    pub consistency: f64,
    /// Line margin (% of line) is scaled by this factor...
    pub margin_scale: f64,
    /// ...and capped at this contribution ceiling.
    pub margin_cap: f64,
    /// Sample-size bonus ceiling, reached at `sample_saturation` games.
    pub sample_bonus_cap: f64,
    pub sample_saturation: usize,
}

impl ScoreWeights {
    /// NBA profile: 7-game window, history weighted over recent form.
    pub fn nba() -> Self {
        ScoreWeights {
            window: 7,
            historical: 0.35,
            recent: 0.25,
            consistency: 0.15,
            margin_scale: 2.0,
            margin_cap: 20.0,
            sample_bonus_cap: 5.0,
            sample_saturation: 20,
        }
    }

    /// NHL profile: 5-game window; with low lines (0.5/1.5) recent form
    /// carries more weight than season history.
    pub fn nhl() -> Self {
        ScoreWeights {
            window: 5,
            historical: 0.30,
            recent: 0.40,
            consistency: 0.10,
            margin_scale: 2.0,
            margin_cap: 20.0,
            sample_bonus_cap: 5.0,
            sample_saturation: 20,
        }
    }

    pub fn defaults(sport: Sport) -> Self {
        match sport {
            Sport::Nba => ScoreWeights::nba(),
            Sport::Nhl => ScoreWeights::nhl(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights::nba()
    }
}

// ---------------------------------------------------------------------------
// Score result
// ---------------------------------------------------------------------------

/// The full scoring breakdown for one candidate. Recomputed fresh each run;
/// degraded-data paths yield a zero result with `insufficient_data` set
/// instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub base_score: f64,
    pub final_score: f64,
    /// Present only when contextual adjustment was applied.
    pub context: Option<ContextAdjustment>,
    pub historical_hit_rate: f64,
    pub recent_hits: usize,
    pub recent_hit_rate: f64,
    pub valid_games: usize,
    pub avg_value: f64,
    /// Average minus line, signed so positive is favorable for the bet.
    pub line_diff: f64,
    pub consistency: f64,
    /// The recent-window stat values, most recent first.
    pub recent_values: Vec<f64>,
    pub insufficient_data: bool,
}

impl ScoreResult {
    fn insufficient() -> Self {
        ScoreResult {
            base_score: 0.0,
            final_score: 0.0,
            context: None,
            historical_hit_rate: 0.0,
            recent_hits: 0,
            recent_hit_rate: 0.0,
            valid_games: 0,
            avg_value: 0.0,
            line_diff: 0.0,
            consistency: 0.0,
            recent_values: Vec::new(),
            insufficient_data: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Whether a realized value satisfies the wagered direction. Strict
/// inequality: a value exactly on the line never hits either way.
pub fn is_hit(value: f64, line: f64, direction: Direction) -> bool {
    match direction {
        Direction::Over => value > line,
        Direction::Under => value < line,
    }
}

/// Sample standard deviation (n-1 denominator). Zero for fewer than two
/// values.
fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Score one candidate against the player's full game-log sequence
/// (most recent first). Games where the stat is unavailable are excluded
/// from every count, not treated as misses.
pub fn score_prop(
    sport: Sport,
    games: &[GameRecord],
    stat: &str,
    line: f64,
    direction: Direction,
    weights: &ScoreWeights,
    apply_context: bool,
) -> ScoreResult {
    let values: Vec<f64> = games
        .iter()
        .filter_map(|g| stats::value(sport, g, stat))
        .collect();

    if values.is_empty() {
        return ScoreResult::insufficient();
    }

    let n = values.len();
    let hits = values.iter().filter(|v| is_hit(**v, line, direction)).count();
    let window_n = weights.window.min(n);
    let recent_hits = values[..window_n]
        .iter()
        .filter(|v| is_hit(**v, line, direction))
        .count();

    let historical_hit_rate = hits as f64 / n as f64 * 100.0;
    let recent_hit_rate = recent_hits as f64 / window_n as f64 * 100.0;

    let avg_value = values.iter().sum::<f64>() / n as f64;
    let line_diff = match direction {
        Direction::Over => avg_value - line,
        Direction::Under => line - avg_value,
    };
    let line_diff_pct = if line != 0.0 {
        line_diff / line * 100.0
    } else {
        0.0
    };
    let margin = (line_diff_pct * weights.margin_scale).min(weights.margin_cap);

    let consistency = if n >= 2 {
        let stdev = sample_stdev(&values, avg_value);
        let cv = if avg_value != 0.0 { stdev / avg_value } else { 0.0 };
        (100.0 - cv * 100.0).clamp(0.0, 100.0)
    } else {
        // Cannot be computed from one sample; treated as moderate.
        50.0
    };

    let saturation = weights.sample_saturation.max(1);
    let sample_bonus =
        n.min(saturation) as f64 / saturation as f64 * weights.sample_bonus_cap;

    let base_score = historical_hit_rate * weights.historical
        + recent_hit_rate * weights.recent
        + margin
        + consistency * weights.consistency
        + sample_bonus;

    let (context, final_score) = if apply_context {
        let adjustment = context::assess(games, direction);
        (Some(adjustment), base_score * adjustment.combined())
    } else {
        (None, base_score)
    };

    ScoreResult {
        base_score,
        final_score,
        context,
        historical_hit_rate,
        recent_hits,
        recent_hit_rate,
        valid_games: n,
        avg_value,
        line_diff,
        consistency,
        recent_values: values[..window_n].to_vec(),
        insufficient_data: false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Build a single-stat game log from values, most recent first.
    fn stat_games(field: &str, values: &[f64]) -> Vec<GameRecord> {
        values
            .iter()
            .map(|v| {
                let mut stats = HashMap::new();
                stats.insert(field.to_string(), json!(v));
                GameRecord {
                    date: String::new(),
                    matchup: String::new(),
                    minutes: None,
                    stats,
                }
            })
            .collect()
    }

    fn points_games(values: &[f64]) -> Vec<GameRecord> {
        stat_games("PTS", values)
    }

    fn nba_score(values: &[f64], line: f64, direction: Direction) -> ScoreResult {
        score_prop(
            Sport::Nba,
            &points_games(values),
            "points",
            line,
            direction,
            &ScoreWeights::nba(),
            false,
        )
    }

    // -- hit semantics --

    #[test]
    fn exact_line_value_never_hits() {
        assert!(!is_hit(10.0, 10.0, Direction::Over));
        assert!(!is_hit(10.0, 10.0, Direction::Under));
        assert!(is_hit(10.1, 10.0, Direction::Over));
        assert!(is_hit(9.9, 10.0, Direction::Under));
    }

    // -- reference sequence from the sportsbook sample --

    #[test]
    fn reference_sequence_hit_rates() {
        // [12, 8, 15, 20, 9, 11, 14] against 10.5 OVER hits on games
        // 1, 3, 4, 6, 7: 5/7.
        let result = nba_score(
            &[12.0, 8.0, 15.0, 20.0, 9.0, 11.0, 14.0],
            10.5,
            Direction::Over,
        );
        assert_eq!(result.valid_games, 7);
        assert_eq!(result.recent_hits, 5);
        assert!(approx_eq(result.historical_hit_rate, 500.0 / 7.0, 1e-9));
        // Window 7 covers the whole history: same rate.
        assert!(approx_eq(
            result.recent_hit_rate,
            result.historical_hit_rate,
            1e-9
        ));
    }

    // -- missing data exclusion --

    #[test]
    fn unavailable_games_excluded_not_misses() {
        let mut games = points_games(&[12.0, 15.0]);
        // A game without PTS recorded must not count in any denominator.
        games.insert(
            1,
            GameRecord {
                date: String::new(),
                matchup: String::new(),
                minutes: None,
                stats: HashMap::new(),
            },
        );
        let result = score_prop(
            Sport::Nba,
            &games,
            "points",
            10.5,
            Direction::Over,
            &ScoreWeights::nba(),
            false,
        );
        assert_eq!(result.valid_games, 2);
        assert!(approx_eq(result.historical_hit_rate, 100.0, 1e-9));
    }

    #[test]
    fn no_valid_values_is_insufficient_not_error() {
        let games = points_games(&[12.0]);
        let result = score_prop(
            Sport::Nba,
            &games,
            "rebounds",
            5.5,
            Direction::Over,
            &ScoreWeights::nba(),
            false,
        );
        assert!(result.insufficient_data);
        assert!(approx_eq(result.final_score, 0.0, 1e-12));
        assert_eq!(result.valid_games, 0);

        let empty = nba_score(&[], 10.5, Direction::Over);
        assert!(empty.insufficient_data);
    }

    // -- recent window --

    #[test]
    fn recent_denominator_never_exceeds_valid_count() {
        let result = nba_score(&[12.0, 13.0, 14.0], 10.5, Direction::Over);
        assert_eq!(result.recent_hits, 3);
        assert!(approx_eq(result.recent_hit_rate, 100.0, 1e-9));
        assert_eq!(result.recent_values.len(), 3);
    }

    #[test]
    fn recent_window_uses_only_first_window_games() {
        // 5-game window: recent all hit, older all miss.
        let values = [2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let result = score_prop(
            Sport::Nhl,
            &stat_games("points", &values),
            "points",
            1.5,
            Direction::Over,
            &ScoreWeights::nhl(),
            false,
        );
        assert_eq!(result.recent_hits, 5);
        assert!(approx_eq(result.recent_hit_rate, 100.0, 1e-9));
        assert!(approx_eq(result.historical_hit_rate, 50.0, 1e-9));
    }

    // -- hit rate bounds --

    #[test]
    fn hit_rates_stay_in_bounds() {
        for (values, line) in [
            (vec![0.0, 0.0, 0.0], 5.5),
            (vec![10.0, 20.0, 30.0], 5.5),
            (vec![5.5, 5.5], 5.5),
        ] {
            for direction in [Direction::Over, Direction::Under] {
                let r = nba_score(&values, line, direction);
                assert!((0.0..=100.0).contains(&r.historical_hit_rate));
                assert!((0.0..=100.0).contains(&r.recent_hit_rate));
            }
        }
    }

    // -- consistency --

    #[test]
    fn consistency_single_sample_is_exactly_50() {
        let result = nba_score(&[18.0], 10.5, Direction::Over);
        assert!(approx_eq(result.consistency, 50.0, 1e-12));
    }

    #[test]
    fn consistency_identical_values_is_100() {
        let result = nba_score(&[12.0, 12.0, 12.0, 12.0], 10.5, Direction::Over);
        assert!(approx_eq(result.consistency, 100.0, 1e-12));
    }

    #[test]
    fn consistency_floored_at_zero() {
        // Wildly volatile values push CV above 1.0; the floor holds.
        let result = nba_score(&[0.0, 40.0, 1.0, 38.0, 0.0, 45.0], 10.5, Direction::Over);
        assert!((0.0..=100.0).contains(&result.consistency));
    }

    // -- margin cap --

    #[test]
    fn margin_contribution_is_capped() {
        // Average 40 vs line 10.5: margin pct ~281%, scaled ~562 -> capped.
        // Every game hits, values are identical, so every term is at its
        // ceiling: 100*0.35 + 100*0.25 + 20 + 100*0.15 + bonus.
        let result = nba_score(&[40.0, 40.0, 40.0, 40.0], 10.5, Direction::Over);
        let bonus = 4.0 / 20.0 * 5.0;
        assert!(approx_eq(result.base_score, 35.0 + 25.0 + 20.0 + 15.0 + bonus, 1e-9));
    }

    // -- sample bonus saturation --

    #[test]
    fn sample_bonus_saturates() {
        let at_saturation = nba_score(&vec![20.0; 20], 10.5, Direction::Over);
        let beyond = nba_score(&vec![20.0; 40], 10.5, Direction::Over);
        assert!(approx_eq(at_saturation.base_score, beyond.base_score, 1e-9));
    }

    // -- contextual composition --

    #[test]
    fn adjusted_score_is_product_of_base_and_multipliers() {
        let mut games = points_games(&[12.0, 14.0, 16.0, 11.0, 13.0]);
        games[0].matchup = "LAL vs. BOS".into();
        games[0].date = "2025-04-09".into();
        games[1].date = "2025-04-08".into();
        for g in games.iter_mut() {
            g.minutes = Some(32.0);
        }

        let result = score_prop(
            Sport::Nba,
            &games,
            "points",
            10.5,
            Direction::Over,
            &ScoreWeights::nba(),
            true,
        );
        let adj = result.context.expect("context requested");
        assert!(approx_eq(
            result.final_score,
            result.base_score
                * adj.home_multiplier
                * adj.rest_multiplier
                * adj.minutes_multiplier,
            1e-9
        ));
        // Home + back-to-back over.
        assert!(approx_eq(adj.home_multiplier, 1.04, 1e-12));
        assert!(approx_eq(adj.rest_multiplier, 0.95, 1e-12));
    }

    #[test]
    fn context_disabled_leaves_base_untouched() {
        let result = nba_score(&[12.0, 14.0], 10.5, Direction::Over);
        assert!(result.context.is_none());
        assert!(approx_eq(result.final_score, result.base_score, 1e-12));
    }

    // -- weight profiles --

    #[test]
    fn nhl_profile_weights_recent_form_over_history() {
        let nhl = ScoreWeights::nhl();
        assert!(nhl.recent >= nhl.historical);
        assert_eq!(nhl.window, 5);
        assert_eq!(ScoreWeights::nba().window, 7);
    }
}
