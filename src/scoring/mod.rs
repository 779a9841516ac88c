// Scoring engine: stat extraction, contextual factors, confidence scoring,
// positional rules.

pub mod context;
pub mod positional;
pub mod scorer;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::board::PropCandidate;
use self::positional::PositionalFlag;
use self::scorer::ScoreResult;

/// A fully evaluated candidate: the bettable outcome, its scoring
/// breakdown, and (when the player's position is known) its positional
/// assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProp {
    pub candidate: PropCandidate,
    pub result: ScoreResult,
    pub positional: Option<PositionalFlag>,
}

impl ScoredProp {
    /// Score used for ranking during selection: the positional confidence
    /// bonus applies only to rule-matching props.
    pub fn selection_score(&self) -> f64 {
        match &self.positional {
            Some(flag) if flag.matches_rule => {
                self.result.final_score * flag.confidence_multiplier
            }
            _ => self.result.final_score,
        }
    }

    /// Position priority for positional ticket ordering; unknown positions
    /// sort last.
    pub fn position_priority(&self) -> u8 {
        self.positional.as_ref().map(|f| f.priority).unwrap_or(5)
    }
}

/// Split scored candidates into rule-matching props and outlier-flagged
/// props. Outliers represent unusual usage for the position and are
/// surfaced separately rather than folded into the standard bucket;
/// candidates matching no rule are dropped.
pub fn partition_positional(props: Vec<ScoredProp>) -> (Vec<ScoredProp>, Vec<ScoredProp>) {
    let mut matched = Vec::new();
    let mut outliers = Vec::new();
    for prop in props {
        let Some(flag) = &prop.positional else { continue };
        if !flag.matches_rule {
            continue;
        }
        if flag.is_outlier {
            outliers.push(prop);
        } else {
            matched.push(prop);
        }
    }
    (matched, outliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::scoring::positional::Position;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn scored(
        score: f64,
        position: Option<Position>,
        stat: &str,
        direction: Direction,
        avg: f64,
    ) -> ScoredProp {
        let candidate = PropCandidate {
            player: "P".into(),
            team: "T".into(),
            position: position.map(|p| p.abbrev().to_string()),
            game: "g".into(),
            game_name: "G".into(),
            stat: stat.into(),
            line: 5.5,
            direction,
            odds: 1.9,
            market_id: "m".into(),
            line_id: "l".into(),
            stat_id: "s".into(),
        };
        let mut result = scorer::score_prop(
            crate::config::Sport::Nba,
            &[],
            stat,
            5.5,
            direction,
            &scorer::ScoreWeights::nba(),
            false,
        );
        result.final_score = score;
        result.avg_value = avg;
        let positional = position.map(|p| positional::evaluate(p, stat, direction, avg));
        ScoredProp {
            candidate,
            result,
            positional,
        }
    }

    #[test]
    fn selection_score_applies_bonus_only_to_matches() {
        let matching = scored(80.0, Some(Position::Center), "rebounds", Direction::Over, 10.0);
        assert!(approx_eq(matching.selection_score(), 80.0 * 1.05, 1e-9));

        let non_matching =
            scored(80.0, Some(Position::Center), "rebounds", Direction::Under, 10.0);
        assert!(approx_eq(non_matching.selection_score(), 80.0, 1e-9));

        let no_position = scored(80.0, None, "rebounds", Direction::Over, 10.0);
        assert!(approx_eq(no_position.selection_score(), 80.0, 1e-9));
    }

    #[test]
    fn partition_separates_outliers_and_drops_non_matches() {
        let props = vec![
            // Matching, in-norm: C rebounds OVER with a typical average.
            scored(82.0, Some(Position::Center), "rebounds", Direction::Over, 10.0),
            // Matching but far outside the norm: outlier bucket.
            scored(78.0, Some(Position::Center), "assists", Direction::Under, 9.0),
            // Direction contradicts the rule: dropped.
            scored(90.0, Some(Position::Center), "rebounds", Direction::Under, 10.0),
            // No position: dropped.
            scored(88.0, None, "rebounds", Direction::Over, 10.0),
        ];

        let (matched, outliers) = partition_positional(props);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].candidate.stat, "rebounds");
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].candidate.stat, "assists");
    }
}
