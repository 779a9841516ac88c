// Placement projection: the minimal per-pick record a downstream betting
// placement interface needs, distinct from the full human-auditable pick.
//
// Identifiers are echoed from the board unchanged; settlement matches on
// them, so nothing here may rewrite or normalize them.

use serde::Serialize;

use crate::board::Direction;
use crate::ticket::assembler::Ticket;

#[derive(Debug, Clone, Serialize)]
pub struct PlacementOutcome {
    pub odds: f64,
    pub market_id: String,
    pub line_id: String,
    pub stat_id: String,
    pub line: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementSlip {
    pub outcomes: Vec<PlacementOutcome>,
    pub total_odds: f64,
}

impl PlacementSlip {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let outcomes = ticket
            .picks
            .iter()
            .map(|pick| PlacementOutcome {
                odds: pick.candidate.odds,
                market_id: pick.candidate.market_id.clone(),
                line_id: pick.candidate.line_id.clone(),
                stat_id: pick.candidate.stat_id.clone(),
                line: pick.candidate.line,
                direction: pick.candidate.direction,
            })
            .collect();
        PlacementSlip {
            outcomes,
            total_odds: ticket.combined_odds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PropCandidate;
    use crate::config::Sport;
    use crate::scoring::scorer::{score_prop, ScoreWeights};
    use crate::scoring::ScoredProp;
    use std::collections::BTreeMap;

    fn pick(player: &str, market_id: &str, line_id: &str, odds: f64) -> ScoredProp {
        ScoredProp {
            candidate: PropCandidate {
                player: player.into(),
                team: "T".into(),
                position: None,
                game: "g".into(),
                game_name: "G".into(),
                stat: "points".into(),
                line: 24.5,
                direction: Direction::Over,
                odds,
                market_id: market_id.into(),
                line_id: line_id.into(),
                stat_id: "17".into(),
            },
            result: score_prop(
                Sport::Nba,
                &[],
                "points",
                24.5,
                Direction::Over,
                &ScoreWeights::nba(),
                false,
            ),
            positional: None,
        }
    }

    #[test]
    fn identifiers_echoed_unchanged() {
        let ticket = Ticket {
            number: 1,
            picks: vec![pick("A", "market-91", "line-17", 1.87), pick("B", "m2", "l2", 2.1)],
            combined_odds: 1.87 * 2.1,
            games: vec!["G".into()],
            position_counts: BTreeMap::new(),
            requested_games: 1,
            delivered_games: 1,
            requested_picks: 2,
        };

        let slip = PlacementSlip::from_ticket(&ticket);
        assert_eq!(slip.outcomes.len(), 2);
        assert_eq!(slip.outcomes[0].market_id, "market-91");
        assert_eq!(slip.outcomes[0].line_id, "line-17");
        assert_eq!(slip.outcomes[0].stat_id, "17");
        assert_eq!(slip.outcomes[0].direction, Direction::Over);
        assert!((slip.total_odds - ticket.combined_odds).abs() < 1e-12);
    }

    #[test]
    fn projection_serializes_only_placement_fields() {
        let ticket = Ticket {
            number: 1,
            picks: vec![pick("A", "m", "l", 1.5)],
            combined_odds: 1.5,
            games: vec![],
            position_counts: BTreeMap::new(),
            requested_games: 1,
            delivered_games: 1,
            requested_picks: 1,
        };
        let json = serde_json::to_value(PlacementSlip::from_ticket(&ticket)).unwrap();
        let outcome = &json["outcomes"][0];
        // The placement API gets identifiers and the wager, not the
        // audit trail.
        assert!(outcome.get("player").is_none());
        assert!(outcome.get("score").is_none());
        assert_eq!(outcome["line"], 24.5);
    }
}
