// Ticket artifact writing: one directory per ticket holding the
// human-readable ticket.txt and the machine placement.json.
//
// Writes are whole-file overwrites; re-running a generation replaces the
// previous artifacts in place.

use std::fmt::Write as _;
use std::path::Path;

use crate::scoring::context::{MinutesTrend, RestState, Venue};
use crate::ticket::assembler::Ticket;
use crate::ticket::placement::PlacementSlip;

const RULE_WIDTH: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to encode placement slip {path}: {source}")]
    Encode {
        path: String,
        source: serde_json::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Render the human-readable ticket sheet.
pub fn render_ticket(ticket: &Ticket) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let thin_rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "TICKET #{}", ticket.number);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total Picks: {}", ticket.delivered_picks());
    let _ = writeln!(out, "Combined Odds: {:.2}x", ticket.combined_odds);
    let _ = writeln!(out, "Games: {}", ticket.games.join(", "));
    if ticket.delivered_games < ticket.requested_games
        || ticket.delivered_picks() < ticket.requested_picks
    {
        let _ = writeln!(
            out,
            "Shortfall: {}/{} games, {}/{} picks",
            ticket.delivered_games,
            ticket.requested_games,
            ticket.delivered_picks(),
            ticket.requested_picks
        );
    }
    if !ticket.position_counts.is_empty() {
        let breakdown: Vec<String> = ticket
            .position_counts
            .iter()
            .map(|(pos, count)| format!("{pos}: {count}"))
            .collect();
        let _ = writeln!(out, "Positions: {}", breakdown.join(", "));
    }
    let _ = writeln!(out, "{rule}");

    let mut current_game: Option<&str> = None;
    for pick in &ticket.picks {
        let game = pick.candidate.game_name.as_str();
        if current_game != Some(game) {
            current_game = Some(game);
            let _ = writeln!(out, "\n{game}");
            let _ = writeln!(out, "{thin_rule}");
        }

        let c = &pick.candidate;
        let r = &pick.result;
        let _ = writeln!(out, "{} ({})", c.player, c.team);
        let _ = writeln!(out, "  {} {} {}", c.stat, c.direction, c.line);
        let _ = writeln!(
            out,
            "  Odds: {:.2}x | Score: {:.1} (base: {:.1})",
            c.odds, r.final_score, r.base_score
        );
        let _ = writeln!(
            out,
            "  Recent: {}/{} | Historical: {:.1}%",
            r.recent_hits,
            r.recent_values.len(),
            r.historical_hit_rate
        );
        if let Some(adj) = &r.context {
            let mut parts: Vec<String> = Vec::new();
            match adj.venue {
                Venue::Home => parts.push("Home".into()),
                Venue::Away => parts.push("Away".into()),
                Venue::Unknown => {}
            }
            if adj.rest == RestState::BackToBack {
                parts.push("B2B".into());
            }
            match adj.minutes_trend {
                MinutesTrend::Up => parts.push("Min up".into()),
                MinutesTrend::Down => parts.push("Min down".into()),
                _ => {}
            }
            if !parts.is_empty() {
                let _ = writeln!(out, "  Context: {}", parts.join(" | "));
            }
        }
        if let Some(flag) = &pick.positional {
            if let Some(rule) = &flag.rule {
                let _ = writeln!(out, "  Rule: {rule}");
            }
            if let Some(reason) = &flag.outlier_reason {
                let _ = writeln!(out, "  Outlier: {reason}");
            }
        }
        let values: Vec<String> = r
            .recent_values
            .iter()
            .map(|v| format!("{v:.1}"))
            .collect();
        let _ = writeln!(out, "  Recent values: [{}]", values.join(", "));
        let _ = writeln!(out);
    }

    out
}

/// Write every ticket's directory under `dir`.
pub fn write_tickets(tickets: &[Ticket], dir: &Path) -> Result<(), ReportError> {
    for ticket in tickets {
        let ticket_dir = dir.join(format!("ticket_{}", ticket.number));
        std::fs::create_dir_all(&ticket_dir).map_err(|e| io_err(&ticket_dir, e))?;

        let text_path = ticket_dir.join("ticket.txt");
        std::fs::write(&text_path, render_ticket(ticket))
            .map_err(|e| io_err(&text_path, e))?;

        let slip = PlacementSlip::from_ticket(ticket);
        let slip_path = ticket_dir.join("placement.json");
        let json = serde_json::to_string_pretty(&slip).map_err(|e| ReportError::Encode {
            path: slip_path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&slip_path, json).map_err(|e| io_err(&slip_path, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, PropCandidate};
    use crate::config::Sport;
    use crate::scoring::scorer::{score_prop, ScoreWeights};
    use crate::scoring::ScoredProp;
    use std::collections::BTreeMap;

    fn ticket() -> Ticket {
        let candidate = PropCandidate {
            player: "Big Man".into(),
            team: "DEN".into(),
            position: Some("C".into()),
            game: "den-min".into(),
            game_name: "Nuggets vs Timberwolves".into(),
            stat: "assists".into(),
            line: 4.5,
            direction: Direction::Under,
            odds: 1.52,
            market_id: "m".into(),
            line_id: "l".into(),
            stat_id: "s".into(),
        };
        let mut result = score_prop(
            Sport::Nba,
            &[],
            "assists",
            4.5,
            Direction::Under,
            &ScoreWeights::nba(),
            false,
        );
        result.final_score = 84.2;
        result.base_score = 81.0;
        result.historical_hit_rate = 90.0;
        result.recent_hits = 6;
        result.recent_values = vec![2.0, 1.0, 3.0, 2.0, 1.0, 2.0, 1.0];
        result.insufficient_data = false;

        Ticket {
            number: 2,
            picks: vec![ScoredProp {
                candidate,
                result,
                positional: None,
            }],
            combined_odds: 1.52,
            games: vec!["Nuggets vs Timberwolves".into()],
            position_counts: BTreeMap::from([("C".to_string(), 1)]),
            requested_games: 4,
            delivered_games: 1,
            requested_picks: 5,
        }
    }

    #[test]
    fn rendered_sheet_carries_pick_and_shortfall() {
        let text = render_ticket(&ticket());
        assert!(text.contains("TICKET #2"));
        assert!(text.contains("assists UNDER 4.5"));
        assert!(text.contains("Odds: 1.52x"));
        assert!(text.contains("Recent: 6/7"));
        // Scope was reduced; the shortfall is surfaced, not hidden.
        assert!(text.contains("Shortfall: 1/4 games, 1/5 picks"));
    }

    #[test]
    fn write_tickets_creates_both_artifacts() {
        let dir = std::env::temp_dir().join("prop_assistant_report_test");
        let _ = std::fs::remove_dir_all(&dir);

        write_tickets(&[ticket()], &dir).unwrap();

        let text = std::fs::read_to_string(dir.join("ticket_2/ticket.txt")).unwrap();
        assert!(text.contains("TICKET #2"));

        let slip: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.join("ticket_2/placement.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(slip["outcomes"][0]["line_id"], "l");
        assert_eq!(slip["total_odds"], 1.52);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
