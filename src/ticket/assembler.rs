// Ticket assembly: selects scored candidates into constrained multi-pick
// tickets with run-scoped de-duplication and aggregate odds.
//
// Two constraint tiers exist. Within one ticket the (player, stat,
// direction) triple is unique; this is a hard invariant and is never
// relaxed. Across the tickets of one generation run the exact (player,
// stat, direction, line) quadruple is a soft preference: the first
// selection pass avoids repeats, a second pass relaxes that when a game
// would otherwise under-fill.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::board::PropCandidate;
use crate::config::TicketSettings;
use crate::scoring::ScoredProp;

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Mutable de-duplication state scoped to one generation run. Repeated or
/// concurrent runs each get their own context, so outcomes stay independent
/// and reproducible.
#[derive(Debug, Default)]
pub struct RunContext {
    used_lines: HashSet<String>,
}

impl RunContext {
    pub fn new() -> Self {
        RunContext::default()
    }
}

fn triple_key(c: &PropCandidate) -> String {
    format!("{}|{}|{}", c.player, c.stat, c.direction)
}

fn quad_key(c: &PropCandidate) -> String {
    format!("{}|{}|{}|{}", c.player, c.stat, c.direction, c.line)
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// One generated ticket. `requested_*` fields surface scope reduction when
/// not enough games or candidates qualified; a shortfall is metadata, not
/// an error.
#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub number: usize,
    pub picks: Vec<ScoredProp>,
    /// Product of all pick odds.
    pub combined_odds: f64,
    /// Display names of the games represented.
    pub games: Vec<String>,
    pub position_counts: BTreeMap<String, usize>,
    pub requested_games: usize,
    pub delivered_games: usize,
    pub requested_picks: usize,
}

impl Ticket {
    pub fn delivered_picks(&self) -> usize {
        self.picks.len()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Sort candidates for selection: descending selection score, optionally
/// grouped by position priority first (positional ticket strategy).
fn sort_for_selection(candidates: &mut [&ScoredProp], positional_ordering: bool) {
    candidates.sort_by(|a, b| {
        let by_score = b
            .selection_score()
            .partial_cmp(&a.selection_score())
            .unwrap_or(std::cmp::Ordering::Equal);
        if positional_ordering {
            a.position_priority()
                .cmp(&b.position_priority())
                .then(by_score)
        } else {
            by_score
        }
    });
}

/// Select up to `want` picks from one game's sorted candidates.
fn select_game_picks<'a>(
    candidates: &[&'a ScoredProp],
    want: usize,
    ticket_triples: &mut HashSet<String>,
    ctx: &mut RunContext,
) -> Vec<&'a ScoredProp> {
    let mut selected = Vec::new();

    // First pass: only props whose exact line has not been used in any
    // ticket of this run.
    for prop in candidates {
        if selected.len() >= want {
            break;
        }
        let triple = triple_key(&prop.candidate);
        if ticket_triples.contains(&triple) {
            continue;
        }
        let quad = quad_key(&prop.candidate);
        if ctx.used_lines.contains(&quad) {
            continue;
        }
        ticket_triples.insert(triple);
        ctx.used_lines.insert(quad);
        selected.push(*prop);
    }

    // Second pass: allow cross-ticket repeats; the per-ticket triple
    // constraint still holds.
    if selected.len() < want {
        for prop in candidates {
            if selected.len() >= want {
                break;
            }
            let triple = triple_key(&prop.candidate);
            if ticket_triples.contains(&triple) {
                continue;
            }
            ticket_triples.insert(triple);
            ctx.used_lines.insert(quad_key(&prop.candidate));
            selected.push(*prop);
        }
    }

    selected
}

/// Generate tickets from scored candidates.
///
/// Games are sampled without replacement from those with at least
/// `min_candidates_per_game` qualifying candidates; when too few games
/// qualify the assembler falls back to every game, largest first, and
/// reduces scope rather than failing.
pub fn generate_tickets<R: Rng>(
    props: &[ScoredProp],
    settings: &TicketSettings,
    ctx: &mut RunContext,
    rng: &mut R,
) -> Vec<Ticket> {
    let mut by_game: BTreeMap<&str, Vec<&ScoredProp>> = BTreeMap::new();
    for prop in props {
        by_game.entry(&prop.candidate.game).or_default().push(prop);
    }
    for candidates in by_game.values_mut() {
        sort_for_selection(candidates, settings.positional_ordering);
    }

    let mut eligible: Vec<&str> = by_game
        .iter()
        .filter(|(_, c)| c.len() >= settings.min_candidates_per_game)
        .map(|(slug, _)| *slug)
        .collect();
    if eligible.len() < settings.games_per_ticket {
        // Not enough well-stocked games: use everything, largest first.
        eligible = by_game.keys().copied().collect();
        eligible.sort_by_key(|slug| std::cmp::Reverse(by_game[slug].len()));
    }

    let mut tickets = Vec::new();
    if eligible.is_empty() {
        return tickets;
    }

    for number in 1..=settings.num_tickets {
        let games_this = settings.games_per_ticket.min(eligible.len());
        let selected_games: Vec<&str> = eligible
            .choose_multiple(rng, games_this)
            .copied()
            .collect();

        let mut picks: Vec<ScoredProp> = Vec::new();
        let mut games: Vec<String> = Vec::new();
        let mut ticket_triples: HashSet<String> = HashSet::new();
        let mut requested_picks = 0;

        for slug in &selected_games {
            let candidates = &by_game[slug];
            let want = rng
                .gen_range(settings.picks_per_game_min..=settings.picks_per_game_max);
            requested_picks += want;

            let game_picks = select_game_picks(candidates, want, &mut ticket_triples, ctx);
            if let Some(first) = candidates.first() {
                games.push(first.candidate.game_name.clone());
            }
            picks.extend(game_picks.into_iter().cloned());
        }

        let combined_odds = picks.iter().map(|p| p.candidate.odds).product();
        let mut position_counts: BTreeMap<String, usize> = BTreeMap::new();
        for pick in &picks {
            let pos = pick
                .candidate
                .position
                .clone()
                .unwrap_or_else(|| "?".to_string());
            *position_counts.entry(pos).or_default() += 1;
        }

        tickets.push(Ticket {
            number,
            picks,
            combined_odds,
            games,
            position_counts,
            requested_games: settings.games_per_ticket,
            delivered_games: games_this,
            requested_picks,
        });
    }

    tickets
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
