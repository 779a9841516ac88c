// Pipeline orchestration: join the props board with game logs, score every
// offered outcome, filter to strong candidates, and hand the survivors to
// the ticket assembler.
//
// Degradation policy: a player with no game log, or a candidate with
// insufficient data, fails individually with a warning and the batch
// continues. Only unreadable input documents abort a stage.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::board::{self, BoardError, PropsBoard};
use crate::config::Config;
use crate::gamelog::{self, GameLogs, GamelogError};
use crate::report::{self, ReportError};
use crate::scoring::positional::Position;
use crate::scoring::{self, scorer, ScoredProp};
use crate::ticket::assembler::{self, RunContext, Ticket};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Gamelog(#[from] GamelogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to encode or decode {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The scoring stage output: strong candidates ready for assembly, plus the
/// positional outliers surfaced separately when the positional strategy is
/// active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub props: Vec<ScoredProp>,
    pub outliers: Vec<ScoredProp>,
}

/// Score every offered outcome on the board against the game logs and keep
/// the candidates passing the configured thresholds.
pub fn evaluate_board(board: &PropsBoard, logs: &GameLogs, config: &Config) -> Evaluation {
    let weights = config.weights();
    let candidates = board::flatten_candidates(board);
    let total = candidates.len();

    let mut missing_logs: HashSet<String> = HashSet::new();
    let mut scored: Vec<ScoredProp> = Vec::new();

    for candidate in candidates {
        let Some(games) = logs.get(&candidate.player) else {
            if missing_logs.insert(candidate.player.clone()) {
                warn!("no game log for '{}', skipping their props", candidate.player);
            }
            continue;
        };

        if let Some(direction) = config.filter.direction {
            if candidate.direction != direction {
                continue;
            }
        }

        let result = scorer::score_prop(
            config.sport,
            games,
            &candidate.stat,
            candidate.line,
            candidate.direction,
            &weights,
            config.apply_context,
        );
        if result.insufficient_data {
            continue;
        }
        if result.final_score < config.filter.min_score
            || result.recent_hits < config.filter.min_recent_hits
        {
            continue;
        }

        let positional = candidate
            .position
            .as_deref()
            .and_then(Position::parse)
            .map(|p| {
                scoring::positional::evaluate(
                    p,
                    &candidate.stat,
                    candidate.direction,
                    result.avg_value,
                )
            });

        scored.push(ScoredProp {
            candidate,
            result,
            positional,
        });
    }

    scored.sort_by(|a, b| {
        b.selection_score()
            .partial_cmp(&a.selection_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let evaluation = if config.filter.positional_only {
        let (props, outliers) = scoring::partition_positional(scored);
        Evaluation { props, outliers }
    } else {
        Evaluation {
            props: scored,
            outliers: Vec::new(),
        }
    };

    info!(
        "scored {} offered outcomes: {} strong candidates, {} outliers, {} players without logs",
        total,
        evaluation.props.len(),
        evaluation.outliers.len(),
        missing_logs.len()
    );
    evaluation
}

// ---------------------------------------------------------------------------
// File stages
// ---------------------------------------------------------------------------

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        }
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| PipelineError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, text).map_err(|e| PipelineError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Scoring stage: board + game logs -> recommendations artifact.
pub fn run_score(config: &Config) -> Result<Evaluation, PipelineError> {
    let board = board::load_board(Path::new(&config.data.board))?;
    let logs = gamelog::load_gamelogs(Path::new(&config.data.gamelogs))?;

    let evaluation = evaluate_board(&board, &logs, config);

    write_json(&evaluation.props, Path::new(&config.data.recommendations))?;
    if !evaluation.outliers.is_empty() {
        write_json(&evaluation.outliers, Path::new(&config.data.outliers))?;
    }
    info!(
        "wrote {} recommendations to {}",
        evaluation.props.len(),
        config.data.recommendations
    );
    Ok(evaluation)
}

fn load_recommendations(path: &Path) -> Result<Vec<ScoredProp>, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| PipelineError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Ticket stage from in-memory candidates.
pub fn generate_and_write_tickets<R: Rng>(
    props: &[ScoredProp],
    config: &Config,
    rng: &mut R,
) -> Result<Vec<Ticket>, PipelineError> {
    let mut ctx = RunContext::new();
    let tickets = assembler::generate_tickets(props, &config.tickets, &mut ctx, rng);
    report::write_tickets(&tickets, Path::new(&config.data.tickets_dir))?;
    for ticket in &tickets {
        info!(
            "ticket {}: {} picks across {} games, {:.2}x combined odds",
            ticket.number,
            ticket.delivered_picks(),
            ticket.delivered_games,
            ticket.combined_odds
        );
    }
    Ok(tickets)
}

/// Ticket stage: recommendations artifact -> ticket directories.
pub fn run_tickets<R: Rng>(config: &Config, rng: &mut R) -> Result<Vec<Ticket>, PipelineError> {
    let props = load_recommendations(Path::new(&config.data.recommendations))?;
    generate_and_write_tickets(&props, config, rng)
}

/// Full pipeline: score, then generate tickets from the fresh evaluation.
pub fn run_all<R: Rng>(config: &Config, rng: &mut R) -> Result<Vec<Ticket>, PipelineError> {
    let evaluation = run_score(config)?;
    generate_and_write_tickets(&evaluation.props, config, rng)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
