//! Reconciliation engine: join formatted selections against formatted board
//! nodes and keep at most one best match per event.

use std::collections::HashMap;

use crate::board::format_board;
use crate::config::DatasetConfig;
use crate::error::ReconError;
use crate::model::{
    BoardNode, MatchType, MatchedSelection, MissingSelection, RunMeta, RunResult, SelectionEvent,
    Source,
};
use crate::selections::format_selections;
use crate::summary::compute_summary;
use crate::table::Table;

/// Pre-loaded raw tables for one dataset run.
pub struct RunInput {
    pub board: Table,
    pub selections: Table,
}

/// Reconciliation output. `matched` has exactly one row per input event, in
/// input order; the engine verifies that rather than assuming it.
#[derive(Debug)]
pub struct ReconcileOutput {
    pub matched: Vec<MatchedSelection>,
    /// Events whose winning tier was satisfied by more than one node.
    pub ambiguous: usize,
    /// Labels with no board counterpart at all, with event counts,
    /// descending.
    pub missing: Vec<MissingSelection>,
    /// Set when the output diverged from the input in count or order.
    /// Indicates a bug in the matching logic, not bad data.
    pub integrity: Option<IntegrityViolation>,
}

/// How reconciliation output diverged from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Row counts differ.
    Count { expected: usize, actual: usize },
    /// Counts agree but rows left their original sequence; `line_number` is
    /// the first input row found out of place.
    Order { line_number: u64 },
}

/// Classify every selection event against the board.
///
/// Tier priority per event: CODE_MATCH > UNIQUE_MATCH > FORWARD_FILL > NONE.
/// Within a tier, ties are broken by lowest `full_pattern` lexicographically
/// and counted in `ambiguous`. Equivalent to a cross join filtered by the
/// tier predicates, but runs off hash indexes keyed on the path code and the
/// normalized label.
pub fn reconcile(selections: &[SelectionEvent], board: &[BoardNode]) -> ReconcileOutput {
    let mut by_pattern: HashMap<&str, &BoardNode> = HashMap::new();
    for node in board {
        // full_pattern is unique by invariant; keep the first if it is not.
        by_pattern.entry(&node.full_pattern).or_insert(node);
    }
    let mut by_selection: HashMap<&str, Vec<&BoardNode>> = HashMap::new();
    for node in board {
        by_selection.entry(&node.selection).or_default().push(node);
    }

    let mut matched = Vec::with_capacity(selections.len());
    let mut ambiguous = 0;
    let mut missing_counts: HashMap<&str, usize> = HashMap::new();

    for event in selections {
        let label_candidates: &[&BoardNode] = by_selection
            .get(event.selection.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if label_candidates.is_empty() {
            *missing_counts.entry(event.selection.as_str()).or_insert(0) += 1;
        }

        let (match_type, node) = classify(event, &by_pattern, label_candidates, &mut ambiguous);

        matched.push(MatchedSelection {
            event: event.clone(),
            is_match: node.is_some(),
            match_type,
            node: node.cloned(),
        });
    }

    let integrity = verify_order(selections, &matched);

    let mut missing: Vec<MissingSelection> = missing_counts
        .into_iter()
        .map(|(selection, count)| MissingSelection {
            selection: selection.to_string(),
            count,
        })
        .collect();
    missing.sort_by(|a, b| b.count.cmp(&a.count).then(a.selection.cmp(&b.selection)));

    ReconcileOutput {
        matched,
        ambiguous,
        missing,
        integrity,
    }
}

/// Evaluate the tiers for one event. Returns the winning tier and node.
fn classify<'a>(
    event: &SelectionEvent,
    by_pattern: &HashMap<&str, &'a BoardNode>,
    label_candidates: &[&'a BoardNode],
    ambiguous: &mut usize,
) -> (MatchType, Option<&'a BoardNode>) {
    // Tier 1: manual path code. Authoritative, label ignored entirely.
    if let Some(code) = event.location_path_code.as_deref() {
        if let Some(&node) = by_pattern.get(code) {
            return (MatchType::CodeMatch, Some(node));
        }
    }

    // Tier 2: label unique board-wide among nodes of the matching kind.
    let unique: Vec<&BoardNode> = label_candidates
        .iter()
        .copied()
        .filter(|n| {
            n.multiplicity == 1
                && match event.source {
                    Source::Menu => n.is_menu,
                    Source::Final => !n.is_menu,
                }
        })
        .collect();
    if let Some(node) = pick(unique, ambiguous) {
        return (MatchType::UniqueMatch, Some(node));
    }

    // Tier 3: terminal label disambiguated by the menu the user was last in.
    if event.source == Source::Final {
        let ff: Vec<&BoardNode> = label_candidates
            .iter()
            .copied()
            .filter(|n| {
                !n.is_menu
                    && n.menu_multiplicity == 1
                    && event.menu_ff.as_deref() == Some(n.menu_title.as_str())
            })
            .collect();
        if let Some(node) = pick(ff, ambiguous) {
            return (MatchType::ForwardFill, Some(node));
        }
    }

    (MatchType::None, None)
}

/// Reduce a tier's satisfying candidates to one winner. More than one
/// candidate is a data inconsistency; take the lowest `full_pattern` and
/// count the tie.
fn pick<'a>(mut candidates: Vec<&'a BoardNode>, ambiguous: &mut usize) -> Option<&'a BoardNode> {
    match candidates.len() {
        0 => None,
        1 => candidates.pop(),
        _ => {
            *ambiguous += 1;
            candidates.sort_by(|a, b| a.full_pattern.cmp(&b.full_pattern));
            candidates.first().copied()
        }
    }
}

/// Core no-data-loss property: one output row per input row, same
/// `line_number` sequence.
fn verify_order(
    selections: &[SelectionEvent],
    matched: &[MatchedSelection],
) -> Option<IntegrityViolation> {
    if selections.len() != matched.len() {
        return Some(IntegrityViolation::Count {
            expected: selections.len(),
            actual: matched.len(),
        });
    }
    selections
        .iter()
        .zip(matched)
        .find(|(s, m)| s.line_number != m.event.line_number)
        .map(|(s, _)| IntegrityViolation::Order {
            line_number: s.line_number,
        })
}

/// Run the full pipeline for one dataset: format both tables, reconcile,
/// summarize. Pure with respect to its arguments; the CLI invokes this once
/// per dataset config.
pub fn run(config: &DatasetConfig, input: &RunInput) -> Result<RunResult, ReconError> {
    let corrections = config.correction_pairs();

    let board_out = format_board(&input.board, &config.board, &corrections)?;
    let selection_out = format_selections(&input.selections, &config.selections, &corrections)?;

    let recon = reconcile(&selection_out.events, &board_out.nodes);

    if let Some(violation) = recon.integrity {
        if config.fail_on_count_mismatch {
            return Err(match violation {
                IntegrityViolation::Count { expected, actual } => {
                    ReconError::CountMismatch { expected, actual }
                }
                IntegrityViolation::Order { line_number } => {
                    ReconError::OrderMismatch { line_number }
                }
            });
        }
    }

    let mut summary = compute_summary(
        &recon.matched,
        recon.ambiguous,
        board_out.dropped,
        selection_out.dropped,
    );
    summary.count_mismatch = recon.integrity.is_some();

    Ok(RunResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            iteration: config.iteration.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        board: board_out.nodes,
        selections: selection_out.events,
        matched: recon.matched,
        missing: recon.missing,
    })
}
