use std::collections::HashMap;

use crate::model::{MatchType, MatchedSelection, RunSummary};

/// Compute summary statistics for one reconciliation run.
pub fn compute_summary(
    matched: &[MatchedSelection],
    ambiguous: usize,
    board_rows_dropped: usize,
    selection_rows_dropped: usize,
) -> RunSummary {
    let mut match_type_counts: HashMap<String, usize> = HashMap::new();
    let mut code_matches = 0;
    let mut unique_matches = 0;
    let mut forward_fills = 0;
    let mut unmatched = 0;

    for m in matched {
        *match_type_counts.entry(m.match_type.to_string()).or_insert(0) += 1;
        match m.match_type {
            MatchType::CodeMatch => code_matches += 1,
            MatchType::UniqueMatch => unique_matches += 1,
            MatchType::ForwardFill => forward_fills += 1,
            MatchType::None => unmatched += 1,
        }
    }

    RunSummary {
        total_events: matched.len(),
        matched: code_matches + unique_matches + forward_fills,
        unmatched,
        code_matches,
        unique_matches,
        forward_fills,
        ambiguous,
        count_mismatch: false,
        board_rows_dropped,
        selection_rows_dropped,
        match_type_counts,
    }
}
