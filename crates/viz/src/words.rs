//! Cross-dataset word summary: how a board's vocabulary shifts between
//! iterations.

use std::collections::BTreeMap;

use boardtrace_recon::model::BoardNode;

/// Count of board entries sharing (selection, iteration, is_menu).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WordCount {
    pub selection: String,
    pub iteration: String,
    pub is_menu: bool,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IterationTotals {
    pub iteration: String,
    pub total_count: usize,
    /// Distinct labels on the iteration's board, regardless of kind; a label
    /// present as both a menu and a terminal counts once.
    pub n_unique_words: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WordSummary {
    pub words: Vec<WordCount>,
    pub totals: Vec<IterationTotals>,
}

/// Summarize one or more formatted boards, each tagged with its iteration
/// label. Output is sorted by (selection, iteration, is_menu).
pub fn word_summary(boards: &[(String, Vec<BoardNode>)]) -> WordSummary {
    let mut counts: BTreeMap<(String, String, bool), usize> = BTreeMap::new();
    for (iteration, nodes) in boards {
        for node in nodes {
            if node.selection.is_empty() {
                continue;
            }
            *counts
                .entry((node.selection.clone(), iteration.clone(), node.is_menu))
                .or_insert(0) += 1;
        }
    }

    let words: Vec<WordCount> = counts
        .into_iter()
        .map(|((selection, iteration, is_menu), count)| WordCount {
            selection,
            iteration,
            is_menu,
            count,
        })
        .collect();

    // Uniqueness ignores the kind split: fold per-kind counts back into a
    // per-selection map before counting.
    let mut totals_map: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for w in &words {
        *totals_map
            .entry(&w.iteration)
            .or_default()
            .entry(&w.selection)
            .or_insert(0) += w.count;
    }
    let totals = totals_map
        .into_iter()
        .map(|(iteration, by_selection)| IterationTotals {
            iteration: iteration.to_string(),
            total_count: by_selection.values().sum(),
            n_unique_words: by_selection.len(),
        })
        .collect();

    WordSummary { words, totals }
}
