//! Heatmap grids over the physical key layout.
//!
//! The device has 18 buttons in a fixed 3×6 arrangement; button identifiers
//! `A`..`R` map row-major onto it. The layout is a physical constant of the
//! hardware, not derived data.

use boardtrace_recon::model::{BoardNode, MatchedSelection};

pub const BOARD_ROWS: usize = 3;
pub const BOARD_COLS: usize = 6;

/// Button identifier → (row, col) on the physical board.
pub const KEY_MAP: &[(char, (usize, usize))] = &[
    ('A', (0, 0)),
    ('B', (0, 1)),
    ('C', (0, 2)),
    ('D', (0, 3)),
    ('E', (0, 4)),
    ('F', (0, 5)),
    ('G', (1, 0)),
    ('H', (1, 1)),
    ('I', (1, 2)),
    ('J', (1, 3)),
    ('K', (1, 4)),
    ('L', (1, 5)),
    ('M', (2, 0)),
    ('N', (2, 1)),
    ('O', (2, 2)),
    ('P', (2, 3)),
    ('Q', (2, 4)),
    ('R', (2, 5)),
];

pub fn key_position(button: char) -> Option<(usize, usize)> {
    KEY_MAP.iter().find(|(k, _)| *k == button).map(|(_, pos)| *pos)
}

/// A 3×6 grid of press percentages, one cell per physical button.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Grid {
    pub cells: [[f64; BOARD_COLS]; BOARD_ROWS],
}

impl Grid {
    fn from_counts(counts: [[u64; BOARD_COLS]; BOARD_ROWS]) -> Self {
        let total: u64 = counts.iter().flatten().sum();
        let mut cells = [[0.0; BOARD_COLS]; BOARD_ROWS];
        if total > 0 {
            for (i, row) in counts.iter().enumerate() {
                for (j, &c) in row.iter().enumerate() {
                    cells[i][j] = c as f64 / total as f64 * 100.0;
                }
            }
        }
        Grid { cells }
    }

    /// Cells formatted as the renderer annotates them (one decimal, percent).
    pub fn labels(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|v| format!("{v:.1}%")).collect())
            .collect()
    }
}

/// Overall press-frequency grid: every button code traversed in every
/// matched event's full pattern counts one press.
pub fn overall_grid(matched: &[MatchedSelection]) -> Grid {
    let mut counts = [[0u64; BOARD_COLS]; BOARD_ROWS];
    for m in matched {
        let Some(node) = &m.node else { continue };
        for button in node.full_pattern.chars() {
            if let Some((i, j)) = key_position(button) {
                counts[i][j] += 1;
            }
        }
    }
    Grid::from_counts(counts)
}

/// Per-menu grid: selections landing on one menu screen, keyed by the final
/// button pressed there.
pub fn menu_grid(matched: &[MatchedSelection], menu_title: &str) -> Grid {
    let mut counts = [[0u64; BOARD_COLS]; BOARD_ROWS];
    for m in matched {
        let Some(node) = &m.node else { continue };
        if node.menu_title != menu_title {
            continue;
        }
        let Some(button) = node.button.chars().next() else { continue };
        if let Some((i, j)) = key_position(button) {
            counts[i][j] += 1;
        }
    }
    Grid::from_counts(counts)
}

/// Distinct menu titles on a board, sorted. One per-menu grid each.
pub fn menu_titles(board: &[BoardNode]) -> Vec<String> {
    let mut titles: Vec<String> = board.iter().map(|n| n.menu_title.clone()).collect();
    titles.sort();
    titles.dedup();
    titles
}
