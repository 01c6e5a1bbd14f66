//! `boardtrace-viz` — derived outputs consumed by external renderers.
//!
//! Pure derivation crate: heatmap grids over the physical key layout,
//! categorical breakdowns for bar charts, the Graphviz tree exporter, and
//! cross-dataset word summaries. No plotting here; renderers are external.

pub mod chart;
pub mod grid;
pub mod tree;
pub mod words;

pub use chart::{category_breakdown, CategoryCount};
pub use grid::{menu_grid, menu_titles, overall_grid, Grid, BOARD_COLS, BOARD_ROWS};
pub use tree::board_to_dot;
pub use words::{word_summary, IterationTotals, WordCount, WordSummary};
