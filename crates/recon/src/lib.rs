//! `boardtrace-recon` — Selection-to-board reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns classified matches.
//! No CLI or IO dependencies.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod selections;
pub mod summary;
pub mod table;

pub use config::DatasetConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{BoardNode, MatchType, MatchedSelection, RunResult, SelectionEvent, Source};
pub use table::Table;
