//! `boardtrace-io` — CSV reading and output-table writing.

pub mod csv;

pub use crate::csv::{read_table, write_board, write_matched, write_missing, write_selections};
