//! Selection Formatter: raw selection-log export → normalized event table.

use crate::config::SelectionSourceConfig;
use crate::error::ReconError;
use crate::model::{SelectionEvent, Source};
use crate::normalize::normalize_label_with;
use crate::table::Table;

#[derive(Debug)]
pub struct SelectionOutput {
    pub events: Vec<SelectionEvent>,
    pub dropped: usize,
}

/// Format a raw selection log into events, preserving original row order.
///
/// The terminal-press column name varies by export vintage; candidates are
/// tried in order. Rows whose coalesced value normalizes to nothing are
/// dropped and counted. `menu_ff` forward-fills the menu column across the
/// original row order, so menus recorded on dropped rows still propagate.
pub fn format_selections(
    table: &Table,
    config: &SelectionSourceConfig,
    corrections: &[(String, String)],
) -> Result<SelectionOutput, ReconError> {
    let word_idx = table
        .column_of(&config.word_columns.iter().map(String::as_str).collect::<Vec<_>>())
        .ok_or_else(|| ReconError::SchemaMismatch {
            table: table.name.clone(),
            detail: format!(
                "none of the terminal-press columns {:?} are present",
                config.word_columns
            ),
        })?;
    let menu_idx = table.require(&config.menu_column)?;
    let path_code_idx = table.column(&config.path_code_column);

    let mut events = Vec::with_capacity(table.rows.len());
    let mut dropped = 0;
    let mut menu_ff: Option<String> = None;

    for row in &table.rows {
        let word = table.cell(row, word_idx);
        let menu = table.cell(row, menu_idx);

        // Forward-fill before the drop decision: a row can carry a menu
        // worth propagating even if its own selection normalizes away.
        if let Some(m) = menu.and_then(|m| normalize_label_with(m, corrections)) {
            menu_ff = Some(m);
        }

        let source = if word.is_some() {
            Source::Final
        } else {
            Source::Menu
        };

        let selection = match word
            .or(menu)
            .and_then(|v| normalize_label_with(v, corrections))
        {
            Some(s) => s,
            None => {
                dropped += 1;
                continue;
            }
        };

        let location_path_code = path_code_idx
            .and_then(|i| table.cell(row, i))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        events.push(SelectionEvent {
            line_number: events.len() as u64,
            location_path_code,
            selection,
            source,
            word: word.map(String::from),
            menu: menu.map(String::from),
            menu_ff: menu_ff.clone(),
        });
    }

    Ok(SelectionOutput { events, dropped })
}
