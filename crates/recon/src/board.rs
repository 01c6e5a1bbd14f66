//! Board Formatter: raw board export → normalized tree-node table.

use std::collections::{HashMap, HashSet};

use crate::config::{BoardLayout, BoardSourceConfig};
use crate::error::ReconError;
use crate::model::{BoardNode, MAIN_MENU, UNKNOWN_MENU};
use crate::normalize::normalize_label_with;
use crate::table::Table;

/// Formatter output: nodes in input row order plus the count of rows that
/// failed normalization and were dropped.
#[derive(Debug)]
pub struct BoardOutput {
    pub nodes: Vec<BoardNode>,
    pub dropped: usize,
}

/// Format a raw board export into tree nodes.
///
/// Fails with a schema error before any row processing when none of the
/// configured columns are present. Rows whose terminal value is null or
/// cannot be split into a pattern and a label are dropped and counted.
pub fn format_board(
    table: &Table,
    config: &BoardSourceConfig,
    corrections: &[(String, String)],
) -> Result<BoardOutput, ReconError> {
    let raw = match config.layout {
        BoardLayout::Levels => extract_levels(table, config)?,
        BoardLayout::Lookup => extract_lookup(table, config)?,
    };

    let mut dropped = 0;
    let mut partial: Vec<(String, String)> = Vec::new();
    for entry in raw {
        match entry {
            Some((pattern, label_raw)) => {
                match normalize_label_with(&label_raw, corrections) {
                    Some(selection) if !pattern.is_empty() => {
                        partial.push((pattern, selection));
                    }
                    _ => dropped += 1,
                }
            }
            None => dropped += 1,
        }
    }

    Ok(BoardOutput {
        nodes: derive_nodes(partial),
        dropped,
    })
}

/// Levels layout: coalesce the per-depth columns deepest-first, then split
/// the combined "<path code> <label>" value on its first space.
fn extract_levels(
    table: &Table,
    config: &BoardSourceConfig,
) -> Result<Vec<Option<(String, String)>>, ReconError> {
    // Deepest first; columns absent from this export vintage are skipped.
    let indices: Vec<usize> = config
        .level_columns
        .iter()
        .rev()
        .filter_map(|c| table.column(c))
        .collect();
    if indices.is_empty() {
        return Err(ReconError::SchemaMismatch {
            table: table.name.clone(),
            detail: format!(
                "none of the level columns {:?} are present",
                config.level_columns
            ),
        });
    }

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let terminal = indices.iter().find_map(|&i| table.cell(row, i));
        out.push(terminal.and_then(split_terminal));
    }
    Ok(out)
}

/// Lookup layout: a dedicated path-code column plus a label column.
fn extract_lookup(
    table: &Table,
    config: &BoardSourceConfig,
) -> Result<Vec<Option<(String, String)>>, ReconError> {
    let pattern_idx = table
        .column_of(&config.pattern_columns.iter().map(String::as_str).collect::<Vec<_>>())
        .ok_or_else(|| ReconError::SchemaMismatch {
            table: table.name.clone(),
            detail: format!(
                "none of the path-code columns {:?} are present",
                config.pattern_columns
            ),
        })?;
    let label_idx = table
        .column_of(&config.label_columns.iter().map(String::as_str).collect::<Vec<_>>())
        .ok_or_else(|| ReconError::SchemaMismatch {
            table: table.name.clone(),
            detail: format!(
                "none of the label columns {:?} are present",
                config.label_columns
            ),
        })?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let pattern = table.cell(row, pattern_idx);
        let label = table.cell(row, label_idx);
        out.push(match (pattern, label) {
            (Some(p), Some(l)) => Some((p.trim().to_string(), l.to_string())),
            _ => None,
        });
    }
    Ok(out)
}

/// Split a combined terminal value on the first space after normalizing
/// non-breaking spaces. The part before the space is the path code.
fn split_terminal(value: &str) -> Option<(String, String)> {
    let cleaned = value.replace('\u{a0}', " ");
    let trimmed = cleaned.trim_start();
    let (pattern, label) = trimmed.split_once(' ')?;
    if pattern.is_empty() {
        return None;
    }
    Some((pattern.to_string(), label.to_string()))
}

/// Derive parent links, menu flags, and multiplicity counters.
fn derive_nodes(partial: Vec<(String, String)>) -> Vec<BoardNode> {
    // Parent resolution joins menu_pattern against full_pattern. First
    // occurrence wins when a pattern repeats; duplicates are tolerated.
    let mut label_by_pattern: HashMap<String, String> = HashMap::new();
    for (pattern, selection) in &partial {
        label_by_pattern
            .entry(pattern.clone())
            .or_insert_with(|| selection.clone());
    }

    let menu_patterns: HashSet<String> = partial
        .iter()
        .filter(|(p, _)| p.chars().count() > 1)
        .map(|(p, _)| {
            let mut chars: Vec<char> = p.chars().collect();
            chars.pop();
            chars.into_iter().collect()
        })
        .collect();

    struct Shape {
        full_pattern: String,
        menu_pattern: String,
        button: String,
        selection: String,
        menu_title: String,
        is_menu: bool,
    }

    let shapes: Vec<Shape> = partial
        .into_iter()
        .map(|(full_pattern, selection)| {
            let mut chars: Vec<char> = full_pattern.chars().collect();
            let button = chars.pop().map(String::from).unwrap_or_default();
            let menu_pattern: String = chars.into_iter().collect();

            let menu_title = if menu_pattern.is_empty() {
                MAIN_MENU.to_string()
            } else {
                match label_by_pattern.get(menu_pattern.as_str()) {
                    Some(parent) => parent.to_string(),
                    None => UNKNOWN_MENU.to_string(),
                }
            };
            let is_menu = menu_patterns.contains(&full_pattern);

            Shape {
                full_pattern,
                menu_pattern,
                button,
                selection,
                menu_title,
                is_menu,
            }
        })
        .collect();

    // multiplicity: nodes sharing (selection, is_menu).
    // menu_multiplicity: nodes sharing (selection, menu_title) — the
    // collision count inside one named menu, which is all the forward-fill
    // tier can see.
    let mut kind_counts: HashMap<(String, bool), u32> = HashMap::new();
    let mut menu_counts: HashMap<(String, String), u32> = HashMap::new();
    for s in &shapes {
        *kind_counts
            .entry((s.selection.clone(), s.is_menu))
            .or_insert(0) += 1;
        *menu_counts
            .entry((s.selection.clone(), s.menu_title.clone()))
            .or_insert(0) += 1;
    }

    shapes
        .into_iter()
        .map(|s| {
            let multiplicity = kind_counts[&(s.selection.clone(), s.is_menu)];
            let menu_multiplicity = menu_counts[&(s.selection.clone(), s.menu_title.clone())];
            BoardNode {
                full_pattern: s.full_pattern,
                menu_pattern: s.menu_pattern,
                button: s.button,
                selection: s.selection,
                menu_title: s.menu_title,
                is_menu: s.is_menu,
                menu_multiplicity,
                multiplicity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardSourceConfig;

    fn levels_config() -> BoardSourceConfig {
        toml::from_str(r#"file = "board.csv""#).unwrap()
    }

    fn lookup_config() -> BoardSourceConfig {
        toml::from_str(r#"file = "board.csv"
layout = "lookup""#)
            .unwrap()
    }

    fn levels_table(rows: &[[Option<&str>; 3]]) -> Table {
        let mut t = Table::new("board", vec!["L1".into(), "L2".into(), "L3".into()]);
        for row in rows {
            t.rows
                .push(row.iter().map(|c| c.map(String::from)).collect());
        }
        t
    }

    fn music_board() -> Table {
        levels_table(&[
            [Some("A Music"), None, None],
            [None, Some("AB Jazz"), None],
            [None, Some("AC Classical"), None],
            [None, None, Some("ACA Beethoven and Dvorak")],
            [Some("B Food"), None, None],
        ])
    }

    #[test]
    fn formats_levels_layout() {
        let out = format_board(&music_board(), &levels_config(), &[]).unwrap();
        assert_eq!(out.dropped, 0);
        assert_eq!(out.nodes.len(), 5);

        let music = &out.nodes[0];
        assert_eq!(music.full_pattern, "A");
        assert_eq!(music.menu_pattern, "");
        assert_eq!(music.button, "A");
        assert_eq!(music.selection, "MUSIC");
        assert_eq!(music.menu_title, MAIN_MENU);
        assert!(music.is_menu);

        let jazz = &out.nodes[1];
        assert_eq!(jazz.full_pattern, "AB");
        assert_eq!(jazz.menu_pattern, "A");
        assert_eq!(jazz.button, "B");
        assert_eq!(jazz.menu_title, "MUSIC");
        assert!(!jazz.is_menu);

        // Literal correction applied during board formatting too.
        let duo = &out.nodes[3];
        assert_eq!(duo.selection, "BEETHOVEN & DVORAK");
        assert_eq!(duo.menu_title, "CLASSICAL");
    }

    #[test]
    fn deepest_level_wins() {
        let t = levels_table(&[[Some("A Music"), Some("AB Jazz"), None]]);
        let out = format_board(&t, &levels_config(), &[]).unwrap();
        assert_eq!(out.nodes[0].full_pattern, "AB");
        assert_eq!(out.nodes[0].selection, "JAZZ");
    }

    #[test]
    fn null_and_unsplittable_rows_dropped_and_counted() {
        let t = levels_table(&[
            [Some("A Music"), None, None],
            [None, None, None],
            [Some("LONESOME"), None, None], // no space → no label
        ]);
        let out = format_board(&t, &levels_config(), &[]).unwrap();
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn unresolved_parent_is_unknown() {
        let t = levels_table(&[
            [Some("A Music"), None, None],
            [None, None, Some("AQX Orphan")], // parent "AQ" never defined
        ]);
        let out = format_board(&t, &levels_config(), &[]).unwrap();
        assert_eq!(out.nodes[1].menu_title, UNKNOWN_MENU);
    }

    #[test]
    fn non_breaking_spaces_in_terminal_value() {
        let t = levels_table(&[[Some("A\u{a0}Big\u{a0}Band"), None, None]]);
        let out = format_board(&t, &levels_config(), &[]).unwrap();
        assert_eq!(out.nodes[0].full_pattern, "A");
        assert_eq!(out.nodes[0].selection, "BIG BAND");
    }

    #[test]
    fn multiplicity_counters() {
        // "JAZZ" appears as a terminal under two unrelated menus, and also
        // as a menu of its own.
        let t = levels_table(&[
            [Some("A Music"), None, None],
            [Some("B Radio"), None, None],
            [None, Some("AB Jazz"), None],
            [None, Some("BB Jazz"), None],
            [None, Some("AC Jazz"), None],
            [None, None, Some("ACA Bebop")],
        ]);
        let out = format_board(&t, &levels_config(), &[]).unwrap();
        let by_pattern = |p: &str| out.nodes.iter().find(|n| n.full_pattern == p).unwrap();

        // Terminal JAZZ nodes: two share (JAZZ, false).
        assert_eq!(by_pattern("AB").multiplicity, 2);
        assert_eq!(by_pattern("BB").multiplicity, 2);
        // Menu JAZZ is its own kind group.
        assert!(by_pattern("AC").is_menu);
        assert_eq!(by_pattern("AC").multiplicity, 1);

        // Within MUSIC, both the terminal AB and the menu AC carry "JAZZ".
        assert_eq!(by_pattern("AB").menu_multiplicity, 2);
        assert_eq!(by_pattern("AC").menu_multiplicity, 2);
        // Within RADIO the label is unique.
        assert_eq!(by_pattern("BB").menu_multiplicity, 1);
    }

    #[test]
    fn lookup_layout() {
        let mut t = Table::new("board", vec!["Lookup".into(), "Label".into()]);
        t.rows.push(vec![Some("A".into()), Some("Music".into())]);
        t.rows.push(vec![Some("AB".into()), Some("Jazz".into())]);
        t.rows.push(vec![None, Some("dangling".into())]);
        let out = format_board(&t, &lookup_config(), &[]).unwrap();
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.dropped, 1);
        assert_eq!(out.nodes[1].menu_title, "MUSIC");
    }

    #[test]
    fn reingests_own_output_columns() {
        let mut t = Table::new(
            "board",
            vec!["full_pattern".into(), "selection".into(), "is_menu".into()],
        );
        t.rows.push(vec![
            Some("A".into()),
            Some("MUSIC".into()),
            Some("true".into()),
        ]);
        t.rows.push(vec![
            Some("AB".into()),
            Some("JAZZ".into()),
            Some("false".into()),
        ]);
        let out = format_board(&t, &lookup_config(), &[]).unwrap();
        assert_eq!(out.nodes[0].selection, "MUSIC");
        assert!(out.nodes[0].is_menu);
        assert_eq!(out.nodes[1].menu_title, "MUSIC");
    }

    #[test]
    fn missing_schema_is_fatal() {
        let t = Table::new("board", vec!["Unrelated".into()]);
        let err = format_board(&t, &levels_config(), &[]).unwrap_err();
        assert!(matches!(err, ReconError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("board"));
    }
}
