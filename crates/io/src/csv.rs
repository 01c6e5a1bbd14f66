// CSV import/export for the reconciliation pipeline

use std::io::Read;
use std::path::Path;

use boardtrace_recon::error::ReconError;
use boardtrace_recon::model::{BoardNode, MatchedSelection, MissingSelection, SelectionEvent};
use boardtrace_recon::table::Table;

/// Read a CSV export into a [`Table`]. Header row required; the delimiter is
/// sniffed from the first lines (spreadsheet exports vary between comma,
/// semicolon and tab).
pub fn read_table(path: &Path, name: &str) -> Result<Table, ReconError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(name, headers);
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        table.rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, common
/// for Excel-exported CSVs).
fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines. The delimiter producing the most consistent field count
/// (>1 field) wins; ties go to the higher field count.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b','];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

fn writer(path: &Path) -> Result<::csv::Writer<std::fs::File>, ReconError> {
    ::csv::Writer::from_path(path)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

fn io_err(path: &Path) -> impl Fn(::csv::Error) -> ReconError + '_ {
    move |e| ReconError::Io(format!("{}: {e}", path.display()))
}

/// Write the normalized board table (`formatted_board.csv`).
pub fn write_board(path: &Path, nodes: &[BoardNode]) -> Result<(), ReconError> {
    let mut w = writer(path)?;
    w.write_record([
        "full_pattern",
        "menu_pattern",
        "button",
        "selection",
        "menu_title",
        "is_menu",
        "menu_multiplicity",
        "multiplicity",
    ])
    .map_err(io_err(path))?;
    for n in nodes {
        w.write_record([
            n.full_pattern.as_str(),
            n.menu_pattern.as_str(),
            n.button.as_str(),
            n.selection.as_str(),
            n.menu_title.as_str(),
            if n.is_menu { "true" } else { "false" },
            &n.menu_multiplicity.to_string(),
            &n.multiplicity.to_string(),
        ])
        .map_err(io_err(path))?;
    }
    w.flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

/// Write the normalized selection table (`formatted_selections.csv`).
pub fn write_selections(path: &Path, events: &[SelectionEvent]) -> Result<(), ReconError> {
    let mut w = writer(path)?;
    w.write_record([
        "line_number",
        "location_path_code",
        "selection",
        "source",
        "word",
        "menu",
        "menu_ff",
    ])
    .map_err(io_err(path))?;
    for e in events {
        w.write_record([
            e.line_number.to_string().as_str(),
            e.location_path_code.as_deref().unwrap_or(""),
            e.selection.as_str(),
            &e.source.to_string(),
            e.word.as_deref().unwrap_or(""),
            e.menu.as_deref().unwrap_or(""),
            e.menu_ff.as_deref().unwrap_or(""),
        ])
        .map_err(io_err(path))?;
    }
    w.flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

/// Write the combined matched-selection table (`full_selections.csv`).
/// Board columns are empty for unmatched rows; the rows stay in.
pub fn write_matched(path: &Path, matched: &[MatchedSelection]) -> Result<(), ReconError> {
    let mut w = writer(path)?;
    w.write_record([
        "line_number",
        "location_path_code",
        "selection",
        "source",
        "word",
        "menu",
        "menu_ff",
        "full_pattern",
        "menu_pattern",
        "button",
        "menu_title",
        "is_menu",
        "menu_multiplicity",
        "multiplicity",
        "is_match",
        "match_type",
    ])
    .map_err(io_err(path))?;
    for m in matched {
        let e = &m.event;
        let empty = String::new();
        let (full_pattern, menu_pattern, button, menu_title, is_menu, menu_mult, mult) =
            match &m.node {
                Some(n) => (
                    n.full_pattern.clone(),
                    n.menu_pattern.clone(),
                    n.button.clone(),
                    n.menu_title.clone(),
                    (if n.is_menu { "true" } else { "false" }).to_string(),
                    n.menu_multiplicity.to_string(),
                    n.multiplicity.to_string(),
                ),
                None => (
                    empty.clone(),
                    empty.clone(),
                    empty.clone(),
                    empty.clone(),
                    empty.clone(),
                    empty.clone(),
                    empty,
                ),
            };
        w.write_record([
            e.line_number.to_string().as_str(),
            e.location_path_code.as_deref().unwrap_or(""),
            e.selection.as_str(),
            &e.source.to_string(),
            e.word.as_deref().unwrap_or(""),
            e.menu.as_deref().unwrap_or(""),
            e.menu_ff.as_deref().unwrap_or(""),
            &full_pattern,
            &menu_pattern,
            &button,
            &menu_title,
            &is_menu,
            &menu_mult,
            &mult,
            if m.is_match { "true" } else { "false" },
            &m.match_type.to_string(),
        ])
        .map_err(io_err(path))?;
    }
    w.flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

/// Write the missing-selections diagnostic (`missing_selections.csv`),
/// already sorted descending by count.
pub fn write_missing(path: &Path, missing: &[MissingSelection]) -> Result<(), ReconError> {
    let mut w = writer(path)?;
    w.write_record(["selection", "count"]).map_err(io_err(path))?;
    for m in missing {
        w.write_record([m.selection.as_str(), &m.count.to_string()])
            .map_err(io_err(path))?;
    }
    w.flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn read_basic_table() {
        let f = temp_csv("Word/Phrase,Menu\nJazz,\n,Music\n");
        let t = read_table(f.path(), "selections").unwrap();
        assert_eq!(t.headers, vec!["Word/Phrase", "Menu"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][0].as_deref(), Some("Jazz"));
        assert_eq!(t.rows[0][1], None);
        assert_eq!(t.rows[1][1].as_deref(), Some("Music"));
    }

    #[test]
    fn sniffs_semicolon_delimiter() {
        let f = temp_csv("L1;L2\nA Music;\n;AB Jazz\n");
        let t = read_table(f.path(), "board").unwrap();
        assert_eq!(t.headers, vec!["L1", "L2"]);
        assert_eq!(t.rows[1][1].as_deref(), Some("AB Jazz"));
    }

    #[test]
    fn windows_1252_fallback() {
        let f = tempfile::NamedTempFile::new().unwrap();
        // "Caf<e-acute>,Menu" in Windows-1252 (0xE9 is not valid UTF-8).
        std::fs::write(f.path(), b"Word/Phrase,Menu\nCaf\xe9,\n").unwrap();
        let t = read_table(f.path(), "selections").unwrap();
        assert_eq!(t.rows[0][0].as_deref(), Some("Café"));
    }

    #[test]
    fn matched_round_trip_headers() {
        use boardtrace_recon::model::{MatchType, MatchedSelection, SelectionEvent, Source};
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full_selections.csv");
        let rows = vec![MatchedSelection {
            event: SelectionEvent {
                line_number: 0,
                location_path_code: None,
                selection: "NOTHING".into(),
                source: Source::Final,
                word: Some("Nothing".into()),
                menu: None,
                menu_ff: None,
            },
            is_match: false,
            match_type: MatchType::None,
            node: None,
        }];
        write_matched(&path, &rows).unwrap();

        let t = read_table(&path, "full").unwrap();
        assert_eq!(t.rows.len(), 1);
        let match_type_idx = t.column("match_type").unwrap();
        assert_eq!(t.rows[0][match_type_idx].as_deref(), Some("NONE"));
        let pattern_idx = t.column("full_pattern").unwrap();
        assert_eq!(t.rows[0][pattern_idx], None);
    }
}
