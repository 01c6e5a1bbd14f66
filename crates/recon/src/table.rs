use crate::error::ReconError;

/// A loaded tabular file: one header row plus cell values by row.
///
/// Cells are `None` when the source field was empty; the formatters treat
/// empty and absent identically.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of a column by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the first matching column among several candidate names.
    pub fn column_of(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|c| self.column(c))
    }

    /// Like [`column`](Self::column) but errors with the table name attached.
    pub fn require(&self, name: &str) -> Result<usize, ReconError> {
        self.column(name).ok_or_else(|| ReconError::MissingColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Cell value at (row, col), flattening missing cells to `None`.
    pub fn cell<'a>(&'a self, row: &'a [Option<String>], col: usize) -> Option<&'a str> {
        row.get(col).and_then(|c| c.as_deref()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(
            "t",
            vec!["A".into(), "B".into(), "C".into()],
        );
        t.rows.push(vec![Some("1".into()), None, Some("".into())]);
        t
    }

    #[test]
    fn column_lookup() {
        let t = sample();
        assert_eq!(t.column("B"), Some(1));
        assert_eq!(t.column("Z"), None);
        assert_eq!(t.column_of(&["Z", "C"]), Some(2));
    }

    #[test]
    fn require_reports_table_name() {
        let t = sample();
        let err = t.require("Z").unwrap_err();
        assert!(err.to_string().contains("'t'"));
        assert!(err.to_string().contains("'Z'"));
    }

    #[test]
    fn empty_cells_are_none() {
        let t = sample();
        let row = &t.rows[0];
        assert_eq!(t.cell(row, 0), Some("1"));
        assert_eq!(t.cell(row, 1), None);
        assert_eq!(t.cell(row, 2), None); // empty string flattens to None
        assert_eq!(t.cell(row, 9), None); // short row
    }
}
