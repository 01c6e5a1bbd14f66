use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One dataset run: a board export, a selection-log export, where to put the
/// output tables. Each config is processed independently; the engine carries
/// no state across runs.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Label distinguishing this dataset in combined outputs
    /// (e.g. "iteration_2").
    pub iteration: String,
    pub board: BoardSourceConfig,
    pub selections: SelectionSourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Treat a count/order integrity failure as fatal rather than a warning.
    #[serde(default = "default_true")]
    pub fail_on_count_mismatch: bool,
    /// Extra literal label substitutions, applied after normalization.
    #[serde(default)]
    pub corrections: Vec<Correction>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Correction {
    pub from: String,
    pub to: String,
}

// ---------------------------------------------------------------------------
// Board source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BoardSourceConfig {
    pub file: String,
    #[serde(default)]
    pub layout: BoardLayout,
    /// Per-depth columns for the `levels` layout, shallowest first.
    #[serde(default = "default_level_columns")]
    pub level_columns: Vec<String>,
    /// Path-code column candidates for the `lookup` layout.
    #[serde(default = "default_pattern_columns")]
    pub pattern_columns: Vec<String>,
    /// Label column candidates for the `lookup` layout.
    #[serde(default = "default_label_columns")]
    pub label_columns: Vec<String>,
}

impl BoardSourceConfig {
    /// Config for re-ingesting an already-formatted board table (lookup
    /// layout over the `full_pattern`/`selection` columns). Formatting is
    /// idempotent beyond recomputed derived counters.
    pub fn formatted() -> Self {
        Self {
            file: String::new(),
            layout: BoardLayout::Lookup,
            level_columns: default_level_columns(),
            pattern_columns: default_pattern_columns(),
            label_columns: default_label_columns(),
        }
    }
}

/// Which export vintage the board file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardLayout {
    /// Per-depth columns `L1..Ln`; the deepest non-null value per row holds
    /// a combined "<path code> <label>" string.
    Levels,
    /// A single path-code column plus a label column.
    Lookup,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::Levels
    }
}

fn default_level_columns() -> Vec<String> {
    ["L1", "L2", "L3", "L4", "L5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_pattern_columns() -> Vec<String> {
    // "full_pattern" lets an already-formatted board table be re-ingested.
    vec!["Lookup".into(), "Path Code".into(), "full_pattern".into()]
}

fn default_label_columns() -> Vec<String> {
    vec!["Label".into(), "Word/Phrase".into(), "selection".into()]
}

// ---------------------------------------------------------------------------
// Selection source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionSourceConfig {
    pub file: String,
    /// Terminal-press column candidates, tried in order (export vintages).
    #[serde(default = "default_word_columns")]
    pub word_columns: Vec<String>,
    #[serde(default = "default_menu_column")]
    pub menu_column: String,
    /// Manually annotated path-code column, honored when present.
    #[serde(default = "default_path_code_column")]
    pub path_code_column: String,
}

fn default_word_columns() -> Vec<String> {
    vec!["Word/Phrase".into(), "Destination Word".into()]
}

fn default_menu_column() -> String {
    "Menu".into()
}

fn default_path_code_column() -> String {
    "Location path code".into()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for the output tables; defaults to the config's directory.
    #[serde(default)]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DatasetConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: DatasetConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        if self.iteration.is_empty() {
            return Err(ReconError::ConfigValidation(
                "iteration must not be empty".into(),
            ));
        }
        if self.board.file.is_empty() {
            return Err(ReconError::ConfigValidation(
                "board.file must not be empty".into(),
            ));
        }
        if self.selections.file.is_empty() {
            return Err(ReconError::ConfigValidation(
                "selections.file must not be empty".into(),
            ));
        }
        if self.board.layout == BoardLayout::Levels && self.board.level_columns.is_empty() {
            return Err(ReconError::ConfigValidation(
                "board.level_columns must not be empty for the levels layout".into(),
            ));
        }
        if self.selections.word_columns.is_empty() {
            return Err(ReconError::ConfigValidation(
                "selections.word_columns must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Corrections as (from, to) pairs for the normalizer.
    pub fn correction_pairs(&self) -> Vec<(String, String)> {
        self.corrections
            .iter()
            .map(|c| (c.from.clone(), c.to.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Iteration 2"
iteration = "iteration_2"

[board]
file = "data/iteration_2_board.csv"

[selections]
file = "data/iteration_2_selections.csv"

[output]
dir = "figures/iteration_2"
"#;

    #[test]
    fn parse_valid_with_defaults() {
        let config = DatasetConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Iteration 2");
        assert_eq!(config.iteration, "iteration_2");
        assert_eq!(config.board.layout, BoardLayout::Levels);
        assert_eq!(config.board.level_columns, ["L1", "L2", "L3", "L4", "L5"]);
        assert_eq!(config.selections.menu_column, "Menu");
        assert_eq!(config.selections.path_code_column, "Location path code");
        assert!(config.fail_on_count_mismatch);
        assert!(config.corrections.is_empty());
        assert_eq!(config.output.dir.as_deref(), Some("figures/iteration_2"));
    }

    #[test]
    fn parse_lookup_layout_and_corrections() {
        let input = r#"
name = "Iteration 1"
iteration = "iteration_1"
fail_on_count_mismatch = false

[board]
file = "board.csv"
layout = "lookup"
pattern_columns = ["Path Code"]

[selections]
file = "selections.csv"
word_columns = ["Destination Word"]

[[corrections]]
from = "MOZART"
to = "W. A. MOZART"
"#;
        let config = DatasetConfig::from_toml(input).unwrap();
        assert_eq!(config.board.layout, BoardLayout::Lookup);
        assert!(!config.fail_on_count_mismatch);
        assert_eq!(config.corrections.len(), 1);
        assert_eq!(
            config.correction_pairs(),
            vec![("MOZART".to_string(), "W. A. MOZART".to_string())]
        );
    }

    #[test]
    fn reject_empty_iteration() {
        let input = VALID.replace("iteration = \"iteration_2\"", "iteration = \"\"");
        let err = DatasetConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("iteration"));
    }

    #[test]
    fn reject_empty_board_file() {
        let input = VALID.replace("data/iteration_2_board.csv", "");
        let err = DatasetConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("board.file"));
    }

    #[test]
    fn reject_unknown_layout() {
        let input = format!("{VALID}\n").replace("[board]", "[board]\nlayout = \"wide\"");
        assert!(DatasetConfig::from_toml(&input).is_err());
    }
}
