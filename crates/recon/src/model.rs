use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One reachable position on the speech board.
///
/// `full_pattern` is the key path from the root (one character per button
/// press) and is unique across the board. `menu_pattern` is `full_pattern`
/// with its last character removed; the empty string denotes the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardNode {
    pub full_pattern: String,
    pub menu_pattern: String,
    pub button: String,
    pub selection: String,
    pub menu_title: String,
    pub is_menu: bool,
    /// Count of nodes sharing this node's label within its parent menu.
    pub menu_multiplicity: u32,
    /// Count of nodes sharing this node's label and menu-vs-terminal kind.
    pub multiplicity: u32,
}

/// Label assigned to children of the root.
pub const MAIN_MENU: &str = "MAIN MENU";

/// Label assigned when a node's parent pattern resolves to no board node.
pub const UNKNOWN_MENU: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// A terminal word/phrase selection.
    Final,
    /// A menu navigated through without a terminal selection.
    Menu,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Final => write!(f, "FINAL"),
            Self::Menu => write!(f, "MENU"),
        }
    }
}

/// One logged interaction, in original log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEvent {
    /// Stable original sequence identity; never reordered or dropped.
    pub line_number: u64,
    /// Manually annotated path code, authoritative when present.
    pub location_path_code: Option<String>,
    /// Normalized label text, joined against board labels.
    pub selection: String,
    pub source: Source,
    /// Raw terminal word/phrase text, if any.
    pub word: Option<String>,
    /// Raw menu label for this event.
    pub menu: Option<String>,
    /// Most recent non-null menu value at or before this event.
    pub menu_ff: Option<String>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Manual path code equals a node's full pattern. Authoritative.
    CodeMatch,
    /// Label uniquely identifies a node of the matching kind board-wide.
    UniqueMatch,
    /// Label ambiguous board-wide but unique within the forward-filled menu.
    ForwardFill,
    None,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CodeMatch => write!(f, "CODE_MATCH"),
            Self::UniqueMatch => write!(f, "UNIQUE_MATCH"),
            Self::ForwardFill => write!(f, "FORWARD_FILL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// A selection event extended with its reconciliation outcome.
///
/// Produced once per engine run; never mutated afterward. `node` is populated
/// iff `is_match` is true.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedSelection {
    #[serde(flatten)]
    pub event: SelectionEvent,
    pub is_match: bool,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<BoardNode>,
}

/// A selection label with no board label counterpart at all, with the number
/// of events carrying it. Pre-reconciliation diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct MissingSelection {
    pub selection: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_events: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub code_matches: usize,
    pub unique_matches: usize,
    pub forward_fills: usize,
    /// Events whose winning tier had more than one satisfying node,
    /// resolved by the deterministic tie-break.
    pub ambiguous: usize,
    /// Output diverged from input in count or order. Only observable when
    /// `fail_on_count_mismatch` is off; otherwise the run aborts.
    pub count_mismatch: bool,
    pub board_rows_dropped: usize,
    pub selection_rows_dropped: usize,
    pub match_type_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub iteration: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Everything one dataset run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub board: Vec<BoardNode>,
    pub selections: Vec<SelectionEvent>,
    pub matched: Vec<MatchedSelection>,
    pub missing: Vec<MissingSelection>,
}
