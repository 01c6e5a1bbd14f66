use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad layout name, empty file path, etc.).
    ConfigValidation(String),
    /// Required input column absent from a table's header row.
    MissingColumn { table: String, column: String },
    /// Input table matches no recognized schema.
    SchemaMismatch { table: String, detail: String },
    /// Reconciliation output diverged from its input in row count.
    CountMismatch { expected: usize, actual: usize },
    /// Reconciliation output left its original row order.
    OrderMismatch { line_number: u64 },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::SchemaMismatch { table, detail } => {
                write!(f, "table '{table}': unrecognized schema ({detail})")
            }
            Self::CountMismatch { expected, actual } => {
                write!(
                    f,
                    "reconciliation integrity failure: expected {expected} row(s), produced {actual}"
                )
            }
            Self::OrderMismatch { line_number } => {
                write!(
                    f,
                    "reconciliation integrity failure: row order diverged at line {line_number}"
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
