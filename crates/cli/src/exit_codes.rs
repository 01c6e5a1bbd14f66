//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of the
//! shell contract — scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (IO, unspecified)                   |
//! | 2    | CLI usage error (bad args)                        |
//! | 3    | Input schema mismatch (required column absent)    |
//! | 4    | Reconciliation integrity failure (count/order)    |
//! | 5    | Invalid dataset config                            |

use boardtrace_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// An input table matched no recognized schema.
pub const EXIT_SCHEMA: u8 = 3;

/// Reconciliation output diverged from its input in count or order.
pub const EXIT_INTEGRITY: u8 = 4;

/// Dataset config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingColumn { .. } | ReconError::SchemaMismatch { .. } => EXIT_SCHEMA,
        ReconError::CountMismatch { .. } | ReconError::OrderMismatch { .. } => EXIT_INTEGRITY,
        ReconError::Io(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping() {
        assert_eq!(
            recon_exit_code(&ReconError::ConfigParse("x".into())),
            EXIT_CONFIG
        );
        assert_eq!(
            recon_exit_code(&ReconError::SchemaMismatch {
                table: "board".into(),
                detail: "no level columns".into(),
            }),
            EXIT_SCHEMA
        );
        assert_eq!(
            recon_exit_code(&ReconError::CountMismatch {
                expected: 10,
                actual: 9,
            }),
            EXIT_INTEGRITY
        );
        assert_eq!(
            recon_exit_code(&ReconError::OrderMismatch { line_number: 3 }),
            EXIT_INTEGRITY
        );
        assert_eq!(recon_exit_code(&ReconError::Io("x".into())), EXIT_ERROR);
    }
}
