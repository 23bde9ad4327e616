//! CLI Exit Code Registry
//!
//! Single source of truth for `stocktake` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success, every report written                    |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage or config error                            |
//! | 3    | Input source missing or unreadable               |
//! | 4    | Malformed input row or CSV syntax error          |
//! | 5    | Item has no service date entry                   |
//! | 6    | Service date or price cannot be parsed           |
//! | 7    | Report could not be written                      |

use stocktake_inventory::StocktakeError;

/// Success - every report written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or invalid config file.
pub const EXIT_USAGE: u8 = 2;

/// An input file does not exist or cannot be opened.
pub const EXIT_SOURCE_NOT_FOUND: u8 = 3;

/// A row is shorter than required, or the CSV itself is broken.
pub const EXIT_MALFORMED_ROW: u8 = 4;

/// A manufacturer entry has no service date.
pub const EXIT_MISSING_SERVICE_DATE: u8 = 5;

/// Date or price text does not parse.
pub const EXIT_PARSE: u8 = 6;

/// Output file cannot be created, or a category cannot name its own file.
pub const EXIT_OUTPUT: u8 = 7;

/// Map an engine error to its exit code.
pub fn error_exit_code(err: &StocktakeError) -> u8 {
    match err {
        StocktakeError::SourceNotFound { .. } => EXIT_SOURCE_NOT_FOUND,
        StocktakeError::MalformedRow { .. } | StocktakeError::Csv { .. } => EXIT_MALFORMED_ROW,
        StocktakeError::MissingServiceDate { .. } => EXIT_MISSING_SERVICE_DATE,
        StocktakeError::DateParse { .. } | StocktakeError::PriceParse { .. } => EXIT_PARSE,
        StocktakeError::InvalidCategory { .. }
        | StocktakeError::FileNameCollision { .. }
        | StocktakeError::Io { .. } => EXIT_OUTPUT,
        StocktakeError::ConfigParse(_) | StocktakeError::ConfigValidation(_) => EXIT_USAGE,
    }
}

/// Short machine-readable name for an engine error.
pub fn error_kind(err: &StocktakeError) -> &'static str {
    match err {
        StocktakeError::SourceNotFound { .. } => "source_not_found",
        StocktakeError::MalformedRow { .. } => "malformed_row",
        StocktakeError::Csv { .. } => "csv",
        StocktakeError::MissingServiceDate { .. } => "missing_service_date",
        StocktakeError::DateParse { .. } => "date_parse",
        StocktakeError::PriceParse { .. } => "price_parse",
        StocktakeError::InvalidCategory { .. } => "invalid_category",
        StocktakeError::FileNameCollision { .. } => "file_name_collision",
        StocktakeError::Io { .. } => "io",
        StocktakeError::ConfigParse(_) => "config_parse",
        StocktakeError::ConfigValidation(_) => "config_validation",
    }
}
