use std::fmt;

#[derive(Debug)]
pub enum StocktakeError {
    /// An input file is missing or cannot be opened.
    SourceNotFound { path: String, reason: String },
    /// A row is too short for the column being read.
    MalformedRow { source: String, line: u64, expected: usize, found: usize },
    /// The CSV reader rejected the input (bad quoting, invalid UTF-8, ...).
    Csv { source: String, line: Option<u64>, reason: String },
    /// A manufacturer key has no service-date row. There is no default.
    MissingServiceDate { id: String },
    /// Service date does not match the configured format.
    DateParse { id: String, value: String },
    /// Price is not a number.
    PriceParse { id: String, value: String },
    /// Category cannot be turned into a usable file name.
    InvalidCategory { category: String },
    /// Two reports would be written to the same file.
    FileNameCollision { file_name: String, first: String, second: String },
    /// Output file could not be created or written.
    Io { path: String, reason: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty file name, bad date format).
    ConfigValidation(String),
}

impl fmt::Display for StocktakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path, reason } => {
                write!(f, "cannot open source '{path}': {reason}")
            }
            Self::MalformedRow { source, line, expected, found } => write!(
                f,
                "{source}, line {line}: expected at least {expected} field(s), found {found}"
            ),
            Self::Csv { source, line: Some(line), reason } => {
                write!(f, "{source}, line {line}: {reason}")
            }
            Self::Csv { source, line: None, reason } => write!(f, "{source}: {reason}"),
            Self::MissingServiceDate { id } => {
                write!(f, "item '{id}': no service date entry")
            }
            Self::DateParse { id, value } => {
                write!(f, "item '{id}': cannot parse service date '{value}'")
            }
            Self::PriceParse { id, value } => {
                write!(f, "item '{id}': cannot parse price '{value}'")
            }
            Self::InvalidCategory { category } => {
                write!(f, "category '{category}' is not usable as a file name")
            }
            Self::FileNameCollision { file_name, first, second } => {
                write!(f, "{first} and {second} would both be written to '{file_name}'")
            }
            Self::Io { path, reason } => write!(f, "cannot write '{path}': {reason}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for StocktakeError {}
