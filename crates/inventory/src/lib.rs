//! `stocktake-inventory` — three-source inventory merge and report engine.
//!
//! Loads the manufacturer, price and service-date tables, joins them into
//! one [`Record`] per item and writes the four report families.

pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod report;
pub mod summary;
pub mod table;

pub use config::StocktakeConfig;
pub use engine::run;
pub use error::StocktakeError;
pub use merge::Inventory;
pub use model::{Price, Record};
pub use report::{ReportField, ReportKind};
pub use summary::{ReportOutput, RunSummary};
pub use table::KeyedTable;
