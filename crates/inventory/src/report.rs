//! Report views over the merged inventory and the generic row writer.
//!
//! Every view borrows from the [`Inventory`] and re-sorts with a stable sort,
//! so ties keep merge order and repeated runs produce identical files.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::StocktakeError;
use crate::merge::Inventory;
use crate::model::Record;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A column that can appear in a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Id,
    Manufacturer,
    Category,
    Price,
    ServiceDate,
    IsDamaged,
}

impl ReportField {
    pub const ALL: [ReportField; 6] = [
        ReportField::Id,
        ReportField::Manufacturer,
        ReportField::Category,
        ReportField::Price,
        ReportField::ServiceDate,
        ReportField::IsDamaged,
    ];

    pub const WITHOUT_DAMAGE: [ReportField; 5] = [
        ReportField::Id,
        ReportField::Manufacturer,
        ReportField::Category,
        ReportField::Price,
        ReportField::ServiceDate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Manufacturer => "manufacturer",
            Self::Category => "category",
            Self::Price => "price",
            Self::ServiceDate => "service_date",
            Self::IsDamaged => "is_damaged",
        }
    }

    /// Text written for this field. Dates use `date_format`; booleans are
    /// written `True` / `False`.
    pub fn render(&self, record: &Record, date_format: &str) -> String {
        match self {
            Self::Id => record.id.clone(),
            Self::Manufacturer => record.manufacturer.clone(),
            Self::Category => record.category.clone(),
            Self::Price => record.price.to_string(),
            Self::ServiceDate => record.service_date.format(date_format).to_string(),
            Self::IsDamaged => String::from(if record.is_damaged { "True" } else { "False" }),
        }
    }
}

impl std::fmt::Display for ReportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Report kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Full,
    Category,
    PastService,
    Damaged,
}

impl ReportKind {
    /// Columns written for this report, in order.
    pub fn fields(&self) -> &'static [ReportField] {
        match self {
            Self::Damaged => &ReportField::WITHOUT_DAMAGE,
            Self::Full | Self::Category | Self::PastService => &ReportField::ALL,
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Category => write!(f, "category"),
            Self::PastService => write!(f, "past_service"),
            Self::Damaged => write!(f, "damaged"),
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

impl Inventory {
    /// All records, by manufacturer ascending.
    pub fn full_report(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records().iter().collect();
        rows.sort_by(|a, b| a.manufacturer.cmp(&b.manufacturer));
        rows
    }

    /// Distinct categories, ascending.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.records().iter().map(|r| r.category.as_str()).collect()
    }

    /// Records of one category, by id ascending.
    pub fn category_report(&self, category: &str) -> Vec<&Record> {
        let mut rows: Vec<&Record> =
            self.records().iter().filter(|r| r.category == category).collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    /// Every category with its records, each sorted by id.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&Record>> {
        self.categories()
            .into_iter()
            .map(|c| (c, self.category_report(c)))
            .collect()
    }

    /// Records whose service date lies before `as_of`, oldest first.
    pub fn past_service_report(&self, as_of: NaiveDateTime) -> Vec<&Record> {
        let mut rows: Vec<&Record> =
            self.records().iter().filter(|r| r.is_past_service(as_of)).collect();
        rows.sort_by_key(|r| r.service_date);
        rows
    }

    /// Damaged records, most expensive first.
    pub fn damaged_report(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records().iter().filter(|r| r.is_damaged).collect();
        rows.sort_by(|a, b| b.price.sort_key().cmp(&a.price.sort_key()));
        rows
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write one headerless CSV row per record with `fields` in order.
pub fn write_records<W: Write>(
    writer: W,
    records: &[&Record],
    fields: &[ReportField],
    date_format: &str,
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for record in records {
        writer.write_record(fields.iter().map(|f| f.render(record, date_format)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the records to it.
pub fn write_report_file(
    path: &Path,
    records: &[&Record],
    fields: &[ReportField],
    date_format: &str,
) -> Result<(), StocktakeError> {
    let io_err = |reason: String| StocktakeError::Io {
        path: path.display().to_string(),
        reason,
    };

    let file = std::fs::File::create(path).map_err(|e| io_err(e.to_string()))?;
    write_records(file, records, fields, date_format).map_err(|e| io_err(e.to_string()))?;
    log::info!("wrote {} row(s) to {}", records.len(), path.display());
    Ok(())
}

/// File name for a per-category report: `{category}{suffix}`.
///
/// Characters that are not valid in a file name (path separators, reserved
/// punctuation, control characters) are replaced by `_`.
pub fn category_file_name(category: &str, suffix: &str) -> Result<String, StocktakeError> {
    let sanitized: String = category
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let file_name = format!("{sanitized}{suffix}");
    if matches!(file_name.as_str(), "" | "." | "..") {
        return Err(StocktakeError::InvalidCategory { category: category.to_string() });
    }

    if sanitized != category {
        log::warn!("category '{category}' written as '{file_name}'");
    }

    Ok(file_name)
}

/// File names for every category, checked up front so that no two reports
/// share a file. `reserved` holds the names of the fixed reports.
pub fn category_file_names<'a>(
    categories: impl IntoIterator<Item = &'a str>,
    suffix: &str,
    reserved: &[&str],
) -> Result<Vec<(&'a str, String)>, StocktakeError> {
    let mut claimed: HashMap<String, String> = reserved
        .iter()
        .map(|name| (name.to_string(), format!("report '{name}'")))
        .collect();

    let mut names = Vec::new();
    for category in categories {
        let file_name = category_file_name(category, suffix)?;
        let owner = format!("category '{category}'");
        if let Some(first) = claimed.insert(file_name.clone(), owner.clone()) {
            return Err(StocktakeError::FileNameCollision { file_name, first, second: owner });
        }
        names.push((category, file_name));
    }

    Ok(names)
}
