use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;

use crate::error::StocktakeError;

/// Price used when an item has no row in the price source.
pub const DEFAULT_PRICE: &str = "0";

/// Marker in the manufacturer source's fourth column flagging a damaged item.
pub const DAMAGED_MARKER: &str = "damaged";

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Item price. Keeps the source text for output; orders by numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price {
    text: String,
    value: OrderedFloat<f64>,
}

impl Price {
    pub fn parse(id: &str, text: &str) -> Result<Self, StocktakeError> {
        let text = text.trim();
        let value: f64 = text
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| StocktakeError::PriceParse {
                id: id.to_string(),
                value: text.to_string(),
            })?;
        Ok(Self { text: text.to_string(), value: OrderedFloat(value) })
    }

    pub fn value(&self) -> f64 {
        self.value.into_inner()
    }

    /// Totally ordered numeric value, for sorting.
    pub fn sort_key(&self) -> OrderedFloat<f64> {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for Price {
    fn default() -> Self {
        Self { text: DEFAULT_PRICE.to_string(), value: OrderedFloat(0.0) }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One merged inventory item. Built once during the merge, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub manufacturer: String,
    pub category: String,
    pub price: Price,
    pub service_date: NaiveDate,
    pub is_damaged: bool,
}

impl Record {
    /// Build a record, trimming the manufacturer and category and parsing
    /// the service date with `date_format`.
    pub fn new(
        id: &str,
        manufacturer: &str,
        category: &str,
        price: Price,
        service_date: &str,
        is_damaged: bool,
        date_format: &str,
    ) -> Result<Self, StocktakeError> {
        Ok(Self {
            id: id.to_string(),
            manufacturer: manufacturer.trim().to_string(),
            category: category.trim().to_string(),
            price,
            service_date: parse_service_date(id, service_date, date_format)?,
            is_damaged,
        })
    }

    /// Whether the service date (taken at midnight) lies before `as_of`.
    /// An item serviced today counts as past once the day has started.
    pub fn is_past_service(&self, as_of: NaiveDateTime) -> bool {
        self.service_date.and_time(chrono::NaiveTime::MIN) < as_of
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, {}, {}, damaged={})",
            self.id, self.manufacturer, self.category, self.price, self.service_date, self.is_damaged
        )
    }
}

/// True iff the value equals the damage marker, ignoring case.
pub fn is_damage_marker(value: &str) -> bool {
    value.eq_ignore_ascii_case(DAMAGED_MARKER)
}

pub fn parse_service_date(id: &str, value: &str, format: &str) -> Result<NaiveDate, StocktakeError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| StocktakeError::DateParse {
        id: id.to_string(),
        value: value.to_string(),
    })
}
