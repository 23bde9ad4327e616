//! Three-way join of the manufacturer, price and service-date tables.

use crate::config::StocktakeConfig;
use crate::error::StocktakeError;
use crate::model::{is_damage_marker, Price, Record};
use crate::table::{KeyedTable, DEFAULT_KEY_INDEX};

const MANUFACTURER_FIELD: usize = 1;
const CATEGORY_FIELD: usize = 2;
const DAMAGE_FIELD: usize = 3;
const VALUE_FIELD: usize = 1;

/// The merged record collection. Written once by the merge, read by every report.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: Vec<Record>,
}

impl Inventory {
    /// Load the three configured sources and merge them.
    pub fn load(config: &StocktakeConfig) -> Result<Self, StocktakeError> {
        let manufacturers =
            KeyedTable::load(&config.resolve_input(&config.inputs.manufacturers), DEFAULT_KEY_INDEX)?;
        let prices = KeyedTable::load(&config.resolve_input(&config.inputs.prices), DEFAULT_KEY_INDEX)?;
        let service_dates =
            KeyedTable::load(&config.resolve_input(&config.inputs.service_dates), DEFAULT_KEY_INDEX)?;

        Self::from_tables(&manufacturers, &prices, &service_dates, &config.date_format)
    }

    pub fn from_tables(
        manufacturers: &KeyedTable,
        prices: &KeyedTable,
        service_dates: &KeyedTable,
        date_format: &str,
    ) -> Result<Self, StocktakeError> {
        let records = merge(manufacturers, prices, service_dates, date_format)?;
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records in merge order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build one record per manufacturer key, in manufacturer-table order.
///
/// A missing price defaults to `"0"`. A missing service date is an error:
/// there is no sensible default for it.
pub fn merge(
    manufacturers: &KeyedTable,
    prices: &KeyedTable,
    service_dates: &KeyedTable,
    date_format: &str,
) -> Result<Vec<Record>, StocktakeError> {
    let mut records = Vec::with_capacity(manufacturers.len());

    for (id, row) in manufacturers.iter() {
        let source = manufacturers.source();
        let manufacturer = row.field(source, MANUFACTURER_FIELD)?;
        let category = row.field(source, CATEGORY_FIELD)?;
        let is_damaged = row
            .fields
            .get(DAMAGE_FIELD)
            .map(|v| is_damage_marker(v))
            .unwrap_or(false);

        let price = match prices.get(id) {
            Some(price_row) => Price::parse(id, price_row.field(prices.source(), VALUE_FIELD)?)?,
            None => Price::default(),
        };

        let service_row = service_dates
            .get(id)
            .ok_or_else(|| StocktakeError::MissingServiceDate { id: id.to_string() })?;
        let service_date = service_row.field(service_dates.source(), VALUE_FIELD)?;

        let record = Record::new(id, manufacturer, category, price, service_date, is_damaged, date_format)?;
        log::debug!("added item {record}");
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FMT: &str = "%m/%d/%Y";

    fn table(name: &str, csv: &str) -> KeyedTable {
        KeyedTable::from_reader(name, csv.as_bytes(), DEFAULT_KEY_INDEX).unwrap()
    }

    fn run(m: &str, p: &str, s: &str) -> Result<Vec<Record>, StocktakeError> {
        merge(&table("m.csv", m), &table("p.csv", p), &table("s.csv", s), FMT)
    }

    #[test]
    fn worked_example() {
        let records = run("A1,Acme ,Laptop,Damaged\n", "A1,999.99\n", "A1,01/01/2020\n").unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "A1");
        assert_eq!(r.manufacturer, "Acme");
        assert_eq!(r.category, "Laptop");
        assert_eq!(r.price.value(), 999.99);
        assert_eq!(r.service_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(r.is_damaged);
    }

    #[test]
    fn one_record_per_manufacturer_key() {
        let records = run(
            "A1,Acme,Laptop\nB2,Globex,Phone\nC3,Initech,Tower\n",
            "A1,10\nB2,20\nZ9,99\n",
            "A1,01/01/2020\nB2,02/02/2021\nC3,03/03/2022\nZ9,04/04/2023\n",
        )
        .unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn missing_price_defaults_to_zero() {
        let records = run("A1,Acme,Laptop\n", "", "A1,01/01/2020\n").unwrap();
        assert_eq!(records[0].price.as_str(), "0");
        assert_eq!(records[0].price.value(), 0.0);
    }

    #[test]
    fn missing_service_date_is_fatal() {
        let err = run("A1,Acme,Laptop\nB2,Globex,Phone\n", "", "A1,01/01/2020\n").unwrap_err();
        assert!(matches!(err, StocktakeError::MissingServiceDate { ref id } if id == "B2"));
    }

    #[test]
    fn damage_flag_rules() {
        let records = run(
            "A,m,t,damaged\nB,m,t,DAMAGED\nC,m,t,Damaged\nD,m,t\nE,m,t,ok\nF,m,t,\n",
            "",
            "A,01/01/2020\nB,01/01/2020\nC,01/01/2020\nD,01/01/2020\nE,01/01/2020\nF,01/01/2020\n",
        )
        .unwrap();
        let flags: Vec<bool> = records.iter().map(|r| r.is_damaged).collect();
        assert_eq!(flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn short_manufacturer_row_is_malformed() {
        let err = run("A1,Acme\n", "", "A1,01/01/2020\n").unwrap_err();
        assert!(matches!(err, StocktakeError::MalformedRow { expected: 3, found: 2, .. }));
    }

    #[test]
    fn short_service_row_is_malformed() {
        let err = run("A1,Acme,Laptop\n", "", "A1\n").unwrap_err();
        match err {
            StocktakeError::MalformedRow { source, .. } => assert_eq!(source, "s.csv"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_price_row_is_malformed() {
        let err = run("A1,Acme,Laptop\n", "A1\n", "A1,01/01/2020\n").unwrap_err();
        match err {
            StocktakeError::MalformedRow { source, line, expected, found } => {
                assert_eq!(source, "p.csv");
                assert_eq!(line, 1);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_service_date_surfaces() {
        let err = run("A1,Acme,Laptop\n", "", "A1,2020-01-01\n").unwrap_err();
        assert!(matches!(err, StocktakeError::DateParse { .. }));
    }
}
