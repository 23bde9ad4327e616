use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::StocktakeError;

/// Month/day/year, slash separated. Used for both input and output.
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every field has a default, so an empty document (or no
/// config file at all) reproduces the fixed file names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StocktakeConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub date_format: String,
    pub inputs: InputFiles,
    pub outputs: OutputFiles,
}

impl Default for StocktakeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            inputs: InputFiles::default(),
            outputs: OutputFiles::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs + Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputFiles {
    pub manufacturers: String,
    pub prices: String,
    pub service_dates: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            manufacturers: "ManufacturerList.csv".into(),
            prices: "PriceList.csv".into(),
            service_dates: "ServiceDatesList.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub full: String,
    pub past_service: String,
    pub damaged: String,
    /// Appended to the category name to form each per-category file name.
    pub category_suffix: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            full: "FullInventory.csv".into(),
            past_service: "PastServiceDateInventory.csv".into(),
            damaged: "DamagedInventory.csv".into(),
            category_suffix: "Inventory.csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl StocktakeConfig {
    pub fn from_toml(input: &str) -> Result<Self, StocktakeError> {
        let config: StocktakeConfig =
            toml::from_str(input).map_err(|e| StocktakeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, StocktakeError> {
        let input = std::fs::read_to_string(path).map_err(|e| StocktakeError::SourceNotFound {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), StocktakeError> {
        let names = [
            ("inputs.manufacturers", &self.inputs.manufacturers),
            ("inputs.prices", &self.inputs.prices),
            ("inputs.service_dates", &self.inputs.service_dates),
            ("outputs.full", &self.outputs.full),
            ("outputs.past_service", &self.outputs.past_service),
            ("outputs.damaged", &self.outputs.damaged),
            ("outputs.category_suffix", &self.outputs.category_suffix),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(StocktakeError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        validate_date_format(&self.date_format)
    }

    pub fn resolve_input(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn resolve_output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// The format must parse what it prints, or reports could not be read back.
fn validate_date_format(format: &str) -> Result<(), StocktakeError> {
    use std::fmt::Write;

    let invalid = || StocktakeError::ConfigValidation(format!("unusable date_format '{format}'"));

    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let sample = NaiveDate::from_ymd_opt(2024, 12, 31).ok_or_else(invalid)?;
    let mut printed = String::new();
    write!(printed, "{}", sample.format(format)).map_err(|_| invalid())?;
    match NaiveDate::parse_from_str(&printed, format) {
        Ok(parsed) if parsed == sample => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_fixed_names() {
        let config = StocktakeConfig::from_toml("").unwrap();
        assert_eq!(config.inputs.manufacturers, "ManufacturerList.csv");
        assert_eq!(config.inputs.prices, "PriceList.csv");
        assert_eq!(config.inputs.service_dates, "ServiceDatesList.csv");
        assert_eq!(config.outputs.full, "FullInventory.csv");
        assert_eq!(config.outputs.past_service, "PastServiceDateInventory.csv");
        assert_eq!(config.outputs.damaged, "DamagedInventory.csv");
        assert_eq!(config.outputs.category_suffix, "Inventory.csv");
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn partial_override() {
        let config = StocktakeConfig::from_toml(
            r#"
output_dir = "reports"

[outputs]
damaged = "Broken.csv"
"#,
        )
        .unwrap();
        assert_eq!(config.outputs.damaged, "Broken.csv");
        assert_eq!(config.outputs.full, "FullInventory.csv");
        assert_eq!(config.resolve_output("x.csv"), PathBuf::from("reports").join("x.csv"));
        assert_eq!(config.resolve_input("y.csv"), PathBuf::from(".").join("y.csv"));
    }

    #[test]
    fn empty_name_rejected() {
        let err = StocktakeConfig::from_toml("[inputs]\nprices = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("inputs.prices"));
    }

    #[test]
    fn date_format_must_round_trip() {
        assert!(StocktakeConfig::from_toml("date_format = \"%Y-%m-%d\"").is_ok());
        assert!(matches!(
            StocktakeConfig::from_toml("date_format = \"%m/%d\""),
            Err(StocktakeError::ConfigValidation(_))
        ));
        assert!(StocktakeConfig::from_toml("date_format = \"%Q\"").is_err());
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            StocktakeConfig::from_toml("inputs = 3"),
            Err(StocktakeError::ConfigParse(_))
        ));
    }
}
