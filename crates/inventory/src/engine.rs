use chrono::NaiveDateTime;

use crate::config::StocktakeConfig;
use crate::error::StocktakeError;
use crate::merge::Inventory;
use crate::model::Record;
use crate::report::{category_file_names, write_report_file, ReportKind};
use crate::summary::{ReportOutput, RunSummary};

/// Load, merge and write every report. `as_of` is "now" for the
/// past-service filter. The first failure aborts the run.
pub fn run(config: &StocktakeConfig, as_of: NaiveDateTime) -> Result<RunSummary, StocktakeError> {
    let inventory = Inventory::load(config)?;
    log::info!("merged {} item(s)", inventory.len());

    // Name every file before writing any, so a bad category leaves no output.
    let by_category = inventory.by_category();
    let outputs = &config.outputs;
    let category_files = category_file_names(
        by_category.keys().copied(),
        &outputs.category_suffix,
        &[outputs.full.as_str(), outputs.past_service.as_str(), outputs.damaged.as_str()],
    )?;

    let mut reports = Vec::new();

    let full = inventory.full_report();
    reports.push(write(config, ReportKind::Full, None, &outputs.full, &full)?);

    for (category, file_name) in category_files {
        let rows = by_category.get(category).map(Vec::as_slice).unwrap_or_default();
        reports.push(write(config, ReportKind::Category, Some(category), &file_name, rows)?);
    }

    let past = inventory.past_service_report(as_of);
    reports.push(write(config, ReportKind::PastService, None, &outputs.past_service, &past)?);

    let damaged = inventory.damaged_report();
    reports.push(write(config, ReportKind::Damaged, None, &outputs.damaged, &damaged)?);

    Ok(RunSummary {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
        as_of,
        records_merged: inventory.len(),
        reports,
    })
}

fn write(
    config: &StocktakeConfig,
    kind: ReportKind,
    category: Option<&str>,
    file_name: &str,
    rows: &[&Record],
) -> Result<ReportOutput, StocktakeError> {
    let path = config.resolve_output(file_name);
    write_report_file(&path, rows, kind.fields(), &config.date_format)?;
    Ok(ReportOutput {
        kind,
        category: category.map(str::to_string),
        path,
        rows: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn write_inputs(dir: &std::path::Path, m: &str, p: &str, s: &str) {
        std::fs::write(dir.join("ManufacturerList.csv"), m).unwrap();
        std::fs::write(dir.join("PriceList.csv"), p).unwrap();
        std::fs::write(dir.join("ServiceDatesList.csv"), s).unwrap();
    }

    fn config_for(dir: &std::path::Path) -> StocktakeConfig {
        StocktakeConfig {
            input_dir: dir.to_path_buf(),
            output_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn as_of() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn writes_all_report_families() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(
            dir.path(),
            "A1,Acme ,Laptop,Damaged\nB2,Globex,Phone\n",
            "A1,999.99\n",
            "A1,01/01/2020\nB2,12/31/2099\n",
        );

        let summary = run(&config_for(dir.path()), as_of()).unwrap();
        assert_eq!(summary.records_merged, 2);
        assert_eq!(summary.reports.len(), 5);
        assert_eq!(summary.rows_for(ReportKind::Full), 2);
        assert_eq!(summary.files_for(ReportKind::Category), 2);
        assert_eq!(summary.rows_for(ReportKind::PastService), 1);
        assert_eq!(summary.rows_for(ReportKind::Damaged), 1);

        let damaged = std::fs::read_to_string(dir.path().join("DamagedInventory.csv")).unwrap();
        assert_eq!(damaged, "A1,Acme,Laptop,999.99,01/01/2020\n");
        let phone = std::fs::read_to_string(dir.path().join("PhoneInventory.csv")).unwrap();
        assert_eq!(phone, "B2,Globex,Phone,0,12/31/2099,False\n");
    }

    #[test]
    fn missing_input_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ManufacturerList.csv"), "A1,Acme,Laptop\n").unwrap();

        let err = run(&config_for(dir.path()), as_of()).unwrap_err();
        assert!(matches!(err, StocktakeError::SourceNotFound { ref path, .. } if path.ends_with("PriceList.csv")));
        assert!(!dir.path().join("FullInventory.csv").exists());
    }

    #[test]
    fn empty_category_is_written_to_suffix_file() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(
            dir.path(),
            "A1,Acme,,\nB2,Globex,Phone,\n",
            "",
            "A1,01/01/2020\nB2,01/01/2020\n",
        );

        let summary = run(&config_for(dir.path()), as_of()).unwrap();
        assert_eq!(summary.files_for(ReportKind::Category), 2);
        let uncategorized = std::fs::read_to_string(dir.path().join("Inventory.csv")).unwrap();
        assert_eq!(uncategorized, "A1,Acme,,0,01/01/2020,False\n");
        assert!(dir.path().join("PhoneInventory.csv").exists());
    }

    #[test]
    fn colliding_categories_abort_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(
            dir.path(),
            "A1,Acme,a/b,\nB2,Globex,a_b,\n",
            "",
            "A1,01/01/2020\nB2,01/01/2020\n",
        );

        let err = run(&config_for(dir.path()), as_of()).unwrap_err();
        assert!(matches!(err, StocktakeError::FileNameCollision { .. }));
        assert!(!dir.path().join("FullInventory.csv").exists());
        assert!(!dir.path().join("a_bInventory.csv").exists());
    }

    #[test]
    fn missing_service_date_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "A1,Acme,Laptop\n", "A1,5\n", "");

        let err = run(&config_for(dir.path()), as_of()).unwrap_err();
        assert!(matches!(err, StocktakeError::MissingServiceDate { .. }));
        assert!(!dir.path().join("FullInventory.csv").exists());
    }
}
