use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::report::ReportKind;

/// One file written during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub engine_version: String,
    pub run_at: String,
    pub as_of: NaiveDateTime,
    pub records_merged: usize,
    pub reports: Vec<ReportOutput>,
}

impl RunSummary {
    /// Rows written for reports of `kind`, summed across files.
    pub fn rows_for(&self, kind: ReportKind) -> usize {
        self.reports.iter().filter(|r| r.kind == kind).map(|r| r.rows).sum()
    }

    pub fn files_for(&self, kind: ReportKind) -> usize {
        self.reports.iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn output(kind: ReportKind, rows: usize) -> ReportOutput {
        ReportOutput { kind, category: None, path: PathBuf::from("x.csv"), rows }
    }

    #[test]
    fn counts_by_kind() {
        let summary = RunSummary {
            engine_version: "0".into(),
            run_at: String::new(),
            as_of: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            records_merged: 4,
            reports: vec![
                output(ReportKind::Full, 4),
                output(ReportKind::Category, 3),
                output(ReportKind::Category, 1),
                output(ReportKind::Damaged, 2),
            ],
        };
        assert_eq!(summary.rows_for(ReportKind::Category), 4);
        assert_eq!(summary.files_for(ReportKind::Category), 2);
        assert_eq!(summary.files_for(ReportKind::PastService), 0);
    }
}
