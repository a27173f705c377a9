use std::path::Path;

use serde::Serialize;

use super::ForecastError;
use super::pipeline::ForecastReport;

/// Default file name offered by the save dialog.
pub const EXPORT_FILE_NAME: &str = "forecast_data.csv";

/// One exported row; field names are the CSV header.
#[derive(Debug, Serialize)]
struct ExportRow {
    ds: String,
    yhat: f64,
    yhat_lower: f64,
    yhat_upper: f64,
}

impl ForecastReport {
    /// The extended axis as UTF-8 CSV: header row, no index column.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ForecastError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for p in &self.points {
            writer.serialize(ExportRow {
                ds: p.date.format("%Y-%m-%d").to_string(),
                yhat: p.yhat,
                yhat_lower: p.yhat_lower,
                yhat_upper: p.yhat_upper,
            })?;
        }
        writer
            .into_inner()
            .map_err(|e| ForecastError::Io(e.into_error()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ForecastError> {
        let bytes = self.to_csv_bytes()?;
        std::fs::write(path, bytes)?;
        log::info!("Saved {} forecast rows to {}", self.points.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::forecast::pipeline::funding_delta;
    use crate::forecast::{ForecastPoint, Horizon};

    fn report(n: usize) -> ForecastReport {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let points = start
            .iter_days()
            .take(n)
            .enumerate()
            .map(|(i, date)| ForecastPoint {
                date,
                yhat: i as f64,
                yhat_lower: i as f64 - 1.0,
                yhat_upper: i as f64 + 1.5,
            })
            .collect();
        ForecastReport {
            horizon: Horizon::new(30).unwrap(),
            history: Vec::new(),
            points,
            delta: funding_delta(1.0, 2.0),
        }
    }

    #[test]
    fn csv_has_header_and_four_columns() {
        let bytes = report(33).to_csv_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ds,yhat,yhat_lower,yhat_upper");
        assert_eq!(lines.len(), 34);
        assert!(lines[1..].iter().all(|l| l.split(',').count() == 4));
        assert!(lines[1].starts_with("2018-01-01,0"));
    }

    #[test]
    fn write_csv_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        report(3).write_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 3);
    }
}
