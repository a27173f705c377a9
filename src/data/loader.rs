use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Date32Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{FundingRecord, FundingTable, SOURCE_COLUMNS};

/// Day-first date layout used by the source data.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a funding table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – ten positional columns, header names ignored (the original export)
/// * `.json`    – `[{ "startup_name": ..., "date": "09/01/2020", ... }, ...]`
/// * `.parquet` – columns named like the JSON keys
pub fn load_file(path: &Path) -> Result<FundingTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Strip thousands separators and parse. Anything non-numeric (or non-finite) is null.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a day/month/year date; mismatches become null rather than errors.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a header row (names are reassigned, not trusted) followed by
/// rows of exactly ten fields:
///
/// `Sr No, Date, Startup Name, Industry Vertical, SubVertical, City Location,
///  Investors Name, Investment Type, Amount in USD, Remarks`
///
/// `Sr No` and `Remarks` are dropped.
fn load_csv(path: &Path) -> Result<FundingTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let n_columns = reader.headers().context("reading CSV headers")?.len();
    if n_columns != SOURCE_COLUMNS.len() {
        bail!(
            "Expected {} columns ({}), found {n_columns}",
            SOURCE_COLUMNS.len(),
            SOURCE_COLUMNS.join(", ")
        );
    }

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |i: usize| row.get(i).unwrap_or("");

        records.push(FundingRecord {
            date: parse_date(field(1)),
            startup_name: field(2).trim().to_string(),
            industry: non_empty(field(3)),
            sub_vertical: non_empty(field(4)),
            city: non_empty(field(5)),
            investors: non_empty(field(6)),
            investment_type: non_empty(field(7)),
            amount_usd: parse_amount(field(8)),
        });
    }

    Ok(FundingTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// A date or amount cell may arrive as text or as a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCell {
    Number(f64),
    Text(String),
}

impl JsonCell {
    fn amount(&self) -> Option<f64> {
        match self {
            JsonCell::Number(v) => Some(*v).filter(|v| v.is_finite()),
            JsonCell::Text(s) => parse_amount(s),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        match self {
            JsonCell::Text(s) => parse_date(s),
            JsonCell::Number(_) => None,
        }
    }
}

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "date": "09/01/2020",
///     "startup_name": "BYJU'S",
///     "industry_vertical": "E-Tech",
///     "city_location": "Bengaluru",
///     "investors_name": "Tiger Global Management",
///     "investment_type": "Private Equity Round",
///     "amount_usd": "200,000,000"
///   },
///   ...
/// ]
/// ```
#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default)]
    date: Option<JsonCell>,
    #[serde(default)]
    startup_name: Option<String>,
    #[serde(default)]
    industry_vertical: Option<String>,
    #[serde(default)]
    sub_vertical: Option<String>,
    #[serde(default)]
    city_location: Option<String>,
    #[serde(default)]
    investors_name: Option<String>,
    #[serde(default)]
    investment_type: Option<String>,
    #[serde(default)]
    amount_usd: Option<JsonCell>,
}

fn load_json(path: &Path) -> Result<FundingTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonRecord> =
        serde_json::from_str(&text).context("Expected a top-level JSON array of records")?;

    let records = rows
        .into_iter()
        .map(|r| FundingRecord {
            startup_name: r.startup_name.unwrap_or_default().trim().to_string(),
            industry: r.industry_vertical.as_deref().and_then(non_empty),
            sub_vertical: r.sub_vertical.as_deref().and_then(non_empty),
            city: r.city_location.as_deref().and_then(non_empty),
            investors: r.investors_name.as_deref().and_then(non_empty),
            investment_type: r.investment_type.as_deref().and_then(non_empty),
            amount_usd: r.amount_usd.as_ref().and_then(JsonCell::amount),
            date: r.date.as_ref().and_then(JsonCell::date),
        })
        .collect();

    Ok(FundingTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of funding rounds.
///
/// Expected schema (nullable columns):
/// - `date`: Utf8 (day/month/year) or Date32
/// - `startup_name`, `industry_vertical`, `sub_vertical`, `city_location`,
///   `investors_name`, `investment_type`: Utf8 / LargeUtf8
/// - `amount_usd`: Float64, Int64 or Utf8 (thousands separators allowed)
fn load_parquet(path: &Path) -> Result<FundingTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let date = column(&batch, "date")?;
        let name = column(&batch, "startup_name")?;
        let industry = column(&batch, "industry_vertical")?;
        let sub_vertical = column(&batch, "sub_vertical")?;
        let city = column(&batch, "city_location")?;
        let investors = column(&batch, "investors_name")?;
        let investment_type = column(&batch, "investment_type")?;
        let amount = column(&batch, "amount_usd")?;

        for row in 0..batch.num_rows() {
            records.push(FundingRecord {
                date: date_at(date, row).with_context(|| format!("Row {row}: 'date'"))?,
                startup_name: text_at(name, row)?.unwrap_or_default(),
                industry: text_at(industry, row)?,
                sub_vertical: text_at(sub_vertical, row)?,
                city: text_at(city, row)?,
                investors: text_at(investors, row)?,
                investment_type: text_at(investment_type, row)?,
                amount_usd: amount_at(amount, row)
                    .with_context(|| format!("Row {row}: 'amount_usd'"))?,
            });
        }
    }

    Ok(FundingTable::from_records(records))
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Read a Utf8 / LargeUtf8 cell; empty strings count as null.
fn text_at(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let raw = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        other => bail!("Expected a text column, got {other:?}"),
    };
    Ok(non_empty(raw))
}

fn date_at(col: &Arc<dyn Array>, row: usize) -> Result<Option<NaiveDate>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Date32 => Ok(col.as_primitive::<Date32Type>().value_as_date(row)),
        DataType::Utf8 | DataType::LargeUtf8 => {
            Ok(text_at(col, row)?.as_deref().and_then(parse_date))
        }
        other => bail!("Expected Date32 or Utf8, got {other:?}"),
    }
}

fn amount_at(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(Some(arr.value(row)).filter(|v| v.is_finite()))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(Some(arr.value(row) as f64))
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            Ok(text_at(col, row)?.as_deref().and_then(parse_amount))
        }
        other => bail!("Expected Float64, Int64 or Utf8, got {other:?}"),
    }
}
