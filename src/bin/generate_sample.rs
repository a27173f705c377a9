use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROUNDS: usize = 600;
const CSV_PATH: &str = "startup_funding.csv";
const PARQUET_PATH: &str = "startup_funding.parquet";

const INDUSTRIES: [(&str, &[&str]); 5] = [
    ("Fintech", &["Payments", "Lending", "Insurance"]),
    ("E-Commerce", &["Grocery", "Fashion", "Marketplace"]),
    ("Edtech", &["Test Prep", "K-12", "Upskilling"]),
    ("Healthcare", &["Diagnostics", "Telemedicine"]),
    ("Logistics", &["Last Mile", "Freight"]),
];
const CITIES: [&str; 6] = ["Bengaluru", "Mumbai", "New Delhi", "Gurgaon", "Pune", "Hyderabad"];
const INVESTORS: [&str; 7] = [
    "Sequoia Capital",
    "Accel Partners",
    "Tiger Global Management",
    "SoftBank Group",
    "Kalaari Capital",
    "Nexus Venture Partners",
    "Sequoia Capital, Accel Partners",
];
const ROUND_TYPES: [&str; 4] = ["Seed Funding", "Private Equity", "Series A", "Series B"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// One synthetic funding round, in the canonical field order.
struct Round {
    date: NaiveDate,
    /// How the date is written in the CSV; occasionally malformed.
    date_text: String,
    startup: String,
    industry: &'static str,
    sub_vertical: &'static str,
    city: &'static str,
    investors: &'static str,
    round_type: &'static str,
    amount: Option<f64>,
}

fn generate(rng: &mut SimpleRng, start: NaiveDate) -> Vec<Round> {
    (0..ROUNDS)
        .map(|i| {
            let date = start + Duration::days(rng.below(4 * 365) as i64);
            let (industry, subs) = *rng.pick(&INDUSTRIES);

            // Heavy-tailed amounts, rounded to the nearest thousand.
            let amount = (rng.next_f64() > 0.1).then(|| {
                let scale = 10f64.powf(5.0 + 3.0 * rng.next_f64());
                (scale / 1000.0).round() * 1000.0
            });
            let date_text = if rng.next_f64() < 0.02 {
                date.format("%d.%m.%Y").to_string()
            } else {
                date.format("%d/%m/%Y").to_string()
            };

            Round {
                date,
                date_text,
                startup: format!("Startup{:03}", i % 240),
                industry,
                sub_vertical: *rng.pick(subs),
                city: *rng.pick(&CITIES),
                investors: *rng.pick(&INVESTORS),
                round_type: *rng.pick(&ROUND_TYPES),
                amount,
            }
        })
        .collect()
}

/// `1234567.0` -> `1,234,567`
fn with_separators(amount: f64) -> String {
    let digits = format!("{amount:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn write_csv(rounds: &[Round]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV file")?;
    writer.write_record([
        "Sr No",
        "Date dd/mm/yyyy",
        "Startup Name",
        "Industry Vertical",
        "SubVertical",
        "City  Location",
        "Investors Name",
        "InvestmentnType",
        "Amount in USD",
        "Remarks",
    ])?;
    for (i, r) in rounds.iter().enumerate() {
        let amount = r
            .amount
            .map(with_separators)
            .unwrap_or_else(|| "undisclosed".to_string());
        writer.write_record([
            (i + 1).to_string().as_str(),
            r.date_text.as_str(),
            r.startup.as_str(),
            r.industry,
            r.sub_vertical,
            r.city,
            r.investors,
            r.round_type,
            amount.as_str(),
            "",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rounds: &[Round]) -> Result<()> {
    let epoch = NaiveDate::default();
    let text = |f: fn(&Round) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(rounds.iter().map(f)))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, true),
        Field::new("startup_name", DataType::Utf8, true),
        Field::new("industry_vertical", DataType::Utf8, true),
        Field::new("sub_vertical", DataType::Utf8, true),
        Field::new("city_location", DataType::Utf8, true),
        Field::new("investors_name", DataType::Utf8, true),
        Field::new("investment_type", DataType::Utf8, true),
        Field::new("amount_usd", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from_iter_values(
                rounds.iter().map(|r| (r.date - epoch).num_days() as i32),
            )),
            text(|r| r.startup.as_str()),
            text(|r| r.industry),
            text(|r| r.sub_vertical),
            text(|r| r.city),
            text(|r| r.investors),
            text(|r| r.round_type),
            Arc::new(Float64Array::from_iter(rounds.iter().map(|r| r.amount))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).context("invalid start date")?;
    let rounds = generate(&mut rng, start);

    write_csv(&rounds)?;
    write_parquet(&rounds)?;

    println!("Wrote {} funding rounds to {CSV_PATH} and {PARQUET_PATH}", rounds.len());
    Ok(())
}
