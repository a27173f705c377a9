use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

/// Canonical names assigned to the ten positional source columns, in order.
pub const SOURCE_COLUMNS: [&str; 10] = [
    "Sr No",
    "Date",
    "Startup Name",
    "Industry Vertical",
    "SubVertical",
    "City Location",
    "Investors Name",
    "Investment Type",
    "Amount in USD",
    "Remarks",
];

/// Columns kept after load (index and remarks are dropped), in display order.
pub const DISPLAY_COLUMNS: [&str; 8] = [
    "Date",
    "Startup Name",
    "Industry Vertical",
    "SubVertical",
    "City Location",
    "Investors Name",
    "Investment Type",
    "Amount in USD",
];

// ---------------------------------------------------------------------------
// FundingRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single funding round after coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FundingRecord {
    pub startup_name: String,
    pub industry: Option<String>,
    pub sub_vertical: Option<String>,
    pub city: Option<String>,
    /// Raw investor field; may list several names in one value.
    pub investors: Option<String>,
    pub investment_type: Option<String>,
    /// Always finite when present.
    pub amount_usd: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl FundingRecord {
    /// Calendar year of the funding date, if the date parsed.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Amount with null treated as zero, for summation.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount_usd.unwrap_or(0.0)
    }

    /// Cell text for the data grid, in [`DISPLAY_COLUMNS`] order.
    pub fn display_cells(&self) -> [String; 8] {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        [
            self.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.startup_name.clone(),
            text(&self.industry),
            text(&self.sub_vertical),
            text(&self.city),
            text(&self.investors),
            text(&self.investment_type),
            self.amount_usd
                .map(|a| format!("{a:.0}"))
                .unwrap_or_default(),
        ]
    }
}

// ---------------------------------------------------------------------------
// FundingTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All loaded records plus the option lists offered by the filter panel.
#[derive(Debug, Clone, Default)]
pub struct FundingTable {
    /// Records in source order.
    pub records: Vec<FundingRecord>,
    /// Sorted unique non-null industries.
    pub industries: BTreeSet<String>,
    /// Sorted unique non-null cities.
    pub cities: BTreeSet<String>,
    /// Sorted unique years among parsed dates.
    pub years: BTreeSet<i32>,
}

impl FundingTable {
    /// Build the filter option indices from the loaded records.
    pub fn from_records(records: Vec<FundingRecord>) -> Self {
        let mut industries = BTreeSet::new();
        let mut cities = BTreeSet::new();
        let mut years = BTreeSet::new();

        for rec in &records {
            if let Some(industry) = &rec.industry {
                industries.insert(industry.clone());
            }
            if let Some(city) = &rec.city {
                cities.insert(city.clone());
            }
            if let Some(year) = rec.year() {
                years.insert(year);
            }
        }

        FundingTable {
            records,
            industries,
            cities,
            years,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether at least one record carries a parsed date.
    pub fn has_dates(&self) -> bool {
        self.records.iter().any(|r| r.date.is_some())
    }
}
