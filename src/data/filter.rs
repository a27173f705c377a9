use std::fmt;

use super::model::{FundingRecord, FundingTable};

// ---------------------------------------------------------------------------
// Filter predicate: one optional equality constraint per dimension
// ---------------------------------------------------------------------------

/// Selection for one filter dimension. `All` is the "no constraint" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// Whether a (possibly null) field value passes this selection.
    /// A null value never matches an `Only` selection.
    pub fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

/// Industry / city / year constraints, composed conjunctively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub industry: Selection<String>,
    pub city: Selection<String>,
    pub year: Selection<i32>,
}

impl FilterCriteria {
    /// Whether a record passes every active constraint.
    pub fn matches(&self, rec: &FundingRecord) -> bool {
        self.industry.admits(rec.industry.as_ref())
            && self.city.admits(rec.city.as_ref())
            && self.year.admits(rec.year().as_ref())
    }

    /// True when every dimension is `All`.
    pub fn is_unconstrained(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Return indices of records that pass all active filters, in source order.
pub fn filtered_indices(table: &FundingTable, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.is_unconstrained() {
        return (0..table.len()).collect();
    }
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Borrow the records behind a set of indices.
pub fn select<'a>(table: &'a FundingTable, indices: &[usize]) -> Vec<&'a FundingRecord> {
    indices
        .iter()
        .filter_map(|&i| table.records.get(i))
        .collect()
}
