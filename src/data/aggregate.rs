use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;

use chrono::NaiveDate;

use super::model::FundingRecord;

/// Label used for rows whose industry is null in per-industry series.
pub const UNKNOWN_INDUSTRY: &str = "Unknown";

// ---------------------------------------------------------------------------
// Grouped – result of a group-by
// ---------------------------------------------------------------------------

/// Groups in ascending key order, plus whatever the unkeyed rows carried.
///
/// Keeping `unkeyed` means `groups` + `unkeyed` always reconciles with the
/// ungrouped total, even though charts only show keyed groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<K, V = f64> {
    pub groups: Vec<(K, V)>,
    pub unkeyed: V,
}

impl<K: Clone, V: Copy + Default + AddAssign + PartialOrd> Grouped<K, V> {
    /// Sum over keyed groups and the unkeyed remainder.
    pub fn total(&self) -> V {
        let mut total = self.unkeyed;
        for (_, v) in &self.groups {
            total += *v;
        }
        total
    }

    /// Largest `n` groups, descending. Ties stay in ascending key order.
    pub fn top_n(&self, n: usize) -> Vec<(K, V)> {
        let mut ranked = self.groups.clone();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

/// Group rows by `key` and fold each row's `value` into its group.
fn group_by<K, V, FK, FV>(records: &[&FundingRecord], key: FK, value: FV) -> Grouped<K, V>
where
    K: Ord,
    V: Copy + Default + AddAssign,
    FK: Fn(&FundingRecord) -> Option<K>,
    FV: Fn(&FundingRecord) -> V,
{
    let mut groups: BTreeMap<K, V> = BTreeMap::new();
    let mut unkeyed = V::default();
    for &rec in records {
        let v = value(rec);
        match key(rec) {
            Some(k) => *groups.entry(k).or_default() += v,
            None => unkeyed += v,
        }
    }
    Grouped {
        groups: groups.into_iter().collect(),
        unkeyed,
    }
}

// ---------------------------------------------------------------------------
// KPI scalars
// ---------------------------------------------------------------------------

/// Sum of amounts, null counted as zero.
pub fn total_funding(records: &[&FundingRecord]) -> f64 {
    records.iter().map(|r| r.amount_or_zero()).sum()
}

/// Most frequent non-null city.
///
/// Ties resolve to the tied value that appears first in row order.
pub fn modal_city(records: &[&FundingRecord]) -> Option<String> {
    let counts = counts_in_encounter_order(records.iter().filter_map(|r| r.city.as_deref()));
    let mut best: Option<(&str, usize)> = None;
    for &(city, n) in &counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((city, n));
        }
    }
    best.map(|(city, _)| city.to_string())
}

/// Headline numbers shown above the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_startups: usize,
    pub total_funding: f64,
    pub top_city: Option<String>,
}

impl Kpis {
    pub fn compute(records: &[&FundingRecord]) -> Self {
        Kpis {
            total_startups: records.len(),
            total_funding: total_funding(records),
            top_city: modal_city(records),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped sums / counts
// ---------------------------------------------------------------------------

pub fn sum_by_city(records: &[&FundingRecord]) -> Grouped<String> {
    group_by(records, |r| r.city.clone(), FundingRecord::amount_or_zero)
}

pub fn sum_by_industry(records: &[&FundingRecord]) -> Grouped<String> {
    group_by(records, |r| r.industry.clone(), FundingRecord::amount_or_zero)
}

pub fn sum_by_year(records: &[&FundingRecord]) -> Grouped<i32> {
    group_by(records, FundingRecord::year, FundingRecord::amount_or_zero)
}

/// Investor field is grouped as-is; multi-investor values are not split.
pub fn sum_by_investor(records: &[&FundingRecord]) -> Grouped<String> {
    group_by(records, |r| r.investors.clone(), FundingRecord::amount_or_zero)
}

/// Number of rounds per calendar year, in year order.
pub fn count_by_year(records: &[&FundingRecord]) -> Grouped<i32, usize> {
    group_by(records, FundingRecord::year, |_| 1usize)
}

/// Top `n` investor-field values by number of rounds, non-increasing.
///
/// Values are counted unsplit. Ties keep the order in which values first appear.
pub fn investor_ranking(records: &[&FundingRecord], n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> =
        counts_in_encounter_order(records.iter().filter_map(|r| r.investors.as_deref()))
            .into_iter()
            .map(|(name, c)| (name.to_string(), c))
            .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

fn counts_in_encounter_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for v in values {
        match slot.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(v, counts.len());
                counts.push((v, 1));
            }
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Amount over time
// ---------------------------------------------------------------------------

/// Dated amounts per industry, each series in date order.
///
/// Rows missing a date or an amount are left out.
pub fn amount_over_time(records: &[&FundingRecord]) -> BTreeMap<String, Vec<(NaiveDate, f64)>> {
    let mut series: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for rec in records {
        if let (Some(date), Some(amount)) = (rec.date, rec.amount_usd) {
            let industry = rec.industry.as_deref().unwrap_or(UNKNOWN_INDUSTRY);
            series
                .entry(industry.to_string())
                .or_default()
                .push((date, amount));
        }
    }
    for points in series.values_mut() {
        points.sort_by_key(|(d, _)| *d);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn with_investor(mut rec: FundingRecord, investors: &str) -> FundingRecord {
        rec.investors = Some(investors.to_string());
        rec
    }

    fn sample() -> Vec<FundingRecord> {
        vec![
            record("a", Some("Fintech"), Some("Pune"), Some((2016, 5, 1)), Some(10.0)),
            record("b", Some("Ecommerce"), Some("Mumbai"), Some((2017, 5, 1)), Some(20.0)),
            record("c", Some("Fintech"), Some("Mumbai"), Some((2017, 8, 9)), None),
            record("d", None, None, None, Some(40.0)),
            record("e", Some("Fintech"), Some("Pune"), Some((2016, 1, 1)), Some(5.5)),
        ]
    }

    #[test]
    fn total_funding_treats_null_as_zero() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        assert!((total_funding(&refs) - 75.5).abs() < 1e-9);
    }

    #[test]
    fn modal_city_tie_goes_to_first_encountered() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        // Pune and Mumbai both appear twice; Pune is seen first.
        assert_eq!(modal_city(&refs).as_deref(), Some("Pune"));

        let reversed: Vec<&FundingRecord> = rows.iter().rev().collect();
        assert_eq!(modal_city(&reversed).as_deref(), Some("Pune"));

        let mumbai_first: Vec<&FundingRecord> = vec![&rows[1], &rows[0], &rows[2], &rows[4]];
        assert_eq!(modal_city(&mumbai_first).as_deref(), Some("Mumbai"));
    }

    #[test]
    fn modal_city_of_cityless_rows_is_none() {
        let rows = vec![record("x", None, None, None, None)];
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        assert_eq!(modal_city(&refs), None);
    }

    #[test]
    fn grouped_sums_reconcile_with_direct_total() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        let direct = total_funding(&refs);

        for grouped in [sum_by_city(&refs), sum_by_industry(&refs), sum_by_investor(&refs)] {
            assert!((grouped.total() - direct).abs() < 1e-9);
        }
        assert!((sum_by_year(&refs).total() - direct).abs() < 1e-9);
    }

    #[test]
    fn city_top_n_is_descending_and_truncated() {
        let rows: Vec<FundingRecord> = (0..15)
            .map(|i| record("s", None, Some(&format!("City{i:02}")), None, Some(i as f64)))
            .collect();
        let refs: Vec<&FundingRecord> = rows.iter().collect();

        let top = sum_by_city(&refs).top_n(10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].0, "City14");
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_n_ties_keep_key_order() {
        let rows = vec![
            record("a", None, Some("Delhi"), None, Some(5.0)),
            record("b", None, Some("Agra"), None, Some(5.0)),
        ];
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        let top = sum_by_city(&refs).top_n(10);
        assert_eq!(top[0].0, "Agra");
        assert_eq!(top[1].0, "Delhi");
    }

    #[test]
    fn yearly_counts_are_in_key_order() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        let counts = count_by_year(&refs);
        assert_eq!(counts.groups, vec![(2016, 2), (2017, 2)]);
        assert_eq!(counts.unkeyed, 1);
        assert_eq!(counts.total(), rows.len());
    }

    #[test]
    fn investor_ranking_is_unsplit_and_bounded() {
        let base = record("s", None, None, None, None);
        let mut rows = vec![
            with_investor(base.clone(), "Sequoia, Accel"),
            with_investor(base.clone(), "Accel"),
            with_investor(base.clone(), "Sequoia, Accel"),
            base.clone(),
        ];
        for i in 0..12 {
            rows.push(with_investor(base.clone(), &format!("Angel {i}")));
        }
        let refs: Vec<&FundingRecord> = rows.iter().collect();

        let ranking = investor_ranking(&refs, 10);
        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0], ("Sequoia, Accel".to_string(), 2));
        assert_eq!(ranking[1], ("Accel".to_string(), 1));
        assert_eq!(ranking[2].0, "Angel 0");
        assert!(ranking.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn amount_over_time_groups_by_industry_in_date_order() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        let series = amount_over_time(&refs);

        let fintech = &series["Fintech"];
        assert_eq!(fintech.len(), 2);
        assert!(fintech[0].0 < fintech[1].0);
        assert_eq!(series["Ecommerce"].len(), 1);
        assert!(!series.contains_key(UNKNOWN_INDUSTRY));
    }

    #[test]
    fn kpis_on_sample() {
        let rows = sample();
        let refs: Vec<&FundingRecord> = rows.iter().collect();
        let kpis = Kpis::compute(&refs);
        assert_eq!(kpis.total_startups, 5);
        assert_eq!(kpis.top_city.as_deref(), Some("Pune"));
    }
}
