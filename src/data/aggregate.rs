use std::collections::{BTreeMap, BTreeSet};

use super::filter::FilteredView;
use super::model::AgeValue;

// ---------------------------------------------------------------------------
// KPI summary
// ---------------------------------------------------------------------------

/// Scalar figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiSummary {
    pub total_population: u64,
    /// Most frequent marital status by row count.
    pub modal_marital_status: String,
    pub distinct_counties: usize,
}

/// Compute the KPIs for a view.
pub fn summarize(view: &FilteredView<'_>) -> KpiSummary {
    let total: u128 = view.iter().map(|rec| u128::from(rec.population)).sum();

    let mut status_rows: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in view.iter() {
        *status_rows.entry(rec.marital_status.as_str()).or_default() += 1;
    }

    let counties: BTreeSet<&str> = view.iter().map(|rec| rec.county.as_str()).collect();

    KpiSummary {
        total_population: u64::try_from(total).unwrap_or(u64::MAX),
        modal_marital_status: mode(&status_rows).to_string(),
        distinct_counties: counties.len(),
    }
}

/// Key with the highest count; ties go to the lexicographically smallest key.
fn mode<'a>(counts: &BTreeMap<&'a str, usize>) -> &'a str {
    let mut best: Option<(&str, usize)> = None;
    // BTreeMap iterates keys ascending, so a strict `>` keeps the smallest
    // key among equal counts.
    for (&key, &count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Aggregate tables
// ---------------------------------------------------------------------------

/// Population summed per group key, keys ascending. Groups with no rows are
/// absent rather than zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateTable<K> {
    rows: Vec<(K, u64)>,
}

impl<K: Ord + Clone> AggregateTable<K> {
    fn from_sums(sums: BTreeMap<K, u128>) -> Self {
        let rows = sums
            .into_iter()
            .map(|(key, sum)| (key, u64::try_from(sum).unwrap_or(u64::MAX)))
            .collect();
        AggregateTable { rows }
    }

    pub fn rows(&self) -> &[(K, u64)] {
        &self.rows
    }

    pub fn get(&self, key: &K) -> Option<u64> {
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, population)| population)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|(k, _)| k)
    }

    /// Sum over every group, saturating like the per-group sums.
    pub fn total(&self) -> u64 {
        let total: u128 = self
            .rows
            .iter()
            .map(|&(_, population)| u128::from(population))
            .sum();
        u64::try_from(total).unwrap_or(u64::MAX)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The grouped sums behind the four charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSet {
    /// One year-ascending series per sex.
    pub by_sex_year: BTreeMap<String, AggregateTable<i64>>,
    pub by_sex: AggregateTable<String>,
    pub by_marital_status: AggregateTable<String>,
    pub by_age: AggregateTable<AgeValue>,
}

/// Compute every grouped sum in a single pass over the view.
pub fn aggregate(view: &FilteredView<'_>) -> AggregateSet {
    let mut by_sex_year: BTreeMap<String, BTreeMap<i64, u128>> = BTreeMap::new();
    let mut by_sex: BTreeMap<String, u128> = BTreeMap::new();
    let mut by_marital_status: BTreeMap<String, u128> = BTreeMap::new();
    let mut by_age: BTreeMap<AgeValue, u128> = BTreeMap::new();

    for rec in view.iter() {
        let population = u128::from(rec.population);
        *by_sex_year
            .entry(rec.sex.clone())
            .or_default()
            .entry(rec.year)
            .or_default() += population;
        *by_sex.entry(rec.sex.clone()).or_default() += population;
        *by_marital_status
            .entry(rec.marital_status.clone())
            .or_default() += population;
        *by_age.entry(rec.age.clone()).or_default() += population;
    }

    AggregateSet {
        by_sex_year: by_sex_year
            .into_iter()
            .map(|(sex, years)| (sex, AggregateTable::from_sums(years)))
            .collect(),
        by_sex: AggregateTable::from_sums(by_sex),
        by_marital_status: AggregateTable::from_sums(by_marital_status),
        by_age: AggregateTable::from_sums(by_age),
    }
}
