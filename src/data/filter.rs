use std::collections::BTreeSet;

use crate::error::{DashboardError, EmptyReason};

use super::model::{Dataset, Dimension, Domain, Domains, Record};

// ---------------------------------------------------------------------------
// Filter predicate: which observed values are selected per dimension
// ---------------------------------------------------------------------------

/// Allowed values for each filterable dimension.
///
/// An empty set means nothing in that dimension is allowed, so nothing
/// matches. It never means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub county: BTreeSet<String>,
    pub sex: BTreeSet<String>,
    pub marital_status: BTreeSet<String>,
    pub year: BTreeSet<i64>,
}

impl FilterSelection {
    /// The initial sidebar state.
    ///
    /// * county: the first observed county only
    /// * sex, marital status: every observed value
    /// * year: `default_year` if it was observed, otherwise nothing
    pub fn defaults(domains: &Domains, default_year: i64) -> Self {
        let mut year = BTreeSet::new();
        if domains.year.contains(&default_year) {
            year.insert(default_year);
        }
        FilterSelection {
            county: domains.county.first().cloned().into_iter().collect(),
            sex: domains.sex.all(),
            marital_status: domains.marital_status.all(),
            year,
        }
    }

    /// Select every observed value in every dimension.
    pub fn everything(domains: &Domains) -> Self {
        FilterSelection {
            county: domains.county.all(),
            sex: domains.sex.all(),
            marital_status: domains.marital_status.all(),
            year: domains.year.all(),
        }
    }

    /// Whether `record` passes every dimension's membership test.
    pub fn matches(&self, record: &Record) -> bool {
        self.county.contains(&record.county)
            && self.sex.contains(&record.sex)
            && self.marital_status.contains(&record.marital_status)
            && self.year.contains(&record.year)
    }

    /// Reject selections that cannot match anything, before scanning rows.
    fn validate(&self, domains: &Domains) -> Result<(), EmptyReason> {
        check(Dimension::County, &self.county, &domains.county)?;
        check(Dimension::Sex, &self.sex, &domains.sex)?;
        check(
            Dimension::MaritalStatus,
            &self.marital_status,
            &domains.marital_status,
        )?;
        check(Dimension::Year, &self.year, &domains.year)
    }
}

fn check<T: Ord + Clone + std::fmt::Debug>(
    dim: Dimension,
    selected: &BTreeSet<T>,
    domain: &Domain<T>,
) -> Result<(), EmptyReason> {
    if selected.is_empty() {
        return Err(EmptyReason::NoValuesSelected(dim));
    }
    if let Some(unknown) = selected.iter().find(|v| !domain.contains(v)) {
        log::warn!("Selected {dim} {unknown:?} was never observed in the dataset");
        return Err(EmptyReason::OutOfDomain(dim));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FilteredView – records in scope for aggregation
// ---------------------------------------------------------------------------

/// The records of a dataset that match a selection, in dataset order.
///
/// Only [`select`] builds one, and never with zero records, so every
/// aggregation over a view has at least one row to work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Return the records of `dataset` passing every filter.
///
/// Fails with [`DashboardError::EmptySelection`] when a dimension has no
/// selected values, when a selected value was never observed, or when no
/// record matches.
pub fn filter<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>, DashboardError> {
    select(dataset, selection).map_err(DashboardError::EmptySelection)
}

/// [`filter`] with the bare reason as its error.
pub fn select<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>, EmptyReason> {
    selection.validate(dataset.domains())?;

    let records: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|rec| selection.matches(rec))
        .collect();

    if records.is_empty() {
        return Err(EmptyReason::NoMatchingRows);
    }
    Ok(FilteredView { records })
}
