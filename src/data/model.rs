use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Dimension – a categorical column used for filtering or grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    County,
    Sex,
    MaritalStatus,
    Year,
    Age,
}

impl Dimension {
    /// The four dimensions exposed as sidebar filters, in display order.
    #[cfg(test)]
    pub const FILTERABLE: [Dimension; 4] = [
        Dimension::County,
        Dimension::Sex,
        Dimension::MaritalStatus,
        Dimension::Year,
    ];

    /// Column name after load-time normalization.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::County => "county",
            Dimension::Sex => "sex",
            Dimension::MaritalStatus => "marital_status",
            Dimension::Year => "year",
            Dimension::Age => "age",
        }
    }

    /// Human-readable name for UI and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::County => "county",
            Dimension::Sex => "sex",
            Dimension::MaritalStatus => "marital status",
            Dimension::Year => "year",
            Dimension::Age => "age",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// AgeValue – integer age or an age-bucket label
// ---------------------------------------------------------------------------

/// Ages are usually integers, but bucketed sources use labels such as
/// `"100+"` or `"15-19"`. Integers sort numerically before any label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeValue {
    Years(i64),
    Bucket(String),
}

impl AgeValue {
    /// Parse a raw cell; anything that is not an integer becomes a bucket label.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(years) => AgeValue::Years(years),
            Err(_) => AgeValue::Bucket(trimmed.to_string()),
        }
    }

    /// A float age is accepted only when it is a whole number (`30.0`).
    pub fn from_whole(v: f64) -> Option<Self> {
        (v.fract() == 0.0 && v.abs() < i64::MAX as f64).then(|| AgeValue::Years(v as i64))
    }
}

impl fmt::Display for AgeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeValue::Years(years) => write!(f, "{years}"),
            AgeValue::Bucket(label) => f.write_str(label),
        }
    }
}

impl<'de> Deserialize<'de> for AgeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AgeVisitor;

        impl Visitor<'_> for AgeVisitor {
            type Value = AgeValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer age or an age-bucket label")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<AgeValue, E> {
                Ok(AgeValue::Years(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<AgeValue, E> {
                i64::try_from(v)
                    .map(AgeValue::Years)
                    .map_err(|_| E::custom(format!("age {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<AgeValue, E> {
                AgeValue::from_whole(v)
                    .ok_or_else(|| E::custom(format!("age {v} is not a whole number")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<AgeValue, E> {
                if v.trim().is_empty() {
                    return Err(E::custom("empty age"));
                }
                Ok(AgeValue::parse(v))
            }
        }

        deserializer.deserialize_any(AgeVisitor)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One row. `population` counts people; the table is not one row per person.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub county: String,
    pub sex: String,
    pub marital_status: String,
    pub year: i64,
    pub age: AgeValue,
    pub population: u64,
}

// ---------------------------------------------------------------------------
// Domain – distinct observed values of one dimension
// ---------------------------------------------------------------------------

/// Distinct values in first-appearance order, with a sorted index for
/// membership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain<T: Ord + Clone> {
    ordered: Vec<T>,
    members: BTreeSet<T>,
}

impl<T: Ord + Clone> Default for Domain<T> {
    fn default() -> Self {
        Self {
            ordered: Vec::new(),
            members: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> Domain<T> {
    fn observe(&mut self, value: &T) {
        if !self.members.contains(value) {
            self.members.insert(value.clone());
            self.ordered.push(value.clone());
        }
    }

    /// Values in the order they first appear in the dataset.
    pub fn values(&self) -> &[T] {
        &self.ordered
    }

    pub fn first(&self) -> Option<&T> {
        self.ordered.first()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Every observed value as a set (an "all selected" filter).
    pub fn all(&self) -> BTreeSet<T> {
        self.members.clone()
    }
}

/// Observed values for each filterable dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains {
    pub county: Domain<String>,
    pub sex: Domain<String>,
    pub marital_status: Domain<String>,
    pub year: Domain<i64>,
}

impl Domains {
    fn from_records(records: &[Record]) -> Self {
        let mut domains = Domains::default();
        for rec in records {
            domains.county.observe(&rec.county);
            domains.sex.observe(&rec.sex);
            domains.marital_status.observe(&rec.marital_status);
            domains.year.observe(&rec.year);
        }
        domains
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
    domains: Domains,
}

impl Dataset {
    /// Build the dataset and its per-dimension domains.
    pub fn from_records(records: Vec<Record>) -> Self {
        let domains = Domains::from_records(&records);
        Dataset { records, domains }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn record(
    county: &str,
    sex: &str,
    marital_status: &str,
    year: i64,
    age: i64,
    population: u64,
) -> Record {
    Record {
        county: county.to_string(),
        sex: sex.to_string(),
        marital_status: marital_status.to_string(),
        year,
        age: AgeValue::Years(age),
        population,
    }
}
