use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Dimension;

// ---------------------------------------------------------------------------
// Dashboard errors
// ---------------------------------------------------------------------------

/// The two ways a render cycle can fail.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset could not be produced. Fatal at startup.
    #[error("data unavailable at {}", .path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The current selection yields no rows. Shown as a warning; KPIs and
    /// charts are skipped for that cycle.
    #[error("no data for the current selection: {0}")]
    EmptySelection(EmptyReason),
}

impl DashboardError {
    pub fn data_unavailable(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        DashboardError::DataUnavailable {
            path: path.into(),
            source,
        }
    }

    /// The reason when this is an `EmptySelection`.
    #[cfg(test)]
    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            DashboardError::EmptySelection(reason) => Some(reason),
            DashboardError::DataUnavailable { .. } => None,
        }
    }
}

/// Why a selection produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing is selected for this dimension.
    NoValuesSelected(Dimension),
    /// A selected value was never observed in this dimension.
    OutOfDomain(Dimension),
    /// Every dimension has selections but no record satisfies all of them.
    NoMatchingRows,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoValuesSelected(dim) => write!(f, "no {} selected", dim.label()),
            EmptyReason::OutOfDomain(dim) => {
                write!(f, "selected {} is not present in the data", dim.label())
            }
            EmptyReason::NoMatchingRows => write!(f, "no rows match every filter"),
        }
    }
}
