//! Framework-agnostic render pipeline: dataset + selection → view model.
//!
//! The UI calls [`render`] whenever the selection changes and draws whatever
//! comes back. Nothing here knows about egui.

use crate::data::aggregate::{AggregateSet, KpiSummary, aggregate, summarize};
use crate::data::filter::{FilterSelection, select};
use crate::data::model::Dataset;
use crate::error::EmptyReason;

/// Everything the presentation layer needs for one frame of the main area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewModel {
    /// Nothing matches; the main area shows a warning instead of figures.
    NoData(EmptyReason),
    Dashboard {
        /// Rows in the filtered view.
        rows: usize,
        kpis: KpiSummary,
        aggregates: AggregateSet,
    },
}

impl ViewModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, ViewModel::NoData(_))
    }

    /// Rows in view; zero for the no-data state.
    pub fn rows(&self) -> usize {
        match self {
            ViewModel::NoData(_) => 0,
            ViewModel::Dashboard { rows, .. } => *rows,
        }
    }
}

/// Run filter → summarize → aggregate. An empty selection short-circuits
/// before any aggregation runs.
pub fn render(dataset: &Dataset, selection: &FilterSelection) -> ViewModel {
    let view = match select(dataset, selection) {
        Ok(view) => view,
        Err(reason) => {
            log::debug!("Selection is empty: {reason}");
            return ViewModel::NoData(reason);
        }
    };

    log::debug!("Recomputing dashboard over {} rows", view.len());
    ViewModel::Dashboard {
        rows: view.len(),
        kpis: summarize(&view),
        aggregates: aggregate(&view),
    }
}

/// Format an integer with `,` thousands separators (`1234567` → `1,234,567`).
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
