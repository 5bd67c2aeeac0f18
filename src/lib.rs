//! Population statistics dashboard.
//!
//! [`data`] and [`pipeline`] hold the framework-agnostic core; [`app`],
//! [`state`] and [`ui`] are the egui front end.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod ui;

pub use config::DashboardConfig;
pub use data::cache::DatasetCache;
pub use error::{DashboardError, EmptyReason};
pub use pipeline::{ViewModel, render};
