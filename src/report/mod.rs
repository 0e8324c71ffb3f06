//! Report registry and runner.
//!
//! - [`catalog`] - the 22 reports and the `before` setup operation
//! - [`params`] - tunable report parameters
//! - [`runner`] - prepares a store once, then runs reports by name
//! - [`result`] - ordered result sets

pub mod catalog;
pub mod params;
pub mod result;
pub mod runner;

pub use catalog::{find, reports, ReportDef, BEFORE};
pub use params::ReportParams;
pub use result::ResultSet;
pub use runner::{before, ReportRunner};

use crate::store::StoreError;

/// Error type for running reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Scalar '{name}' of {report} returned {rows} row(s) of {columns} column(s), expected a single value")]
    ScalarShape {
        report: String,
        name: String,
        rows: usize,
        columns: usize,
    },
}
