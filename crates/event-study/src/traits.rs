//! Core trait definitions for summary tables.
//!
//! Every output table implements [`SummaryTable`], which describes the frame
//! it reads and reduces that frame with polars group-by expressions.

use crate::Result;
use derive_more::Display;
use polars::prelude::*;

/// Stage output a summary table is computed from.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSource {
    /// Classified annual view, one row per disclosure
    Annual,
    /// Sub-period hand-off table, one row per event × sub-period
    SubPeriod,
    /// Full event-window table, one row per event day
    EventWindow,
}

/// A descriptive table computed from one of the pipeline's outputs.
///
/// Tables hold no business logic of their own: they are pure reductions over
/// already-computed columns.
pub trait SummaryTable: Send + Sync + std::fmt::Debug {
    /// Unique identifier, also used as the output file stem.
    fn name(&self) -> &str;

    /// Human-readable description of the table.
    fn description(&self) -> &str;

    /// Frame the table is computed from.
    fn source(&self) -> TableSource;

    /// Columns required in the source frame.
    ///
    /// The caller must ensure these columns exist before calling `compute`.
    fn required_columns(&self) -> &[&str];

    /// Compute the table.
    fn compute(&self, data: &LazyFrame) -> Result<DataFrame>;
}

/// A summary table that supports runtime configuration.
pub trait ConfigurableTable: SummaryTable {
    /// Configuration type for this table.
    type Config: Default + Clone + Send + Sync + std::fmt::Debug;

    /// Create a new table with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;
}
