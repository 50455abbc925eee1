//! Summary table registry for discovery and bulk computation.

use crate::{
    EventStudyConfig, EventStudyError, Result,
    summary::{CarSeparation, LagDeltaMedians, LagPercentiles, LagPercentilesConfig, NewsCounts, ReturnCurves},
    traits::{ConfigurableTable, SummaryTable, TableSource},
};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Metadata for table introspection.
#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Table name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Frame the table reads
    pub source: TableSource,
    /// Required input columns
    pub required_columns: Vec<String>,
}

/// The three stage outputs summary tables are computed from.
#[derive(Debug, Clone)]
pub struct SourceFrames {
    /// Classified annual view
    pub annual: DataFrame,
    /// Sub-period hand-off table
    pub sub_period: DataFrame,
    /// Full event-window table
    pub event_window: DataFrame,
}

impl SourceFrames {
    /// Frame for a given source.
    pub const fn get(&self, source: TableSource) -> &DataFrame {
        match source {
            TableSource::Annual => &self.annual,
            TableSource::SubPeriod => &self.sub_period,
            TableSource::EventWindow => &self.event_window,
        }
    }
}

/// Registry of summary tables, ordered by name.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: BTreeMap<String, Arc<dyn SummaryTable>>,
}

impl TableRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Register all standard tables with default configuration.
    pub fn with_defaults() -> Self {
        Self::from_config(&EventStudyConfig::default())
    }

    /// Register all standard tables, configured from `config`.
    pub fn from_config(config: &EventStudyConfig) -> Self {
        let mut registry = Self::new();

        // Annual view
        registry.register(Arc::new(LagPercentiles::with_config(LagPercentilesConfig {
            percentiles: config.percentiles.clone(),
        })));
        registry.register(Arc::new(LagDeltaMedians));

        // Sub-period table
        registry.register(Arc::new(NewsCounts));
        registry.register(Arc::new(CarSeparation));

        // Event window
        registry.register(Arc::new(ReturnCurves));

        registry
    }

    /// Register a table in the registry.
    pub fn register(&mut self, table: Arc<dyn SummaryTable>) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Get a table by name.
    pub fn get(&self, name: &str) -> Option<&dyn SummaryTable> {
        self.tables.get(name).map(|t| t.as_ref())
    }

    /// Get all table metadata.
    pub fn all_info(&self) -> Vec<TableInfo> {
        self.tables
            .values()
            .map(|t| TableInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                source: t.source(),
                required_columns: t.required_columns().iter().map(|s| s.to_string()).collect(),
            })
            .collect()
    }

    /// Get all table names.
    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    /// Compute one table by name.
    pub fn compute(&self, name: &str, frames: &SourceFrames) -> Result<DataFrame> {
        let table = self
            .get(name)
            .ok_or_else(|| EventStudyError::TableNotFound(name.to_string()))?;
        compute_checked(table, frames)
    }

    /// Compute every registered table, in name order.
    pub fn compute_all(&self, frames: &SourceFrames) -> Result<Vec<(String, DataFrame)>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), compute_checked(table.as_ref(), frames)?)))
            .collect()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn compute_checked(table: &dyn SummaryTable, frames: &SourceFrames) -> Result<DataFrame> {
    let data = frames.get(table.source());
    if let Some(missing) = table
        .required_columns()
        .iter()
        .find(|name| data.column(name).is_err())
    {
        return Err(EventStudyError::MissingColumn((*missing).to_string()));
    }

    let result = table.compute(&data.clone().lazy())?;
    if result.height() == 0 {
        warn!(table = table.name(), "summary table is empty");
    }
    debug!(table = table.name(), rows = result.height(), "computed summary table");
    Ok(result)
}
