//! Reporting-lag tables.
//!
//! Reporting lag is the number of days between the fiscal period end and the
//! earnings announcement. Both tables group by fiscal year.

use crate::{
    Result,
    traits::{ConfigurableTable, SummaryTable, TableSource},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column name for a percentile, e.g. `0.25` → `p25`.
fn percentile_name(q: f64) -> String {
    format!("p{}", (q * 100.0).round() as i64)
}

/// Configuration for the [`LagPercentiles`] table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagPercentilesConfig {
    /// Percentiles to report, in `[0, 1]`.
    pub percentiles: Vec<f64>,
}

impl Default for LagPercentilesConfig {
    fn default() -> Self {
        Self {
            percentiles: vec![0.10, 0.25, 0.50, 0.75, 0.90],
        }
    }
}

/// Per-year distribution of reporting lag.
///
/// # Required Columns
/// - `fiscal_year`: Fiscal year of the disclosure
/// - `reporting_lag`: Days from fiscal period end to report date
///
/// # Returns
/// DataFrame with columns: `fiscal_year`, `count`, `mean`, and one `pNN`
/// column per configured percentile.
#[derive(Debug, Clone, Default)]
pub struct LagPercentiles {
    config: LagPercentilesConfig,
}

impl SummaryTable for LagPercentiles {
    fn name(&self) -> &str {
        "lag_percentiles"
    }

    fn description(&self) -> &str {
        "Per fiscal year count, mean and percentiles of reporting lag in days"
    }

    fn source(&self) -> TableSource {
        TableSource::Annual
    }

    fn required_columns(&self) -> &[&str] {
        &["fiscal_year", "reporting_lag"]
    }

    fn compute(&self, data: &LazyFrame) -> Result<DataFrame> {
        let lag = || col("reporting_lag").cast(DataType::Float64);

        let mut aggs = vec![
            len().cast(DataType::Int64).alias("count"),
            lag().mean().alias("mean"),
        ];
        aggs.extend(self.config.percentiles.iter().map(|&q| {
            lag()
                .quantile(lit(q), QuantileMethod::Linear)
                .alias(percentile_name(q))
        }));

        let result = data
            .clone()
            .filter(col("reporting_lag").is_not_null())
            .group_by([col("fiscal_year")])
            .agg(aggs)
            .sort(["fiscal_year"], SortMultipleOptions::default())
            .collect()?;

        Ok(result)
    }
}

impl ConfigurableTable for LagPercentiles {
    type Config = LagPercentilesConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

/// Per-year median of the year-over-year change in reporting lag.
///
/// # Required Columns
/// - `fiscal_year`: Fiscal year of the disclosure
/// - `reporting_lag_delta`: Year-over-year change in reporting lag
///
/// # Returns
/// DataFrame with columns: `fiscal_year`, `count`, `median`
#[derive(Debug, Clone, Default)]
pub struct LagDeltaMedians;

impl SummaryTable for LagDeltaMedians {
    fn name(&self) -> &str {
        "lag_delta_medians"
    }

    fn description(&self) -> &str {
        "Per fiscal year median of the year-over-year change in reporting lag"
    }

    fn source(&self) -> TableSource {
        TableSource::Annual
    }

    fn required_columns(&self) -> &[&str] {
        &["fiscal_year", "reporting_lag_delta"]
    }

    fn compute(&self, data: &LazyFrame) -> Result<DataFrame> {
        let result = data
            .clone()
            .filter(col("reporting_lag_delta").is_not_null())
            .group_by([col("fiscal_year")])
            .agg([
                len().cast(DataType::Int64).alias("count"),
                col("reporting_lag_delta")
                    .cast(DataType::Float64)
                    .median()
                    .alias("median"),
            ])
            .sort(["fiscal_year"], SortMultipleOptions::default())
            .collect()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn annual() -> DataFrame {
        df![
            "fiscal_year" => [2001, 2001, 2001, 2000, 2000],
            "reporting_lag" => [Some(30i64), Some(60), Some(90), Some(45), None],
            "reporting_lag_delta" => [Some(-5i64), Some(3), None, None, Some(10)]
        ]
        .unwrap()
    }

    #[test]
    fn test_percentile_names() {
        assert_eq!(percentile_name(0.1), "p10");
        assert_eq!(percentile_name(0.5), "p50");
        assert_eq!(percentile_name(0.95), "p95");
    }

    #[test]
    fn test_lag_percentiles() {
        let table = LagPercentiles::with_config(LagPercentilesConfig {
            percentiles: vec![0.5],
        });
        let result = table.compute(&annual().lazy()).unwrap();

        assert_eq!(result.height(), 2);
        let years = result.column("fiscal_year").unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(2000));
        assert_eq!(years.get(1), Some(2001));

        let counts = result.column("count").unwrap().i64().unwrap();
        assert_eq!(counts.get(0), Some(1));
        assert_eq!(counts.get(1), Some(3));

        let medians = result.column("p50").unwrap().f64().unwrap();
        assert_relative_eq!(medians.get(1).unwrap(), 60.0, epsilon = 1e-9);
        let means = result.column("mean").unwrap().f64().unwrap();
        assert_relative_eq!(means.get(0).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lag_delta_medians() {
        let result = LagDeltaMedians.compute(&annual().lazy()).unwrap();

        assert_eq!(result.height(), 2);
        let medians = result.column("median").unwrap().f64().unwrap();
        assert_relative_eq!(medians.get(0).unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(medians.get(1).unwrap(), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_metadata() {
        let table = LagPercentiles::default();
        assert_eq!(table.name(), "lag_percentiles");
        assert_eq!(table.source(), TableSource::Annual);
        assert_eq!(table.config().percentiles.len(), 5);
    }
}
