//! Good- and bad-news event counts per fiscal year and sub-period.

use crate::{
    Result,
    traits::{SummaryTable, TableSource},
};
use polars::prelude::*;

/// Number of good-news and bad-news events per fiscal year and sub-period.
///
/// # Required Columns
/// - `fiscal_year`: Fiscal year of the event
/// - `sub_period`: Sub-period label (1, 2, 3)
/// - `news`: `good` or `bad`
///
/// # Returns
/// DataFrame with columns: `fiscal_year`, `sub_period`, `good`, `bad`, `total`
#[derive(Debug, Clone, Default)]
pub struct NewsCounts;

impl SummaryTable for NewsCounts {
    fn name(&self) -> &str {
        "news_counts"
    }

    fn description(&self) -> &str {
        "Per fiscal year and sub-period count of good-news and bad-news events"
    }

    fn source(&self) -> TableSource {
        TableSource::SubPeriod
    }

    fn required_columns(&self) -> &[&str] {
        &["fiscal_year", "sub_period", "news"]
    }

    fn compute(&self, data: &LazyFrame) -> Result<DataFrame> {
        let result = data
            .clone()
            .group_by([col("fiscal_year"), col("sub_period")])
            .agg([
                col("news")
                    .eq(lit("good"))
                    .sum()
                    .cast(DataType::Int64)
                    .alias("good"),
                col("news")
                    .eq(lit("bad"))
                    .sum()
                    .cast(DataType::Int64)
                    .alias("bad"),
                len().cast(DataType::Int64).alias("total"),
            ])
            .sort(
                ["fiscal_year", "sub_period"],
                SortMultipleOptions::default().with_order_descending_multi([false, false]),
            )
            .collect()?;

        Ok(result)
    }
}
