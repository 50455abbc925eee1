//! Good-vs-bad separation in cumulative abnormal return.

use crate::{
    Result,
    traits::{SummaryTable, TableSource},
};
use polars::prelude::*;

/// Mean sub-period cumulative abnormal return by news class.
///
/// `separation = good_mean - bad_mean`. When either class has no events in
/// a group its mean, and therefore the separation, is null.
///
/// # Required Columns
/// - `fiscal_year`: Fiscal year of the event
/// - `sub_period`: Sub-period label (1, 2, 3)
/// - `news`: `good` or `bad`
/// - `cum_abnormal_return`: Terminal cumulative abnormal return of the sub-period
///
/// # Returns
/// DataFrame with columns: `fiscal_year`, `sub_period`, `good_mean`,
/// `bad_mean`, `separation`
#[derive(Debug, Clone, Default)]
pub struct CarSeparation;

impl SummaryTable for CarSeparation {
    fn name(&self) -> &str {
        "car_separation"
    }

    fn description(&self) -> &str {
        "Per fiscal year and sub-period mean CAR of good and bad news, and their difference"
    }

    fn source(&self) -> TableSource {
        TableSource::SubPeriod
    }

    fn required_columns(&self) -> &[&str] {
        &["fiscal_year", "sub_period", "news", "cum_abnormal_return"]
    }

    fn compute(&self, data: &LazyFrame) -> Result<DataFrame> {
        let class_mean = |news: &str| {
            col("cum_abnormal_return")
                .filter(col("news").eq(lit(news)))
                .mean()
        };

        let result = data
            .clone()
            .group_by([col("fiscal_year"), col("sub_period")])
            .agg([
                class_mean("good").alias("good_mean"),
                class_mean("bad").alias("bad_mean"),
            ])
            .with_column((col("good_mean") - col("bad_mean")).alias("separation"))
            .sort(
                ["fiscal_year", "sub_period"],
                SortMultipleOptions::default().with_order_descending_multi([false, false]),
            )
            .collect()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_separation() {
        let df = df![
            "fiscal_year" => [2001, 2001, 2001, 2001],
            "sub_period" => [3, 3, 3, 2],
            "news" => ["good", "good", "bad", "good"],
            "cum_abnormal_return" => [0.04, 0.02, -0.01, 0.05]
        ]
        .unwrap();

        let result = CarSeparation.compute(&df.lazy()).unwrap();
        assert_eq!(result.height(), 2);

        let separation = result.column("separation").unwrap().f64().unwrap();
        // Sub-period 2 has no bad-news events
        assert_eq!(separation.get(0), None);
        assert_relative_eq!(separation.get(1).unwrap(), 0.04, epsilon = 1e-12);

        let good = result.column("good_mean").unwrap().f64().unwrap();
        assert_relative_eq!(good.get(1).unwrap(), 0.03, epsilon = 1e-12);
    }
}
