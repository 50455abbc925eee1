//! Average cumulative return paths by news class and relative day.

use crate::{
    Result,
    traits::{SummaryTable, TableSource},
};
use polars::prelude::*;

/// Mean cumulative return and abnormal return per news class and day `t`.
///
/// The `_demeaned` columns subtract, per `t`, the average of the class means
/// so both curves are centred on zero. When only one class is present at a
/// given `t`, its demeaned value is zero.
///
/// # Required Columns
/// - `news`: `good` or `bad`
/// - `t`: Days relative to the window end anchor
/// - `cum_return`: Cumulative log return over the full event window
/// - `cum_abnormal_return`: Cumulative abnormal log return over the full event window
///
/// # Returns
/// DataFrame with columns: `news`, `t`, `events`, `cum_return`,
/// `cum_abnormal_return`, `cum_return_demeaned`, `cum_abnormal_return_demeaned`
#[derive(Debug, Clone, Default)]
pub struct ReturnCurves;

impl SummaryTable for ReturnCurves {
    fn name(&self) -> &str {
        "return_curves"
    }

    fn description(&self) -> &str {
        "Per news class and relative day mean CR and CAR, raw and demeaned across classes"
    }

    fn source(&self) -> TableSource {
        TableSource::EventWindow
    }

    fn required_columns(&self) -> &[&str] {
        &["news", "t", "cum_return", "cum_abnormal_return"]
    }

    fn compute(&self, data: &LazyFrame) -> Result<DataFrame> {
        let demeaned =
            |name: &str| (col(name) - col(name).mean().over([col("t")])).alias(format!("{name}_demeaned"));

        let result = data
            .clone()
            .group_by([col("news"), col("t")])
            .agg([
                len().cast(DataType::Int64).alias("events"),
                col("cum_return").mean().alias("cum_return"),
                col("cum_abnormal_return")
                    .mean()
                    .alias("cum_abnormal_return"),
            ])
            .with_columns([demeaned("cum_return"), demeaned("cum_abnormal_return")])
            .sort(
                ["news", "t"],
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
    fn test_curves_are_demeaned_per_day() {
        let df = df![
            "news" => ["good", "good", "bad", "good", "bad"],
            "t" => [0i64, 0, 0, 1, 1],
            "cum_return" => [0.03, 0.05, -0.02, 0.06, 0.00],
            "cum_abnormal_return" => [0.02, 0.04, -0.04, 0.05, -0.01]
        ]
        .unwrap();

        let result = ReturnCurves.compute(&df.lazy()).unwrap();
        assert_eq!(result.height(), 4);

        // Sorted: (bad, 0), (bad, 1), (good, 0), (good, 1)
        let news = result.column("news").unwrap().str().unwrap();
        assert_eq!(news.get(0), Some("bad"));
        assert_eq!(news.get(2), Some("good"));

        let events = result.column("events").unwrap().i64().unwrap();
        assert_eq!(events.get(2), Some(2));

        let cr = result.column("cum_return").unwrap().f64().unwrap();
        assert_relative_eq!(cr.get(2).unwrap(), 0.04, epsilon = 1e-12);

        // t = 0: class means 0.04 and -0.02, centre 0.01
        let cr_dm = result.column("cum_return_demeaned").unwrap().f64().unwrap();
        assert_relative_eq!(cr_dm.get(0).unwrap(), -0.03, epsilon = 1e-12);
        assert_relative_eq!(cr_dm.get(2).unwrap(), 0.03, epsilon = 1e-12);

        // t = 1: class means 0.05 and -0.01, centre 0.02
        let car_dm = result
            .column("cum_abnormal_return_demeaned")
            .unwrap()
            .f64()
            .unwrap();
        assert_relative_eq!(car_dm.get(1).unwrap(), -0.03, epsilon = 1e-12);
        assert_relative_eq!(car_dm.get(3).unwrap(), 0.03, epsilon = 1e-12);
    }
}
