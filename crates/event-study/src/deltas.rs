//! Year-over-year deltas and news classification.
//!
//! Records are sorted by entity and report date, then scanned once per
//! entity. A delta is only taken against the immediately preceding record,
//! and only when that record is exactly one fiscal year earlier with the
//! same fiscal-year-end month. Anything else yields `None`.

use crate::{
    Result,
    types::{AnnualRecord, ClassifiedRecord, NewsClass, days_between},
    validate::ensure_unique,
};
use tracing::{debug, info, warn};

/// Values of the preceding record needed for year-over-year deltas.
#[derive(Debug, Clone, Copy)]
struct Previous {
    fiscal_year: i32,
    fiscal_year_end_month: u32,
    eps: Option<f64>,
    reporting_lag: Option<i64>,
}

impl Previous {
    fn of(record: &AnnualRecord, reporting_lag: Option<i64>) -> Self {
        Self {
            fiscal_year: record.fiscal_year,
            fiscal_year_end_month: record.fiscal_year_end_month,
            eps: record.eps,
            reporting_lag,
        }
    }

    /// Whether `record` is the next fiscal year under the same year-end.
    const fn is_adjacent_to(&self, record: &AnnualRecord) -> bool {
        record.fiscal_year - self.fiscal_year == 1
            && record.fiscal_year_end_month == self.fiscal_year_end_month
    }
}

/// Compute deltas, reporting lag, news class and `tau` for every record.
///
/// Fails if `(entity_id, report_date)` is not unique. The output is ordered
/// by entity and report date; ties keep input order.
pub fn compute_deltas(mut records: Vec<AnnualRecord>) -> Result<Vec<ClassifiedRecord>> {
    ensure_unique("annual", &records, |r| (r.entity_id.clone(), r.report_date))?;

    records.sort_by(|a, b| {
        a.entity_id
            .cmp(&b.entity_id)
            .then(a.report_date.cmp(&b.report_date))
    });

    let mut classified = Vec::with_capacity(records.len());
    let mut previous: Option<(String, Previous)> = None;

    for record in records {
        let reporting_lag = record.reporting_lag();

        let prior = previous
            .as_ref()
            .filter(|(entity, _)| *entity == record.entity_id)
            .map(|(_, prev)| *prev)
            .filter(|prev| prev.is_adjacent_to(&record));

        let earnings_delta = prior.and_then(|prev| Some(record.eps? - prev.eps?));
        let reporting_lag_delta = prior.and_then(|prev| Some(reporting_lag? - prev.reporting_lag?));
        let tau = record
            .window_start
            .zip(record.window_end)
            .map(|(start, end)| days_between(start, end));
        if let Some(tau) = tau.filter(|tau| *tau < 0) {
            warn!(
                entity = %record.entity_id,
                fiscal_year = record.fiscal_year,
                tau,
                "window ends before it starts, event sub-period is empty"
            );
        }

        previous = Some((record.entity_id.clone(), Previous::of(&record, reporting_lag)));

        classified.push(ClassifiedRecord {
            news: NewsClass::from_delta(earnings_delta),
            earnings_delta,
            reporting_lag,
            reporting_lag_delta,
            tau,
            record,
        });
    }

    let with_delta = classified
        .iter()
        .filter(|r| r.earnings_delta.is_some())
        .count();
    let with_news = classified.iter().filter(|r| r.news.is_some()).count();
    info!(
        records = classified.len(),
        with_delta, with_news, "computed year-over-year deltas"
    );
    debug!(
        without_predecessor = classified.len() - with_delta,
        zero_delta = with_delta - with_news,
        "unclassified annual records"
    );

    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStudyError;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(entity: &str, fiscal_year: i32, fyr: u32, eps: Option<f64>) -> AnnualRecord {
        AnnualRecord {
            entity_id: entity.to_string(),
            report_date: date(fiscal_year + 1, 2, 15),
            period_end: Some(date(fiscal_year, 12, 31)),
            fiscal_year,
            fiscal_year_end_month: fyr,
            eps,
            window_start: Some(date(fiscal_year + 1, 2, 14)),
            window_end: Some(date(fiscal_year + 1, 2, 16)),
        }
    }

    #[test]
    fn test_adjacent_years_produce_delta() {
        let out = compute_deltas(vec![
            record("E1", 2000, 12, Some(1.0)),
            record("E1", 2001, 12, Some(1.2)),
        ])
        .unwrap();

        assert!(out[0].earnings_delta.is_none());
        assert_eq!(out[0].news, None);
        assert_relative_eq!(out[1].earnings_delta.unwrap(), 0.2, epsilon = 1e-12);
        assert_eq!(out[1].news, Some(NewsClass::Good));
        assert_eq!(out[1].tau, Some(2));
    }

    #[test]
    fn test_gap_year_has_no_delta() {
        let out = compute_deltas(vec![
            record("E1", 2000, 12, Some(1.0)),
            record("E1", 2002, 12, Some(0.5)),
        ])
        .unwrap();
        assert!(out[1].earnings_delta.is_none());
        assert!(out[1].reporting_lag_delta.is_none());
        assert_eq!(out[1].news, None);
    }

    #[test]
    fn test_fiscal_year_end_change_has_no_delta() {
        let out = compute_deltas(vec![
            record("E1", 2000, 12, Some(1.0)),
            record("E1", 2001, 6, Some(0.5)),
        ])
        .unwrap();
        assert!(out[1].earnings_delta.is_none());
    }

    #[test]
    fn test_no_delta_across_entities() {
        let out = compute_deltas(vec![
            record("E2", 2001, 12, Some(2.0)),
            record("E1", 2000, 12, Some(1.0)),
        ])
        .unwrap();
        assert_eq!(out[0].record.entity_id, "E1");
        assert_eq!(out[1].record.entity_id, "E2");
        assert!(out[1].earnings_delta.is_none());
    }

    #[test]
    fn test_zero_delta_is_unclassified() {
        let out = compute_deltas(vec![
            record("E1", 2000, 12, Some(1.0)),
            record("E1", 2001, 12, Some(1.0)),
            record("E1", 2002, 12, Some(0.8)),
        ])
        .unwrap();
        assert_eq!(out[1].earnings_delta, Some(0.0));
        assert_eq!(out[1].news, None);
        assert_eq!(out[2].news, Some(NewsClass::Bad));
    }

    #[test]
    fn test_missing_eps_propagates_null() {
        let out = compute_deltas(vec![
            record("E1", 2000, 12, None),
            record("E1", 2001, 12, Some(1.0)),
        ])
        .unwrap();
        assert!(out[1].earnings_delta.is_none());
        assert_eq!(out[1].reporting_lag_delta, Some(0));
    }

    #[test]
    fn test_missing_period_end_propagates_to_lag_delta() {
        let mut first = record("E1", 2000, 12, Some(1.0));
        first.period_end = None;
        let out = compute_deltas(vec![first, record("E1", 2001, 12, Some(1.5))]).unwrap();

        assert_eq!(out[0].reporting_lag, None);
        assert_eq!(out[1].reporting_lag, Some(46));
        assert_eq!(out[1].reporting_lag_delta, None);
        assert_relative_eq!(out[1].earnings_delta.unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(out[1].news, Some(NewsClass::Good));
    }

    #[test]
    fn test_inverted_window_keeps_negative_tau() {
        let mut inverted = record("E1", 2000, 12, Some(1.0));
        inverted.window_start = Some(date(2001, 2, 16));
        inverted.window_end = Some(date(2001, 2, 14));
        let out = compute_deltas(vec![inverted]).unwrap();
        assert_eq!(out[0].tau, Some(-2));
    }

    #[test]
    fn test_reporting_lag_delta() {
        let mut later = record("E1", 2001, 12, Some(1.0));
        later.report_date = date(2002, 3, 1);
        let out = compute_deltas(vec![record("E1", 2000, 12, Some(1.0)), later]).unwrap();
        assert_eq!(out[0].reporting_lag, Some(46));
        assert_eq!(out[1].reporting_lag, Some(60));
        assert_eq!(out[1].reporting_lag_delta, Some(14));
    }

    #[test]
    fn test_sorted_by_report_date_within_entity() {
        let out = compute_deltas(vec![
            record("E1", 2001, 12, Some(1.5)),
            record("E1", 2000, 12, Some(1.0)),
        ])
        .unwrap();
        assert_eq!(out[0].record.fiscal_year, 2000);
        assert_relative_eq!(out[1].earnings_delta.unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_report_date_is_fatal() {
        let err = compute_deltas(vec![
            record("E1", 2000, 12, Some(1.0)),
            record("E1", 2000, 12, Some(1.1)),
        ])
        .unwrap_err();
        assert!(matches!(err, EventStudyError::DuplicateKey { .. }));
    }
}
