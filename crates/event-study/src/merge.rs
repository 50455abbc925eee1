//! Event merge, offset computation and the analytic-sample filter.
//!
//! The join and the filter are separate steps: [`merge_events`] keeps every
//! daily row (a left join), and [`filter_analytic_sample`] decides which rows
//! make it into the event study. Events without a qualifying prior-year
//! comparison are dropped entirely at the filter.

use crate::{
    Result,
    types::{ClassifiedRecord, DailyReturnRecord, EventDay, EventKey, NewsClass, days_between},
    validate::ensure_unique,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};

/// Annual fields carried onto each daily row of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInfo {
    /// News classification
    pub news: Option<NewsClass>,
    /// Fiscal year
    pub fiscal_year: i32,
    /// Fiscal period end
    pub period_end: Option<NaiveDate>,
    /// Event-window span
    pub tau: Option<i64>,
}

impl From<&ClassifiedRecord> for EventInfo {
    fn from(record: &ClassifiedRecord) -> Self {
        Self {
            news: record.news,
            fiscal_year: record.record.fiscal_year,
            period_end: record.record.period_end,
            tau: record.tau,
        }
    }
}

/// A daily row after the left join, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedDay {
    /// Daily observation
    pub daily: DailyReturnRecord,
    /// Matching annual fields, if any record shares the event key
    pub event: Option<EventInfo>,
    /// Days from the window end to the observation date
    pub t: Option<i64>,
}

/// Deduplicated annual view keyed by [`EventKey`].
///
/// The first record (in the order given) wins for each key. Records missing
/// either anchor date have no key and are left out.
pub fn dedup_events(records: &[ClassifiedRecord]) -> HashMap<EventKey, EventInfo> {
    let mut events = HashMap::with_capacity(records.len());
    let mut duplicates = 0usize;
    for record in records {
        let Some(key) = record.record.event_key() else {
            continue;
        };
        if events.contains_key(&key) {
            duplicates += 1;
            continue;
        }
        events.insert(key, EventInfo::from(record));
    }
    info!(events = events.len(), duplicates, "deduplicated annual view by event key");
    events
}

/// Left-join daily rows onto the annual event view and compute `t`.
///
/// Fails if `(event key, date)` is not unique in `daily`.
pub fn merge_events(
    events: &HashMap<EventKey, EventInfo>,
    daily: Vec<DailyReturnRecord>,
) -> Result<Vec<JoinedDay>> {
    ensure_unique("daily", &daily, |r| (r.key.clone(), r.date))?;

    let joined = daily
        .into_iter()
        .map(|daily| JoinedDay {
            event: events.get(&daily.key).cloned(),
            t: daily.date.map(|date| days_between(daily.key.window_end, date)),
            daily,
        })
        .collect();
    Ok(joined)
}

/// Keep rows with a matching event, a news classification and an offset.
pub fn filter_analytic_sample(joined: Vec<JoinedDay>) -> Vec<EventDay> {
    let total = joined.len();
    let mut unmatched = 0usize;
    let mut unclassified = 0usize;
    let mut undated = 0usize;

    let kept: Vec<EventDay> = joined
        .into_iter()
        .filter_map(|row| {
            let Some(event) = row.event else {
                unmatched += 1;
                return None;
            };
            let (Some(news), Some(tau)) = (event.news, event.tau) else {
                unclassified += 1;
                return None;
            };
            let (Some(date), Some(t)) = (row.daily.date, row.t) else {
                undated += 1;
                return None;
            };
            Some(EventDay {
                key: row.daily.key,
                date,
                t,
                ret: row.daily.ret,
                benchmark_ret: row.daily.benchmark_ret,
                news,
                fiscal_year: event.fiscal_year,
                period_end: event.period_end,
                tau,
                cum_return: None,
                cum_abnormal_return: None,
                sub_period: None,
            })
        })
        .collect();

    info!(
        total,
        kept = kept.len(),
        unmatched,
        unclassified,
        undated,
        "filtered analytic sample"
    );
    if kept.is_empty() && total > 0 {
        warn!("no daily rows survived the analytic-sample filter");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnnualRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn classified(entity: &str, eps: f64, news: Option<NewsClass>) -> ClassifiedRecord {
        ClassifiedRecord {
            record: AnnualRecord {
                entity_id: entity.to_string(),
                report_date: date(2001, 3, 2),
                period_end: Some(date(2000, 12, 31)),
                fiscal_year: 2000,
                fiscal_year_end_month: 12,
                eps: Some(eps),
                window_start: Some(date(2001, 3, 1)),
                window_end: Some(date(2001, 3, 5)),
            },
            earnings_delta: None,
            reporting_lag: Some(61),
            reporting_lag_delta: None,
            news,
            tau: Some(4),
        }
    }

    fn key(entity: &str) -> EventKey {
        EventKey::new(entity, date(2001, 3, 1), date(2001, 3, 5))
    }

    fn daily(entity: &str, day: Option<NaiveDate>) -> DailyReturnRecord {
        DailyReturnRecord {
            key: key(entity),
            date: day,
            ret: Some(0.01),
            benchmark_ret: Some(0.005),
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let records = vec![
            classified("E1", 1.0, Some(NewsClass::Good)),
            classified("E1", 2.0, Some(NewsClass::Bad)),
        ];
        for _ in 0..3 {
            let events = dedup_events(&records);
            assert_eq!(events.len(), 1);
            assert_eq!(events[&key("E1")].news, Some(NewsClass::Good));
        }
    }

    #[test]
    fn test_dedup_skips_records_without_anchors() {
        let mut record = classified("E1", 1.0, Some(NewsClass::Good));
        record.record.window_start = None;
        assert!(dedup_events(&[record]).is_empty());
    }

    #[test]
    fn test_merge_computes_offset_from_window_end() {
        let events = dedup_events(&[classified("E1", 1.0, Some(NewsClass::Good))]);
        let joined = merge_events(
            &events,
            vec![
                daily("E1", Some(date(2001, 3, 2))),
                daily("E1", Some(date(2001, 3, 7))),
                daily("E2", Some(date(2001, 3, 5))),
            ],
        )
        .unwrap();

        assert_eq!(joined[0].t, Some(-3));
        assert_eq!(joined[1].t, Some(2));
        assert!(joined[0].event.is_some());
        assert!(joined[2].event.is_none());
    }

    #[test]
    fn test_merge_rejects_duplicate_daily_rows() {
        let events = dedup_events(&[classified("E1", 1.0, Some(NewsClass::Good))]);
        let day = Some(date(2001, 3, 2));
        assert!(merge_events(&events, vec![daily("E1", day), daily("E1", day)]).is_err());
    }

    #[test]
    fn test_filter_drops_unmatched_unclassified_and_undated() {
        let events = dedup_events(&[
            classified("E1", 1.0, Some(NewsClass::Good)),
            classified("E2", 1.0, None),
        ]);
        let joined = merge_events(
            &events,
            vec![
                daily("E1", Some(date(2001, 3, 4))),
                daily("E1", None),
                daily("E2", Some(date(2001, 3, 4))),
                daily("E3", Some(date(2001, 3, 4))),
            ],
        )
        .unwrap();

        let kept = filter_analytic_sample(joined);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].key.entity_id, "E1");
        assert_eq!(kept[0].t, -1);
        assert_eq!(kept[0].tau, 4);
        assert_eq!(kept[0].news, NewsClass::Good);
    }
}
