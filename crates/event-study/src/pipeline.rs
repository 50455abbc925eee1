//! End-to-end event-study run.
//!
//! Stages run strictly in order, each consuming its predecessor's full
//! output:
//! 1. deltas and news classification on the annual panel
//! 2. event-key dedup, left join of daily rows, analytic-sample filter
//! 3. cumulative returns per event over the full window
//! 4. sub-period labels, per-sub-period re-accumulation and reduce-to-last
//!
//! Summary tables are computed afterwards from [`EventStudyOutput::frames`].

use crate::{
    EventStudyConfig, Result,
    cumulative::accumulate_events,
    deltas::compute_deltas,
    frame::{annual_frame, event_window_frame, sub_period_frame, write_csv},
    merge::{dedup_events, filter_analytic_sample, merge_events},
    registry::{SourceFrames, TableRegistry},
    subperiod::{partition, reduce_sub_periods},
    types::{AnnualRecord, ClassifiedRecord, DailyReturnRecord, EventDay, SubPeriodReturn},
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output file for the classified annual view.
pub const EVENTS_FILE: &str = "events.csv";
/// Output file for the full event-window table.
pub const EVENT_WINDOW_FILE: &str = "event_window.csv";
/// Output file for the sub-period hand-off table.
pub const SUB_PERIODS_FILE: &str = "sub_periods.csv";

/// Event-study pipeline.
#[derive(Debug, Clone, Default)]
pub struct EventStudy {
    config: EventStudyConfig,
}

/// Stage outputs of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStudyOutput {
    /// Every annual record with its derived fields
    pub classified: Vec<ClassifiedRecord>,
    /// Analytic sample with full-window cumulative returns and sub-period labels
    pub event_days: Vec<EventDay>,
    /// Terminal cumulative values per event × sub-period
    pub sub_periods: Vec<SubPeriodReturn>,
}

impl EventStudy {
    /// Create a pipeline with the given configuration.
    pub const fn new(config: EventStudyConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub const fn config(&self) -> &EventStudyConfig {
        &self.config
    }

    /// Run every stage over the two input panels.
    ///
    /// Fails before producing any output if either panel violates its key.
    pub fn run(
        &self,
        annual: Vec<AnnualRecord>,
        daily: Vec<DailyReturnRecord>,
    ) -> Result<EventStudyOutput> {
        let classified = compute_deltas(annual)?;

        let events = dedup_events(&classified);
        let joined = merge_events(&events, daily)?;
        let mut event_days = filter_analytic_sample(joined);

        accumulate_events(&mut event_days);
        partition(&mut event_days, &self.config.windows);
        let sub_periods = reduce_sub_periods(&event_days, &self.config.windows);

        info!(
            annual = classified.len(),
            event_days = event_days.len(),
            sub_periods = sub_periods.len(),
            "event study complete"
        );

        Ok(EventStudyOutput {
            classified,
            event_days,
            sub_periods,
        })
    }
}

impl EventStudyOutput {
    /// Stage outputs as polars frames, for the summary tables.
    pub fn frames(&self) -> Result<SourceFrames> {
        Ok(SourceFrames {
            annual: annual_frame(&self.classified)?,
            sub_period: sub_period_frame(&self.sub_periods)?,
            event_window: event_window_frame(&self.event_days)?,
        })
    }

    /// Write stage outputs and every registered summary table to `dir`.
    ///
    /// Returns the paths written, stage outputs first.
    pub fn write_all(&self, registry: &TableRegistry, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let frames = self.frames()?;
        let tables = registry.compute_all(&frames)?;

        let SourceFrames {
            annual,
            sub_period,
            event_window,
        } = frames;
        let outputs = [
            (EVENTS_FILE.to_string(), annual),
            (EVENT_WINDOW_FILE.to_string(), event_window),
            (SUB_PERIODS_FILE.to_string(), sub_period),
        ]
        .into_iter()
        .chain(tables.into_iter().map(|(name, df)| (format!("{name}.csv"), df)));

        let mut written = Vec::new();
        for (file, mut df) in outputs {
            let path = dir.join(file);
            write_csv(&mut df, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventStudyError, types::EventKey};
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn annual(entity: &str, fiscal_year: i32, eps: f64) -> AnnualRecord {
        AnnualRecord {
            entity_id: entity.to_string(),
            report_date: date(fiscal_year + 1, 3, 2),
            period_end: Some(date(fiscal_year, 12, 31)),
            fiscal_year,
            fiscal_year_end_month: 12,
            eps: Some(eps),
            window_start: Some(date(fiscal_year + 1, 3, 1)),
            window_end: Some(date(fiscal_year + 1, 3, 3)),
        }
    }

    fn daily(record: &AnnualRecord, t: i64) -> DailyReturnRecord {
        let key = record.event_key().unwrap();
        let day = key.window_end + Duration::days(t);
        DailyReturnRecord {
            key,
            date: Some(day),
            ret: Some(0.01),
            benchmark_ret: Some(0.005),
        }
    }

    #[test]
    fn test_first_year_event_is_excluded() {
        let first = annual("E1", 2000, 1.0);
        let second = annual("E1", 2001, 0.8);
        let days = (-2..=2)
            .flat_map(|t| [daily(&first, t), daily(&second, t)])
            .collect();

        let output = EventStudy::default()
            .run(vec![first, second.clone()], days)
            .unwrap();

        assert_eq!(output.classified.len(), 2);
        assert_eq!(output.event_days.len(), 5);
        let second_key: EventKey = second.event_key().unwrap();
        assert!(output.event_days.iter().all(|d| d.key == second_key));
        // tau = 2: t = -2..0 event, t = 1..2 post-event
        assert_eq!(output.sub_periods.len(), 2);
    }

    #[test]
    fn test_duplicate_daily_rows_abort_run() {
        let first = annual("E1", 2000, 1.0);
        let days = vec![daily(&first, 0), daily(&first, 0)];
        let err = EventStudy::default().run(vec![first], days).unwrap_err();
        assert!(matches!(err, EventStudyError::DuplicateKey { .. }));
    }

    #[test]
    fn test_frames_have_one_row_per_record() {
        let first = annual("E1", 2000, 1.0);
        let second = annual("E1", 2001, 1.5);
        let days = (-1..=1).map(|t| daily(&second, t)).collect();
        let output = EventStudy::default().run(vec![first, second], days).unwrap();

        let frames = output.frames().unwrap();
        assert_eq!(frames.annual.height(), 2);
        assert_eq!(frames.event_window.height(), 3);
        assert_eq!(frames.sub_period.height(), 2);
    }
}
