//! Record types flowing through the pipeline.
//!
//! Derived values that may be absent are `Option`s throughout: a missing
//! earnings delta is never encoded as zero, and an unclassified report is
//! `None` rather than a third numeric code.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Days from `start` to `end` (negative when `end` precedes `start`).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// News classification of an earnings report.
///
/// Unclassified reports are represented as `Option::<NewsClass>::None`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsClass {
    /// Earnings rose year over year
    #[display("good")]
    Good,
    /// Earnings fell year over year
    #[display("bad")]
    Bad,
}

impl NewsClass {
    /// Classify by the sign of a year-over-year earnings delta.
    ///
    /// A delta of exactly zero is unclassified, the same as a missing delta.
    pub fn from_delta(delta: Option<f64>) -> Option<Self> {
        match delta {
            Some(d) if d > 0.0 => Some(Self::Good),
            Some(d) if d < 0.0 => Some(Self::Bad),
            _ => None,
        }
    }

    /// Column value used in output frames.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

/// Sub-period of an event timeline.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubPeriod {
    /// Before the event window
    #[display("pre_event")]
    PreEvent,
    /// Between the window start and the announcement anchor
    #[display("event")]
    Event,
    /// After the announcement anchor
    #[display("post_event")]
    PostEvent,
}

impl SubPeriod {
    /// Integer label used in output tables (1, 2, 3).
    pub const fn label(&self) -> i32 {
        match self {
            Self::PreEvent => 1,
            Self::Event => 2,
            Self::PostEvent => 3,
        }
    }
}

/// Compound identifier scoping one earnings-announcement event.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("({entity_id}, {window_start}, {window_end})")]
pub struct EventKey {
    /// Firm identifier
    pub entity_id: String,
    /// Last trading day on or before the announcement
    pub window_start: NaiveDate,
    /// First trading day after the announcement
    pub window_end: NaiveDate,
}

impl EventKey {
    /// Create a new event key.
    pub fn new(entity_id: impl Into<String>, window_start: NaiveDate, window_end: NaiveDate) -> Self {
        Self {
            entity_id: entity_id.into(),
            window_start,
            window_end,
        }
    }

    /// Event-window span in days.
    pub fn tau(&self) -> i64 {
        days_between(self.window_start, self.window_end)
    }
}

/// One firm-fiscal-year earnings disclosure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    /// Firm identifier
    pub entity_id: String,
    /// Earnings announcement date
    pub report_date: NaiveDate,
    /// Fiscal period end date
    pub period_end: Option<NaiveDate>,
    /// Fiscal year
    pub fiscal_year: i32,
    /// Month in which the fiscal year ends (1-12)
    pub fiscal_year_end_month: u32,
    /// Earnings per share
    pub eps: Option<f64>,
    /// Event window start anchor
    pub window_start: Option<NaiveDate>,
    /// Event window end anchor
    pub window_end: Option<NaiveDate>,
}

impl AnnualRecord {
    /// The event key, if both anchor dates are known.
    pub fn event_key(&self) -> Option<EventKey> {
        Some(EventKey::new(
            self.entity_id.clone(),
            self.window_start?,
            self.window_end?,
        ))
    }

    /// Days between the fiscal period end and the report date.
    pub fn reporting_lag(&self) -> Option<i64> {
        self.period_end
            .map(|period_end| days_between(period_end, self.report_date))
    }
}

/// An [`AnnualRecord`] with the fields populated by the delta engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    /// Source disclosure
    pub record: AnnualRecord,
    /// Year-over-year EPS change
    pub earnings_delta: Option<f64>,
    /// Report date minus fiscal period end, in days
    pub reporting_lag: Option<i64>,
    /// Year-over-year change in reporting lag
    pub reporting_lag_delta: Option<i64>,
    /// Good / bad / unclassified
    pub news: Option<NewsClass>,
    /// Window end minus window start, in days
    pub tau: Option<i64>,
}

/// One calendar-day observation within an event's return window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReturnRecord {
    /// Event the observation belongs to
    pub key: EventKey,
    /// Observation date
    pub date: Option<NaiveDate>,
    /// Raw stock return
    pub ret: Option<f64>,
    /// Benchmark (market) return
    pub benchmark_ret: Option<f64>,
}

/// A daily observation in the analytic sample.
///
/// Produced by the merge filter; cumulative fields are filled by
/// [`crate::cumulative::accumulate_by`], `sub_period` by the partitioner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDay {
    /// Event the observation belongs to
    pub key: EventKey,
    /// Observation date
    pub date: NaiveDate,
    /// Days from the window end anchor to `date`
    pub t: i64,
    /// Raw stock return
    pub ret: Option<f64>,
    /// Benchmark (market) return
    pub benchmark_ret: Option<f64>,
    /// News classification of the matching annual record
    pub news: NewsClass,
    /// Fiscal year of the matching annual record
    pub fiscal_year: i32,
    /// Fiscal period end of the matching annual record
    pub period_end: Option<NaiveDate>,
    /// Event-window span of the matching annual record
    pub tau: i64,
    /// Running sum of `ln(1 + ret)`
    pub cum_return: Option<f64>,
    /// Running sum of `ln(1 + ret - benchmark_ret)`
    pub cum_abnormal_return: Option<f64>,
    /// Sub-period label, once partitioned
    pub sub_period: Option<SubPeriod>,
}

/// Terminal cumulative values of one event × sub-period.
///
/// This is the hand-off row consumed by the external resampling job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPeriodReturn {
    /// Event the row summarises
    pub key: EventKey,
    /// Fiscal year of the event
    pub fiscal_year: i32,
    /// News classification of the event
    pub news: NewsClass,
    /// Sub-period summarised
    pub sub_period: SubPeriod,
    /// Cumulative return at the last day of the sub-period
    pub cum_return: Option<f64>,
    /// Cumulative abnormal return at the last day of the sub-period
    pub cum_abnormal_return: Option<f64>,
}
