//! Sub-period partitioning and reduce-to-last.
//!
//! Boundaries relative to the window end anchor, using each event's own `tau`:
//! - pre-event: `t ∈ [pre_event_start, -tau - 1]`
//! - event: `t ∈ [-tau, 0]`
//! - post-event: `t ∈ [1, post_event_end]`

use crate::{
    config::WindowConfig,
    cumulative::accumulate_by,
    types::{EventDay, SubPeriod, SubPeriodReturn},
};
use tracing::{debug, info};

impl SubPeriod {
    /// Sub-period of offset `t` for an event of span `tau`, if any.
    ///
    /// A negative `tau` (window end before window start) leaves the event
    /// sub-period empty and extends pre-event up to `t = -tau - 1`.
    pub const fn assign(t: i64, tau: i64, windows: &WindowConfig) -> Option<Self> {
        if t >= windows.pre_event_start && t < -tau {
            Some(Self::PreEvent)
        } else if t >= -tau && t <= 0 {
            Some(Self::Event)
        } else if t >= 1 && t <= windows.post_event_end {
            Some(Self::PostEvent)
        } else {
            None
        }
    }
}

/// Label every day with its sub-period. Unassigned days keep `None`.
pub fn partition(days: &mut [EventDay], windows: &WindowConfig) {
    let mut unassigned = 0usize;
    for day in days.iter_mut() {
        day.sub_period = SubPeriod::assign(day.t, day.tau, windows);
        if day.sub_period.is_none() {
            unassigned += 1;
        }
    }
    debug!(days = days.len(), unassigned, "partitioned event days");
}

/// Terminal cumulative values per event × sub-period.
///
/// Days are labeled, unassigned days dropped, and both cumulative sums are
/// recomputed from zero within each `(event key, sub-period)`. The last day
/// in date order of each group is kept. The input is left untouched.
pub fn reduce_sub_periods(days: &[EventDay], windows: &WindowConfig) -> Vec<SubPeriodReturn> {
    let mut labeled: Vec<EventDay> = days
        .iter()
        .filter_map(|day| {
            let sub_period = SubPeriod::assign(day.t, day.tau, windows)?;
            Some(EventDay {
                sub_period: Some(sub_period),
                ..day.clone()
            })
        })
        .collect();

    accumulate_by(&mut labeled, |day| (day.key.clone(), day.sub_period));

    let reduced: Vec<SubPeriodReturn> = labeled
        .chunk_by(|a, b| a.key == b.key && a.sub_period == b.sub_period)
        .filter_map(|group| {
            let last = group.last()?;
            Some(SubPeriodReturn {
                key: last.key.clone(),
                fiscal_year: last.fiscal_year,
                news: last.news,
                sub_period: last.sub_period?,
                cum_return: last.cum_return,
                cum_abnormal_return: last.cum_abnormal_return,
            })
        })
        .collect();

    let null_terminals = reduced
        .iter()
        .filter(|r| r.cum_return.is_none() || r.cum_abnormal_return.is_none())
        .count();
    info!(
        days = days.len(),
        labeled = labeled.len(),
        rows = reduced.len(),
        null_terminals,
        "reduced event days to sub-period terminals"
    );
    reduced
}
