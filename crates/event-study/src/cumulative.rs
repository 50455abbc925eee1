//! Running cumulative log returns, restarted at every group boundary.
//!
//! Two sums are kept per group:
//! - cumulative return: `Σ ln(1 + r)`
//! - cumulative abnormal return: `Σ ln(1 + r - m)`
//!
//! The abnormal sum is an additive approximation of the market-adjusted
//! compounded return, not `Σ ln((1 + r) / (1 + m))`. Downstream figures
//! depend on this exact form.
//!
//! Missing addends: a day whose addend cannot be computed (missing return,
//! missing benchmark for the abnormal sum, or a non-positive log argument)
//! gets `None` for that sum. It adds nothing, and later days continue from
//! the running total.

use crate::types::EventDay;

/// `ln(1 + x)`, or `None` when undefined.
fn log_growth(x: f64) -> Option<f64> {
    let growth = 1.0 + x;
    (growth > 0.0).then(|| growth.ln()).filter(|v| v.is_finite())
}

/// Log-return addend of a day.
pub fn return_addend(day: &EventDay) -> Option<f64> {
    log_growth(day.ret?)
}

/// Abnormal log-return addend of a day.
pub fn abnormal_addend(day: &EventDay) -> Option<f64> {
    log_growth(day.ret? - day.benchmark_ret?)
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningSum(f64);

impl RunningSum {
    fn add(&mut self, addend: Option<f64>) -> Option<f64> {
        let addend = addend?;
        self.0 += addend;
        Some(self.0)
    }
}

/// Fill `cum_return` and `cum_abnormal_return` per group.
///
/// Rows are stably sorted by `(group_key, date)` in place, so ties on the
/// date keep their current order. Both sums start at zero for each group.
pub fn accumulate_by<K, F>(days: &mut [EventDay], group_key: F)
where
    K: Ord,
    F: Fn(&EventDay) -> K,
{
    days.sort_by(|a, b| group_key(a).cmp(&group_key(b)).then(a.date.cmp(&b.date)));

    let mut current: Option<K> = None;
    let mut ret_sum = RunningSum::default();
    let mut abnormal_sum = RunningSum::default();

    for day in days.iter_mut() {
        let key = group_key(day);
        if current.as_ref() != Some(&key) {
            ret_sum = RunningSum::default();
            abnormal_sum = RunningSum::default();
            current = Some(key);
        }
        day.cum_return = ret_sum.add(return_addend(day));
        day.cum_abnormal_return = abnormal_sum.add(abnormal_addend(day));
    }
}

/// Accumulate over whole events, keyed by [`crate::types::EventKey`].
pub fn accumulate_events(days: &mut [EventDay]) {
    accumulate_by(days, |day| day.key.clone());
}
