//! Conversion between polars frames and pipeline records, and CSV I/O.
//!
//! Input panels are read as text with schema inference disabled, then each
//! column is parsed explicitly. Identifiers such as `001000` keep their
//! leading zeros. Dates are ISO `YYYY-MM-DD` strings on input; output frames
//! carry polars `Date` columns.

use crate::{
    EventStudyError, Result,
    types::{AnnualRecord, ClassifiedRecord, DailyReturnRecord, EventDay, EventKey, SubPeriodReturn},
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns required in the annual panel.
pub const ANNUAL_COLUMNS: &[&str] = &[
    "entity_id",
    "report_date",
    "period_end",
    "fiscal_year",
    "fiscal_year_end_month",
    "eps",
    "window_start",
    "window_end",
];

/// Columns required in the daily return panel.
pub const DAILY_COLUMNS: &[&str] = &[
    "entity_id",
    "window_start",
    "window_end",
    "date",
    "ret",
    "benchmark_ret",
];

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| EventStudyError::MissingColumn(name.to_string()))
}

fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    match names.iter().find(|name| df.column(name).is_err()) {
        Some(missing) => Err(EventStudyError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}

fn strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let values = column(df, name)?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect())
}

fn dates(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    strings(df, name)?
        .into_iter()
        .map(|value| {
            value
                .map(|s| {
                    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| {
                        EventStudyError::InvalidDate {
                            column: name.to_string(),
                            value: s.clone(),
                        }
                    })
                })
                .transpose()
        })
        .collect()
}

fn parsed<T: FromStr>(df: &DataFrame, name: &str) -> Result<Vec<Option<T>>> {
    strings(df, name)?
        .into_iter()
        .map(|value| {
            value
                .map(|s| {
                    s.parse::<T>().map_err(|_| EventStudyError::InvalidValue {
                        column: name.to_string(),
                        value: s.clone(),
                    })
                })
                .transpose()
        })
        .collect()
}

fn ints(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    parsed(df, name)
}

fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    parsed(df, name)
}

fn required<T>(values: Vec<Option<T>>, table: &str, name: &str) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| EventStudyError::MissingValue {
                table: table.to_string(),
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

fn narrow<T: TryFrom<i64>>(values: Vec<i64>, name: &str) -> Result<Vec<T>> {
    values
        .into_iter()
        .map(|v| {
            T::try_from(v).map_err(|_| EventStudyError::InvalidValue {
                column: name.to_string(),
                value: v.to_string(),
            })
        })
        .collect()
}

/// Read a CSV file with a header row, every column as `String`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a frame as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!(path = %path.as_ref().display(), rows = df.height(), "wrote table");
    Ok(())
}

/// Build annual records from a frame with [`ANNUAL_COLUMNS`].
///
/// `entity_id`, `report_date`, `fiscal_year` and `fiscal_year_end_month`
/// must be non-null.
pub fn annual_from_frame(df: &DataFrame) -> Result<Vec<AnnualRecord>> {
    const TABLE: &str = "annual";
    require_columns(df, ANNUAL_COLUMNS)?;
    let entity_ids = required(strings(df, "entity_id")?, TABLE, "entity_id")?;
    let report_dates = required(dates(df, "report_date")?, TABLE, "report_date")?;
    let period_ends = dates(df, "period_end")?;
    let fiscal_years: Vec<i32> = narrow(
        required(ints(df, "fiscal_year")?, TABLE, "fiscal_year")?,
        "fiscal_year",
    )?;
    let year_end_months: Vec<u32> = narrow(
        required(ints(df, "fiscal_year_end_month")?, TABLE, "fiscal_year_end_month")?,
        "fiscal_year_end_month",
    )?;
    let eps = floats(df, "eps")?;
    let window_starts = dates(df, "window_start")?;
    let window_ends = dates(df, "window_end")?;

    let records = (0..df.height())
        .map(|i| AnnualRecord {
            entity_id: entity_ids[i].clone(),
            report_date: report_dates[i],
            period_end: period_ends[i],
            fiscal_year: fiscal_years[i],
            fiscal_year_end_month: year_end_months[i],
            eps: eps[i],
            window_start: window_starts[i],
            window_end: window_ends[i],
        })
        .collect();
    Ok(records)
}

/// Build daily return records from a frame with [`DAILY_COLUMNS`].
///
/// The event key columns must be non-null; `date` may be null.
pub fn daily_from_frame(df: &DataFrame) -> Result<Vec<DailyReturnRecord>> {
    const TABLE: &str = "daily";
    require_columns(df, DAILY_COLUMNS)?;
    let entity_ids = required(strings(df, "entity_id")?, TABLE, "entity_id")?;
    let window_starts = required(dates(df, "window_start")?, TABLE, "window_start")?;
    let window_ends = required(dates(df, "window_end")?, TABLE, "window_end")?;
    let days = dates(df, "date")?;
    let returns = floats(df, "ret")?;
    let benchmark_returns = floats(df, "benchmark_ret")?;

    let records = (0..df.height())
        .map(|i| DailyReturnRecord {
            key: EventKey::new(entity_ids[i].clone(), window_starts[i], window_ends[i]),
            date: days[i],
            ret: returns[i],
            benchmark_ret: benchmark_returns[i],
        })
        .collect();
    Ok(records)
}

/// Load the annual panel from CSV.
pub fn read_annual(path: impl AsRef<Path>) -> Result<Vec<AnnualRecord>> {
    let records = annual_from_frame(&read_csv(path)?)?;
    info!(rows = records.len(), "loaded annual panel");
    Ok(records)
}

/// Load the daily return panel from CSV.
pub fn read_daily(path: impl AsRef<Path>) -> Result<Vec<DailyReturnRecord>> {
    let records = daily_from_frame(&read_csv(path)?)?;
    info!(rows = records.len(), "loaded daily panel");
    Ok(records)
}

/// Classified annual view, one row per disclosure.
pub fn annual_frame(records: &[ClassifiedRecord]) -> Result<DataFrame> {
    let df = df![
        "entity_id" => records.iter().map(|r| r.record.entity_id.as_str()).collect::<Vec<_>>(),
        "report_date" => records.iter().map(|r| r.record.report_date).collect::<Vec<_>>(),
        "period_end" => records.iter().map(|r| r.record.period_end).collect::<Vec<_>>(),
        "fiscal_year" => records.iter().map(|r| r.record.fiscal_year).collect::<Vec<_>>(),
        "fiscal_year_end_month" => records.iter().map(|r| i64::from(r.record.fiscal_year_end_month)).collect::<Vec<_>>(),
        "eps" => records.iter().map(|r| r.record.eps).collect::<Vec<_>>(),
        "window_start" => records.iter().map(|r| r.record.window_start).collect::<Vec<_>>(),
        "window_end" => records.iter().map(|r| r.record.window_end).collect::<Vec<_>>(),
        "earnings_delta" => records.iter().map(|r| r.earnings_delta).collect::<Vec<_>>(),
        "reporting_lag" => records.iter().map(|r| r.reporting_lag).collect::<Vec<_>>(),
        "reporting_lag_delta" => records.iter().map(|r| r.reporting_lag_delta).collect::<Vec<_>>(),
        "news" => records.iter().map(|r| r.news.map(|n| n.as_str())).collect::<Vec<_>>(),
        "tau" => records.iter().map(|r| r.tau).collect::<Vec<_>>()
    ]?;
    Ok(df)
}

/// Full event-window view, one row per event day.
pub fn event_window_frame(days: &[EventDay]) -> Result<DataFrame> {
    let df = df![
        "entity_id" => days.iter().map(|d| d.key.entity_id.as_str()).collect::<Vec<_>>(),
        "window_start" => days.iter().map(|d| d.key.window_start).collect::<Vec<_>>(),
        "window_end" => days.iter().map(|d| d.key.window_end).collect::<Vec<_>>(),
        "date" => days.iter().map(|d| d.date).collect::<Vec<_>>(),
        "t" => days.iter().map(|d| d.t).collect::<Vec<_>>(),
        "ret" => days.iter().map(|d| d.ret).collect::<Vec<_>>(),
        "benchmark_ret" => days.iter().map(|d| d.benchmark_ret).collect::<Vec<_>>(),
        "news" => days.iter().map(|d| d.news.as_str()).collect::<Vec<_>>(),
        "fiscal_year" => days.iter().map(|d| d.fiscal_year).collect::<Vec<_>>(),
        "tau" => days.iter().map(|d| d.tau).collect::<Vec<_>>(),
        "sub_period" => days.iter().map(|d| d.sub_period.map(|p| p.label())).collect::<Vec<_>>(),
        "cum_return" => days.iter().map(|d| d.cum_return).collect::<Vec<_>>(),
        "cum_abnormal_return" => days.iter().map(|d| d.cum_abnormal_return).collect::<Vec<_>>()
    ]?;
    Ok(df)
}

/// Sub-period hand-off table, one row per event × sub-period.
pub fn sub_period_frame(rows: &[SubPeriodReturn]) -> Result<DataFrame> {
    let df = df![
        "entity_id" => rows.iter().map(|r| r.key.entity_id.as_str()).collect::<Vec<_>>(),
        "window_start" => rows.iter().map(|r| r.key.window_start).collect::<Vec<_>>(),
        "window_end" => rows.iter().map(|r| r.key.window_end).collect::<Vec<_>>(),
        "fiscal_year" => rows.iter().map(|r| r.fiscal_year).collect::<Vec<_>>(),
        "news" => rows.iter().map(|r| r.news.as_str()).collect::<Vec<_>>(),
        "sub_period" => rows.iter().map(|r| r.sub_period.label()).collect::<Vec<_>>(),
        "cum_return" => rows.iter().map(|r| r.cum_return).collect::<Vec<_>>(),
        "cum_abnormal_return" => rows.iter().map(|r| r.cum_abnormal_return).collect::<Vec<_>>()
    ]?;
    Ok(df)
}
