//! Date dimension table.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Date32Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};

use crate::calendar::fiscal::FiscalCalendar;
use crate::calendar::ranges::month_end;
use crate::error::{Error, Result};

fn int_column<F>(dates: &[NaiveDate], f: F) -> ArrayRef
where
    F: Fn(&NaiveDate) -> i32,
{
    Arc::new(Int32Array::from_iter_values(dates.iter().map(f)))
}

fn text_column(dates: &[NaiveDate], fmt: &str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(
        dates.iter().map(|date| date.format(fmt).to_string()),
    ))
}

fn date_column<F>(dates: &[NaiveDate], f: F) -> Result<ArrayRef>
where
    F: Fn(&NaiveDate) -> Option<NaiveDate>,
{
    let values = dates
        .iter()
        .map(|date| {
            f(date)
                .map(Date32Type::from_naive_date)
                .ok_or_else(|| Error::invalid_argument(format!("Date out of range: {date}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Date32Array::from(values)))
}

fn bool_column<F>(dates: &[NaiveDate], f: F) -> ArrayRef
where
    F: Fn(&NaiveDate) -> bool,
{
    Arc::new(BooleanArray::from(dates.iter().map(f).collect::<Vec<_>>()))
}

// Components of dates produced by chrono always fit in i32
#[allow(clippy::cast_possible_wrap)]
const fn as_i32(value: u32) -> i32 {
    value as i32
}

/// Build a date dimension with one row per day in `[start, end]`
///
/// Weekdays are ISO numbered (Monday is 1) and `week_of_year` is the ISO
/// week. When `fiscal` is given, `fiscal_year` and `fiscal_quarter` columns
/// are appended.
///
/// # Errors
/// Returns `InvalidArgument` if `start` is after `end`
pub fn date_dimension(
    start: NaiveDate,
    end: NaiveDate,
    fiscal: Option<&FiscalCalendar>,
) -> Result<RecordBatch> {
    if start > end {
        return Err(Error::invalid_argument("Start date must be before end date."));
    }

    let dates: Vec<NaiveDate> = start.iter_days().take_while(|date| *date <= end).collect();

    let mut fields = vec![
        Field::new("date", DataType::Date32, false),
        Field::new("date_id", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("is_leap_year", DataType::Boolean, false),
        Field::new("month", DataType::Int32, false),
        Field::new("month_name", DataType::Utf8, false),
        Field::new("month_start", DataType::Date32, false),
        Field::new("month_end", DataType::Date32, false),
        Field::new("month_abbr", DataType::Utf8, false),
        Field::new("year_month", DataType::Utf8, false),
        Field::new("day_of_month", DataType::Int32, false),
        Field::new("weekday", DataType::Int32, false),
        Field::new("day_of_year", DataType::Int32, false),
        Field::new("day_name", DataType::Utf8, false),
        Field::new("day_abbr", DataType::Utf8, false),
        Field::new("week_of_year", DataType::Int32, false),
        Field::new("quarter", DataType::Int32, false),
        Field::new("is_weekend", DataType::Boolean, false),
    ];

    let mut columns: Vec<ArrayRef> = vec![
        date_column(&dates, |date| Some(*date))?,
        text_column(&dates, "%Y%m%d"),
        int_column(&dates, |date| date.year()),
        bool_column(&dates, |date| date.leap_year()),
        int_column(&dates, |date| as_i32(date.month())),
        text_column(&dates, "%B"),
        date_column(&dates, |date| date.with_day(1))?,
        date_column(&dates, |date| month_end(*date))?,
        text_column(&dates, "%b"),
        text_column(&dates, "%Y%m"),
        int_column(&dates, |date| as_i32(date.day())),
        int_column(&dates, |date| as_i32(date.weekday().number_from_monday())),
        int_column(&dates, |date| as_i32(date.ordinal())),
        text_column(&dates, "%A"),
        text_column(&dates, "%a"),
        int_column(&dates, |date| as_i32(date.iso_week().week())),
        int_column(&dates, |date| as_i32((date.month() - 1) / 3 + 1)),
        bool_column(&dates, |date| date.weekday().number_from_monday() > 5),
    ];

    if let Some(calendar) = fiscal {
        fields.push(Field::new("fiscal_year", DataType::Int32, false));
        fields.push(Field::new("fiscal_quarter", DataType::Int32, false));
        columns.push(int_column(&dates, |date| calendar.fiscal_year(*date)));
        columns.push(int_column(&dates, |date| as_i32(calendar.fiscal_quarter(*date))));
    }

    log::debug!("Built date dimension with {} days from {start} to {end}", dates.len());

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
