//! Calendar frequencies and date ranges.

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{Error, Result};

/// Base unit of a [`Frequency`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    /// Every day (`D`)
    Day,
    /// Every Sunday (`W`)
    Week,
    /// First day of every month (`MS`)
    MonthStart,
    /// Last day of every month (`M`, `ME`)
    MonthEnd,
    /// First day of January, April, July and October (`QS`)
    QuarterStart,
    /// January 1st (`YS`)
    YearStart,
    /// December 31st (`Y`, `YE`)
    YearEnd,
}

impl FrequencyUnit {
    const fn code(self) -> &'static str {
        match self {
            Self::Day => "D",
            Self::Week => "W",
            Self::MonthStart => "MS",
            Self::MonthEnd => "ME",
            Self::QuarterStart => "QS",
            Self::YearStart => "YS",
            Self::YearEnd => "YE",
        }
    }
}

/// A calendar frequency such as `D`, `7D` or `2MS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    unit: FrequencyUnit,
    multiple: u32,
}

impl Default for Frequency {
    fn default() -> Self {
        Self::new(FrequencyUnit::Day)
    }
}

impl Frequency {
    /// A frequency stepping one unit at a time
    #[must_use]
    pub const fn new(unit: FrequencyUnit) -> Self {
        Self { unit, multiple: 1 }
    }

    /// A frequency stepping `multiple` units at a time
    ///
    /// # Errors
    /// Returns an error if `multiple` is zero
    pub fn with_multiple(unit: FrequencyUnit, multiple: u32) -> Result<Self> {
        if multiple == 0 {
            return Err(Error::invalid_argument("Frequency multiple must be positive"));
        }
        Ok(Self { unit, multiple })
    }

    #[must_use]
    pub const fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    #[must_use]
    pub const fn multiple(&self) -> u32 {
        self.multiple
    }

    /// First date on this frequency at or after `date`
    fn roll_forward(self, date: NaiveDate) -> Option<NaiveDate> {
        let (month, day) = (date.month(), date.day());
        match self.unit {
            FrequencyUnit::Day => Some(date),
            FrequencyUnit::Week => {
                let offset = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_days(Days::new(u64::from(offset)))
            }
            FrequencyUnit::MonthStart if day == 1 => Some(date),
            FrequencyUnit::MonthStart => first_of_month(date, 1),
            FrequencyUnit::MonthEnd => month_end(date),
            FrequencyUnit::QuarterStart if day == 1 && (month - 1) % 3 == 0 => Some(date),
            FrequencyUnit::QuarterStart => {
                let quarter_start = date.with_day(1)?.with_month((month - 1) / 3 * 3 + 1)?;
                first_of_month(quarter_start, 3)
            }
            FrequencyUnit::YearStart if day == 1 && month == 1 => Some(date),
            FrequencyUnit::YearStart => NaiveDate::from_ymd_opt(date.year(), 1, 1)?
                .checked_add_months(Months::new(12)),
            FrequencyUnit::YearEnd => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        }
    }

    /// Next date on this frequency after the on-frequency `date`
    fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        let n = self.multiple;
        match self.unit {
            FrequencyUnit::Day => date.checked_add_days(Days::new(u64::from(n))),
            FrequencyUnit::Week => date.checked_add_days(Days::new(7 * u64::from(n))),
            FrequencyUnit::MonthStart => first_of_month(date, n),
            FrequencyUnit::MonthEnd => first_of_month(date, n.checked_add(1)?)?.pred_opt(),
            FrequencyUnit::QuarterStart => first_of_month(date, n.checked_mul(3)?),
            FrequencyUnit::YearStart | FrequencyUnit::YearEnd => {
                date.checked_add_months(Months::new(n.checked_mul(12)?))
            }
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, code) = s.split_at(split);

        let multiple = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| Error::invalid_argument(format!("Invalid frequency: {s}")))?
        };

        let unit = match code.to_ascii_uppercase().as_str() {
            "D" => FrequencyUnit::Day,
            "W" => FrequencyUnit::Week,
            "MS" => FrequencyUnit::MonthStart,
            "M" | "ME" => FrequencyUnit::MonthEnd,
            "QS" => FrequencyUnit::QuarterStart,
            "YS" => FrequencyUnit::YearStart,
            "Y" | "YE" => FrequencyUnit::YearEnd,
            _ => return Err(Error::invalid_argument(format!("Invalid frequency: {s}"))),
        };

        Self::with_multiple(unit, multiple)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple == 1 {
            f.write_str(self.unit.code())
        } else {
            write!(f, "{}{}", self.multiple, self.unit.code())
        }
    }
}

/// First day of the month `months` after the month of `date`
fn first_of_month(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(months))
}

/// Last day of the month containing `date`
pub(crate) fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date, 1)?.pred_opt()
}

/// All dates on `freq` within `[start, end]`, in order
#[must_use]
pub fn date_range(start: NaiveDate, end: NaiveDate, freq: Frequency) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = freq.roll_forward(start);
    while let Some(date) = current.filter(|date| *date <= end) {
        dates.push(date);
        current = freq.advance(date);
    }
    dates
}

/// Consecutive `(from, to)` pairs over the range points of `[start, end]`
///
/// When no point falls in the range the single pair `(start, end)` is
/// returned. When the last point is before `end` a final `(last, end)` pair
/// closes the range.
#[must_use]
pub fn date_range_pairs(
    start: NaiveDate,
    end: NaiveDate,
    freq: Frequency,
) -> Vec<(NaiveDate, NaiveDate)> {
    let dates = date_range(start, end, freq);
    let Some(&last) = dates.last() else {
        return vec![(start, end)];
    };

    let mut pairs: Vec<_> = dates.windows(2).map(|pair| (pair[0], pair[1])).collect();
    if last < end {
        pairs.push((last, end));
    }
    pairs
}

/// Check that `fmt` is a valid strftime format
///
/// # Errors
/// Returns an error if the format contains an unknown or malformed specifier
pub fn validate_format(fmt: &str) -> Result<()> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(Error::invalid_argument(format!(
            "Invalid date format: {fmt}"
        )));
    }
    Ok(())
}

/// [`date_range_pairs`] formatted with the strftime format `fmt`
///
/// # Errors
/// Returns an error if `fmt` is not a valid strftime format
pub fn generate_date_ranges(
    start: NaiveDate,
    end: NaiveDate,
    freq: Frequency,
    fmt: &str,
) -> Result<Vec<(String, String)>> {
    validate_format(fmt)?;
    Ok(date_range_pairs(start, end, freq)
        .into_iter()
        .map(|(from, to)| (from.format(fmt).to_string(), to.format(fmt).to_string()))
        .collect())
}
