//! Fiscal calendar helpers.
//!
//! A fiscal year is named after the calendar year it starts in. With the
//! default October start, 2023-11-15 falls in fiscal year 2023 and
//! 2024-03-01 also falls in fiscal year 2023.

use chrono::{Datelike, Local, NaiveDate};

use crate::config::DEFAULT_FISCAL_START_MONTH;
use crate::error::{Error, Result};

/// A fiscal calendar starting on the first day of `start_month`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self {
            start_month: DEFAULT_FISCAL_START_MONTH,
        }
    }
}

impl FiscalCalendar {
    /// Create a fiscal calendar
    ///
    /// # Errors
    /// Returns an error if `start_month` is not in `1..=12`
    pub fn new(start_month: u32) -> Result<Self> {
        if !(1..=12).contains(&start_month) {
            return Err(Error::invalid_argument(format!(
                "Invalid fiscal start month: {start_month}"
            )));
        }
        Ok(Self { start_month })
    }

    /// First month of the fiscal year
    #[must_use]
    pub const fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Fiscal year (the calendar year it starts in) containing `date`
    #[must_use]
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        if date.month() < self.start_month {
            date.year() - 1
        } else {
            date.year()
        }
    }

    /// Fiscal quarter (1-4) containing `date`
    #[must_use]
    pub fn fiscal_quarter(&self, date: NaiveDate) -> u32 {
        let fiscal_month = (date.month() + 12 - self.start_month) % 12;
        fiscal_month / 3 + 1
    }

    /// Fiscal year containing today's local date
    #[must_use]
    pub fn current_fiscal_year(&self) -> i32 {
        self.fiscal_year(Local::now().date_naive())
    }
}
