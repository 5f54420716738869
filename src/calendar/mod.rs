//! Calendar utilities: fiscal years, date dimensions and date ranges.

pub mod dimension;
pub mod fiscal;
pub mod ranges;

pub use dimension::date_dimension;
pub use fiscal::FiscalCalendar;
pub use ranges::{
    Frequency, FrequencyUnit, date_range, date_range_pairs, generate_date_ranges, validate_format,
};
