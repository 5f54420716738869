//! Utility functions for IO, logging and small job-script helpers

pub mod io;
pub mod logging;
pub mod misc;

pub use misc::{modified_today, parse_ranges, rand_int_list, unpack_list};
