//! Small helpers for job scripts.

use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, Local};
use itertools::Itertools;
use rand::prelude::*;

use crate::error::{Error, Result};

/// Parse a list of integers and inclusive ranges such as `"1-3,5,7-9"`
///
/// A range whose end is below its start contributes nothing.
///
/// # Errors
/// Returns `InvalidArgument` if a token is not an integer or a range
pub fn parse_ranges(ranges: &str) -> Result<Vec<i64>> {
    let invalid = |token: &str| Error::invalid_argument(format!("Invalid range: '{token}'"));
    let parse = |token: &str, part: &str| part.trim().parse::<i64>().map_err(|_| invalid(token));

    let mut values = Vec::new();
    for token in ranges.split(',') {
        match token.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(token, start)?, parse(token, end)?);
                values.extend(start..=end);
            }
            None => values.push(parse(token, token)?),
        }
    }
    Ok(values)
}

/// Whether `path` exists and was last modified on today's local date
pub fn modified_today(path: impl AsRef<Path>) -> bool {
    let Ok(modified) = std::fs::metadata(path.as_ref()).and_then(|m| m.modified()) else {
        return false;
    };
    DateTime::<Local>::from(modified).date_naive() == Local::now().date_naive()
}

/// `count` random integers drawn uniformly from `0..=max_num`
///
/// # Errors
/// Returns `InvalidArgument` if `max_num` is negative or `count` is below 1
pub fn rand_int_list(max_num: i64, count: i64) -> Result<Vec<i64>> {
    let mut rng = StdRng::from_os_rng();
    rand_int_list_with_rng(&mut rng, max_num, count)
}

/// [`rand_int_list`] drawing from a caller supplied generator
///
/// # Errors
/// Returns `InvalidArgument` if `max_num` is negative or `count` is below 1
pub fn rand_int_list_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    max_num: i64,
    count: i64,
) -> Result<Vec<i64>> {
    if max_num < 0 || count < 1 {
        return Err(Error::invalid_argument(
            "max_num should be non-negative and count should be at least 1",
        ));
    }
    Ok((0..count).map(|_| rng.random_range(0..=max_num)).collect())
}

/// Join `items` with `", "`, wrapped in parentheses when `parens` is set
pub fn unpack_list<T: Display>(items: &[T], parens: bool) -> String {
    let joined = items.iter().join(", ");
    if parens { format!("({joined})") } else { joined }
}
