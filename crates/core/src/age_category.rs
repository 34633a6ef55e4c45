//! Age-eligibility category derivation.
//!
//! Competitions and groups are labelled "Under N" from a reference
//! eligibility date: players born on or after that date qualify. The label
//! is the smallest bracket strictly above the age that date represents
//! today.

use chrono::{Datelike, NaiveDate};

/// Predefined "Under N" brackets, ascending.
pub const AGE_BRACKETS: [u32; 15] = [8, 10, 12, 14, 16, 18, 20, 21, 23, 25, 30, 35, 40, 45, 50];

/// Width of the open-ended brackets past the table.
const OPEN_BRACKET_STEP: u32 = 5;

/// Completed years between `birth` and `today`.
///
/// A birth date after `today` counts as age 0.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// The `N` of the "Under N" bracket for a computed age.
///
/// Smallest bracket strictly greater than `age`; from 50 upwards, the age
/// rounded up to a multiple of 5 plus another 5.
pub fn age_limit(age: u32) -> u32 {
    AGE_BRACKETS
        .iter()
        .copied()
        .find(|&limit| limit > age)
        .unwrap_or_else(|| age.div_ceil(OPEN_BRACKET_STEP) * OPEN_BRACKET_STEP + OPEN_BRACKET_STEP)
}

/// Render a bracket label.
pub fn format_age_limit(limit: u32) -> String {
    format!("Under {limit}")
}

/// Parse an "Under N" label back into `N`.
pub fn parse_age_limit(label: &str) -> Option<u32> {
    label
        .trim()
        .strip_prefix("Under")?
        .trim()
        .parse()
        .ok()
        .filter(|&n| n > 0)
}

/// The "Under N" category for an eligibility date as of `today`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use clubdesk_core::age_category::age_category;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let born = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
/// assert_eq!(age_category(born, today), "Under 16");
/// ```
pub fn age_category(eligibility_date: NaiveDate, today: NaiveDate) -> String {
    format_age_limit(age_limit(age_on(eligibility_date, today)))
}

/// [`age_category`] against the local calendar date.
pub fn age_category_today(eligibility_date: NaiveDate) -> String {
    age_category(eligibility_date, chrono::Local::now().date_naive())
}
