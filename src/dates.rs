//! Survey date validation.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub const DAY_RANGE: (u32, u32) = (1, 31);
pub const MONTH_RANGE: (u32, u32) = (1, 12);
pub const YEAR_RANGE: (i32, i32) = (2000, 2024);

/// Why a day does not exist in the chosen month. The message is shown to the
/// user before asking for the date again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("February can only have 29 days in a leap year.")]
    LeapFebruary,
    #[error("February can only have 28 days in a non-leap year.")]
    February,
    #[error("Month {0} can only have 30 days.")]
    ThirtyDayMonth(u32),
    #[error("{day:02}/{month:02}/{year} is not a valid date.")]
    Invalid { day: u32, month: u32, year: i32 },
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A calendar date entered for a survey, displayed as `dd/MM/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurveyDate(NaiveDate);

impl SurveyDate {
    /// Validates `day` against the length of `month` in `year`.
    ///
    /// Components are expected to be range-checked already (see
    /// [`DAY_RANGE`], [`MONTH_RANGE`], [`YEAR_RANGE`]).
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self, DateError> {
        if day > days_in_month(month, year) {
            return Err(match month {
                2 if is_leap_year(year) => DateError::LeapFebruary,
                2 => DateError::February,
                4 | 6 | 9 | 11 => DateError::ThirtyDayMonth(month),
                _ => DateError::Invalid { day, month, year },
            });
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::Invalid { day, month, year })
    }

    /// Parses the canonical `dd/MM/yyyy` form.
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y")
            .ok()
            .map(Self)
    }
}

impl fmt::Display for SurveyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%Y"))
    }
}
