//! Calendar-aware date and numeric time conversion
//!
//! Climate model output stores time as numbers relative to an epoch, e.g.
//! "days since 1850-01-01", under one of several CF calendars. This module
//! parses those unit strings and converts between calendar dates and numeric
//! time values. The Gregorian calendars delegate to `chrono`; the fixed-length
//! calendars (360-day, no-leap, all-leap) use plain integer day arithmetic
//! since no stock date type can represent e.g. the 30th of February.

use crate::errors::{Result, TempoCubeError};
use chrono::{Datelike, NaiveDate};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Cumulative days before each month, 365-day calendar
const CUM_DAYS_NOLEAP: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Cumulative days before each month, 366-day calendar
const CUM_DAYS_ALLLEAP: [i64; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// CF calendar systems supported for time coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// Mixed Julian/Gregorian; treated as proleptic Gregorian here, which is
    /// exact for all dates after 1582-10-15
    Standard,
    ProlepticGregorian,
    /// 365 days every year, no leap days
    NoLeap,
    /// 366 days every year
    AllLeap,
    /// Twelve 30-day months
    Day360,
}

impl Calendar {
    /// Parse a CF `calendar` attribute value.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            other => Err(TempoCubeError::DateConversion(format!(
                "Unknown calendar '{}'",
                other
            ))),
        }
    }

    /// CF attribute string for this calendar.
    pub fn as_str(&self) -> &'static str {
        match self {
            Calendar::Standard => "standard",
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
        }
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Calendar::Standard | Calendar::ProlepticGregorian => {
                (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
            }
            Calendar::NoLeap | Calendar::Day360 => false,
            Calendar::AllLeap => true,
        }
    }

    /// Number of days in a month under this calendar.
    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match self {
            Calendar::Day360 => 30,
            _ => {
                const LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
                let base = LENGTHS[(month - 1) as usize];
                if month == 2 && self.is_leap_year(year) {
                    29
                } else {
                    base
                }
            }
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar-naive date and time of day
///
/// Unlike `chrono::NaiveDateTime` this can hold dates that only exist in
/// non-standard calendars, such as 2000-02-30 in the 360-day calendar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalDate {
    /// Date at midnight.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    pub fn with_time(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Parse "YYYY-MM-DD", optionally followed by " hh:mm[:ss[.f]]" or a
    /// "T"-separated time of day.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (date_part, time_part) = match s.split_once(|c| c == ' ' || c == 'T') {
            Some((d, t)) => (d, Some(t.trim())),
            None => (s, None),
        };

        let fields: Vec<&str> = date_part.split('-').collect();
        if fields.len() != 3 {
            return Err(TempoCubeError::UnitParse(format!(
                "Expected date as YYYY-MM-DD, got '{}'",
                date_part
            )));
        }
        let year: i32 = fields[0]
            .parse()
            .map_err(|_| TempoCubeError::UnitParse(format!("Invalid year '{}'", fields[0])))?;
        let month: u32 = fields[1]
            .parse()
            .map_err(|_| TempoCubeError::UnitParse(format!("Invalid month '{}'", fields[1])))?;
        let day: u32 = fields[2]
            .parse()
            .map_err(|_| TempoCubeError::UnitParse(format!("Invalid day '{}'", fields[2])))?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(TempoCubeError::UnitParse(format!(
                "Date '{}' out of range",
                date_part
            )));
        }

        let (mut hour, mut minute, mut second) = (0u32, 0u32, 0u32);
        if let Some(t) = time_part {
            if !t.is_empty() {
                let clock: Vec<&str> = t.split(':').collect();
                if clock.len() < 2 || clock.len() > 3 {
                    return Err(TempoCubeError::UnitParse(format!(
                        "Expected time as hh:mm[:ss], got '{}'",
                        t
                    )));
                }
                hour = clock[0]
                    .parse()
                    .map_err(|_| TempoCubeError::UnitParse(format!("Invalid hour '{}'", clock[0])))?;
                minute = clock[1].parse().map_err(|_| {
                    TempoCubeError::UnitParse(format!("Invalid minute '{}'", clock[1]))
                })?;
                if clock.len() == 3 {
                    // Seconds may carry a fractional part in some files
                    let secs: f64 = clock[2].parse().map_err(|_| {
                        TempoCubeError::UnitParse(format!("Invalid second '{}'", clock[2]))
                    })?;
                    second = secs.round() as u32;
                }
                if hour > 23 || minute > 59 || second > 60 {
                    return Err(TempoCubeError::UnitParse(format!(
                        "Time of day '{}' out of range",
                        t
                    )));
                }
            }
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    fn seconds_of_day(&self) -> i64 {
        self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64
    }
}

impl fmt::Display for CalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Base unit of a "<base> since <epoch>" time coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeBase {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" | "s" => Ok(TimeBase::Seconds),
            "minute" | "minutes" | "min" | "mins" => Ok(TimeBase::Minutes),
            "hour" | "hours" | "hr" | "hrs" | "h" => Ok(TimeBase::Hours),
            "day" | "days" | "d" => Ok(TimeBase::Days),
            other => Err(TempoCubeError::UnitParse(format!(
                "Unknown time base '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBase::Seconds => "seconds",
            TimeBase::Minutes => "minutes",
            TimeBase::Hours => "hours",
            TimeBase::Days => "days",
        }
    }

    fn in_seconds(&self) -> f64 {
        match self {
            TimeBase::Seconds => 1.0,
            TimeBase::Minutes => 60.0,
            TimeBase::Hours => 3600.0,
            TimeBase::Days => 86_400.0,
        }
    }
}

/// Unit of a numeric time coordinate: base unit, epoch and calendar
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnit {
    pub base: TimeBase,
    pub epoch: CalDate,
    pub calendar: Calendar,
}

impl TimeUnit {
    pub fn new(base: TimeBase, epoch: CalDate, calendar: Calendar) -> Self {
        Self {
            base,
            epoch,
            calendar,
        }
    }

    /// Parse a CF units string such as "days since 1850-01-01 00:00:00".
    pub fn parse(units: &str, calendar: Calendar) -> Result<Self> {
        let (base_part, epoch_part) = units.split_once(" since ").ok_or_else(|| {
            TempoCubeError::UnitParse(format!(
                "Expected '<base> since <date>', got '{}'",
                units
            ))
        })?;
        let base = TimeBase::parse(base_part)?;
        let epoch = CalDate::parse(epoch_part)?;
        Ok(Self::new(base, epoch, calendar))
    }

    /// The CF units string for this unit.
    pub fn units_string(&self) -> String {
        format!("{} since {}", self.base.as_str(), self.epoch)
    }

    /// Convert a calendar date to a numeric time value in this unit.
    pub fn date2num(&self, date: &CalDate) -> Result<f64> {
        let seconds = (self.abs_day(date)? - self.abs_day(&self.epoch)?) * SECONDS_PER_DAY
            + (date.seconds_of_day() - self.epoch.seconds_of_day());
        Ok(seconds as f64 / self.base.in_seconds())
    }

    /// Convert a numeric time value back to a calendar date.
    ///
    /// The value is resolved to whole seconds; sub-second fractions round to
    /// the nearest second.
    pub fn num2date(&self, value: f64) -> Result<CalDate> {
        let offset_seconds = (value * self.base.in_seconds()).round() as i64;
        let total = self.abs_day(&self.epoch)? * SECONDS_PER_DAY
            + self.epoch.seconds_of_day()
            + offset_seconds;
        let day_number = total.div_euclid(SECONDS_PER_DAY);
        let second_of_day = total.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = self.date_from_abs_day(day_number)?;
        Ok(CalDate {
            year,
            month,
            day,
            hour: (second_of_day / 3600) as u32,
            minute: ((second_of_day % 3600) / 60) as u32,
            second: (second_of_day % 60) as u32,
        })
    }

    /// Days elapsed since year 0 of the calendar for a given date.
    fn abs_day(&self, date: &CalDate) -> Result<i64> {
        if !(1..=12).contains(&date.month) {
            return Err(TempoCubeError::DateConversion(format!(
                "Month {} out of range in date {}",
                date.month, date
            )));
        }
        let month_len = self.calendar.days_in_month(date.year, date.month);
        if !(1..=month_len).contains(&date.day) {
            return Err(TempoCubeError::DateConversion(format!(
                "Day {} does not exist in month {} of the {} calendar",
                date.day, date.month, self.calendar
            )));
        }

        let year = date.year as i64;
        let month_index = (date.month - 1) as usize;
        let day = (date.day - 1) as i64;
        match self.calendar {
            Calendar::Day360 => Ok(year * 360 + month_index as i64 * 30 + day),
            Calendar::NoLeap => Ok(year * 365 + CUM_DAYS_NOLEAP[month_index] + day),
            Calendar::AllLeap => Ok(year * 366 + CUM_DAYS_ALLLEAP[month_index] + day),
            Calendar::Standard | Calendar::ProlepticGregorian => {
                let d = NaiveDate::from_ymd_opt(date.year, date.month, date.day).ok_or_else(
                    || TempoCubeError::DateConversion(format!("Invalid date {}", date)),
                )?;
                Ok(d.num_days_from_ce() as i64)
            }
        }
    }

    /// Inverse of `abs_day`: calendar date for a day number.
    fn date_from_abs_day(&self, day_number: i64) -> Result<(i32, u32, u32)> {
        match self.calendar {
            Calendar::Day360 => {
                let year = day_number.div_euclid(360);
                let day_of_year = day_number.rem_euclid(360);
                Ok((
                    year as i32,
                    (day_of_year / 30 + 1) as u32,
                    (day_of_year % 30 + 1) as u32,
                ))
            }
            Calendar::NoLeap => Ok(split_fixed_year(day_number, 365, &CUM_DAYS_NOLEAP)),
            Calendar::AllLeap => Ok(split_fixed_year(day_number, 366, &CUM_DAYS_ALLLEAP)),
            Calendar::Standard | Calendar::ProlepticGregorian => {
                let d = NaiveDate::from_num_days_from_ce_opt(day_number as i32).ok_or_else(
                    || {
                        TempoCubeError::DateConversion(format!(
                            "Day number {} out of range",
                            day_number
                        ))
                    },
                )?;
                Ok((d.year(), d.month(), d.day()))
            }
        }
    }
}

/// Split a day number into (year, month, day) for calendars where every year
/// has the same length.
fn split_fixed_year(day_number: i64, year_length: i64, cumulative: &[i64; 12]) -> (i32, u32, u32) {
    let year = day_number.div_euclid(year_length);
    let day_of_year = day_number.rem_euclid(year_length);
    let month_index = match cumulative.iter().rposition(|&c| c <= day_of_year) {
        Some(i) => i,
        None => 0,
    };
    let day = day_of_year - cumulative[month_index];
    (year as i32, (month_index + 1) as u32, (day + 1) as u32)
}
