//! Cron expressions with a seconds field.
//!
//! Format: `sec min hour day-of-month month day-of-week`. Each field accepts `*`
//! (or `?`), a number, a range `a-b`, a step `*/n`, `a/n` or `a-b/n`, and
//! comma-separated lists of those. Day-of-week runs 0-7 with both 0 and 7 meaning
//! Sunday. When both day fields are restricted a day matches if either does.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::cron::CronError;

/// Years searched ahead before a schedule is considered unsatisfiable.
const SEARCH_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    bits: u64,
    any: bool,
}

impl Field {
    fn contains(&self, value: u32) -> bool {
        self.bits & (1u64 << value) != 0
    }
}

/// A parsed cron schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    source: String,
    seconds: Field,
    minutes: Field,
    hours: Field,
    days_of_month: Field,
    months: Field,
    days_of_week: Field,
}

impl Schedule {
    pub fn parse(spec: &str) -> Result<Self, CronError> {
        let invalid = |reason: String| CronError::InvalidSchedule {
            spec: spec.to_string(),
            reason,
        };

        let fields: Vec<&str> = spec.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(invalid(format!("expected 6 fields, found {}", fields.len())));
        }

        let mut days_of_week = parse_field(fields[5], 0, 7).map_err(&invalid)?;
        if days_of_week.contains(7) {
            days_of_week.bits = (days_of_week.bits & !(1 << 7)) | 1;
        }

        Ok(Self {
            source: spec.to_string(),
            seconds: parse_field(fields[0], 0, 59).map_err(&invalid)?,
            minutes: parse_field(fields[1], 0, 59).map_err(&invalid)?,
            hours: parse_field(fields[2], 0, 23).map_err(&invalid)?,
            days_of_month: parse_field(fields[3], 1, 31).map_err(&invalid)?,
            months: parse_field(fields[4], 1, 12).map_err(&invalid)?,
            days_of_week,
        })
    }

    /// The expression this schedule was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(date.day());
        let dow = self.days_of_week.contains(date.weekday().num_days_from_sunday());
        if self.days_of_month.any || self.days_of_week.any {
            dom && dow
        } else {
            dom || dow
        }
    }

    /// First fire time strictly after `after`, or `None` if nothing matches within
    /// the next few years.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut t = after.with_nanosecond(0)? + Duration::seconds(1);
        let last_year = after.year() + SEARCH_YEARS;

        while t.year() <= last_year {
            if !self.months.contains(t.month()) {
                let (year, month) = if t.month() == 12 {
                    (t.year() + 1, 1)
                } else {
                    (t.year(), t.month() + 1)
                };
                t = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.day_matches(t.date()) {
                t = t.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.hours.contains(t.hour()) {
                t = t.date().and_hms_opt(t.hour(), 0, 0)? + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(t.minute()) {
                t = t.date().and_hms_opt(t.hour(), t.minute(), 0)? + Duration::minutes(1);
                continue;
            }
            if !self.seconds.contains(t.second()) {
                t += Duration::seconds(1);
                continue;
            }
            return Some(t);
        }
        None
    }
}

impl FromStr for Schedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_field(text: &str, min: u32, max: u32) -> Result<Field, String> {
    let mut bits = 0u64;
    let mut any = false;

    for part in text.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| format!("invalid step '{step}' in '{part}'"))?;
                if step == 0 {
                    return Err(format!("step must be positive in '{part}'"));
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (start, end) = if range == "*" || range == "?" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, part)?, parse_value(b, part)?)
        } else {
            let value = parse_value(range, part)?;
            (value, if step.is_some() { max } else { value })
        };

        if start < min || end > max || start > end {
            return Err(format!("'{part}' is outside {min}-{max}"));
        }

        // `*/n` with n > 1 restricts the field like any explicit list.
        let step = step.unwrap_or(1);
        if (range == "*" || range == "?") && step == 1 {
            any = true;
        }

        let step = step as usize;
        for value in (start..=end).step_by(step) {
            bits |= 1 << value;
        }
    }

    Ok(Field { bits, any })
}

fn parse_value(text: &str, part: &str) -> Result<u32, String> {
    text.parse().map_err(|_| format!("invalid value '{text}' in '{part}'"))
}
