// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Reporting window resolution and event filtering.
//!
//! A window is either relative ("the last N days" ending now) or absolute
//! (an explicit `fromdate`/`todate` pair). Both bounds are inclusive and
//! expressed in epoch milliseconds so they compare directly against audit
//! log timestamps. Malformed inputs are rejected up front instead of silently
//! producing an empty report.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::{audit::AuditEvent, error::Error};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Accepts `YYYY-MM-DD`, optionally followed by an RFC 3339 time part.
static DATE_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:[Tt].+)?$",).expect("valid date pattern",)
},);

/// How the window bounds were derived.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum WindowMode
{
    /// Trailing window ending at the resolution instant.
    Relative
    {
        /// Number of days covered.
        days: u32,
    },
    /// Explicit date range.
    Absolute
    {
        /// Start date as supplied.
        from: String,
        /// End date as supplied.
        to:   String,
    },
}

/// Inclusive reporting interval plus the labels derived from it.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct DateWindow
{
    /// Lower bound in epoch milliseconds.
    pub start_ms:      i64,
    /// Upper bound in epoch milliseconds.
    pub end_ms:        i64,
    /// Human readable label embedded in column headers.
    pub display_label: String,
    /// Label embedded in the report filename.
    pub file_label:    String,
    /// Mode the window was resolved in.
    pub mode:          WindowMode,
}

impl DateWindow
{
    /// Resolves the reporting window from raw option values.
    ///
    /// Empty `fromdate` and `todate` select the relative mode covering the
    /// last `days` days before `now`. Otherwise both dates must be present
    /// and well formed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `days` is not a positive integer, only
    /// one date is supplied, a date is malformed, or the range is inverted.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use gitaudit::DateWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0,).unwrap();
    /// let window = DateWindow::resolve("7", "", "", now,)?;
    /// assert_eq!(window.display_label, "the last 7 days");
    /// assert_eq!(window.file_label, "7-days");
    /// # Ok::<(), gitaudit::Error>(())
    /// ```
    pub fn resolve(
        days: &str,
        fromdate: &str,
        todate: &str,
        now: DateTime<Utc,>,
    ) -> Result<Self, Error,>
    {
        let fromdate = fromdate.trim();
        let todate = todate.trim();

        match (fromdate.is_empty(), todate.is_empty(),) {
            (true, true,) => Self::relative(parse_days(days,)?, now,),
            (false, false,) => Self::absolute(fromdate, todate,),
            (false, true,) => Err(Error::config("fromdate was provided without todate",),),
            (true, false,) => Err(Error::config("todate was provided without fromdate",),),
        }
    }

    /// Builds a window covering the `days` days that end at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `days` is zero or the start would
    /// underflow the timestamp range.
    pub fn relative(days: u32, now: DateTime<Utc,>,) -> Result<Self, Error,>
    {
        if days == 0 {
            return Err(Error::config("days must be a positive integer",),);
        }

        let end_ms = now.timestamp_millis();
        let start_ms = i64::from(days,)
            .checked_mul(MILLIS_PER_DAY,)
            .and_then(|span| end_ms.checked_sub(span,),)
            .ok_or_else(|| Error::config(format!("days value {days} is out of range"),),)?;

        Ok(Self {
            start_ms,
            end_ms,
            display_label: format!("the last {days} days"),
            file_label: format!("{days}-days"),
            mode: WindowMode::Relative {
                days,
            },
        },)
    }

    /// Builds a window spanning the explicit `from`..=`to` range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when either date is malformed or `from` is
    /// later than `to`.
    pub fn absolute(from: &str, to: &str,) -> Result<Self, Error,>
    {
        let start_ms = parse_epoch_millis("fromdate", from,)?;
        let end_ms = parse_epoch_millis("todate", to,)?;

        if start_ms > end_ms {
            return Err(Error::config(format!("fromdate {from} is later than todate {to}"),),);
        }

        Ok(Self {
            start_ms,
            end_ms,
            display_label: format!("{from} to {to}"),
            file_label: format!("{from}-to-{to}"),
            mode: WindowMode::Absolute {
                from: from.to_owned(), to: to.to_owned(),
            },
        },)
    }

    /// Returns `true` when `timestamp_ms` lies inside the window, bounds
    /// included.
    pub fn contains(&self, timestamp_ms: i64,) -> bool
    {
        (self.start_ms..=self.end_ms).contains(&timestamp_ms,)
    }

    /// Keeps the events that fall inside the window, preserving order.
    pub fn filter_events(&self, events: Vec<AuditEvent,>,) -> Vec<AuditEvent,>
    {
        events.into_iter().filter(|event| self.contains(event.timestamp_ms,),).collect()
    }
}

fn parse_days(raw: &str,) -> Result<u32, Error,>
{
    let trimmed = raw.trim();
    let days = trimmed.parse::<u32,>().map_err(|_| {
        Error::config(format!("days must be a positive integer, got '{trimmed}'"),)
    },)?;

    if days == 0 {
        return Err(Error::config("days must be a positive integer",),);
    }

    Ok(days,)
}

/// Parses a bare date as UTC midnight, or a full RFC 3339 timestamp.
fn parse_epoch_millis(field: &str, value: &str,) -> Result<i64, Error,>
{
    if !DATE_PATTERN.is_match(value,) {
        return Err(Error::config(format!("{field} '{value}' is not a YYYY-MM-DD date"),),);
    }

    if value.len() == 10 {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d",)
            .map_err(|e| Error::config(format!("{field} '{value}' is not a valid date: {e}"),),)?;
        let midnight = date
            .and_hms_opt(0, 0, 0,)
            .ok_or_else(|| Error::config(format!("{field} '{value}' has no midnight"),),)?;
        return Ok(midnight.and_utc().timestamp_millis(),);
    }

    DateTime::parse_from_rfc3339(value,)
        .map(|instant| instant.timestamp_millis(),)
        .map_err(|e| Error::config(format!("{field} '{value}' is not a valid timestamp: {e}"),),)
}
