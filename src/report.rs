// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Report shaping, ordering, and CSV serialization.
//!
//! Rows carry a fixed schema of three git counters per member. The report is
//! sorted descending by a single column with a stable sort, so members with
//! equal values keep the order in which they were first seen.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, window::DateWindow};

/// Per-member counters emitted as one CSV line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow
{
    /// Login of the organization member.
    pub member_name: String,
    /// Number of `git.clone` events.
    pub git_clone:   u64,
    /// Number of `git.push` events.
    pub git_push:    u64,
    /// Number of `git.fetch` events.
    pub git_fetch:   u64,
}

/// Column used to order report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default,)]
pub enum SortColumn
{
    /// Sort by member login.
    MemberName,
    /// Sort by clone count.
    #[default]
    GitClone,
    /// Sort by push count.
    GitPush,
    /// Sort by fetch count.
    GitFetch,
}

impl SortColumn
{
    /// Returns the option value naming this column.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::MemberName => "memberName",
            Self::GitClone => "gitClone",
            Self::GitPush => "gitPush",
            Self::GitFetch => "gitFetch",
        }
    }

    /// Orders two rows descending by this column.
    fn compare_descending(self, left: &ReportRow, right: &ReportRow,) -> Ordering
    {
        match self {
            Self::MemberName => right.member_name.cmp(&left.member_name,),
            Self::GitClone => right.git_clone.cmp(&left.git_clone,),
            Self::GitPush => right.git_push.cmp(&left.git_push,),
            Self::GitFetch => right.git_fetch.cmp(&left.git_fetch,),
        }
    }
}

impl fmt::Display for SortColumn
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.as_str(),)
    }
}

impl FromStr for SortColumn
{
    type Err = Error;

    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        match value.trim() {
            "memberName" => Ok(Self::MemberName,),
            "gitClone" => Ok(Self::GitClone,),
            "gitPush" => Ok(Self::GitPush,),
            "gitFetch" => Ok(Self::GitFetch,),
            other => Err(Error::config(format!(
                "sort must be one of memberName, gitClone, gitPush, gitFetch; got '{other}'"
            ),),),
        }
    }
}

/// Display labels written as the first CSV line.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ReportHeader
{
    /// Label of the member column.
    pub member_name: String,
    /// Label of the clone column.
    pub git_clone:   String,
    /// Label of the push column.
    pub git_push:    String,
    /// Label of the fetch column.
    pub git_fetch:   String,
}

impl ReportHeader
{
    /// Builds labels that embed the window's display label.
    pub fn for_window(window: &DateWindow,) -> Self
    {
        let label = &window.display_label;
        Self {
            member_name: "Username".to_owned(),
            git_clone:   format!("Git clones ({label})"),
            git_push:    format!("Git pushes ({label})"),
            git_fetch:   format!("Git fetches ({label})"),
        }
    }

    fn as_record(&self,) -> [&str; 4]
    {
        [&self.member_name, &self.git_clone, &self.git_push, &self.git_fetch,]
    }
}

/// Sorted report ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Report
{
    header: ReportHeader,
    rows:   Vec<ReportRow,>,
}

impl Report
{
    /// Sorts `rows` by `sort` and attaches the header for `window`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use gitaudit::{DateWindow, Report, ReportRow, SortColumn};
    ///
    /// let window = DateWindow::resolve("7", "", "", Utc::now(),)?;
    /// let rows = vec![ReportRow {
    ///     member_name: "octocat".to_owned(),
    ///     git_clone:   2,
    ///     git_push:    1,
    ///     git_fetch:   0,
    /// }];
    /// let csv = Report::build(rows, SortColumn::GitClone, &window,).to_csv()?;
    /// assert!(csv.ends_with("octocat,2,1,0\n"));
    /// # Ok::<(), gitaudit::Error>(())
    /// ```
    pub fn build(mut rows: Vec<ReportRow,>, sort: SortColumn, window: &DateWindow,) -> Self
    {
        sort_rows(&mut rows, sort,);
        Self {
            header: ReportHeader::for_window(window,),
            rows,
        }
    }

    /// Header labels of the report.
    pub fn header(&self,) -> &ReportHeader
    {
        &self.header
    }

    /// Rows in report order.
    pub fn rows(&self,) -> &[ReportRow]
    {
        &self.rows
    }

    /// Serializes the header and rows as CSV text.
    ///
    /// Fields are written in the order member, clones, pushes, fetches; one
    /// line per row terminated by `\n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] when the writer fails.
    pub fn to_csv(&self,) -> Result<String, Error,>
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false,)
            .terminator(csv::Terminator::Any(b'\n',),)
            .from_writer(Vec::with_capacity(64 * (self.rows.len() + 1),),);

        writer.write_record(self.header.as_record(),)?;
        for row in &self.rows {
            writer.serialize(row,)?;
        }

        let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error(),),)?;
        String::from_utf8(bytes,).map_err(|e| {
            csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e,),).into()
        },)
    }
}

/// Stable descending sort by `column`; ties keep their relative order.
pub fn sort_rows(rows: &mut [ReportRow], column: SortColumn,)
{
    rows.sort_by(|left, right| column.compare_descending(left, right,),);
}
