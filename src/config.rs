// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Run options resolved from flags, workflow inputs, and the event payload.
//!
//! The GitHub Actions runner exports every declared input as an `INPUT_*`
//! environment variable and leaves unset inputs as empty strings. The types
//! in this module treat blank values as absent, apply documented defaults,
//! and validate everything that can be checked before the first API call.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{self, Error},
    publish::{Committer, TargetRepository},
    report::SortColumn,
};

/// Default number of days covered by the relative window.
pub const DEFAULT_DAYS: &str = "7";

/// Raw option values as collected by the command line parser.
///
/// Every field is optional; [`ReportConfig::resolve`] applies defaults and
/// validation.
#[derive(Debug, Clone, Default,)]
pub struct RawInputs
{
    /// Personal access token used for every API call.
    pub token:           Option<String,>,
    /// Organization whose audit log is reported.
    pub org:             Option<String,>,
    /// Path to the workflow event payload used as the organization fallback.
    pub event_path:      Option<PathBuf,>,
    /// Length of the relative window in days.
    pub days:            Option<String,>,
    /// Start of the absolute window.
    pub fromdate:        Option<String,>,
    /// End of the absolute window.
    pub todate:          Option<String,>,
    /// Column used to order the report.
    pub sort:            Option<String,>,
    /// Committer display name.
    pub committer_name:  Option<String,>,
    /// Committer email address.
    pub committer_email: Option<String,>,
    /// Repository receiving the report, `owner/name`.
    pub repository:      Option<String,>,
    /// GitHub REST API base URL.
    pub api_url:         Option<String,>,
    /// Print the report instead of committing it.
    pub dry_run:         bool,
}

/// Validated options for a single reporting run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ReportConfig
{
    /// Personal access token used for every API call.
    pub token:      String,
    /// Organization whose audit log is reported.
    pub org:        String,
    /// Length of the relative window in days, unparsed.
    pub days:       String,
    /// Start of the absolute window, empty when unset.
    pub fromdate:   String,
    /// End of the absolute window, empty when unset.
    pub todate:     String,
    /// Column used to order the report.
    pub sort:       SortColumn,
    /// Committer identity for the report commit.
    pub committer:  Committer,
    /// Repository receiving the report. Absent only for dry runs.
    pub repository: Option<TargetRepository,>,
    /// GitHub REST API base URL override.
    pub api_url:    Option<String,>,
    /// Print the report instead of committing it.
    pub dry_run:    bool,
}

impl ReportConfig
{
    /// Applies defaults and validates raw inputs.
    ///
    /// The organization is taken from `org` when set, otherwise from
    /// `organization.login` in the event payload at `event_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the token is missing, the organization
    /// cannot be resolved, the sort column is unknown, or the target
    /// repository is missing or malformed outside a dry run. Reading the
    /// event payload may also fail with [`Error::PayloadIo`] or
    /// [`Error::PayloadParse`].
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaudit::{RawInputs, ReportConfig, SortColumn};
    ///
    /// let config = ReportConfig::resolve(RawInputs {
    ///     token: Some("ghp_token".to_owned(),),
    ///     org: Some("acme".to_owned(),),
    ///     repository: Some("acme/audit-reports".to_owned(),),
    ///     ..RawInputs::default()
    /// },)?;
    /// assert_eq!(config.days, "7");
    /// assert_eq!(config.sort, SortColumn::GitClone);
    /// # Ok::<(), gitaudit::Error>(())
    /// ```
    pub fn resolve(raw: RawInputs,) -> Result<Self, Error,>
    {
        let token = normalized(raw.token,)
            .ok_or_else(|| Error::config("missing required token input",),)?;

        let org = resolve_org(normalized(raw.org,).as_deref(), raw.event_path.as_deref(),)?;

        let sort = match normalized(raw.sort,) {
            Some(value,) => value.parse()?,
            None => SortColumn::default(),
        };

        let defaults = Committer::default();
        let committer = Committer {
            name:  normalized(raw.committer_name,).unwrap_or(defaults.name,),
            email: normalized(raw.committer_email,).unwrap_or(defaults.email,),
        };

        let repository = normalized(raw.repository,)
            .map(|value| value.parse::<TargetRepository,>(),)
            .transpose()?;
        if repository.is_none() && !raw.dry_run {
            return Err(Error::config("missing target repository (owner/name)",),);
        }

        Ok(Self {
            token,
            org,
            days: normalized(raw.days,).unwrap_or_else(|| DEFAULT_DAYS.to_owned(),),
            fromdate: normalized(raw.fromdate,).unwrap_or_default(),
            todate: normalized(raw.todate,).unwrap_or_default(),
            sort,
            committer,
            repository,
            api_url: normalized(raw.api_url,),
            dry_run: raw.dry_run,
        },)
    }
}

#[derive(Debug, Deserialize,)]
struct EventPayload
{
    #[serde(default)]
    organization: Option<EventOrganization,>,
}

#[derive(Debug, Deserialize,)]
struct EventOrganization
{
    login: String,
}

/// Resolves the organization to report on.
///
/// An explicit, non-blank `org` wins. Otherwise the workflow event payload
/// at `event_path` is read and its `organization.login` used.
///
/// # Errors
///
/// Returns [`Error::Config`] when neither source names an organization and
/// the payload errors when the file cannot be read or decoded.
pub fn resolve_org(org: Option<&str,>, event_path: Option<&Path,>,) -> Result<String, Error,>
{
    if let Some(org,) = org.map(str::trim,).filter(|value| !value.is_empty(),) {
        return Ok(org.to_owned(),);
    }

    let path = event_path.ok_or_else(|| {
        Error::config("missing org input and no event payload to derive it from",)
    },)?;

    debug!("Reading organization from event payload {}", path.display());
    let contents = fs::read_to_string(path,).map_err(|source| error::payload_io_error(path, source,),)?;
    let payload: EventPayload = serde_json::from_str(&contents,)
        .map_err(|source| error::payload_parse_error(path, source,),)?;

    payload
        .organization
        .map(|organization| organization.login.trim().to_owned(),)
        .filter(|login| !login.is_empty(),)
        .ok_or_else(|| {
            Error::config(format!(
                "missing org input and event payload {} has no organization",
                path.display()
            ),)
        },)
}

fn normalized(value: Option<String,>,) -> Option<String,>
{
    value.map(|raw| raw.trim().to_owned(),).filter(|trimmed| !trimmed.is_empty(),)
}
