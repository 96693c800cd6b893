// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Organization audit log retrieval.
///
/// Fetches git audit events for an organization from the GitHub REST API and
/// follows `Link` pagination until every page has been concatenated.
use indicatif::{ProgressBar, ProgressStyle};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;

/// Maximum page size accepted by the audit log endpoint.
const AUDIT_LOG_PAGE_SIZE: u8 = 100;
/// Feature filter restricting the audit log to git events.
const GIT_EVENT_FILTER: &str = "git";

/// Single audit log entry.
///
/// Only the fields consumed by the report are decoded; everything else in
/// the API payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct AuditEvent
{
    /// Event time in milliseconds since the Unix epoch.
    #[serde(rename = "@timestamp")]
    pub timestamp_ms: i64,
    /// Login of the account that performed the action. System events may
    /// omit it.
    #[serde(default)]
    pub actor:        Option<String,>,
    /// Categorized event type, e.g. `git.clone`.
    #[serde(default)]
    pub action:       String,
}

impl AuditEvent
{
    /// Creates an event attributed to `actor`.
    pub fn new(timestamp_ms: i64, actor: impl Into<String,>, action: impl Into<String,>,) -> Self
    {
        Self {
            timestamp_ms,
            actor: Some(actor.into(),),
            action: action.into(),
        }
    }

    /// Returns the git action this event represents, if it is one of the
    /// reported kinds.
    pub fn git_action(&self,) -> Option<GitAction,>
    {
        GitAction::from_action(&self.action,)
    }
}

/// Git actions tracked by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum GitAction
{
    /// `git.clone`
    Clone,
    /// `git.push`
    Push,
    /// `git.fetch`
    Fetch,
}

impl GitAction
{
    /// Parses an audit log action name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaudit::GitAction;
    ///
    /// assert_eq!(GitAction::from_action("git.push"), Some(GitAction::Push));
    /// assert_eq!(GitAction::from_action("repo.create"), None);
    /// ```
    pub fn from_action(action: &str,) -> Option<Self,>
    {
        match action {
            "git.clone" => Some(Self::Clone,),
            "git.push" => Some(Self::Push,),
            "git.fetch" => Some(Self::Fetch,),
            _ => None,
        }
    }

    /// Returns the audit log action name.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::Clone => "git.clone",
            Self::Push => "git.push",
            Self::Fetch => "git.fetch",
        }
    }
}

#[derive(Debug, Serialize,)]
struct AuditLogQuery<'a,>
{
    include:  &'a str,
    per_page: u8,
}

/// Fetches every git audit event recorded for `org`.
///
/// Pages are requested sequentially and concatenated in the order the API
/// returns them. No filtering happens here.
///
/// # Errors
///
/// Returns [`Error::Api`] when any page request fails. Nothing is retried.
///
/// # Example
///
/// ```no_run
/// use gitaudit::{build_client, fetch_git_events};
///
/// # async fn example() -> Result<(), gitaudit::Error> {
/// let octocrab = build_client("ghp_token", None,)?;
/// let events = fetch_git_events(&octocrab, "acme",).await?;
/// println!("{} events", events.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_git_events(octocrab: &Octocrab, org: &str,) -> Result<Vec<AuditEvent,>, Error,>
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );

    let route = format!("/orgs/{org}/audit-log");
    let query = AuditLogQuery {
        include: GIT_EVENT_FILTER, per_page: AUDIT_LOG_PAGE_SIZE,
    };

    pb.set_message(format!("Fetching audit log for {org}..."),);
    debug!("Requesting first audit log page from {}", route);
    let mut page: Page<AuditEvent,> = octocrab
        .get(&route, Some(&query,),)
        .await
        .map_err(|e| Error::api(format!("failed to fetch audit log for {org}: {e}"),),)?;

    let mut events = page.take_items();
    let mut pages = 1usize;

    while let Some(mut next,) = octocrab
        .get_page::<AuditEvent,>(&page.next,)
        .await
        .map_err(|e| Error::api(format!("failed to fetch audit log page for {org}: {e}"),),)?
    {
        pages += 1;
        events.extend(next.take_items(),);
        debug!("Fetched audit log page {} ({} events so far)", pages, events.len());
        pb.set_message(format!("Fetched {} pages ({} events)...", pages, events.len()),);
        page = next;
    }

    pb.finish_and_clear();
    info!("Fetched {} git audit events for {} across {} pages", events.len(), org, pages);

    Ok(events,)
}
