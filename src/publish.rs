// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Report publication through the repository contents API.
///
/// Commits the serialized CSV report into the target repository with a single
/// create-or-update file call.
use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::Error, window::DateWindow};

/// Directory receiving generated reports.
const REPORTS_DIR: &str = "reports";
const DEFAULT_COMMITTER_NAME: &str = "github-actions";
const DEFAULT_COMMITTER_EMAIL: &str = "github-actions@github.com";

/// Identity recorded as the committer of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Committer
{
    /// Committer display name.
    pub name:  String,
    /// Committer email address.
    pub email: String,
}

impl Default for Committer
{
    fn default() -> Self
    {
        Self {
            name:  DEFAULT_COMMITTER_NAME.to_owned(),
            email: DEFAULT_COMMITTER_EMAIL.to_owned(),
        }
    }
}

/// Repository that receives the report, in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct TargetRepository
{
    /// Account owning the repository.
    pub owner: String,
    /// Repository name.
    pub name:  String,
}

impl fmt::Display for TargetRepository
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for TargetRepository
{
    type Err = Error;

    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        let trimmed = value.trim();
        match trimmed.split_once('/',) {
            Some((owner, name,),)
                if !owner.is_empty() && !name.is_empty() && !name.contains('/',) =>
            {
                Ok(Self {
                    owner: owner.to_owned(), name: name.to_owned(),
                },)
            }
            _ => Err(Error::config(format!(
                "repository must be in owner/name form, got '{trimmed}'"
            ),),),
        }
    }
}

/// Body of the create-or-update file contents request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ContentsRequest
{
    /// Commit message.
    pub message:   String,
    /// Base64 encoded file contents.
    pub content:   String,
    /// Committer identity.
    pub committer: Committer,
}

impl ContentsRequest
{
    /// Encodes `csv` and stamps the commit message with the UTC date of
    /// `now`.
    pub fn new(csv: &str, committer: Committer, now: DateTime<Utc,>,) -> Self
    {
        Self {
            message: commit_message(now,),
            content: STANDARD.encode(csv.as_bytes(),),
            committer,
        }
    }
}

/// Result of a successful publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct PublishOutcome
{
    /// Repository path of the committed report.
    pub path:       String,
    /// SHA of the created commit, when reported by the API.
    pub commit_sha: Option<String,>,
    /// Browser URL of the committed file, when reported by the API.
    pub html_url:   Option<String,>,
}

#[derive(Debug, Deserialize,)]
struct ContentsResponse
{
    #[serde(default)]
    content: Option<ContentsEntry,>,
    #[serde(default)]
    commit:  Option<CommitEntry,>,
}

#[derive(Debug, Deserialize,)]
struct ContentsEntry
{
    #[serde(default)]
    html_url: Option<String,>,
}

#[derive(Debug, Deserialize,)]
struct CommitEntry
{
    #[serde(default)]
    sha: Option<String,>,
}

/// Builds the repository path of a report generated at `now`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gitaudit::{DateWindow, report_path};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0,).unwrap();
/// let window = DateWindow::resolve("7", "", "", now,)?;
/// assert_eq!(report_path("acme", &window, now,), "reports/acme-2024-03-10T08:30:00Z-7-days.csv");
/// # Ok::<(), gitaudit::Error>(())
/// ```
pub fn report_path(org: &str, window: &DateWindow, now: DateTime<Utc,>,) -> String
{
    let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true,);
    format!("{REPORTS_DIR}/{org}-{stamp}-{}.csv", window.file_label)
}

/// Commit message embedding the UTC date of `now`.
pub fn commit_message(now: DateTime<Utc,>,) -> String
{
    format!("{} Git audit log report", now.format("%Y-%m-%d"))
}

/// Commits the report at `path` inside `repository`.
///
/// # Errors
///
/// Returns [`Error::Conflict`] when the API reports that the path changed
/// underneath the request, and [`Error::Api`] for every other failure.
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use gitaudit::{Committer, ContentsRequest, TargetRepository, build_client, publish_report};
///
/// # async fn example() -> Result<(), gitaudit::Error> {
/// let octocrab = build_client("ghp_token", None,)?;
/// let repository: TargetRepository = "acme/audit-reports".parse()?;
/// let request = ContentsRequest::new("Username\n", Committer::default(), Utc::now(),);
/// let outcome =
///     publish_report(&octocrab, &repository, "reports/acme.csv", &request,).await?;
/// println!("{:?}", outcome.html_url);
/// # Ok(())
/// # }
/// ```
pub async fn publish_report(
    octocrab: &Octocrab,
    repository: &TargetRepository,
    path: &str,
    request: &ContentsRequest,
) -> Result<PublishOutcome, Error,>
{
    let route = format!("/repos/{}/{}/contents/{path}", repository.owner, repository.name);

    info!("Pushing final CSV report to repository path: {}", path);
    debug!("PUT {} ({} encoded bytes)", route, request.content.len());

    let response: ContentsResponse =
        octocrab.put(&route, Some(request,),).await.map_err(|e| classify_failure(path, e,),)?;

    Ok(PublishOutcome {
        path:       path.to_owned(),
        commit_sha: response.commit.and_then(|commit| commit.sha,),
        html_url:   response.content.and_then(|content| content.html_url,),
    },)
}

fn classify_failure(path: &str, error: octocrab::Error,) -> Error
{
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } => classify_status(path, source.status_code.as_u16(), &source.message,),
        _ => Error::api(format!("failed to write {path}: {error}"),),
    }
}

/// Maps an API status to a conflict or a generic API error.
///
/// 409 always signals a conflict; 422 does when the API asks for the `sha`
/// of an existing file.
fn classify_status(path: &str, status: u16, message: &str,) -> Error
{
    let conflict = status == 409 || (status == 422 && message.contains("sha",));
    if conflict {
        return Error::Conflict {
            path: path.to_owned(), message: message.to_owned(),
        };
    }

    Error::api(format!("failed to write {path} ({status}): {message}"),)
}
