// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the gitaudit binary.
//!
//! Every option doubles as the environment variable the GitHub Actions runner
//! exports for the matching workflow input, so the binary runs unchanged as
//! an action step or from a shell.

use std::{io, path::PathBuf, process};

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};
use gitaudit::{
    ContentsRequest, DateWindow, Error, RawInputs, Report, ReportConfig, ReportRow, build_client,
    fetch_git_events, publish_report, report_path, summarize,
};
use octocrab::Octocrab;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for generating git audit log reports.
#[derive(Debug, Parser,)]
#[command(name = "gitaudit", version, about = "Report organization git activity as CSV")]
struct Cli
{
    /// Personal access token with audit log read and contents write access.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Organization whose audit log is reported.
    #[arg(long, env = "INPUT_ORG")]
    org: Option<String,>,

    /// Workflow event payload used when no organization is given.
    #[arg(long = "event-path", value_name = "PATH", env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf,>,

    /// Number of trailing days covered when no date range is given.
    #[arg(long, env = "INPUT_DAYS")]
    days: Option<String,>,

    /// First day of an explicit range (YYYY-MM-DD).
    #[arg(long, env = "INPUT_FROMDATE")]
    fromdate: Option<String,>,

    /// Last day of an explicit range (YYYY-MM-DD).
    #[arg(long, env = "INPUT_TODATE")]
    todate: Option<String,>,

    /// Column to sort by: memberName, gitClone, gitPush, or gitFetch.
    #[arg(long, env = "INPUT_SORT")]
    sort: Option<String,>,

    /// Name recorded as the report committer.
    #[arg(long = "committer-name", env = "INPUT_COMMITTER-NAME")]
    committer_name: Option<String,>,

    /// Email recorded as the report committer.
    #[arg(long = "committer-email", env = "INPUT_COMMITTER-EMAIL")]
    committer_email: Option<String,>,

    /// Repository receiving the report, in owner/name form.
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    repository: Option<String,>,

    /// GitHub REST API base URL.
    #[arg(long = "api-url", value_name = "URL", env = "GITHUB_API_URL")]
    api_url: Option<String,>,

    /// Print the CSV report to stdout instead of committing it.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,
}

impl Cli
{
    fn into_inputs(self,) -> RawInputs
    {
        RawInputs {
            token:           self.token,
            org:             self.org,
            event_path:      self.event_path,
            days:            self.days,
            fromdate:        self.fromdate,
            todate:          self.todate,
            sort:            self.sort,
            committer_name:  self.committer_name,
            committer_email: self.committer_email,
            repository:      self.repository,
            api_url:         self.api_url,
            dry_run:         self.dry_run,
        }
    }
}

/// Entry point that reports errors as a workflow failure annotation.
#[tokio::main(flavor = "current_thread")]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("::error::{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),),
        )
        .with_writer(io::stderr,)
        .init();
}

/// Executes one reporting run.
///
/// # Errors
///
/// Propagates the first error raised while collecting audit data or
/// publishing the report.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let config = ReportConfig::resolve(cli.into_inputs(),)?;
    let now = Utc::now();
    let window = DateWindow::resolve(&config.days, &config.fromdate, &config.todate, now,)?;
    let octocrab = build_client(&config.token, config.api_url.as_deref(),)?;

    let rows = collect_rows(&octocrab, &config.org, &window,).await?;
    publish(&octocrab, &config, &window, rows, now,).await
}

/// Fetches the audit log and reduces it to per-member rows.
async fn collect_rows(
    octocrab: &Octocrab,
    org: &str,
    window: &DateWindow,
) -> Result<Vec<ReportRow,>, Error,>
{
    info!("Retrieving git audit log of {} for {}", org, window.display_label);
    let events = fetch_git_events(octocrab, org,).await?;
    Ok(summarize(events, window,),)
}

/// Builds the CSV report and commits it, or prints it on dry runs.
async fn publish(
    octocrab: &Octocrab,
    config: &ReportConfig,
    window: &DateWindow,
    rows: Vec<ReportRow,>,
    now: DateTime<Utc,>,
) -> Result<(), Error,>
{
    let csv = Report::build(rows, config.sort, window,).to_csv()?;
    let path = report_path(&config.org, window, now,);

    let repository = match (&config.repository, config.dry_run,) {
        (Some(repository,), false,) => repository,
        _ => {
            info!("Dry run: report would be written to {}", path);
            print!("{csv}");
            return Ok((),);
        }
    };

    let request = ContentsRequest::new(&csv, config.committer.clone(), now,);
    let outcome = publish_report(octocrab, repository, &path, &request,).await?;

    match outcome.html_url.as_deref() {
        Some(url,) => info!("Report committed to {}", url),
        None => info!("Report committed to {}/{}", repository, outcome.path),
    }

    Ok((),)
}
