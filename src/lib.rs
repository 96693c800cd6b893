// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Git audit log reporting for GitHub organizations.
//!
//! The library exposes each stage of a linear pipeline: resolve the reporting
//! window, fetch git audit events, filter them to the window, aggregate
//! per-member clone/push/fetch counts, build a sorted CSV report, and commit
//! it into a repository. Stages are pure except for the fetch and publish
//! calls, which talk to the GitHub REST API through [`octocrab`].

mod aggregate;
#[cfg(test)]
mod api_stub;
mod audit;
mod config;
mod error;
mod github;
mod publish;
mod report;
mod window;

pub use aggregate::{ActionCounts, ActorCounters, aggregate, summarize};
pub use audit::{AuditEvent, GitAction, fetch_git_events};
pub use config::{DEFAULT_DAYS, RawInputs, ReportConfig, resolve_org};
pub use error::Error;
pub use github::build_client;
pub use publish::{
    Committer, ContentsRequest, PublishOutcome, TargetRepository, commit_message, publish_report,
    report_path,
};
pub use report::{Report, ReportHeader, ReportRow, SortColumn, sort_rows};
pub use window::{DateWindow, WindowMode};

#[cfg(test)]
mod tests
{
    use super::*;

    fn scenario_events() -> Vec<AuditEvent,>
    {
        vec![
            AuditEvent::new(100, "alice", "git.clone",),
            AuditEvent::new(100, "alice", "git.push",),
            AuditEvent::new(200, "bob", "git.clone",),
        ]
    }

    fn scenario_window() -> DateWindow
    {
        DateWindow {
            start_ms:      0,
            end_ms:        1000,
            display_label: "the last 7 days".to_owned(),
            file_label:    "7-days".to_owned(),
            mode:          WindowMode::Relative {
                days: 7
            },
        }
    }

    #[test]
    fn pipeline_counts_and_orders_members()
    {
        let window = scenario_window();
        let rows = summarize(scenario_events(), &window,);
        let report = Report::build(rows, SortColumn::GitClone, &window,);

        assert_eq!(report.rows(), &[
            ReportRow {
                member_name: "alice".to_owned(),
                git_clone:   1,
                git_push:    1,
                git_fetch:   0,
            },
            ReportRow {
                member_name: "bob".to_owned(),
                git_clone:   1,
                git_push:    0,
                git_fetch:   0,
            },
        ]);

        let csv = report.to_csv().expect("csv serialization",);
        assert_eq!(
            csv,
            "Username,Git clones (the last 7 days),Git pushes (the last 7 days),Git fetches (the \
             last 7 days)\nalice,1,1,0\nbob,1,0,0\n"
        );
    }

    #[test]
    fn pipeline_excludes_events_outside_window()
    {
        let mut window = scenario_window();
        window.end_ms = 150;

        let rows = summarize(scenario_events(), &window,);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].member_name, "alice");
    }

    #[test]
    fn pipeline_with_empty_window_produces_header_only_report()
    {
        let mut window = scenario_window();
        window.start_ms = 500;

        let rows = summarize(scenario_events(), &window,);
        let csv = Report::build(rows, SortColumn::GitPush, &window,)
            .to_csv()
            .expect("csv serialization",);
        assert_eq!(csv.lines().count(), 1);
    }
}
