// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Per-actor aggregation of git audit events.
///
/// Reduces filtered audit events into counters keyed by actor and flattens
/// them into fixed-schema report rows.
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    audit::{AuditEvent, GitAction},
    report::ReportRow,
    window::DateWindow,
};

/// Occurrence counts of each action kind for a single actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize,)]
pub struct ActionCounts
{
    /// `git.clone` occurrences.
    pub clone: u64,
    /// `git.push` occurrences.
    pub push:  u64,
    /// `git.fetch` occurrences.
    pub fetch: u64,
    /// Occurrences of any other action. Never reported.
    pub other: u64,
}

impl ActionCounts
{
    /// Increments the counter matching `action`.
    pub fn record(&mut self, action: Option<GitAction,>,)
    {
        let counter = match action {
            Some(GitAction::Clone,) => &mut self.clone,
            Some(GitAction::Push,) => &mut self.push,
            Some(GitAction::Fetch,) => &mut self.fetch,
            None => &mut self.other,
        };
        *counter += 1;
    }

    /// Sum of every counter, including unreported actions.
    pub fn total(&self,) -> u64
    {
        self.clone + self.push + self.fetch + self.other
    }
}

/// Counters keyed by actor, iterated in first-seen order.
#[derive(Debug, Clone, Default,)]
pub struct ActorCounters
{
    index:   HashMap<String, usize,>,
    entries: Vec<(String, ActionCounts,),>,
}

impl ActorCounters
{
    /// Records one occurrence of `action` performed by `actor`.
    pub fn record(&mut self, actor: &str, action: Option<GitAction,>,)
    {
        let slot = match self.index.get(actor,) {
            Some(&slot,) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(actor.to_owned(), slot,);
                self.entries.push((actor.to_owned(), ActionCounts::default(),),);
                slot
            }
        };
        self.entries[slot].1.record(action,);
    }

    /// Returns the counters recorded for `actor`.
    pub fn get(&self, actor: &str,) -> Option<&ActionCounts,>
    {
        self.index.get(actor,).map(|&slot| &self.entries[slot].1,)
    }

    /// Number of distinct actors.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when no event has been recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Iterates actors and their counters in first-seen order.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, &ActionCounts,),>
    {
        self.entries.iter().map(|(actor, counts,)| (actor.as_str(), counts,),)
    }

    /// Flattens the counters into one report row per actor.
    ///
    /// Counters for actions outside the report schema are dropped.
    pub fn into_rows(self,) -> Vec<ReportRow,>
    {
        self.entries
            .into_iter()
            .map(|(member_name, counts,)| {
                info!(
                    "{} ## Clones: {}, Pushes: {}, Fetches: {}",
                    member_name, counts.clone, counts.push, counts.fetch
                );
                if counts.other > 0 {
                    debug!("{} has {} unreported audit events", member_name, counts.other);
                }
                ReportRow {
                    member_name,
                    git_clone: counts.clone,
                    git_push: counts.push,
                    git_fetch: counts.fetch,
                }
            },)
            .collect()
    }
}

/// Reduces `events` into per-actor counters.
///
/// Events without an actor cannot be attributed to a row and are skipped.
///
/// # Examples
///
/// ```
/// use gitaudit::{AuditEvent, aggregate};
///
/// let events = vec![
///     AuditEvent::new(100, "alice", "git.clone",),
///     AuditEvent::new(100, "alice", "git.push",),
///     AuditEvent::new(200, "bob", "git.clone",),
/// ];
/// let counters = aggregate(&events,);
/// assert_eq!(counters.len(), 2);
/// assert_eq!(counters.get("alice").map(|c| c.push), Some(1));
/// ```
pub fn aggregate<'a, I,>(events: I,) -> ActorCounters
where
    I: IntoIterator<Item = &'a AuditEvent,>,
{
    let mut counters = ActorCounters::default();
    let mut skipped = 0usize;

    for event in events {
        match event.actor.as_deref() {
            Some(actor,) => counters.record(actor, event.git_action(),),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} audit events without an actor", skipped);
    }
    debug!("Aggregated events for {} actors", counters.len());

    counters
}

/// Filters `events` to `window` and flattens the per-actor counters into
/// report rows in first-seen order.
pub fn summarize(events: Vec<AuditEvent,>, window: &DateWindow,) -> Vec<ReportRow,>
{
    let fetched = events.len();
    let in_window = window.filter_events(events,);
    info!(
        "Retrieved git audit log for {}: {} of {} events in window",
        window.display_label,
        in_window.len(),
        fetched
    );

    aggregate(&in_window,).into_rows()
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn snapshot(counters: &ActorCounters,) -> HashMap<String, ActionCounts,>
    {
        counters.iter().map(|(actor, counts,)| (actor.to_owned(), *counts,),).collect()
    }

    #[test]
    fn rows_cover_every_actor_with_default_counters()
    {
        let events = vec![
            AuditEvent::new(100, "alice", "git.clone",),
            AuditEvent::new(100, "alice", "git.push",),
            AuditEvent::new(200, "bob", "git.clone",),
        ];

        let rows = aggregate(&events,).into_rows();
        assert_eq!(rows, vec![
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
    }

    #[test]
    fn unreported_actions_do_not_leak_into_rows()
    {
        let events = vec![
            AuditEvent::new(1, "carol", "git.fetch",),
            AuditEvent::new(2, "carol", "git.lfs.download",),
            AuditEvent::new(3, "dave", "repo.create",),
        ];

        let counters = aggregate(&events,);
        let carol = counters.get("carol",).expect("carol should be counted",);
        assert_eq!(carol.fetch, 1);
        assert_eq!(carol.other, 1);
        assert_eq!(carol.total(), 2);

        let rows = counters.into_rows();
        assert_eq!(rows.len(), 2);
        let dave = rows.iter().find(|row| row.member_name == "dave",).expect("dave row",);
        assert_eq!((dave.git_clone, dave.git_push, dave.git_fetch), (0, 0, 0));
    }

    #[test]
    fn events_without_actor_are_skipped()
    {
        let mut anonymous = AuditEvent::new(1, "ignored", "git.clone",);
        anonymous.actor = None;
        let events = vec![anonymous, AuditEvent::new(2, "erin", "git.clone",)];

        let counters = aggregate(&events,);
        assert_eq!(counters.len(), 1);
        assert!(counters.get("ignored").is_none());
    }

    #[test]
    fn empty_input_yields_no_rows()
    {
        let counters = aggregate(&Vec::<AuditEvent,>::new(),);
        assert!(counters.is_empty());
        assert!(counters.into_rows().is_empty());
    }

    fn arb_event() -> impl Strategy<Value = AuditEvent,>
    {
        (
            0i64..10_000,
            prop::sample::select(vec!["alice", "bob", "carol", "dave"],),
            prop::sample::select(vec!["git.clone", "git.push", "git.fetch", "git.other"],),
        )
            .prop_map(|(timestamp, actor, action,)| AuditEvent::new(timestamp, actor, action,),)
    }

    proptest! {
        #[test]
        fn aggregation_is_order_independent(
            (events, shuffled) in prop::collection::vec(arb_event(), 0..100)
                .prop_flat_map(|events| {
                    let shuffled = Just(events.clone()).prop_shuffle();
                    (Just(events), shuffled)
                })
        ) {
            let forward = snapshot(&aggregate(&events,),);
            let permuted = snapshot(&aggregate(&shuffled,),);
            prop_assert_eq!(forward, permuted);
        }

        #[test]
        fn every_event_increments_exactly_one_counter(
            events in prop::collection::vec(arb_event(), 0..100)
        ) {
            let counters = aggregate(&events,);
            let total: u64 = counters.iter().map(|(_, counts,)| counts.total(),).sum();
            prop_assert_eq!(total, events.len() as u64);
        }
    }
}
