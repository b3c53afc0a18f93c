// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session tracker.
//!
//! A [`Session`] consumes play events in order, attributes each one to a test through the
//! [resolver](crate::resolver), keeps the [ledger](crate::ledger) current, and writes report output
//! as events arrive. At the end of the stream, [`Session::finalize`] closes the open test and
//! writes the recap.
//!
//! Test boundaries are crossed only on task start events. Per-host outcomes for a task are assumed
//! to arrive after that task's start and before the next task's start.

use crate::{
    config::RecapConfig,
    errors::WriteEventError,
    events::{FinalStats, OutcomeEvent, PlayEvent, PlayEventKind, TaskDescriptor},
    ledger::{BoundaryCrossing, TestLedger, TestStatus},
    reporter::{Reporter, SuccessDisplay},
    resolver::{self, TestBoundaryResolver},
    test_id::TestId,
};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// The state of one report run.
pub struct Session<'a> {
    resolver: TestBoundaryResolver,
    cleanup_tag: String,
    ledger: TestLedger,
    reporter: Reporter<'a>,
    session_start: Instant,
    summary: Option<SessionSummary>,
}

impl<'a> Session<'a> {
    /// Creates a new session that started at `session_start`, writing output to `reporter`.
    pub fn new(config: &RecapConfig, reporter: Reporter<'a>, session_start: Instant) -> Self {
        Self::with_resolver(
            config.resolver(),
            config.cleanup_tag(),
            reporter,
            session_start,
        )
    }

    /// Creates a new session with an explicit resolver and cleanup tag.
    pub fn with_resolver(
        resolver: TestBoundaryResolver,
        cleanup_tag: impl Into<String>,
        reporter: Reporter<'a>,
        session_start: Instant,
    ) -> Self {
        Self {
            resolver,
            cleanup_tag: cleanup_tag.into(),
            ledger: TestLedger::new(),
            reporter,
            session_start,
            summary: None,
        }
    }

    /// Returns true once the session has seen its final statistics.
    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// Handles a single event, writing any output it produces.
    ///
    /// A [`PlayEventKind::Stats`] event ends the session in place, as if [`Self::finalize`] had
    /// been called. Events that arrive after that are ignored.
    pub fn handle_event(&mut self, event: &PlayEvent) -> Result<(), WriteEventError> {
        if self.is_finished() {
            warn!(event = event.kind.name(), "ignoring event after final statistics");
            return Ok(());
        }
        trace!(event = event.kind.name(), "handling event");

        let at = event.at;
        match &event.kind {
            PlayEventKind::PlayStarted { name } => self
                .reporter
                .write_with(|display, writer| display.write_play_start(name, writer)),
            PlayEventKind::TaskStarted { task } => self.task_started(task, at),
            PlayEventKind::Ok(outcome) | PlayEventKind::ItemOk(outcome) => {
                self.succeeded(outcome, at)
            }
            PlayEventKind::Failed(outcome) | PlayEventKind::ItemFailed(outcome) => {
                self.failed(outcome, at)
            }
            PlayEventKind::Unreachable(outcome) => self.unreachable(outcome, at),
            PlayEventKind::Retry(outcome) => {
                let display_name = self.resolver.display_name(&outcome.task);
                self.reporter.write_with(|display, writer| {
                    display.write_retry(display_name, outcome, writer)
                })
            }
            PlayEventKind::Skipped(_) | PlayEventKind::ItemSkipped(_) => Ok(()),
            PlayEventKind::Stats(stats) => {
                let summary = self.finish(stats, at)?;
                self.summary = Some(summary);
                Ok(())
            }
        }
    }

    /// Ends the session: closes the open test, writes the recap, and returns a summary.
    ///
    /// If the event stream already carried final statistics, the session is already finished and
    /// the summary computed then is returned without writing anything.
    pub fn finalize(
        mut self,
        stats: &FinalStats,
        at: Instant,
    ) -> Result<SessionSummary, WriteEventError> {
        match self.summary.take() {
            Some(summary) => Ok(summary),
            None => self.finish(stats, at),
        }
    }

    fn task_started(&mut self, task: &TaskDescriptor, at: Instant) -> Result<(), WriteEventError> {
        let id = self.resolver.resolve(task);
        if let BoundaryCrossing::Crossed {
            closed: Some(closed),
            ..
        } = self.ledger.enter(id, at)
        {
            self.reporter
                .write_with(|display, writer| display.write_footer(&closed, writer))?;
        }
        Ok(())
    }

    fn succeeded(&mut self, outcome: &OutcomeEvent, at: Instant) -> Result<(), WriteEventError> {
        if let Some(id) = self.resolver.resolve(&outcome.task) {
            self.ledger.touch(&id, at);
        }

        let success_display = SuccessDisplay::new(outcome, self.is_cleanup(&outcome.task));
        let display_name = self.resolver.display_name(&outcome.task);
        self.reporter.write_with(|display, writer| {
            display.write_success(display_name, outcome, success_display, writer)
        })
    }

    fn failed(&mut self, outcome: &OutcomeEvent, at: Instant) -> Result<(), WriteEventError> {
        if let Some(id) = self.resolver.resolve(&outcome.task) {
            self.ledger.touch(&id, at);
            if !outcome.ignore_errors {
                self.ledger.mark_failed(&id);
            }
        }

        let display_name = self.resolver.display_name(&outcome.task);
        self.reporter.write_with(|display, writer| {
            display.write_failure(display_name, outcome, writer)
        })
    }

    fn unreachable(&mut self, outcome: &OutcomeEvent, at: Instant) -> Result<(), WriteEventError> {
        if let Some(id) = self.resolver.resolve(&outcome.task) {
            self.ledger.touch(&id, at);
            // An unreachable host fails the test even if errors are ignored, but cleanup can't fail
            // a test.
            if !self.is_cleanup(&outcome.task) {
                self.ledger.mark_failed(&id);
            }
        }

        let display_name = self.resolver.display_name(&outcome.task);
        self.reporter.write_with(|display, writer| {
            display.write_unreachable(display_name, outcome, writer)
        })
    }

    fn finish(&mut self, stats: &FinalStats, at: Instant) -> Result<SessionSummary, WriteEventError> {
        if let Some(closed) = self.ledger.close_current(at) {
            self.reporter
                .write_with(|display, writer| display.write_footer(&closed, writer))?;
        }

        let total = at.saturating_duration_since(self.session_start);
        let ledger = &self.ledger;
        self.reporter
            .write_with(|display, writer| display.write_recap(ledger, total, stats, writer))?;

        let summary = SessionSummary::new(ledger, stats, total);
        debug!(
            passed = summary.passed,
            failed = summary.failed,
            failed_hosts = summary.failed_hosts,
            "session finished"
        );
        Ok(summary)
    }

    fn is_cleanup(&self, task: &TaskDescriptor) -> bool {
        resolver::is_cleanup(task, &self.cleanup_tag)
    }
}

/// The result of a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// The tests, in discovery order.
    pub tests: Vec<TestSummary>,

    /// The number of passing tests.
    pub passed: usize,

    /// The number of failing tests.
    pub failed: usize,

    /// The number of hosts that the engine reported as unreachable or as having failures.
    pub failed_hosts: usize,

    /// The total time taken by the session.
    pub total: Duration,
}

impl SessionSummary {
    fn new(ledger: &TestLedger, stats: &FinalStats, total: Duration) -> Self {
        let counts = ledger.counts();
        let tests = ledger
            .iter()
            .map(|record| TestSummary {
                id: record.id().clone(),
                status: record.status(),
                elapsed: record.elapsed().unwrap_or_default(),
            })
            .collect();
        let failed_hosts = stats
            .hosts
            .values()
            .filter(|host| host.unreachable || host.failures > 0)
            .count();

        Self {
            tests,
            passed: counts.passed,
            failed: counts.failed,
            failed_hosts,
            total,
        }
    }

    /// Returns true if every test passed and every host finished cleanly.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.failed_hosts == 0
    }
}

/// The final state of a single test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSummary {
    /// The test identifier.
    pub id: TestId,

    /// The final status.
    pub status: TestStatus,

    /// The elapsed time.
    pub elapsed: Duration,
}
