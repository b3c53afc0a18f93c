// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timing and status records for the tests discovered in a session.
//!
//! Records are keyed by [`TestId`] and kept in discovery order. A record is never removed: a test
//! whose identifier comes back after another test ran continues its existing record.

use crate::test_id::TestId;
use indexmap::IndexMap;
use std::{
    fmt,
    time::{Duration, Instant},
};
use tracing::{debug, trace};

/// The aggregate status of a test.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestStatus {
    /// No fatal failure has been observed.
    #[default]
    Pass,

    /// A fatal failure was observed. This is terminal.
    Fail,
}

impl TestStatus {
    /// Returns true if the test passed.
    pub fn is_success(self) -> bool {
        self == Self::Pass
    }

    /// Returns the label shown in the report.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Timing and status for one test.
#[derive(Clone, Debug)]
pub struct TestRecord {
    id: TestId,
    order: usize,
    started_at: Instant,
    last_seen_at: Option<Instant>,
    elapsed: Option<Duration>,
    status: TestStatus,
}

impl TestRecord {
    fn new(id: TestId, order: usize, started_at: Instant) -> Self {
        Self {
            id,
            order,
            started_at,
            last_seen_at: None,
            elapsed: None,
            status: TestStatus::Pass,
        }
    }

    /// Returns the test identifier.
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Returns the position in which this test was first discovered.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the time of the first event for this test.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time of the latest completion-type event for this test, if any.
    pub fn last_seen_at(&self) -> Option<Instant> {
        self.last_seen_at
    }

    /// Returns the elapsed time, if the test has been closed.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Returns the current status.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Records a completion-type event (success, failure, or unreachable).
    pub fn touch(&mut self, at: Instant) {
        self.last_seen_at = Some(at);
    }

    /// Marks the test as failed. Once failed, a test stays failed.
    pub fn mark_failed(&mut self) {
        self.status = TestStatus::Fail;
    }

    /// Closes the test, computing its elapsed time, and returns it.
    ///
    /// The elapsed time runs from the first event to the last completion event, or to `now` if no
    /// completion event was ever seen. It is computed once: later calls return the same value.
    pub fn close(&mut self, now: Instant) -> Duration {
        *self.elapsed.get_or_insert_with(|| {
            let closed_at = self.last_seen_at.unwrap_or(now);
            closed_at.saturating_duration_since(self.started_at)
        })
    }
}

/// The result of entering a task's test scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryCrossing {
    /// The task belongs to the test that is already open.
    Unchanged,

    /// The open test changed.
    Crossed {
        /// The test that was closed, along with its elapsed time and status.
        closed: Option<ClosedTest>,

        /// The newly opened test, or `None` if the task is outside any test.
        opened: Option<TestId>,

        /// True if `opened` was seen for the first time.
        discovered: bool,
    },
}

/// A test that was just closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosedTest {
    /// The test identifier.
    pub id: TestId,

    /// The elapsed time of the test.
    pub elapsed: Duration,

    /// The status of the test at close.
    pub status: TestStatus,
}

/// Pass/fail counts across the ledger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// The number of passing tests.
    pub passed: usize,

    /// The number of failing tests.
    pub failed: usize,
}

impl TestCounts {
    /// Returns the total number of tests.
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// All test records for a session, plus the currently open test.
#[derive(Clone, Debug, Default)]
pub struct TestLedger {
    records: IndexMap<TestId, TestRecord>,
    current: Option<TestId>,
}

impl TestLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently open test.
    pub fn current(&self) -> Option<&TestId> {
        self.current.as_ref()
    }

    /// Returns the record for `id`.
    pub fn get(&self, id: &str) -> Option<&TestRecord> {
        self.records.get(id)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no tests were discovered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in discovery order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestRecord> {
        self.records.values()
    }

    /// Returns pass/fail counts.
    pub fn counts(&self) -> TestCounts {
        self.iter()
            .fold(TestCounts::default(), |mut counts, record| {
                match record.status() {
                    TestStatus::Pass => counts.passed += 1,
                    TestStatus::Fail => counts.failed += 1,
                }
                counts
            })
    }

    /// Enters the scope of `id` on a task start.
    ///
    /// If `id` differs from the open test, the open test is closed first. A new record is created
    /// only the first time an identifier is seen; re-entering a known identifier continues its
    /// record.
    pub fn enter(&mut self, id: Option<TestId>, now: Instant) -> BoundaryCrossing {
        if id == self.current {
            return BoundaryCrossing::Unchanged;
        }

        let closed = self.close_current(now);

        let mut discovered = false;
        if let Some(id) = &id {
            if !self.records.contains_key(id) {
                let order = self.records.len();
                debug!(test_id = %id, order, "discovered test");
                self.records
                    .insert(id.clone(), TestRecord::new(id.clone(), order, now));
                discovered = true;
            }
        }

        debug!(
            from = ?closed.as_ref().map(|c| c.id.as_str()),
            to = ?id.as_ref().map(TestId::as_str),
            "test boundary crossed"
        );
        self.current = id.clone();
        BoundaryCrossing::Crossed {
            closed,
            opened: id,
            discovered,
        }
    }

    /// Closes the open test, if any, and leaves no test open.
    pub fn close_current(&mut self, now: Instant) -> Option<ClosedTest> {
        let id = self.current.take()?;
        let record = self.records.get_mut(&id)?;
        let elapsed = record.close(now);
        Some(ClosedTest {
            id,
            elapsed,
            status: record.status(),
        })
    }

    /// Records a completion-type event for `id`.
    pub fn touch(&mut self, id: &TestId, at: Instant) {
        if let Some(record) = self.records.get_mut(id) {
            trace!(test_id = %id, "completion event");
            record.touch(at);
        }
    }

    /// Marks `id` as failed.
    pub fn mark_failed(&mut self, id: &TestId) {
        if let Some(record) = self.records.get_mut(id) {
            if record.status().is_success() {
                debug!(test_id = %id, "test failed");
            }
            record.mark_failed();
        }
    }
}
