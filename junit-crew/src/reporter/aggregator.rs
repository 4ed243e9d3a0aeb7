// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds lifecycle events into a [`ReportTree`].

use super::tree::{NonSuccess, ReportTree, TestCase, TestCaseStatus, TestSuite};
use crate::{
    config::SuitePolicy,
    time::{StopwatchStart, stopwatch},
};
use tracing::warn;

/// How a test case ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CaseOutcome {
    /// The test passed.
    Pass,

    /// The test failed.
    Failure(NonSuccess),

    /// The test errored.
    Error(NonSuccess),

    /// The test was skipped.
    Skipped,
}

/// Builds a [`ReportTree`] out of an ordered sequence of lifecycle events.
///
/// At most one suite and at most one test case are open at any time. Counters are kept as running
/// totals per open suite and frozen into the suite when it finishes.
///
/// Events arriving out of order never cause a panic: see the individual methods for how each
/// situation is handled.
#[derive(Debug)]
pub struct ReportAggregator {
    tree: ReportTree,
    policy: SuitePolicy,
    implicit_suite_name: String,
    open_suite: Option<OpenSuite>,
}

#[derive(Debug)]
struct OpenSuite {
    // Index into tree.test_suites.
    index: usize,
    stopwatch: StopwatchStart,
    counts: RunningCounts,
    open_case: Option<OpenCase>,
}

#[derive(Debug)]
struct OpenCase {
    // Index into the open suite's test_cases.
    index: usize,
    stopwatch: StopwatchStart,
}

#[derive(Clone, Copy, Debug, Default)]
struct RunningCounts {
    passed: usize,
    failed: usize,
    errored: usize,
    skipped: usize,
}

impl RunningCounts {
    fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }
}

impl ReportAggregator {
    /// Creates a new, empty aggregator.
    ///
    /// Test cases that start without an open suite are placed into a suite named
    /// `implicit_suite_name`.
    pub fn new(policy: SuitePolicy, implicit_suite_name: impl Into<String>) -> Self {
        Self {
            tree: ReportTree::default(),
            policy,
            implicit_suite_name: implicit_suite_name.into(),
            open_suite: None,
        }
    }

    /// Returns the policy used when a suite starts while another one is open.
    pub fn policy(&self) -> SuitePolicy {
        self.policy
    }

    /// Returns true if a suite is currently open.
    pub fn has_open_suite(&self) -> bool {
        self.open_suite.is_some()
    }

    /// Returns true if a test case is currently open.
    pub fn has_open_case(&self) -> bool {
        self.open_suite
            .as_ref()
            .is_some_and(|suite| suite.open_case.is_some())
    }

    /// Opens a new suite.
    ///
    /// If a suite is already open, [`SuitePolicy::Coalescing`] keeps using it, while
    /// [`SuitePolicy::Strict`] opens a new one regardless. The previously open suite is then left
    /// unfinished.
    pub fn on_suite_started(&mut self, name: &str) {
        if let Some(open_suite) = &self.open_suite {
            match self.policy {
                SuitePolicy::Coalescing => return,
                SuitePolicy::Strict => {
                    let current = &self.tree.test_suites[open_suite.index];
                    warn!(
                        "suite `{name}` started while suite `{}` was still open, \
                         leaving it unfinished",
                        current.name,
                    );
                }
            }
        }

        self.open_new_suite(name);
    }

    /// Finishes the open suite, freezing its time and counts.
    ///
    /// Does nothing if no suite is open. A test case still open at this point is abandoned: it
    /// stays in the report, but without a time or outcome, and is not counted.
    pub fn on_suite_finished(&mut self) {
        let Some(open_suite) = self.open_suite.take() else {
            warn!("suite finished with no open suite, ignoring");
            return;
        };

        let suite = &mut self.tree.test_suites[open_suite.index];
        if let Some(open_case) = &open_suite.open_case {
            warn!(
                "suite `{}` finished while test case `{}` was still running, abandoning it",
                suite.name, suite.test_cases[open_case.index].name,
            );
        }

        let counts = open_suite.counts;
        suite.time = Some(open_suite.stopwatch.elapsed());
        suite.tests = counts.total();
        suite.failures = counts.failed;
        suite.errors = counts.errored;
        suite.skipped = counts.skipped;
    }

    /// Starts a test case in the open suite.
    ///
    /// If no suite is open, an implicit suite is opened first. If another test case is open, it is
    /// abandoned.
    pub fn on_case_started(&mut self, name: &str) {
        if self.open_suite.is_none() {
            warn!(
                "test case `{name}` started with no open suite, opening implicit suite `{}`",
                self.implicit_suite_name,
            );
            let implicit_suite_name = self.implicit_suite_name.clone();
            self.open_new_suite(&implicit_suite_name);
        }

        let Some(open_suite) = self.open_suite.as_mut() else {
            return;
        };
        let suite = &mut self.tree.test_suites[open_suite.index];

        if let Some(open_case) = &open_suite.open_case {
            warn!(
                "test case `{name}` started while test case `{}` was still running, abandoning it",
                suite.test_cases[open_case.index].name,
            );
        }

        suite.test_cases.push(TestCase::new(name));
        // The running count includes cases that haven't finished yet.
        suite.tests += 1;
        open_suite.open_case = Some(OpenCase {
            index: suite.test_cases.len() - 1,
            stopwatch: stopwatch(),
        });
    }

    /// Records the outcome of the open test case and closes it.
    ///
    /// Does nothing if no test case is open.
    pub fn on_case_outcome(&mut self, outcome: CaseOutcome) {
        let Some((open_suite, open_case)) = self
            .open_suite
            .as_mut()
            .and_then(|suite| suite.open_case.take().map(|case| (suite, case)))
        else {
            warn!("test case finished with no open test case, ignoring");
            return;
        };

        let test_case =
            &mut self.tree.test_suites[open_suite.index].test_cases[open_case.index];
        test_case.time = Some(open_case.stopwatch.elapsed());
        test_case.status = match outcome {
            CaseOutcome::Pass => {
                open_suite.counts.passed += 1;
                TestCaseStatus::Success
            }
            CaseOutcome::Failure(non_success) => {
                open_suite.counts.failed += 1;
                TestCaseStatus::Failure(non_success)
            }
            CaseOutcome::Error(non_success) => {
                open_suite.counts.errored += 1;
                TestCaseStatus::Error(non_success)
            }
            CaseOutcome::Skipped => {
                open_suite.counts.skipped += 1;
                TestCaseStatus::Skipped
            }
        };
    }

    /// Adds a property to the open suite.
    ///
    /// Does nothing if no suite is open.
    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let Some(open_suite) = &self.open_suite else {
            let name: String = name.into();
            warn!("property `{name}` recorded with no open suite, ignoring");
            return;
        };

        self.tree.test_suites[open_suite.index]
            .properties
            .push((name, value).into());
    }

    /// Finishes the suite left open at the end of a run, if any.
    pub fn finish_run(&mut self) {
        if let Some(open_suite) = &self.open_suite {
            warn!(
                "run finished while suite `{}` was still open, finishing it",
                self.tree.test_suites[open_suite.index].name,
            );
            self.on_suite_finished();
        }
    }

    /// Returns the report accumulated so far.
    ///
    /// This does not disturb any state, so it can be called at any point during a run.
    pub fn render(&self) -> &ReportTree {
        &self.tree
    }

    fn open_new_suite(&mut self, name: &str) {
        let stopwatch = stopwatch();
        let index = self.tree.test_suites.len();
        self.tree
            .test_suites
            .push(TestSuite::new(index, name, stopwatch.start_time()));
        self.open_suite = Some(OpenSuite {
            index,
            stopwatch,
            counts: RunningCounts::default(),
            open_case: None,
        });
    }
}
