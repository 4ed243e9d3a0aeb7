// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::render::render_report;
use crate::errors::RenderError;
use chrono::{DateTime, Utc};
use std::{io, time::Duration};

/// The root of a JUnit report, accumulated by a [`ReportAggregator`](super::ReportAggregator).
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ReportTree {
    /// The test suites in this report, in the order they started.
    pub test_suites: Vec<TestSuite>,
}

impl ReportTree {
    /// Serializes this report as XML to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), RenderError> {
        render_report(self, writer)
    }

    /// Serializes this report as an XML string.
    pub fn to_xml_string(&self) -> Result<String, RenderError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        String::from_utf8(buf).map_err(|error| RenderError::Utf8(error.utf8_error()))
    }
}

/// A single test suite, grouping together several [`TestCase`]s.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct TestSuite {
    /// The index of this suite within the report.
    pub id: usize,

    /// The name of this suite.
    pub name: String,

    /// The time at which the suite started.
    pub timestamp: DateTime<Utc>,

    /// The time taken by the suite. Set when the suite finishes.
    pub time: Option<Duration>,

    /// The number of tests in the suite.
    ///
    /// While the suite is open this counts every test case started so far. Once the suite
    /// finishes it is the number of test cases that reached an outcome.
    pub tests: usize,

    /// The number of failed tests. Set when the suite finishes.
    pub failures: usize,

    /// The number of errored tests. Set when the suite finishes.
    pub errors: usize,

    /// The number of skipped tests. Set when the suite finishes.
    pub skipped: usize,

    /// Properties recorded while the suite was running.
    pub properties: Vec<Property>,

    /// The test cases in this suite, in the order they started.
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    pub(crate) fn new(id: usize, name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp,
            time: None,
            tests: 0,
            failures: 0,
            errors: 0,
            skipped: 0,
            properties: vec![],
            test_cases: vec![],
        }
    }

    /// Returns true if the suite has finished.
    pub fn is_finished(&self) -> bool {
        self.time.is_some()
    }
}

/// A property recorded against a [`TestSuite`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new `Property`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T, U> From<(T, U)> for Property
where
    T: Into<String>,
    U: Into<String>,
{
    fn from((name, value): (T, U)) -> Self {
        Property::new(name, value)
    }
}

/// A single test case.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct TestCase {
    /// The name of the test case.
    pub name: String,

    /// The time taken by the test case. Set when its outcome is recorded.
    pub time: Option<Duration>,

    /// The result of the test case.
    pub status: TestCaseStatus,
}

impl TestCase {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
            status: TestCaseStatus::Success,
        }
    }
}

/// The result of a [`TestCase`].
///
/// Test cases that have not reached an outcome yet are represented as `Success`. This includes
/// abandoned cases: a case still running when the next case starts or its suite finishes is left
/// in the report as it was. Like a passing test, an abandoned case renders without a result
/// element. It differs from a pass only in having no `time` attribute, and it is not counted in
/// the suite's totals.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestCaseStatus {
    /// The test passed, or never finished. [`TestCase::time`] is `None` for the latter.
    Success,

    /// The test failed.
    Failure(NonSuccess),

    /// The test errored.
    Error(NonSuccess),

    /// The test was skipped.
    Skipped,
}

/// Details about a failed or errored [`TestCase`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NonSuccess {
    /// The type of the failure, for example `AssertionError`.
    pub ty: String,

    /// The failure message.
    pub message: String,

    /// A long-form description, typically a stack trace. Rendered as CDATA.
    pub detail: Option<String>,
}

impl NonSuccess {
    /// Creates a new `NonSuccess`.
    pub fn new(ty: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// Sets the long-form detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
