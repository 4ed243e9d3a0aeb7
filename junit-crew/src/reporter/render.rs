// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a [`ReportTree`] as JUnit XML.

use super::tree::{NonSuccess, Property, ReportTree, TestCase, TestCaseStatus, TestSuite};
use crate::errors::RenderError;
use chrono::SecondsFormat;
use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event},
};
use std::{io, time::Duration};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static PROPERTIES_TAG: &str = "properties";
static PROPERTY_TAG: &str = "property";
static FAILURE_TAG: &str = "failure";
static ERROR_TAG: &str = "error";
static SKIPPED_TAG: &str = "skipped";

pub(crate) fn render_report(report: &ReportTree, writer: impl io::Write) -> Result<(), RenderError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    let ReportTree { test_suites } = report;

    if test_suites.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(TESTSUITES_TAG)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(TESTSUITES_TAG)))?;
        for test_suite in test_suites {
            serialize_test_suite(test_suite, &mut writer)?;
        }
        serialize_end_tag(TESTSUITES_TAG, &mut writer)?;
    }

    // Add a trailing newline.
    io::Write::write_all(writer.get_mut(), b"\n")?;
    Ok(())
}

fn serialize_test_suite(
    test_suite: &TestSuite,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), RenderError> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let TestSuite {
        id,
        name,
        timestamp,
        time,
        tests,
        failures,
        errors,
        skipped,
        properties,
        test_cases,
    } = test_suite;

    let mut test_suite_tag = BytesStart::new(TESTSUITE_TAG);
    test_suite_tag.push_attribute(("id", id.to_string().as_str()));
    test_suite_tag.push_attribute(("name", name.as_str()));
    test_suite_tag.push_attribute((
        "timestamp",
        timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .as_str(),
    ));
    if let Some(time) = time {
        test_suite_tag.push_attribute(("time", serialize_time(time).as_str()));
    }
    test_suite_tag.push_attribute(("tests", tests.to_string().as_str()));
    // Zero counts are omitted rather than rendered as "0".
    for (attr, count) in [("failures", failures), ("errors", errors), ("skipped", skipped)] {
        if *count > 0 {
            test_suite_tag.push_attribute((attr, count.to_string().as_str()));
        }
    }

    if properties.is_empty() && test_cases.is_empty() {
        writer.write_event(Event::Empty(test_suite_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(test_suite_tag))?;

    if !properties.is_empty() {
        writer.write_event(Event::Start(BytesStart::new(PROPERTIES_TAG)))?;
        for property in properties {
            serialize_property(property, writer)?;
        }
        serialize_end_tag(PROPERTIES_TAG, writer)?;
    }

    for test_case in test_cases {
        serialize_test_case(test_case, writer)?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)
}

fn serialize_property(
    property: &Property,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), RenderError> {
    let mut property_tag = BytesStart::new(PROPERTY_TAG);
    property_tag.push_attribute(("name", property.name.as_str()));
    property_tag.push_attribute(("value", property.value.as_str()));

    writer.write_event(Event::Empty(property_tag))?;
    Ok(())
}

fn serialize_test_case(
    test_case: &TestCase,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), RenderError> {
    let TestCase { name, time, status } = test_case;

    let mut test_case_tag = BytesStart::new(TESTCASE_TAG);
    test_case_tag.push_attribute(("name", name.as_str()));
    if let Some(time) = time {
        test_case_tag.push_attribute(("time", serialize_time(time).as_str()));
    }

    match status {
        TestCaseStatus::Success => {
            writer.write_event(Event::Empty(test_case_tag))?;
            return Ok(());
        }
        TestCaseStatus::Failure(non_success) => {
            writer.write_event(Event::Start(test_case_tag))?;
            serialize_non_success(non_success, FAILURE_TAG, writer)?;
        }
        TestCaseStatus::Error(non_success) => {
            writer.write_event(Event::Start(test_case_tag))?;
            serialize_non_success(non_success, ERROR_TAG, writer)?;
        }
        TestCaseStatus::Skipped => {
            writer.write_event(Event::Start(test_case_tag))?;
            writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
        }
    }

    serialize_end_tag(TESTCASE_TAG, writer)
}

fn serialize_non_success(
    non_success: &NonSuccess,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), RenderError> {
    let NonSuccess {
        ty,
        message,
        detail,
    } = non_success;

    let mut tag = BytesStart::new(tag_name);
    tag.push_attribute(("type", ty.as_str()));
    tag.push_attribute(("message", message.as_str()));

    match detail {
        Some(detail) => {
            writer.write_event(Event::Start(tag))?;
            serialize_cdata(detail, writer)?;
            serialize_end_tag(tag_name, writer)
        }
        None => {
            writer.write_event(Event::Empty(tag))?;
            Ok(())
        }
    }
}

fn serialize_cdata(text: &str, writer: &mut Writer<impl io::Write>) -> Result<(), RenderError> {
    // "]]>" cannot appear inside a CDATA section, so it is split across two adjacent sections.
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        writer.write_event(Event::CData(BytesCData::new(&rest[..idx + 2])))?;
        rest = &rest[idx + 2..];
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;
    Ok(())
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), RenderError> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

// Serialize time as seconds with 3 decimal points.
fn serialize_time(time: &Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
