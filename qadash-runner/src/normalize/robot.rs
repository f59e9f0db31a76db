// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizer for acceptance-test output XML.

use crate::{
    errors::SourceError,
    summaries::{AcceptanceSummary, CaseResult, CaseStatus},
};
use quick_xml::{events::Event, Reader};

/// Parses acceptance-test output into a summary plus an ordered case list.
///
/// The document carries a `statistics/total/stat` node with `total`, `pass`
/// and `fail` attributes, and a sequence of `test` nodes each of which should
/// have a `status` child (`status` attribute, inner text as the message).
/// A test missing its status child yields [`CaseStatus::Other`] with an empty
/// message -- partial data beats dropping the case. The case sequence keeps
/// source order.
pub fn parse_acceptance(input: &str) -> Result<AcceptanceSummary, SourceError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut stats: Option<(u64, u64, u64)> = None;
    let mut cases: Vec<CaseResult> = Vec::new();

    // Nesting state. `test` elements do not nest, and only the first
    // `status` child of a test is the test's own verdict.
    let mut in_statistics = false;
    let mut in_total = false;
    let mut current_test: Option<CaseResult> = None;
    let mut in_status = false;
    let mut status_seen = false;
    let mut message = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| SourceError::malformed(format!("invalid XML: {err}")))?;
        match event {
            Event::Start(e) => match e.name().local_name().as_ref() {
                b"statistics" => in_statistics = true,
                b"total" if in_statistics => in_total = true,
                b"stat" if in_total && stats.is_none() => {
                    stats = Some(extract_stat(&e)?);
                }
                b"test" if current_test.is_none() => {
                    let name = find_attr(&e, b"name")?.unwrap_or_default();
                    current_test = Some(CaseResult {
                        name,
                        status: CaseStatus::Other,
                        message: String::new(),
                    });
                    status_seen = false;
                }
                b"status" if current_test.is_some() && !status_seen => {
                    status_seen = true;
                    if let Some(test) = current_test.as_mut() {
                        test.status = parse_verdict(find_attr(&e, b"status")?);
                    }
                    in_status = true;
                    message.clear();
                }
                _ => {}
            },
            // Self-closing elements have no matching end event, so their
            // state changes must not leave anything open.
            Event::Empty(e) => match e.name().local_name().as_ref() {
                b"stat" if in_total && stats.is_none() => {
                    stats = Some(extract_stat(&e)?);
                }
                b"test" if current_test.is_none() => {
                    let name = find_attr(&e, b"name")?.unwrap_or_default();
                    cases.push(CaseResult {
                        name,
                        status: CaseStatus::Other,
                        message: String::new(),
                    });
                }
                b"status" if current_test.is_some() && !status_seen => {
                    status_seen = true;
                    if let Some(test) = current_test.as_mut() {
                        test.status = parse_verdict(find_attr(&e, b"status")?);
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_status {
                    let text = text
                        .unescape()
                        .map_err(|err| SourceError::malformed(format!("invalid text: {err}")))?;
                    message.push_str(&text);
                }
            }
            Event::End(e) => match e.name().local_name().as_ref() {
                b"statistics" => in_statistics = false,
                b"total" => in_total = false,
                b"status" if in_status => {
                    in_status = false;
                    if let Some(test) = current_test.as_mut() {
                        test.message = std::mem::take(&mut message);
                    }
                }
                b"test" => {
                    if let Some(test) = current_test.take() {
                        cases.push(test);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let (total, pass, fail) =
        stats.ok_or_else(|| SourceError::malformed("no statistics/total/stat node found"))?;
    Ok(AcceptanceSummary {
        total,
        pass,
        fail,
        cases,
    })
}

fn parse_verdict(verdict: Option<String>) -> CaseStatus {
    match verdict.as_deref() {
        Some("PASS") => CaseStatus::Pass,
        Some("FAIL") => CaseStatus::Fail,
        _ => CaseStatus::Other,
    }
}

fn extract_stat(
    element: &quick_xml::events::BytesStart<'_>,
) -> Result<(u64, u64, u64), SourceError> {
    let total = require_count(element, b"total")?;
    let pass = require_count(element, b"pass")?;
    let fail = require_count(element, b"fail")?;
    Ok((total, pass, fail))
}

fn require_count(
    element: &quick_xml::events::BytesStart<'_>,
    name: &[u8],
) -> Result<u64, SourceError> {
    let value = find_attr(element, name)?.ok_or_else(|| {
        SourceError::malformed(format!(
            "stat node is missing the `{}` attribute",
            String::from_utf8_lossy(name)
        ))
    })?;
    value.trim().parse().map_err(|_| {
        SourceError::malformed(format!(
            "stat attribute `{}` is not a count: `{value}`",
            String::from_utf8_lossy(name)
        ))
    })
}

fn find_attr(
    element: &quick_xml::events::BytesStart<'_>,
    name: &[u8],
) -> Result<Option<String>, SourceError> {
    for attr in element.attributes() {
        let attr =
            attr.map_err(|err| SourceError::malformed(format!("invalid attribute: {err}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|err| {
                SourceError::malformed(format!("invalid attribute value: {err}"))
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    static SAMPLE: &str = indoc! {r#"
        <robot>
          <suite name="Smoke">
            <test name="Health endpoint responds">
              <status status="PASS">All good</status>
            </test>
            <test name="Item creation">
              <status status="FAIL">expected 201, got 500</status>
            </test>
            <test name="Flaky teardown"/>
            <statistics>
              <total>
                <stat total="3" pass="1" fail="1">All Tests</stat>
              </total>
            </statistics>
          </suite>
        </robot>
    "#};

    #[test]
    fn parses_statistics_and_cases_in_order() {
        let summary = parse_acceptance(SAMPLE).unwrap();
        assert_eq!((summary.total, summary.pass, summary.fail), (3, 1, 1));
        assert_eq!(
            summary.cases,
            vec![
                CaseResult {
                    name: "Health endpoint responds".to_owned(),
                    status: CaseStatus::Pass,
                    message: "All good".to_owned(),
                },
                CaseResult {
                    name: "Item creation".to_owned(),
                    status: CaseStatus::Fail,
                    message: "expected 201, got 500".to_owned(),
                },
                CaseResult {
                    name: "Flaky teardown".to_owned(),
                    status: CaseStatus::Other,
                    message: String::new(),
                },
            ]
        );
    }

    #[test]
    fn unknown_verdict_is_other() {
        let summary = parse_acceptance(indoc! {r#"
            <suite name="s">
              <test name="t"><status status="SKIP">not run</status></test>
              <statistics><total><stat total="1" pass="0" fail="0"/></total></statistics>
            </suite>
        "#})
        .unwrap();
        assert_eq!(summary.cases[0].status, CaseStatus::Other);
        assert_eq!(summary.cases[0].message, "not run");
    }

    #[test]
    fn missing_statistics_is_an_error() {
        let err = parse_acceptance("<suite name=\"s\"></suite>").unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput { .. }));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let err = parse_acceptance("<suite><test").unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput { .. }));
    }
}
