// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizer for JUnit-style unit-test summary XML.

use crate::{
    errors::SourceError,
    summaries::{Count, SuiteSummary},
};
use quick_xml::{events::BytesStart, events::Event, Reader};

/// The summary attribute names, in model order.
static COUNT_ATTRS: [&str; 4] = ["tests", "failures", "errors", "skipped"];

/// Parses a unit-test summary out of JUnit-style XML.
///
/// Different producers hang the summary attributes at different nesting
/// levels: some put them on the root element (`<testsuites tests=...>`),
/// others only on a child `<testsuite>`. Both levels are probed, preferring
/// whichever actually carries a `tests` attribute. Attributes that are
/// missing (or not numeric) become [`Count::Unknown`] rather than failing
/// the record; malformed markup is an error.
pub fn parse_unit_test(input: &str) -> Result<SuiteSummary, SourceError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut root: Option<[Count; 4]> = None;
    let mut child_testsuite: Option<[Count; 4]> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(extract_counts(&e)?);
                } else if child_testsuite.is_none()
                    && e.name().local_name().as_ref() == b"testsuite"
                {
                    child_testsuite = Some(extract_counts(&e)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SourceError::malformed(format!("invalid XML: {err}")));
            }
            Ok(_) => {}
        }
    }

    let root = root.ok_or_else(|| SourceError::malformed("no root element"))?;

    // Prefer the level that actually reported a total.
    let counts = match (root, child_testsuite) {
        ([Count::Unknown, ..], Some(child @ [Count::Known(_), ..])) => child,
        (root, _) => root,
    };

    let [tests, failures, errors, skipped] = counts;
    Ok(SuiteSummary {
        tests,
        failures,
        errors,
        skipped,
    })
}

fn extract_counts(element: &BytesStart<'_>) -> Result<[Count; 4], SourceError> {
    let mut counts = [Count::Unknown; 4];
    for attr in element.attributes() {
        let attr = attr
            .map_err(|err| SourceError::malformed(format!("invalid attribute: {err}")))?;
        let Some(slot) = COUNT_ATTRS
            .iter()
            .position(|name| attr.key.local_name().as_ref() == name.as_bytes())
        else {
            continue;
        };
        let value = attr
            .unescape_value()
            .map_err(|err| SourceError::malformed(format!("invalid attribute value: {err}")))?;
        // A non-numeric count is treated like a missing one: partial data is
        // preferable to dropping the whole record.
        counts[slot] = value.trim().parse::<u64>().ok().into();
    }
    Ok(counts)
}
