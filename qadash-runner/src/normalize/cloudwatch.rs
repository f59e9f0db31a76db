// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizer for the cloud metric feed.

use crate::{errors::SourceError, summaries::ColdStartMetric};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MetricPayload {
    #[serde(rename = "Datapoints", default)]
    datapoints: Vec<Datapoint>,
}

#[derive(Debug, Deserialize)]
struct Datapoint {
    #[serde(rename = "Sum")]
    sum: f64,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

/// Parses the cloud metric payload, reporting the first datapoint if one
/// exists. An empty `Datapoints` sequence is not an error: the feed was
/// reachable, there was just nothing to report, so the result is `None`
/// (rendered as absence).
pub fn parse_cloud_metric(input: &str) -> Result<Option<ColdStartMetric>, SourceError> {
    let payload: MetricPayload = serde_json::from_str(input)
        .map_err(|err| SourceError::malformed(format!("invalid metric JSON: {err}")))?;
    Ok(payload.datapoints.into_iter().next().map(|point| {
        ColdStartMetric {
            value: point.sum,
            timestamp: point.timestamp,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_datapoint_wins() {
        let metric = parse_cloud_metric(
            r#"{"Datapoints": [
                {"Sum": 3.0, "Timestamp": "2026-08-23T10:00:00Z"},
                {"Sum": 9.0, "Timestamp": "2026-08-23T09:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            metric,
            Some(ColdStartMetric {
                value: 3.0,
                timestamp: "2026-08-23T10:00:00Z".to_owned(),
            })
        );
    }

    #[test]
    fn empty_datapoints_is_absent_not_error() {
        assert_eq!(parse_cloud_metric(r#"{"Datapoints": []}"#).unwrap(), None);
    }

    #[test]
    fn missing_datapoints_key_is_absent() {
        assert_eq!(parse_cloud_metric(r#"{"Label": "ColdStartCount"}"#).unwrap(), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_cloud_metric("{not json").unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput { .. }));
    }
}
