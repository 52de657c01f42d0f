//! Aggregation over real HTTP against mocked upstream APIs

mod helper;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use mockito::{Matcher, Server};
use serde_json::json;

use helper::{chart_response, pipeline_parts, release_response, tag_response};
use release_radar::release::aggregator::Aggregator;
use release_radar::release::http_client::HttpUpstreamClient;
use release_radar::release::types::{RepositoryRef, Severity};

fn graphql_for(owner: &str) -> Matcher {
    Matcher::PartialJson(json!({ "variables": { "owner": owner } }))
}

#[tokio::test]
async fn aggregate_tolerates_upstream_status_error_for_one_repository() {
    let mut server = Server::new_async().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let first = server
        .mock("POST", "/graphql")
        .match_body(graphql_for("first"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            release_response("v1.0.0", now - Duration::days(2) - Duration::hours(10)).to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("POST", "/graphql")
        .match_body(graphql_for("second"))
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    let third = server
        .mock("POST", "/graphql")
        .match_body(graphql_for("third"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tag_response("v3.0.0", now - Duration::days(7)).to_string())
        .create_async()
        .await;

    let (queries, normalizer) = pipeline_parts(&server.url());
    let aggregator = Aggregator::new(
        Arc::new(HttpUpstreamClient::new().unwrap()),
        queries,
        normalizer,
    );
    let refs: Vec<RepositoryRef> = vec![
        "first/repo".into(),
        "second/repo".into(),
        "third/repo".into(),
    ];

    let releases = aggregator.aggregate(&refs, &[], now).await;

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;

    assert_eq!(releases.len(), 3);
    assert_eq!(releases[0].repository_name, "first/repo");
    assert_eq!(releases[0].days, 2);
    assert_eq!(releases[0].severity, Severity::Critical);
    assert_eq!(releases[1].repository_name, "third/repo");
    assert_eq!(releases[1].days, 7);
    assert_eq!(releases[1].severity, Severity::White);
    assert_eq!(releases[2].repository_name, "second/repo");
    assert_eq!(releases[2].severity, Severity::Error);
    assert!(releases[2].tag_name.contains("500"));
}

#[tokio::test]
async fn aggregate_resolves_charts_from_package_index() {
    let mut server = Server::new_async().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let chart = server
        .mock("GET", "/api/v1/packages/helm/vmware-tanzu/velero")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            chart_response(
                "vmware-tanzu",
                "velero",
                "5.2.0",
                now - Duration::days(6) - Duration::hours(23),
            )
            .to_string(),
        )
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/api/v1/packages/helm/stable/gone")
        .with_status(404)
        .with_body(r#"{"message": "not found"}"#)
        .create_async()
        .await;

    let (queries, normalizer) = pipeline_parts(&server.url());
    let aggregator = Aggregator::new(
        Arc::new(HttpUpstreamClient::new().unwrap()),
        queries,
        normalizer,
    );
    let refs: Vec<RepositoryRef> = vec!["stable/gone".into(), "vmware-tanzu/velero".into()];

    let releases = aggregator.aggregate(&[], &refs, now).await;

    chart.assert_async().await;
    missing.assert_async().await;

    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].repository_name, "vmware-tanzu/velero");
    assert_eq!(releases[0].tag_name, "chart: 5.2.0");
    assert_eq!(releases[0].days, 6);
    assert_eq!(releases[0].severity, Severity::Warning);
    assert_eq!(releases[1].repository_name, "stable/gone");
    assert_eq!(releases[1].severity, Severity::Error);
}
