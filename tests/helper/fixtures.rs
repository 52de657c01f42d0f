//! Upstream response fixtures

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde_json::{Value, json};

use release_radar::release::normalizer::Normalizer;
use release_radar::release::query::QueryBuilder;

/// Query builder and normalizer pointing at the given base URL
pub fn pipeline_parts(base_url: &str) -> (QueryBuilder, Normalizer) {
    let queries = QueryBuilder::new(
        &format!("{}/graphql", base_url),
        "test-token",
        Url::parse(base_url).unwrap(),
    );
    let normalizer = Normalizer::new("https://github.com", "https://artifacthub.io");
    (queries, normalizer)
}

/// GraphQL body holding a single formal release
pub fn release_response(tag: &str, published_at: DateTime<Utc>) -> Value {
    json!({
        "data": {
            "repository": {
                "releases": {
                    "edges": [{
                        "node": {
                            "createdAt": published_at.to_rfc3339(),
                            "publishedAt": published_at.to_rfc3339(),
                            "url": format!("https://github.com/owner/repo/releases/tag/{}", tag),
                            "isDraft": false,
                            "isPrerelease": false,
                            "tagName": tag,
                            "name": tag
                        }
                    }]
                },
                "refs": { "edges": [] }
            }
        }
    })
}

/// GraphQL body holding a single lightweight tag dated by its commit
pub fn tag_response(tag: &str, authored_at: DateTime<Utc>) -> Value {
    json!({
        "data": {
            "repository": {
                "releases": { "edges": [] },
                "refs": {
                    "edges": [{
                        "node": {
                            "name": tag,
                            "target": {
                                "oid": "0123abcd",
                                "authoredDate": authored_at.to_rfc3339()
                            }
                        }
                    }]
                }
            }
        }
    })
}

/// Artifact Hub package detail body
pub fn chart_response(
    collection: &str,
    chart: &str,
    version: &str,
    created_at: DateTime<Utc>,
) -> Value {
    json!({
        "name": chart,
        "normalized_name": chart,
        "version": version,
        "app_version": "1.0.0",
        "created_at": created_at.timestamp(),
        "repository": { "name": collection }
    })
}
