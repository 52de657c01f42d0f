//! reqwest implementation of [`UpstreamClient`]

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, USER_AGENT};
use crate::release::error::ResolveError;
use crate::release::query::OutboundRequest;
use crate::release::upstream::UpstreamClient;

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct HttpUpstreamClient {
    client: Client,
}

impl HttpUpstreamClient {
    pub fn new() -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn send(&self, request: &OutboundRequest) -> Result<serde_json::Value, ResolveError> {
        let builder = match request {
            OutboundRequest::GraphQl {
                endpoint,
                bearer_token,
                body,
            } => self.client.post(endpoint).bearer_auth(bearer_token).json(body),
            OutboundRequest::Rest { url } => self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json"),
        };

        debug!("Sending upstream request: {:?}", request);
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upstream returned status {}: {}", status, request.url());
            return Err(ResolveError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json().await.map_err(|e| {
            warn!("Failed to decode upstream response from {}: {}", request.url(), e);
            ResolveError::InvalidResponse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::query::QueryBuilder;
    use crate::release::types::Upstream;
    use mockito::{Matcher, Server};
    use reqwest::Url;

    fn builder(server: &Server) -> QueryBuilder {
        QueryBuilder::new(
            &format!("{}/graphql", server.url()),
            "test-token",
            Url::parse(&server.url()).unwrap(),
        )
    }

    #[tokio::test]
    async fn send_posts_graphql_query_with_bearer_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "variables": { "owner": "rust-lang", "name": "rust" },
                "operationName": "LatestRelease"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"repository": null}}"#)
            .create_async()
            .await;

        let request = builder(&server)
            .build(&"rust-lang/rust".into(), Upstream::SourceCode)
            .unwrap();
        let client = HttpUpstreamClient::new().unwrap();
        let body = client.send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, serde_json::json!({"data": {"repository": null}}));
    }

    #[tokio::test]
    async fn send_gets_package_detail_without_authorization() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/packages/helm/vmware-tanzu/velero")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"version": "5.2.0"}"#)
            .create_async()
            .await;

        let request = builder(&server)
            .build(&"vmware-tanzu/velero".into(), Upstream::PackageIndex)
            .unwrap();
        let client = HttpUpstreamClient::new().unwrap();
        let body = client.send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["version"], "5.2.0");
    }

    #[tokio::test]
    async fn send_returns_status_error_for_non_success() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/packages/helm/stable/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "not found"}"#)
            .create_async()
            .await;

        let request = builder(&server)
            .build(&"stable/missing".into(), Upstream::PackageIndex)
            .unwrap();
        let client = HttpUpstreamClient::new().unwrap();
        let result = client.send(&request).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ResolveError::Status { status: 404, ref body }) if body.contains("not found")
        ));
    }

    #[tokio::test]
    async fn send_returns_invalid_response_for_non_json_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let request = builder(&server)
            .build(&"owner/repo".into(), Upstream::SourceCode)
            .unwrap();
        let client = HttpUpstreamClient::new().unwrap();
        let result = client.send(&request).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ResolveError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn send_returns_transport_error_when_upstream_is_unreachable() {
        let request = OutboundRequest::Rest {
            url: "http://127.0.0.1:1/api/v1/packages/helm/a/b".to_string(),
        };
        let client = HttpUpstreamClient::new().unwrap();

        let result = client.send(&request).await;

        assert!(matches!(result, Err(ResolveError::Transport(_))));
    }
}
