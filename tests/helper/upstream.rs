//! Upstream test utilities

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use release_radar::release::error::ResolveError;
use release_radar::release::query::OutboundRequest;
use release_radar::release::upstream::UpstreamClient;

enum CannedResponse {
    Body(Value),
    Status(u16),
}

/// Upstream returning canned bodies keyed by repository identifier
#[derive(Default)]
pub struct CannedUpstream {
    responses: HashMap<String, CannedResponse>,
}

impl CannedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, repository: &str, body: Value) -> Self {
        self.responses
            .insert(repository.to_string(), CannedResponse::Body(body));
        self
    }

    pub fn with_status(mut self, repository: &str, status: u16) -> Self {
        self.responses
            .insert(repository.to_string(), CannedResponse::Status(status));
        self
    }
}

fn repository_of(request: &OutboundRequest) -> String {
    match request {
        OutboundRequest::GraphQl { body, .. } => {
            format!("{}/{}", body.variables.owner, body.variables.name)
        }
        OutboundRequest::Rest { url } => url
            .split("/packages/helm/")
            .nth(1)
            .unwrap_or_default()
            .to_string(),
    }
}

#[async_trait]
impl UpstreamClient for CannedUpstream {
    async fn send(&self, request: &OutboundRequest) -> Result<Value, ResolveError> {
        let repository = repository_of(request);
        match self.responses.get(&repository) {
            Some(CannedResponse::Body(body)) => Ok(body.clone()),
            Some(CannedResponse::Status(status)) => Err(ResolveError::Status {
                status: *status,
                body: "canned failure".to_string(),
            }),
            None => Err(ResolveError::Status {
                status: 404,
                body: format!("no canned response for {}", repository),
            }),
        }
    }
}
