//! Upstream client trait for sending outbound requests

#[cfg(test)]
use mockall::automock;

use crate::release::error::ResolveError;
use crate::release::query::OutboundRequest;

/// Trait for sending a built request to an upstream API
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Sends the request and returns the decoded JSON body
    ///
    /// # Returns
    /// * `Ok(Value)` - Body of a successful response
    /// * `Err(ResolveError)` - Transport failure, non-success status or undecodable body
    async fn send(&self, request: &OutboundRequest) -> Result<serde_json::Value, ResolveError>;
}
