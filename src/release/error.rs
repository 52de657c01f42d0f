use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Malformed repository identifier: {0}")]
    MalformedRef(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not find any release for {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),
}
