//! Release resolution layer
//!
//! Resolves the latest published release of each configured repository,
//! normalizes heterogeneous upstream data into one record shape, and
//! classifies it by recency.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Query    │────▶│  Upstream   │────▶│ Normalizer  │
//! │  (build)    │     │   (send)    │     │ (candidates)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        │                                       ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Aggregator  │◀────│  Freshness  │◀────│  Selector   │
//! │ (per repo)  │     │ (days/tier) │     │ (best one)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`aggregator`]: Runs the pipeline for every repository and sorts the result
//! - [`error`]: Error taxonomy for a single repository's resolution
//! - [`freshness`]: Days elapsed and severity tiers
//! - [`http_client`]: reqwest-backed [`upstream::UpstreamClient`]
//! - [`normalizer`]: Upstream JSON to candidate records
//! - [`query`]: GraphQL and REST request construction
//! - [`selector`]: Picks the best candidate
//! - [`types`]: Shared records such as [`types::Candidate`] and [`types::ResolvedRelease`]
//! - [`upstream`]: Transport trait

pub mod aggregator;
pub mod error;
pub mod freshness;
pub mod http_client;
pub mod normalizer;
pub mod query;
pub mod selector;
pub mod types;
pub mod upstream;
