//! Upstream response normalization
//!
//! Turns raw upstream JSON bodies into [`Candidate`] records. Parsing is
//! independent of transport so the same code runs against live responses and
//! fixtures.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::release::error::ResolveError;
use crate::release::types::{Candidate, CandidateKind, RepositoryRef, Upstream};

/// `data` payload of the latest-release GraphQL query
#[derive(Debug, Deserialize)]
pub struct LatestReleaseData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    releases: Option<Connection<ReleaseNode>>,
    refs: Option<Connection<TagNode>>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    /// Queries ask for `last: 1`, so the newest node is the final edge
    fn into_last(self) -> Option<T> {
        self.edges.into_iter().last().and_then(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseNode {
    name: Option<String>,
    tag_name: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_draft: bool,
    #[serde(default)]
    is_prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    name: String,
    target: Option<TagTarget>,
}

/// Tag target; a plain commit or an annotated tag object depending on the tag
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagTarget {
    pushed_date: Option<DateTime<Utc>>,
    authored_date: Option<DateTime<Utc>>,
    tagger: Option<Tagger>,
}

impl TagTarget {
    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.pushed_date
            .or_else(|| self.tagger.as_ref().and_then(|tagger| tagger.date))
            .or(self.authored_date)
    }
}

#[derive(Debug, Deserialize)]
struct Tagger {
    date: Option<DateTime<Utc>>,
}

/// Response from the Artifact Hub package detail API
#[derive(Debug, Deserialize)]
struct PackageDetail {
    name: Option<String>,
    normalized_name: Option<String>,
    version: Option<String>,
    app_version: Option<String>,
    /// Unix seconds
    created_at: Option<i64>,
    repository: Option<PackageRepository>,
}

#[derive(Debug, Deserialize)]
struct PackageRepository {
    name: Option<String>,
}

/// Parses upstream bodies into candidates, building item links against the
/// configured web bases
#[derive(Debug, Clone)]
pub struct Normalizer {
    github_web_url: String,
    artifacthub_url: String,
}

impl Normalizer {
    pub fn new(github_web_url: &str, artifacthub_url: &str) -> Self {
        Self {
            github_web_url: github_web_url.trim_end_matches('/').to_string(),
            artifacthub_url: artifacthub_url.trim_end_matches('/').to_string(),
        }
    }

    /// Extracts candidates from a raw body.
    ///
    /// Returns an empty list when the body is well formed but holds nothing to
    /// pick from; fails only when the body does not have the expected shape.
    pub fn normalize(
        &self,
        body: serde_json::Value,
        repository: &RepositoryRef,
        upstream: Upstream,
    ) -> Result<Vec<Candidate>, ResolveError> {
        match upstream {
            Upstream::SourceCode => self.normalize_source_code(body, repository),
            Upstream::PackageIndex => self.normalize_package_index(body, repository),
        }
    }

    fn normalize_source_code(
        &self,
        body: serde_json::Value,
        repository: &RepositoryRef,
    ) -> Result<Vec<Candidate>, ResolveError> {
        let response: graphql_client::Response<LatestReleaseData> = serde_json::from_value(body)
            .map_err(|e| {
                warn!("Failed to parse GitHub GraphQL response for {}: {}", repository, e);
                ResolveError::InvalidResponse(e.to_string())
            })?;

        let errors = response.errors.unwrap_or_default();
        let node = response.data.and_then(|data| data.repository);

        let mut candidates = Vec::new();
        if let Some(node) = node {
            if let Some(release) = node.releases.and_then(Connection::into_last) {
                candidates.push(release_candidate(release));
            }
            if let Some(tag) = node.refs.and_then(Connection::into_last) {
                candidates.push(self.tag_candidate(tag, repository));
            }
        }

        if candidates.is_empty() && !errors.is_empty() {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(ResolveError::GraphQl(messages.join("; ")));
        }
        if !errors.is_empty() {
            warn!(
                "GitHub returned partial data for {} with {} error(s)",
                repository,
                errors.len()
            );
        }

        Ok(candidates)
    }

    fn tag_candidate(&self, tag: TagNode, repository: &RepositoryRef) -> Candidate {
        let published_at = tag.target.as_ref().and_then(TagTarget::published_at);
        let url = format!(
            "{}/{}/releases/tag/{}",
            self.github_web_url, repository, tag.name
        );

        Candidate {
            kind: CandidateKind::Tag,
            label: tag.name,
            published_at,
            url,
            is_draft: false,
            is_prerelease: false,
            name: None,
            app_version: None,
            collection: None,
        }
    }

    fn normalize_package_index(
        &self,
        body: serde_json::Value,
        repository: &RepositoryRef,
    ) -> Result<Vec<Candidate>, ResolveError> {
        let detail: PackageDetail = serde_json::from_value(body).map_err(|e| {
            warn!("Failed to parse Artifact Hub response for {}: {}", repository, e);
            ResolveError::InvalidResponse(e.to_string())
        })?;

        let Some(version) = detail.version else {
            return Ok(Vec::new());
        };

        let (namespace, chart) = repository
            .split_pair()
            .unwrap_or((repository.as_str(), repository.as_str()));
        let collection = detail
            .repository
            .and_then(|r| r.name)
            .unwrap_or_else(|| namespace.to_string());
        let name = detail
            .normalized_name
            .or(detail.name)
            .unwrap_or_else(|| chart.to_string());
        let published_at = detail
            .created_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        let url = format!(
            "{}/packages/helm/{}/{}/{}",
            self.artifacthub_url, collection, name, version
        );

        Ok(vec![Candidate {
            kind: CandidateKind::PackageVersion,
            label: format!("chart: {}", version),
            published_at,
            url,
            is_draft: false,
            is_prerelease: false,
            name: Some(name),
            app_version: detail.app_version,
            collection: Some(collection),
        }])
    }
}

fn release_candidate(release: ReleaseNode) -> Candidate {
    Candidate {
        kind: CandidateKind::FormalRelease,
        label: release.tag_name.unwrap_or_default(),
        published_at: release.published_at,
        url: release.url.unwrap_or_default(),
        is_draft: release.is_draft,
        is_prerelease: release.is_prerelease,
        name: release.name,
        app_version: None,
        collection: None,
    }
}
