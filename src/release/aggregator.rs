//! Aggregation of resolved releases across all configured repositories
//!
//! Each repository runs through query → send → normalize → select → classify.
//! A failure for one repository becomes an inline error record; the batch is
//! never aborted. Requests run concurrently up to a worker limit and the
//! collected list is sorted afterwards, so ordering does not depend on timing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_MAX_CONCURRENCY};
use crate::release::error::ResolveError;
use crate::release::freshness::{classify, classify_package};
use crate::release::normalizer::Normalizer;
use crate::release::query::QueryBuilder;
use crate::release::selector::{select, sort_descending_by};
use crate::release::types::{RepositoryRef, ResolvedRelease, Upstream};
use crate::release::upstream::UpstreamClient;

pub struct Aggregator {
    client: Arc<dyn UpstreamClient>,
    queries: QueryBuilder,
    normalizer: Normalizer,
    unreliable_collections: Vec<String>,
    max_concurrency: usize,
}

impl Aggregator {
    pub fn new(
        client: Arc<dyn UpstreamClient>,
        queries: QueryBuilder,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            client,
            queries,
            normalizer,
            unreliable_collections: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Builds an aggregator with endpoints and limits taken from configuration
    pub fn from_config(client: Arc<dyn UpstreamClient>, config: &Config) -> Self {
        let queries = QueryBuilder::new(
            config.github_graphql_url.as_str(),
            &config.github_token,
            config.artifacthub_url.clone(),
        );
        let normalizer = Normalizer::new(
            config.github_web_url.as_str(),
            config.artifacthub_url.as_str(),
        );

        Self::new(client, queries, normalizer)
            .with_unreliable_collections(config.unreliable_collections.clone())
            .with_max_concurrency(config.max_concurrency)
    }

    /// Package collections whose publish timestamps are not trusted
    pub fn with_unreliable_collections(mut self, collections: Vec<String>) -> Self {
        self.unreliable_collections = collections;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Resolves every repository and returns the list sorted most recent first.
    ///
    /// Failed repositories are kept as error records at the end of the list.
    pub async fn aggregate(
        &self,
        source_refs: &[RepositoryRef],
        package_refs: &[RepositoryRef],
        now: DateTime<Utc>,
    ) -> Vec<ResolvedRelease> {
        let jobs: Vec<(&RepositoryRef, Upstream)> = source_refs
            .iter()
            .map(|repository| (repository, Upstream::SourceCode))
            .chain(
                package_refs
                    .iter()
                    .map(|repository| (repository, Upstream::PackageIndex)),
            )
            .collect();

        let pending: Vec<_> = jobs
            .into_iter()
            .map(|(repository, upstream)| self.resolve(repository, upstream, now))
            .collect();

        let mut releases: Vec<ResolvedRelease> = stream::iter(pending)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        sort_descending_by(&mut releases, |release| {
            (!release.is_error(), release.effective_published_at())
        });

        let failed = releases.iter().filter(|release| release.is_error()).count();
        info!("Resolved {} repositories ({} failed)", releases.len(), failed);

        releases
    }

    /// Resolves one repository, turning any failure into an error record
    pub async fn resolve(
        &self,
        repository: &RepositoryRef,
        upstream: Upstream,
        now: DateTime<Utc>,
    ) -> ResolvedRelease {
        match self.try_resolve(repository, upstream, now).await {
            Ok(release) => {
                debug!(
                    "Resolved {}/{} to {} ({} days)",
                    upstream.as_str(),
                    repository,
                    release.tag_name,
                    release.days
                );
                release
            }
            Err(e) => {
                warn!("Failed to resolve {}/{}: {}", upstream.as_str(), repository, e);
                ResolvedRelease::failed(repository, e.to_string())
            }
        }
    }

    async fn try_resolve(
        &self,
        repository: &RepositoryRef,
        upstream: Upstream,
        now: DateTime<Utc>,
    ) -> Result<ResolvedRelease, ResolveError> {
        let request = self.queries.build(repository, upstream)?;
        let body = self.client.send(&request).await?;
        let candidates = self.normalizer.normalize(body, repository, upstream)?;

        let not_found = || ResolveError::NotFound(repository.to_string());
        let candidate = select(candidates).ok_or_else(not_found)?;
        let published_at = candidate.published_at.ok_or_else(not_found)?;

        let freshness = match (upstream, candidate.collection.as_deref()) {
            (Upstream::PackageIndex, Some(collection)) => {
                classify_package(collection, published_at, now, &self.unreliable_collections)
            }
            _ => classify(published_at, now),
        };

        Ok(ResolvedRelease {
            repository_name: repository.to_string(),
            release_type: candidate.release_type(),
            tag_name: candidate.label,
            name: candidate.name,
            app_version: candidate.app_version,
            html_url: candidate.url,
            published_at: Some(freshness.published_at),
            days: freshness.days,
            severity: freshness.severity,
            error: None,
        })
    }
}
