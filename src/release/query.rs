//! Upstream query construction
//!
//! Builds the outbound request for one repository. Source repositories get a
//! single GraphQL call asking for both the newest release and the newest tag;
//! package repositories get a plain REST lookup.

use graphql_client::{GraphQLQuery, QueryBody};
use reqwest::Url;
use serde::Serialize;

use crate::release::error::ResolveError;
use crate::release::normalizer::LatestReleaseData;
use crate::release::types::{RepositoryRef, Upstream};

const LATEST_RELEASE_QUERY: &str = r#"
query LatestRelease($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    releases(last: 1, orderBy: {field: CREATED_AT, direction: ASC}) {
      edges {
        node {
          createdAt
          publishedAt
          url
          isDraft
          isPrerelease
          tagName
          name
        }
      }
    }
    refs(refPrefix: "refs/tags/", last: 1, orderBy: {field: TAG_COMMIT_DATE, direction: ASC}) {
      edges {
        node {
          name
          target {
            oid
            ... on Commit {
              pushedDate
              authoredDate
            }
            ... on Tag {
              tagger {
                date
              }
            }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestReleaseVariables {
    pub owner: String,
    pub name: String,
}

pub struct LatestReleaseQuery;

impl GraphQLQuery for LatestReleaseQuery {
    type Variables = LatestReleaseVariables;
    type ResponseData = LatestReleaseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: LATEST_RELEASE_QUERY,
            operation_name: "LatestRelease",
        }
    }
}

/// Request ready to be sent by an [`UpstreamClient`](crate::release::upstream::UpstreamClient)
pub enum OutboundRequest {
    /// Bearer-authenticated GraphQL POST
    GraphQl {
        endpoint: String,
        bearer_token: String,
        body: QueryBody<LatestReleaseVariables>,
    },
    /// Unauthenticated GET of a single resource
    Rest { url: String },
}

impl OutboundRequest {
    pub fn url(&self) -> &str {
        match self {
            OutboundRequest::GraphQl { endpoint, .. } => endpoint,
            OutboundRequest::Rest { url } => url,
        }
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboundRequest::GraphQl { endpoint, body, .. } => f
                .debug_struct("GraphQl")
                .field("endpoint", endpoint)
                .field("bearer_token", &"<redacted>")
                .field("variables", &body.variables)
                .finish(),
            OutboundRequest::Rest { url } => f.debug_struct("Rest").field("url", url).finish(),
        }
    }
}

/// Builds outbound requests for both upstreams
#[derive(Clone)]
pub struct QueryBuilder {
    github_graphql_url: String,
    github_token: String,
    artifacthub_url: Url,
}

impl QueryBuilder {
    pub fn new(github_graphql_url: &str, github_token: &str, artifacthub_url: Url) -> Self {
        Self {
            github_graphql_url: github_graphql_url.to_string(),
            github_token: github_token.to_string(),
            artifacthub_url,
        }
    }

    pub fn build(
        &self,
        repository: &RepositoryRef,
        upstream: Upstream,
    ) -> Result<OutboundRequest, ResolveError> {
        match upstream {
            Upstream::SourceCode => self.build_source_code(repository),
            Upstream::PackageIndex => self.build_package_index(repository),
        }
    }

    fn build_source_code(
        &self,
        repository: &RepositoryRef,
    ) -> Result<OutboundRequest, ResolveError> {
        let (owner, name) = repository
            .split_pair()
            .ok_or_else(|| ResolveError::MalformedRef(repository.to_string()))?;

        let body = LatestReleaseQuery::build_query(LatestReleaseVariables {
            owner: owner.to_string(),
            name: name.to_string(),
        });

        Ok(OutboundRequest::GraphQl {
            endpoint: self.github_graphql_url.clone(),
            bearer_token: self.github_token.clone(),
            body,
        })
    }

    fn build_package_index(
        &self,
        repository: &RepositoryRef,
    ) -> Result<OutboundRequest, ResolveError> {
        let (namespace, chart) = repository
            .split_pair()
            .ok_or_else(|| ResolveError::MalformedRef(repository.to_string()))?;

        let mut url = self.artifacthub_url.clone();
        url.path_segments_mut()
            .map_err(|_| ResolveError::MalformedRef(repository.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1", "packages", "helm", namespace, chart]);

        Ok(OutboundRequest::Rest {
            url: url.to_string(),
        })
    }
}
