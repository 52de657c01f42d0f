//! Common types shared by the release-resolution pipeline

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upstream API a repository is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// GitHub GraphQL API (releases and tags)
    SourceCode,
    /// Artifact Hub package API (Helm charts)
    PackageIndex,
}

impl Upstream {
    /// Returns the string representation of the upstream
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::SourceCode => "github",
            Upstream::PackageIndex => "artifacthub",
        }
    }
}

/// Repository identifier as given by configuration
///
/// Shaped `owner/name` for source repositories and `namespace/chart` for
/// package repositories. The original string is kept untouched for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef(String);

impl RepositoryRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the identifier on the first `/` into its two parts.
    ///
    /// Returns `None` when there is no `/` or either side is empty.
    pub fn split_pair(&self) -> Option<(&str, &str)> {
        let (first, rest) = self.0.split_once('/')?;
        if first.is_empty() || rest.is_empty() {
            return None;
        }
        Some((first, rest))
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepositoryRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which upstream signal a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    FormalRelease,
    Tag,
    PackageVersion,
}

impl CandidateKind {
    /// Preference among candidates published at the same instant (higher wins)
    pub fn tie_break_rank(&self) -> u8 {
        match self {
            CandidateKind::FormalRelease => 2,
            CandidateKind::PackageVersion => 1,
            CandidateKind::Tag => 0,
        }
    }
}

/// Unresolved signal of the most recently published thing of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Tag name, or `chart: <version>` for packages
    pub label: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    pub is_draft: bool,
    pub is_prerelease: bool,
    /// Release title or normalized chart name
    pub name: Option<String>,
    /// Application version packaged by a chart
    pub app_version: Option<String>,
    /// Package collection the chart is published in
    pub collection: Option<String>,
}

impl Candidate {
    /// Human label of the release type.
    ///
    /// Draft wins over pre-release when both flags are set.
    pub fn release_type(&self) -> ReleaseType {
        match self.kind {
            CandidateKind::FormalRelease if self.is_draft => ReleaseType::Draft,
            CandidateKind::FormalRelease if self.is_prerelease => ReleaseType::PreRelease,
            CandidateKind::FormalRelease => ReleaseType::LatestRelease,
            CandidateKind::Tag => ReleaseType::Tag,
            CandidateKind::PackageVersion => ReleaseType::HelmChart,
        }
    }
}

/// Release type label shown to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReleaseType {
    #[serde(rename = "Latest release")]
    LatestRelease,
    #[serde(rename = "Pre-release")]
    PreRelease,
    Draft,
    Tag,
    #[serde(rename = "Helm chart")]
    HelmChart,
    Error,
}

/// Freshness tier of a resolved release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Published less than three days ago
    Critical,
    /// Published three to six days ago
    Warning,
    /// Published a week or more ago
    White,
    /// Upstream timestamp is known to be unreliable
    Unknown,
    /// Resolution failed
    Error,
}

/// One entry of the releases feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRelease {
    pub repository_name: String,
    #[serde(rename = "type")]
    pub release_type: ReleaseType,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    pub html_url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub days: i64,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolvedRelease {
    /// Builds the inline record standing in for a repository that failed to resolve
    pub fn failed(repository: &RepositoryRef, message: String) -> Self {
        Self {
            repository_name: repository.to_string(),
            release_type: ReleaseType::Error,
            tag_name: message.clone(),
            name: None,
            app_version: None,
            html_url: String::new(),
            published_at: None,
            days: 0,
            severity: Severity::Error,
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Timestamp used for ordering; failed records sort as the oldest possible entry
    pub fn effective_published_at(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
