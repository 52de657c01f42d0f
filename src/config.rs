use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::logging::LogFormat;
use crate::release::types::RepositoryRef;

// =============================================================================
// Constants
// =============================================================================

/// Timeout for a single upstream request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Default number of upstream requests in flight at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// User agent sent with every upstream request
pub const USER_AGENT: &str = concat!("release-radar/", env!("CARGO_PKG_VERSION"));

/// Package collections whose upstream publish timestamps are known to be stale
pub const DEFAULT_UNRELIABLE_COLLECTIONS: &str = "stable,loki,nginx";

/// Command line and environment arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "release-radar")]
#[command(version, about = "Serves the latest releases of GitHub repositories and Helm charts")]
pub struct Args {
    /// Comma-separated GitHub repositories (owner/name)
    #[arg(long, env = "REPOSITORIES", default_value = "")]
    pub repositories: String,

    /// Comma-separated Artifact Hub Helm charts (namespace/chart)
    #[arg(long, env = "HELM_REPOS", default_value = "")]
    pub helm_repos: String,

    /// Token for the GitHub GraphQL API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Host name or address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// GitHub GraphQL endpoint
    #[arg(long, env = "GITHUB_GRAPHQL_URL", default_value = "https://api.github.com/graphql")]
    pub github_graphql_url: String,

    /// Base URL for links to GitHub tags
    #[arg(long, env = "GITHUB_WEB_URL", default_value = "https://github.com")]
    pub github_web_url: String,

    /// Artifact Hub base URL
    #[arg(long, env = "ARTIFACTHUB_URL", default_value = "https://artifacthub.io")]
    pub artifacthub_url: String,

    /// Maximum number of upstream requests in flight
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Comma-separated package collection prefixes reported with unknown freshness
    #[arg(long, env = "UNRELIABLE_COLLECTIONS", default_value = DEFAULT_UNRELIABLE_COLLECTIONS)]
    pub unreliable_collections: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Directory to additionally write release-radar.log into
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN is required when repositories are configured")]
    MissingToken,

    #[error("Invalid URL for {name}: {message}")]
    InvalidUrl { name: &'static str, message: String },

    #[error("Listen host must not be empty")]
    EmptyHost,

    #[error("Max concurrency must be at least 1")]
    InvalidConcurrency,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
}

/// Validated service configuration, built once at startup
#[derive(Clone)]
pub struct Config {
    pub source_repositories: Vec<RepositoryRef>,
    pub package_repositories: Vec<RepositoryRef>,
    pub github_token: String,
    pub host: String,
    pub port: u16,
    pub github_graphql_url: Url,
    pub github_web_url: Url,
    pub artifacthub_url: Url,
    pub max_concurrency: usize,
    pub unreliable_collections: Vec<String>,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let source_repositories = parse_ref_list(&args.repositories);
        let package_repositories = parse_ref_list(&args.helm_repos);

        let github_token = args
            .github_token
            .map(|token| token.trim().to_string())
            .unwrap_or_default();
        if !source_repositories.is_empty() && github_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        if args.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        let host = args.host.trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        Ok(Self {
            source_repositories,
            package_repositories,
            github_token,
            host,
            port: args.port,
            github_graphql_url: parse_url("github-graphql-url", &args.github_graphql_url)?,
            github_web_url: parse_url("github-web-url", &args.github_web_url)?,
            artifacthub_url: parse_url("artifacthub-url", &args.artifacthub_url)?,
            max_concurrency: args.max_concurrency,
            unreliable_collections: parse_list(&args.unreliable_collections),
            logging: LoggingConfig {
                level: args.log_level,
                format: args.log_format,
                dir: args.log_dir,
            },
        })
    }
}

/// Splits a comma-separated list after stripping all whitespace and newlines.
///
/// Empty entries are dropped, so an unset list yields no items.
pub fn parse_list(raw: &str) -> Vec<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_ref_list(raw: &str) -> Vec<RepositoryRef> {
    parse_list(raw).into_iter().map(RepositoryRef::new).collect()
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        name,
        message: e.to_string(),
    })
}
