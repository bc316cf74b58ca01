//! Server configuration, loaded from a TOML file at startup.
//!
//! Every section has serde defaults so a missing or empty file yields a
//! runnable development configuration (memory repository, filesystem
//! blob store, five-minute sweep).

use std::time::Duration;

use serde::Deserialize;

use vanish_core::UploadLimits;
use vanish_lifecycle::{ExpiryStrategy, ReaperConfig};

/// Top-level configuration for the Vanish server.
#[derive(Debug, Default, Deserialize)]
pub struct VanishConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload validation limits and TTL policy.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Blob store backend configuration.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Metadata repository backend configuration.
    #[serde(default)]
    pub repository: RepositoryConfig,
    /// Background expiry reaper configuration.
    #[serde(default)]
    pub reaper: ReaperSettings,
    /// CORS configuration for the upload UI.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout in seconds. Bounds how long the server
    /// waits for the reaper to finish its current pass.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
    /// External URL for building shareable links
    /// (e.g. `https://vanish.example.com`).
    ///
    /// If not set, defaults to `http://localhost:{port}`.
    pub external_url: Option<String>,
    /// Path under the external URL that the link UI serves
    /// (default: `/open`).
    #[serde(default = "default_link_path")]
    pub link_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            external_url: None,
            link_path: default_link_path(),
        }
    }
}

/// Upload validation limits.
#[derive(Debug, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of files per upload.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single file, in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// TTL applied when the client does not request one, in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,
    /// Upper bound on the client-requested TTL, in seconds.
    #[serde(default = "default_max_ttl_seconds")]
    pub max_ttl_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_bytes: default_max_file_bytes(),
            default_ttl_seconds: default_ttl_seconds(),
            max_ttl_seconds: default_max_ttl_seconds(),
        }
    }
}

/// Configuration for the blob store backend.
#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// Which backend to use: `"fs"`, `"memory"`, or `"supabase"`.
    #[serde(default = "default_blob_backend")]
    pub backend: String,
    /// Root directory for the `fs` backend. Defaults to `data/blobs`.
    pub root: Option<String>,
    /// Project base URL for the `supabase` backend.
    pub url: Option<String>,
    /// Service-role key for the `supabase` backend.
    pub service_key: Option<String>,
    /// Storage bucket for the `supabase` backend. Defaults to `files`.
    pub bucket: Option<String>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_blob_backend(),
            root: None,
            url: None,
            service_key: None,
            bucket: None,
        }
    }
}

/// Configuration for the metadata repository backend.
#[derive(Debug, Deserialize)]
pub struct RepositoryConfig {
    /// Which backend to use. Currently only `"memory"`.
    #[serde(default = "default_repo_backend")]
    pub backend: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            backend: default_repo_backend(),
        }
    }
}

/// Background expiry reaper configuration.
#[derive(Debug, Deserialize)]
pub struct ReaperSettings {
    /// Whether the background reaper runs at all. Disable only when an
    /// external scheduler drives the administrative sweep.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Expiry strategy: `"sweep"` or `"timer"`.
    #[serde(default = "default_strategy")]
    pub strategy: ExpiryStrategy,
    /// Sweep period for the sweep strategy, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Fallback sweep period for the timer strategy, in seconds.
    #[serde(default = "default_fallback_sweep_interval")]
    pub fallback_sweep_interval_seconds: u64,
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            strategy: default_strategy(),
            sweep_interval_seconds: default_sweep_interval(),
            fallback_sweep_interval_seconds: default_fallback_sweep_interval(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Default, Deserialize)]
pub struct CorsConfig {
    /// Origin allowed to call the API (e.g. `http://localhost:3000`).
    /// When unset, any origin is allowed.
    pub allowed_origin: Option<String>,
}

impl VanishConfig {
    /// The socket address to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The external base URL used to build shareable links.
    #[must_use]
    pub fn external_url(&self) -> String {
        self.server
            .external_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.server.port))
    }

    /// The prefix a group id is appended to when building a link.
    #[must_use]
    pub fn link_base(&self) -> String {
        format!(
            "{}{}",
            self.external_url().trim_end_matches('/'),
            self.server.link_path
        )
    }

    /// Upload limits derived from the `[limits]` section.
    #[must_use]
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.limits.max_files,
            max_file_bytes: self.limits.max_file_bytes,
            default_ttl: Duration::from_secs(self.limits.default_ttl_seconds),
            max_ttl: Duration::from_secs(self.limits.max_ttl_seconds),
        }
    }

    /// Reaper configuration derived from the `[reaper]` section.
    #[must_use]
    pub fn reaper_config(&self) -> ReaperConfig {
        ReaperConfig {
            strategy: self.reaper.strategy,
            sweep_interval: Duration::from_secs(self.reaper.sweep_interval_seconds),
            fallback_sweep_interval: Duration::from_secs(
                self.reaper.fallback_sweep_interval_seconds,
            ),
        }
    }

    /// Maximum accepted request body size: every file at the limit,
    /// plus headroom for multipart framing.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        let files = self.limits.max_file_bytes.saturating_mul(self.limits.max_files as u64);
        usize::try_from(files.saturating_add(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_link_path() -> String {
    "/open".to_owned()
}

fn default_max_files() -> usize {
    10
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_ttl_seconds() -> u64 {
    3600
}

fn default_max_ttl_seconds() -> u64 {
    7 * 24 * 3600
}

fn default_blob_backend() -> String {
    "fs".to_owned()
}

fn default_repo_backend() -> String {
    "memory".to_owned()
}

fn default_enabled() -> bool {
    true
}

fn default_strategy() -> ExpiryStrategy {
    ExpiryStrategy::Sweep
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_fallback_sweep_interval() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_working_defaults() {
        let config: VanishConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.blob.backend, "fs");
        assert_eq!(config.repository.backend, "memory");
        assert!(config.reaper.enabled);
        assert_eq!(config.reaper.strategy, ExpiryStrategy::Sweep);
        assert_eq!(config.link_base(), "http://localhost:8080/open");
        assert_eq!(
            config.upload_limits().default_ttl,
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn full_config_parses() {
        let config: VanishConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            external_url = "https://share.example.com/"

            [limits]
            max_files = 5
            max_file_bytes = 1048576
            default_ttl_seconds = 600
            max_ttl_seconds = 86400

            [blob]
            backend = "supabase"
            url = "https://proj.supabase.co"
            service_key = "key"
            bucket = "uploads"

            [reaper]
            strategy = "timer"
            sweep_interval_seconds = 60
            fallback_sweep_interval_seconds = 600

            [cors]
            allowed_origin = "http://localhost:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.link_base(), "https://share.example.com/open");
        assert_eq!(config.blob.backend, "supabase");
        assert_eq!(config.blob.bucket.as_deref(), Some("uploads"));
        assert_eq!(config.reaper.strategy, ExpiryStrategy::Timer);
        assert_eq!(
            config.reaper_config().fallback_sweep_interval,
            Duration::from_secs(600)
        );
        assert_eq!(
            config.cors.allowed_origin.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.upload_limits().max_files, 5);
    }

    #[test]
    fn max_body_bytes_covers_a_full_batch() {
        let config: VanishConfig = toml::from_str(
            r#"
            [limits]
            max_files = 2
            max_file_bytes = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.max_body_bytes(), 2000 + 1024 * 1024);
    }
}
