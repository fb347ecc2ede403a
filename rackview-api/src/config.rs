//! API Configuration Module
//!
//! CORS, static asset locations, probe timeouts, and the bind address.
//! Configuration is loaded from environment variables with defaults suited to
//! local development next to the frontend dev server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Origins of the frontend dev servers.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Where the built frontend lives relative to the server's working directory.
pub const DEFAULT_STATIC_PATH: &str = "../../frontend/dist";

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, static assets, and device probes.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Root of the built frontend. `/static/*` is served from `<static_path>/static`.
    pub static_path: PathBuf,

    /// File served for every unmatched non-API path.
    pub index_path: PathBuf,

    /// Timeout for the HTTP health-check request.
    pub http_probe_timeout: Duration,

    /// Timeout for each TCP connect attempt of the reachability probe.
    pub tcp_probe_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let static_path = PathBuf::from(DEFAULT_STATIC_PATH);
        Self {
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            cors_max_age_secs: 86400,
            index_path: static_path.join("index.html"),
            static_path,
            http_probe_timeout: Duration::from_secs(5),
            tcp_probe_timeout: Duration::from_secs(2),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RACKVIEW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `RACKVIEW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `RACKVIEW_STATIC_PATH`: Frontend build directory (default: ../../frontend/dist)
    /// - `RACKVIEW_INDEX_PATH`: SPA entry point (default: `<static>/index.html`)
    /// - `RACKVIEW_HTTP_PROBE_TIMEOUT_MS`: HTTP probe timeout (default: 5000)
    /// - `RACKVIEW_TCP_PROBE_TIMEOUT_MS`: Per-port TCP probe timeout (default: 2000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cors_origins = lookup("RACKVIEW_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let static_path = lookup("RACKVIEW_STATIC_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_path);
        let index_path = lookup("RACKVIEW_INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| static_path.join("index.html"));

        Self {
            cors_origins,
            cors_max_age_secs: parse_or(
                &lookup,
                "RACKVIEW_CORS_MAX_AGE_SECS",
                defaults.cors_max_age_secs,
            ),
            static_path,
            index_path,
            http_probe_timeout: Duration::from_millis(parse_or(
                &lookup,
                "RACKVIEW_HTTP_PROBE_TIMEOUT_MS",
                5000,
            )),
            tcp_probe_timeout: Duration::from_millis(parse_or(
                &lookup,
                "RACKVIEW_TCP_PROBE_TIMEOUT_MS",
                2000,
            )),
        }
    }

    /// Directory backing the `/static` route.
    pub fn static_assets_dir(&self) -> PathBuf {
        self.static_path.join("static")
    }
}

// ============================================================================
// BIND ADDRESS
// ============================================================================

/// Resolve the listen address from `RACKVIEW_API_BIND` and `PORT` /
/// `RACKVIEW_API_PORT` (default `0.0.0.0:8080`).
pub fn resolve_bind_addr(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<SocketAddr> {
    let host = lookup("RACKVIEW_API_BIND").unwrap_or_else(|| "0.0.0.0".to_string());
    let port_str = lookup("PORT")
        .or_else(|| lookup("RACKVIEW_API_PORT"))
        .unwrap_or_else(|| "8080".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let ip = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind host {}: {}", host, e)))?;
    Ok(SocketAddr::new(ip, port))
}
