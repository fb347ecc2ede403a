//! Device Health Probe
//!
//! Tries the device's HTTP health-check URL first, then falls back to TCP
//! connects against a handful of common service ports on its IP address.
//! The outcome is persisted as the device's status.

use std::time::{Duration, Instant};

use chrono::Utc;
use rackview_core::{DeviceId, DeviceStatus};
use rackview_storage::InventoryStore;
use thiserror::Error;
use tokio::net::TcpStream;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::HealthCheckResult;

/// Ports tried in order by the reachability probe.
pub const PROBE_PORTS: &[u16] = &[80, 443, 22, 8080, 8443, 3389];

/// Why a single probe attempt failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("server error: {0}")]
    ServerError(u16),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("{0}")]
    Transport(String),

    #[error("device unreachable on common ports")]
    Unreachable,
}

/// Classify an HTTP status code returned by a health-check URL.
pub fn classify_status(code: u16) -> Result<(), ProbeError> {
    match code {
        200..=299 => Ok(()),
        500.. => Err(ProbeError::ServerError(code)),
        _ => Err(ProbeError::UnexpectedStatus(code)),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// HTTP client and timeouts used to probe devices.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    tcp_timeout: Duration,
    ports: Vec<u16>,
}

impl HealthProbe {
    pub fn new(http_timeout: Duration, tcp_timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            tcp_timeout,
            ports: PROBE_PORTS.to_vec(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(config.http_probe_timeout, config.tcp_probe_timeout)
    }

    /// Replace the list of ports the reachability probe tries.
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    async fn check_http(&self, url: &str) -> Result<u64, ProbeError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        let latency = elapsed_ms(start);
        classify_status(response.status().as_u16())?;
        Ok(latency)
    }

    async fn check_tcp(&self, host: &str) -> Result<u64, ProbeError> {
        for &port in &self.ports {
            let start = Instant::now();
            let attempt = tokio::time::timeout(self.tcp_timeout, TcpStream::connect((host, port)));
            if let Ok(Ok(_stream)) = attempt.await {
                return Ok(elapsed_ms(start));
            }
        }
        Err(ProbeError::Unreachable)
    }

    /// Probe a device given its configured address and health-check URL.
    pub async fn probe(&self, ip_address: Option<&str>, url: Option<&str>) -> HealthCheckResult {
        let timestamp = Utc::now();
        let mut failures: Vec<String> = Vec::new();

        if let Some(url) = url {
            match self.check_http(url).await {
                Ok(latency) => {
                    return HealthCheckResult {
                        status: DeviceStatus::Online,
                        message: format!("HTTP check successful ({}ms)", latency),
                        latency_ms: Some(latency),
                        timestamp,
                    };
                }
                Err(e) => failures.push(format!("HTTP check failed: {}", e)),
            }
        }

        if let Some(ip) = ip_address {
            match self.check_tcp(ip).await {
                Ok(latency) => {
                    return HealthCheckResult {
                        status: DeviceStatus::Online,
                        message: format!("Ping successful ({}ms)", latency),
                        latency_ms: Some(latency),
                        timestamp,
                    };
                }
                Err(e) => failures.push(format!("Ping failed: {}", e)),
            }
        }

        if ip_address.is_none() && url.is_none() {
            return HealthCheckResult {
                status: DeviceStatus::Warning,
                message: "No health check configured (IP address or health check URL required)"
                    .to_string(),
                latency_ms: None,
                timestamp,
            };
        }

        let message = if failures.is_empty() {
            "Health check failed".to_string()
        } else {
            failures.join("; ")
        };
        HealthCheckResult {
            status: DeviceStatus::Offline,
            message,
            latency_ms: None,
            timestamp,
        }
    }
}

/// Probe a stored device and record the resulting status on it.
pub async fn check_device_health(
    store: &dyn InventoryStore,
    probe: &HealthProbe,
    id: DeviceId,
) -> ApiResult<HealthCheckResult> {
    let device = store
        .device_get(id)
        .await?
        .ok_or_else(|| ApiError::device_not_found(id))?;

    let result = probe
        .probe(device.ip_address.as_deref(), device.health_check_url.as_deref())
        .await;

    if !store.device_set_status(id, result.status).await? {
        return Err(ApiError::device_not_found(id));
    }

    tracing::info!(
        device_id = %id,
        status = %result.status,
        latency_ms = ?result.latency_ms,
        "Health check completed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use rackview_core::{DeviceSpecs, DeviceType, EntityIdType, NewDevice, NewRack};
    use rackview_storage::MockStorage;
    use tokio::net::TcpListener;

    fn probe() -> HealthProbe {
        HealthProbe::new(Duration::from_secs(2), Duration::from_millis(500)).unwrap()
    }

    /// Serve `status` on `/health` and return the base URL.
    async fn serve_status(status: StatusCode) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/health", get(move || async move { status }));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/health", addr)
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), Ok(()));
        assert_eq!(classify_status(204), Ok(()));
        assert_eq!(classify_status(503), Err(ProbeError::ServerError(503)));
        assert_eq!(classify_status(404), Err(ProbeError::UnexpectedStatus(404)));
        assert_eq!(classify_status(301), Err(ProbeError::UnexpectedStatus(301)));
        assert_eq!(
            ProbeError::ServerError(500).to_string(),
            "server error: 500"
        );
    }

    #[tokio::test]
    async fn test_nothing_configured_is_warning() {
        let result = probe().probe(None, None).await;
        assert_eq!(result.status, DeviceStatus::Warning);
        assert!(result.message.starts_with("No health check configured"));
        assert_eq!(result.latency_ms, None);
    }

    #[tokio::test]
    async fn test_http_success_is_online() {
        let url = serve_status(StatusCode::OK).await;
        let result = probe().probe(None, Some(&url)).await;
        assert_eq!(result.status, DeviceStatus::Online);
        assert!(result.message.starts_with("HTTP check successful ("));
        assert!(result.latency_ms.is_some());
    }

    #[tokio::test]
    async fn test_http_server_error_is_offline() {
        let url = serve_status(StatusCode::SERVICE_UNAVAILABLE).await;
        let result = probe().probe(None, Some(&url)).await;
        assert_eq!(result.status, DeviceStatus::Offline);
        assert_eq!(result.message, "HTTP check failed: server error: 503");
    }

    #[tokio::test]
    async fn test_http_failure_falls_back_to_tcp() {
        let url = serve_status(StatusCode::NOT_FOUND).await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = probe()
            .with_ports(vec![port])
            .probe(Some("127.0.0.1"), Some(&url))
            .await;
        assert_eq!(result.status, DeviceStatus::Online);
        assert!(result.message.starts_with("Ping successful ("));
    }

    #[tokio::test]
    async fn test_all_checks_failing_accumulates_messages() {
        let url = serve_status(StatusCode::NOT_FOUND).await;
        let port = closed_port().await;

        let result = probe()
            .with_ports(vec![port])
            .probe(Some("127.0.0.1"), Some(&url))
            .await;
        assert_eq!(result.status, DeviceStatus::Offline);
        assert_eq!(
            result.message,
            "HTTP check failed: unexpected status: 404; \
             Ping failed: device unreachable on common ports"
        );
    }

    #[tokio::test]
    async fn test_check_device_health_persists_status() {
        let store = MockStorage::new();
        let rack = store
            .rack_insert(&NewRack {
                name: "r1".to_string(),
                description: String::new(),
                size_u: 42,
            })
            .await
            .unwrap();
        let device = store
            .device_insert(&NewDevice {
                rack_id: rack.id,
                name: "pdu".to_string(),
                icon: "🔌".to_string(),
                device_type: DeviceType::Storage,
                position_u: 1,
                size_u: 1,
                status: DeviceStatus::Online,
                model: String::new(),
                ip_address: None,
                health_check_url: None,
                specs: DeviceSpecs::new(),
            })
            .await
            .unwrap();

        let result = check_device_health(&store, &probe(), device.id).await.unwrap();
        assert_eq!(result.status, DeviceStatus::Warning);

        let stored = store.device_get(device.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeviceStatus::Warning);
    }

    #[tokio::test]
    async fn test_check_missing_device_is_not_found() {
        let store = MockStorage::new();
        let err = check_device_health(&store, &probe(), DeviceId::new(9))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DeviceNotFound);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every HTTP status lands in exactly one bucket: 2xx passes, 5xx is a
        /// server error, everything else is unexpected.
        #[test]
        fn prop_status_classification_partitions_codes(code in 100u16..=599) {
            match classify_status(code) {
                Ok(()) => prop_assert!((200..300).contains(&code)),
                Err(ProbeError::ServerError(c)) => {
                    prop_assert_eq!(c, code);
                    prop_assert!(code >= 500);
                }
                Err(ProbeError::UnexpectedStatus(c)) => {
                    prop_assert_eq!(c, code);
                    prop_assert!(code < 200 || (300..500).contains(&code));
                }
                Err(other) => prop_assert!(false, "unexpected classification: {}", other),
            }
        }

        /// The failure message names the status code the device answered with.
        #[test]
        fn prop_failure_message_carries_code(code in 300u16..=599) {
            let err = classify_status(code).unwrap_err();
            prop_assert!(err.to_string().ends_with(&code.to_string()));
        }
    }
}
