use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::logger::{self, LogTag};
use crate::probe::types::HostSnapshot;

const USER_AGENT: &str = "hostwatch/0.1";

/// Failure classification for a metrics fetch.
///
/// The `Display` output is shown verbatim to the user in chat, so every
/// variant names the failure class and the target it was talking to.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Timeout { target: String, seconds: u64 },
    HttpStatus { target: String, status: u16 },
    Transport { target: String, detail: String },
    EmptyResponse { target: String },
    Parse { target: String, detail: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Timeout { target, seconds } => {
                write!(f, "Request to {} timed out after {} s", target, seconds)
            }
            FetchError::HttpStatus { target, status } => {
                write!(f, "HTTP error {} from {}", status, target)
            }
            FetchError::Transport { target, detail } => {
                write!(f, "Could not reach {}: {}", target, detail)
            }
            FetchError::EmptyResponse { target } => {
                write!(f, "Empty response from {}", target)
            }
            FetchError::Parse { target, detail } => {
                write!(f, "Invalid JSON from {}: {}", target, detail)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// HTTP client for polling a host's `/get_info` endpoint
pub struct ProbeClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl ProbeClient {
    /// Create a new ProbeClient with the configured per-request timeout
    pub fn new(timeout_seconds: u64, endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout_seconds,
        })
    }

    /// Fetch the current snapshot from `http://{ip}:{port}{endpoint}`.
    ///
    /// Never panics and never leaks a raw transport error: every failure mode
    /// maps to one [`FetchError`] variant.
    pub async fn fetch(&self, ip: &str, port: u16) -> Result<HostSnapshot, FetchError> {
        let target = format!("{}:{}", ip, port);
        let url = format!("http://{}{}", target, self.endpoint);

        logger::debug(LogTag::Probe, &format!("GET {}", url));

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.classify_request_error(&target, e)),
        };

        let status = response.status();
        if !status.is_success() {
            logger::warning(
                LogTag::Probe,
                &format!("HTTP {} from {}", status.as_u16(), target),
            );
            return Err(FetchError::HttpStatus {
                target,
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Err(self.classify_request_error(&target, e)),
        };

        let snapshot = parse_snapshot(&body, &target)?;
        logger::debug(
            LogTag::Probe,
            &format!(
                "Snapshot from {}: {} disks, {} components",
                target,
                snapshot.disks.len(),
                snapshot.components.len()
            ),
        );
        Ok(snapshot)
    }

    fn classify_request_error(&self, target: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            logger::warning(
                LogTag::Probe,
                &format!("Timeout after {} s for {}", self.timeout_seconds, target),
            );
            FetchError::Timeout {
                target: target.to_string(),
                seconds: self.timeout_seconds,
            }
        } else {
            logger::warning(LogTag::Probe, &format!("Request to {} failed: {}", target, e));
            FetchError::Transport {
                target: target.to_string(),
                detail: e.to_string(),
            }
        }
    }
}

/// Parse a response body into a snapshot, distinguishing "empty" from
/// "malformed". Split out of `fetch` so it is testable without a network.
fn parse_snapshot(body: &str, target: &str) -> Result<HostSnapshot, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyResponse {
            target: target.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        target: target.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BODY: &str = r#"{
        "system": {"name": "Linux", "kernel_version": "6.8.0", "os_version": "Ubuntu 24.04", "host_name": "web1"},
        "memory": {
            "total_ram_gb": 15.5, "total_ram_mb": 15872.0,
            "used_ram_gb": 6.2, "used_ram_mb": 6348.8, "ram_percent": 40.0,
            "total_swap_gb": 2.0, "total_swap_mb": 2048.0,
            "used_swap_gb": 0.0, "used_swap_mb": 0.0, "swap_percent": 0.0
        },
        "disks": [{"name": "sda1", "mount_point": "/", "available_space_gb": 100.0,
                   "available_space_mb": 102400.0, "total_space_gb": 200.0, "total_space_mb": 204800.0}],
        "components": [{"label": "CPU", "temperature": 48.5}]
    }"#;

    #[test]
    fn test_parse_valid_snapshot() {
        let snapshot = parse_snapshot(VALID_BODY, "10.0.0.5:8080").unwrap();
        assert_eq!(snapshot.system.name, "Linux");
        assert_eq!(snapshot.memory.ram_percent, 40.0);
        assert_eq!(snapshot.disks.len(), 1);
        assert_eq!(snapshot.components[0].label.as_deref(), Some("CPU"));
    }

    #[test]
    fn test_parse_tolerates_missing_optional_fields() {
        let body = r#"{
            "system": {"name": "", "kernel_version": "", "os_version": "", "host_name": ""},
            "memory": {
                "total_ram_gb": 0.0, "total_ram_mb": 0.0, "used_ram_gb": 0.0,
                "used_ram_mb": 0.0, "ram_percent": 0.0, "total_swap_gb": 0.0,
                "total_swap_mb": 0.0, "used_swap_gb": 0.0, "used_swap_mb": 0.0,
                "swap_percent": 0.0
            },
            "disks": [{}],
            "components": [{"label": "acpitz"}]
        }"#;
        let snapshot = parse_snapshot(body, "10.0.0.5:8080").unwrap();
        assert!(snapshot.disks[0].name.is_none());
        assert!(snapshot.components[0].temperature.is_none());
    }

    #[test]
    fn test_parse_empty_body() {
        let err = parse_snapshot("", "10.0.0.5:8080").unwrap_err();
        assert_eq!(
            err,
            FetchError::EmptyResponse {
                target: "10.0.0.5:8080".to_string()
            }
        );
        assert!(err.to_string().contains("10.0.0.5:8080"));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_snapshot("not json", "10.0.0.5:8080").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert!(err.to_string().contains("10.0.0.5:8080"));
    }

    #[test]
    fn test_parse_missing_top_level_key() {
        // A body without the memory section breaks the expected shape
        let body = r#"{"system": {"name": "x", "kernel_version": "y", "os_version": "z", "host_name": "w"}}"#;
        let err = parse_snapshot(body, "10.0.0.5:8080").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn test_timeout_message_names_value_and_target() {
        let err = FetchError::Timeout {
            target: "10.0.0.5:8080".to_string(),
            seconds: 10,
        };
        let text = err.to_string();
        assert!(text.contains("10 s"));
        assert!(text.contains("10.0.0.5:8080"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_target_returns_error_value() {
        let probe = ProbeClient::new(2, "/get_info").unwrap();
        // Port 9 on loopback is closed in any sane environment
        let err = probe.fetch("127.0.0.1", 9).await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1:9"));
    }
}
