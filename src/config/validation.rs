//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Flag suspicious upstream settings without rejecting them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Upstream URL/token are never rejected; writes with a bad upstream fail
//!   per request with a 500, so problems there are reported as warnings

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{RelayConfig, UpstreamConfig};
use crate::http::server::HEALTH_PATH;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.ingest_path: '{0}' must start with '/'")]
    RelativeIngestPath(String),

    #[error("listener.ingest_path: '{0}' collides with the health endpoint")]
    ReservedIngestPath(String),

    #[error("listener.ingest_path: '{0}' must be a literal path (no '{{', '}}', '*' or ':' segments)")]
    PatternIngestPath(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let path = &config.listener.ingest_path;
    if !path.starts_with('/') {
        errors.push(ValidationError::RelativeIngestPath(path.clone()));
    } else if path == HEALTH_PATH {
        errors.push(ValidationError::ReservedIngestPath(path.clone()));
    } else if !is_literal_path(path) {
        errors.push(ValidationError::PatternIngestPath(path.clone()));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if config.timeouts.upstream_connect_secs == Some(0) {
        errors.push(ValidationError::Zero("timeouts.upstream_connect_secs"));
    }
    if config.timeouts.upstream_request_secs == Some(0) {
        errors.push(ValidationError::Zero("timeouts.upstream_request_secs"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The router treats braces, wildcards and `:` segments as captures.
fn is_literal_path(path: &str) -> bool {
    !path.contains(['{', '}', '*']) && !path.split('/').any(|segment| segment.starts_with(':'))
}

/// Describe upstream settings that will likely make every write fail.
pub fn upstream_warnings(upstream: &UpstreamConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if upstream.url.is_empty() {
        warnings.push("upstream.url is not set; writes will fail".to_string());
    } else {
        match url::Url::parse(&upstream.url) {
            Ok(url) if url.scheme() != "https" => {
                warnings.push(format!("upstream.url uses '{}', token will be sent unencrypted", url.scheme()));
            }
            Ok(_) => {}
            Err(e) => warnings.push(format!("upstream.url is not a valid URL: {}", e)),
        }
    }

    if upstream.token.is_empty() {
        warnings.push("upstream.token is not set; writes will likely be rejected".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.ingest_path = "write".into();
        config.timeouts.upstream_request_secs = Some(0);
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::RelativeIngestPath("write".into())));
        assert!(errors.contains(&ValidationError::Zero("timeouts.upstream_request_secs")));
    }

    #[test]
    fn test_health_path_is_reserved() {
        let mut config = RelayConfig::default();
        config.listener.ingest_path = HEALTH_PATH.into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ReservedIngestPath(HEALTH_PATH.into())]
        );
    }

    #[test]
    fn test_route_patterns_rejected_in_ingest_path() {
        for path in ["/write/{", "/write/{device}", "/write/*rest", "/write/:device", "/}"] {
            let mut config = RelayConfig::default();
            config.listener.ingest_path = path.into();
            assert_eq!(
                validate_config(&config).unwrap_err(),
                vec![ValidationError::PatternIngestPath(path.into())],
                "{}",
                path
            );
        }

        let mut config = RelayConfig::default();
        config.listener.ingest_path = "/api/v1/write-data.lp".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_tls_paths_required() {
        let mut config = RelayConfig::default();
        config.listener.tls = Some(TlsConfig {
            cert_path: String::new(),
            key_path: "key.pem".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyTlsPath("cert_path")]);
        assert_eq!(errors[0].to_string(), "listener.tls.cert_path must not be empty");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_upstream_is_warned_not_rejected() {
        let config = RelayConfig::default();
        assert!(validate_config(&config).is_ok());

        let warnings = upstream_warnings(&config.upstream);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("upstream.url"));
        assert!(warnings[1].contains("upstream.token"));
    }

    #[test]
    fn test_upstream_warnings_for_plain_http() {
        let upstream = UpstreamConfig {
            url: "http://localhost:8086/api/v2/write".into(),
            token: "t".into(),
        };
        let warnings = upstream_warnings(&upstream);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'http'"));

        let upstream = UpstreamConfig {
            url: "https://influx.example/api/v2/write".into(),
            token: "t".into(),
        };
        assert!(upstream_warnings(&upstream).is_empty());
    }
}
