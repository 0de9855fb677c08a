//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Gateway configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default: `"0.0.0.0"`), `PORT` (default: `8080`)
/// - `RUST_LOG` tracing filter (default: `"info"`), `LOG_FORMAT` `pretty` or `json`
/// - `RESERVATION_SERVICE`, `PAYMENT_SERVICE`, `LOYALTY_SERVICE` backend base URLs
/// - `REQUEST_TIMEOUT_MS` (default: `5000`)
/// - `CIRCUIT_FAILURE_THRESHOLD` (default: `10`), `CIRCUIT_COOLDOWN_MS` (default: `5000`)
/// - `MAX_CONNECTIONS` (default: `64`)
/// - `LOYALTY_RETRY_DELAY_SECS` (default: `10`)
///
/// Unparseable numbers fall back to their default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub reservation_service: String,
    pub payment_service: String,
    pub loyalty_service: String,
    pub request_timeout: Duration,
    pub circuit_failure_threshold: u32,
    pub circuit_cooldown: Duration,
    pub max_connections: usize,
    pub loyalty_retry_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            reservation_service: lookup("RESERVATION_SERVICE")
                .unwrap_or(defaults.reservation_service),
            payment_service: lookup("PAYMENT_SERVICE").unwrap_or(defaults.payment_service),
            loyalty_service: lookup("LOYALTY_SERVICE").unwrap_or(defaults.loyalty_service),
            request_timeout: Duration::from_millis(number("REQUEST_TIMEOUT_MS", 5000)),
            circuit_failure_threshold: lookup("CIRCUIT_FAILURE_THRESHOLD")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.circuit_failure_threshold),
            circuit_cooldown: Duration::from_millis(number("CIRCUIT_COOLDOWN_MS", 5000)),
            max_connections: lookup("MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_connections),
            loyalty_retry_delay: Duration::from_secs(number("LOYALTY_RETRY_DELAY_SECS", 10)),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings shared by every backend client.
    pub fn client_config(&self) -> clients::ClientConfig {
        clients::ClientConfig {
            request_timeout: self.request_timeout,
            breaker: clients::CircuitBreakerConfig {
                failure_threshold: self.circuit_failure_threshold,
                cooldown: self.circuit_cooldown,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            reservation_service: "http://localhost:8070/api/reservation".to_string(),
            payment_service: "http://localhost:8060/api/payment".to_string(),
            loyalty_service: "http://localhost:8050/api/loyalty".to_string(),
            request_timeout: Duration::from_millis(5000),
            circuit_failure_threshold: 10,
            circuit_cooldown: Duration::from_millis(5000),
            max_connections: 64,
            loyalty_retry_delay: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.circuit_failure_threshold, 10);
        assert_eq!(config.loyalty_retry_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 64);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "9000"),
            ("LOG_FORMAT", "JSON"),
            ("PAYMENT_SERVICE", "http://payment:8060/api/payment"),
            ("REQUEST_TIMEOUT_MS", "250"),
            ("CIRCUIT_FAILURE_THRESHOLD", "3"),
            ("LOYALTY_RETRY_DELAY_SECS", "1"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.payment_service, "http://payment:8060/api/payment");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.client_config().breaker.failure_threshold, 3);
        assert_eq!(config.loyalty_retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = from_pairs(&[
            ("PORT", "eighty"),
            ("CIRCUIT_COOLDOWN_MS", "-5"),
            ("MAX_CONNECTIONS", ""),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.circuit_cooldown, Duration::from_secs(5));
        assert_eq!(config.max_connections, 64);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
