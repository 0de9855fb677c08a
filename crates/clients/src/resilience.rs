//! Shared connection pool and the breaker-guarded client built on it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use saga::ServiceError;
use tokio::sync::Semaphore;

use crate::breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::response::UpstreamResponse;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;

/// One `reqwest::Client` plus a cap on concurrent outbound exchanges.
///
/// Cloning shares both the client and the cap.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    client: reqwest::Client,
    slots: Arc<Semaphore>,
}

impl ConnectionPool {
    pub fn new(max_connections: usize) -> Result<Self, reqwest::Error> {
        let max_connections = max_connections.max(1);
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(max_connections)
            .build()?;
        Ok(Self {
            client,
            slots: Arc::new(Semaphore::new(max_connections)),
        })
    }

    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

/// Settings for one [`ResilientClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Covers waiting for a slot, sending, and reading the whole body.
    pub request_timeout: Duration,
    pub breaker: CircuitBreakerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// HTTP client for one backend, with a hard timeout and its own circuit breaker.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    name: &'static str,
    base_url: String,
    pool: ConnectionPool,
    breaker: Arc<CircuitBreaker>,
    request_timeout: Duration,
}

impl ResilientClient {
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        pool: ConnectionPool,
        config: ClientConfig,
    ) -> Self {
        Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pool,
            breaker: Arc::new(CircuitBreaker::new(name, config.breaker)),
            request_timeout: config.request_timeout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Joins `path` onto the base URL; an empty path is the base itself.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.pool.client.request(method, self.url(path))
    }

    /// Sends a request through the breaker and buffers the response.
    ///
    /// Transport errors, timeouts and 5xx answers count against the breaker;
    /// 4xx answers do not. A rejected or failed exchange is reported as
    /// [`ServiceError::Unavailable`]; HTTP statuses are left for the caller
    /// to classify.
    pub async fn execute(&self, request: RequestBuilder) -> Result<UpstreamResponse, ServiceError> {
        let Some(permit) = self.breaker.try_acquire() else {
            metrics::counter!("upstream_requests_total", "service" => self.name, "outcome" => "rejected")
                .increment(1);
            tracing::debug!(service = self.name, "circuit open, failing fast");
            return Err(ServiceError::Unavailable(format!(
                "circuit open for {} service",
                self.name
            )));
        };

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(self.request_timeout, self.exchange(request)).await;
        metrics::histogram!("upstream_request_duration_seconds", "service" => self.name)
            .record(started.elapsed().as_secs_f64());

        let (outcome, result) = match result {
            Err(_) => {
                permit.failure();
                let reason = format!(
                    "{} service timed out after {}ms",
                    self.name,
                    self.request_timeout.as_millis()
                );
                ("timeout", Err(ServiceError::Unavailable(reason)))
            }
            Ok(Err(e)) => {
                permit.failure();
                ("transport_error", Err(e))
            }
            Ok(Ok(response)) if response.status.is_server_error() => {
                permit.failure();
                ("server_error", Ok(response))
            }
            Ok(Ok(response)) => {
                permit.success();
                ("ok", Ok(response))
            }
        };
        metrics::counter!("upstream_requests_total", "service" => self.name, "outcome" => outcome)
            .increment(1);
        if let Err(e) = &result {
            tracing::warn!(service = self.name, error = %e, "upstream call failed");
        }
        result
    }

    async fn exchange(&self, request: RequestBuilder) -> Result<UpstreamResponse, ServiceError> {
        let _slot = self
            .pool
            .slots
            .acquire()
            .await
            .map_err(|_| ServiceError::Unavailable("connection pool closed".to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("{} service: {e}", self.name)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("{} service: {e}", self.name)))?;
        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitState;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, threshold: u32, timeout: Duration) -> ResilientClient {
        ResilientClient::new(
            "test",
            base_url,
            ConnectionPool::new(4).unwrap(),
            ClientConfig {
                request_timeout: timeout,
                breaker: CircuitBreakerConfig {
                    failure_threshold: threshold,
                    cooldown: Duration::from_secs(60),
                },
            },
        )
    }

    #[tokio::test]
    async fn test_client_errors_keep_the_circuit_closed() {
        let app = Router::new().route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let c = client(spawn_server(app).await, 2, Duration::from_secs(5));

        for _ in 0..5 {
            let response = c.execute(c.request(Method::GET, "/missing")).await.unwrap();
            assert_eq!(response.status, StatusCode::NOT_FOUND);
        }
        assert_eq!(c.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_server_errors_open_the_circuit() {
        let app = Router::new().route("/boom", get(|| async { StatusCode::BAD_GATEWAY }));
        let c = client(spawn_server(app).await, 2, Duration::from_secs(5));

        for _ in 0..2 {
            c.execute(c.request(Method::GET, "/boom")).await.unwrap();
        }
        assert_eq!(c.breaker().state(), CircuitState::Open);

        let err = c.execute(c.request(Method::GET, "/boom")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let c = client(spawn_server(app).await, 1, Duration::from_millis(50));

        let err = c.execute(c.request(Method::GET, "/slow")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(c.breaker().state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let c = client(format!("http://{addr}"), 10, Duration::from_secs(5));

        let err = c.execute(c.request(Method::GET, "/")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[test]
    fn test_url_joining() {
        let c = client("http://payment:8050/api/v1/payment/".to_string(), 1, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(c.url(""), "http://payment:8050/api/v1/payment");
        assert_eq!(c.url("/abc"), "http://payment:8050/api/v1/payment/abc");
    }
}
