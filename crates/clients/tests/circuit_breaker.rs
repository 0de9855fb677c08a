//! Circuit breaker behavior against a real loopback backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use clients::{
    CircuitBreakerConfig, CircuitState, ClientConfig, ConnectionPool, HttpPaymentClient,
    ResilientClient,
};
use saga::{PaymentService, ServiceError};
use uuid::Uuid;

struct Backend {
    hits: Arc<AtomicUsize>,
    healthy: Arc<std::sync::atomic::AtomicBool>,
    base_url: String,
}

impl Backend {
    async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let healthy = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let app = Router::new().route(
            "/api/v1/payment/{uid}",
            get({
                let hits = hits.clone();
                let healthy = healthy.clone();
                move || async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if healthy.load(Ordering::SeqCst) {
                        (
                            StatusCode::OK,
                            r#"{"payment_uid":"6f1f5e2e-61b4-4d43-8b8b-3a5d2c4b9a10","status":"PAID","price":1}"#,
                        )
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, "down")
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            hits,
            healthy,
            base_url: format!("http://{addr}/api/v1/payment"),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

fn client(backend: &Backend, cooldown: Duration) -> HttpPaymentClient {
    HttpPaymentClient::new(ResilientClient::new(
        "payment",
        backend.base_url.clone(),
        ConnectionPool::new(8).unwrap(),
        ClientConfig {
            request_timeout: Duration::from_secs(5),
            breaker: CircuitBreakerConfig {
                failure_threshold: 3,
                cooldown,
            },
        },
    ))
}

#[tokio::test]
async fn test_open_circuit_fails_fast_without_network() {
    let backend = Backend::spawn().await;
    let payment = client(&backend, Duration::from_secs(60));

    for _ in 0..3 {
        let err = payment.payment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Server { status: 500, .. }));
    }
    assert_eq!(payment.inner().breaker().state(), CircuitState::Open);
    assert_eq!(backend.hits(), 3);

    for _ in 0..10 {
        let err = payment.payment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
    assert_eq!(backend.hits(), 3);
}

#[tokio::test]
async fn test_exactly_one_probe_after_cooldown() {
    let backend = Backend::spawn().await;
    let payment = client(&backend, Duration::from_millis(200));

    for _ in 0..3 {
        let _ = payment.payment(Uuid::new_v4()).await;
    }
    assert_eq!(backend.hits(), 3);

    tokio::time::sleep(Duration::from_millis(250)).await;

    // Concurrent callers race for the probe; only one reaches the backend.
    let calls = (0..5).map(|_| {
        let payment = payment.clone();
        tokio::spawn(async move { payment.payment(Uuid::new_v4()).await })
    });
    for call in calls.collect::<Vec<_>>() {
        let _ = call.await.unwrap();
    }
    assert_eq!(backend.hits(), 4);
    assert_eq!(payment.inner().breaker().state(), CircuitState::Open);
}

#[tokio::test]
async fn test_successful_probe_closes_circuit() {
    let backend = Backend::spawn().await;
    let payment = client(&backend, Duration::from_millis(100));

    for _ in 0..3 {
        let _ = payment.payment(Uuid::new_v4()).await;
    }
    backend.set_healthy(true);
    tokio::time::sleep(Duration::from_millis(150)).await;

    payment.payment(Uuid::new_v4()).await.unwrap();
    assert_eq!(payment.inner().breaker().state(), CircuitState::Closed);

    payment.payment(Uuid::new_v4()).await.unwrap();
    assert_eq!(backend.hits(), 5);
}
