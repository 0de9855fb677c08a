//! HTTP client for the loyalty backend.

use async_trait::async_trait;
use common::{Loyalty, USER_HEADER, Username};
use reqwest::{Method, StatusCode};
use saga::{LoyaltyService, ServiceError};

use crate::resilience::ResilientClient;

#[derive(Debug, Clone)]
pub struct HttpLoyaltyClient {
    client: ResilientClient,
}

impl HttpLoyaltyClient {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &ResilientClient {
        &self.client
    }

    async fn update(&self, path: &str, username: &Username) -> Result<(), ServiceError> {
        let request = self
            .client
            .request(Method::PATCH, path)
            .header(USER_HEADER, username.as_str());
        self.client
            .execute(request)
            .await?
            .expect(StatusCode::OK)
            .map(drop)
    }
}

#[async_trait]
impl LoyaltyService for HttpLoyaltyClient {
    async fn loyalty(&self, username: &Username) -> Result<Loyalty, ServiceError> {
        let request = self
            .client
            .request(Method::GET, "/me")
            .header(USER_HEADER, username.as_str());
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }

    async fn increment(&self, username: &Username) -> Result<(), ServiceError> {
        self.update("/increment", username).await
    }

    async fn decrement(&self, username: &Username) -> Result<(), ServiceError> {
        self.update("/decrement", username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{ClientConfig, ConnectionPool};
    use axum::http::HeaderMap;
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use common::LoyaltyTier;
    use serde_json::json;

    async fn spawn_server(app: Router) -> HttpLoyaltyClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        HttpLoyaltyClient::new(ResilientClient::new(
            "loyalty",
            format!("http://{addr}/api/v1/loyalty"),
            ConnectionPool::new(4).unwrap(),
            ClientConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_lookup_recomputes_tier_from_count() {
        let app = Router::new().route(
            "/api/v1/loyalty/me",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers.get(USER_HEADER).unwrap(), "alice");
                // A stale tier in the body is ignored.
                Json(json!({
                    "username": "alice",
                    "reservation_count": 21,
                    "status": "BRONZE",
                    "discount": 5
                }))
            }),
        );
        let client = spawn_server(app).await;

        let loyalty = client.loyalty(&Username::from("alice")).await.unwrap();
        assert_eq!(loyalty.reservation_count(), 21);
        assert_eq!(loyalty.tier(), LoyaltyTier::Gold);
        assert_eq!(loyalty.discount(), 10);
    }

    #[tokio::test]
    async fn test_counter_updates() {
        let app = Router::new()
            .route("/api/v1/loyalty/increment", patch(|| async { StatusCode::OK }))
            .route(
                "/api/v1/loyalty/decrement",
                patch(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );
        let client = spawn_server(app).await;
        let alice = Username::from("alice");

        client.increment(&alice).await.unwrap();
        let err = client.decrement(&alice).await.unwrap_err();
        assert!(matches!(err, ServiceError::Server { status: 503, .. }));
    }
}
