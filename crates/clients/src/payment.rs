//! HTTP client for the payment backend.

use async_trait::async_trait;
use common::Payment;
use reqwest::{Method, StatusCode};
use saga::{PaymentService, ServiceError};
use uuid::Uuid;

use crate::resilience::ResilientClient;

#[derive(Debug, Clone)]
pub struct HttpPaymentClient {
    client: ResilientClient,
}

impl HttpPaymentClient {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &ResilientClient {
        &self.client
    }
}

#[async_trait]
impl PaymentService for HttpPaymentClient {
    async fn create_payment(&self, payment: &Payment) -> Result<(), ServiceError> {
        let request = self.client.request(Method::POST, "").json(payment);
        self.client
            .execute(request)
            .await?
            .expect(StatusCode::CREATED)
            .map(drop)
    }

    async fn cancel_payment(&self, payment_uid: Uuid) -> Result<(), ServiceError> {
        let request = self
            .client
            .request(Method::PATCH, &format!("/{payment_uid}"));
        self.client
            .execute(request)
            .await?
            .expect(StatusCode::OK)
            .map(drop)
    }

    async fn payment(&self, payment_uid: Uuid) -> Result<Payment, ServiceError> {
        let request = self.client.request(Method::GET, &format!("/{payment_uid}"));
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{ClientConfig, ConnectionPool};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use common::PaymentStatus;
    use serde_json::json;

    async fn spawn_server(app: Router) -> HttpPaymentClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        HttpPaymentClient::new(ResilientClient::new(
            "payment",
            format!("http://{addr}/api/v1/payment"),
            ConnectionPool::new(4).unwrap(),
            ClientConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_create_posts_to_base_url() {
        let app = Router::new().route(
            "/api/v1/payment",
            post(|Json(payment): Json<Payment>| async move {
                assert_eq!(payment.price, 180);
                StatusCode::CREATED
            }),
        );
        let client = spawn_server(app).await;

        let payment = Payment {
            payment_uid: Uuid::new_v4(),
            status: PaymentStatus::Paid,
            price: 180,
        };
        client.create_payment(&payment).await.unwrap();
    }

    #[tokio::test]
    async fn test_lookup_decodes_payment() {
        let uid = Uuid::new_v4();
        let app = Router::new().route(
            "/api/v1/payment/{uid}",
            get(move || async move {
                Json(json!({ "payment_uid": uid, "status": "CANCELED", "price": 99 }))
            }),
        );
        let client = spawn_server(app).await;

        let payment = client.payment(uid).await.unwrap();
        assert_eq!(payment.payment_uid, uid);
        assert_eq!(payment.status, PaymentStatus::Canceled);
    }

    #[tokio::test]
    async fn test_server_error_is_classified() {
        let app = Router::new().route(
            "/api/v1/payment/{uid}",
            axum::routing::patch(|| async {
                (StatusCode::INTERNAL_SERVER_ERROR, "database down")
            }),
        );
        let client = spawn_server(app).await;

        let err = client.cancel_payment(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Server {
                status: 500,
                message: "database down".to_string()
            }
        );
    }
}
