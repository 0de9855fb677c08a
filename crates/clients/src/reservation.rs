//! HTTP client for the reservation backend, which also serves the hotel catalog.

use async_trait::async_trait;
use common::{Hotel, Reservation, USER_HEADER, Username};
use reqwest::{Method, StatusCode};
use saga::{ReservationService, ServiceError};
use serde::Deserialize;
use uuid::Uuid;

use crate::resilience::ResilientClient;

#[derive(Debug, Deserialize)]
struct HotelIdBody {
    id: i64,
}

#[derive(Debug, Clone)]
pub struct HttpReservationClient {
    client: ResilientClient,
}

impl HttpReservationClient {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &ResilientClient {
        &self.client
    }
}

#[async_trait]
impl ReservationService for HttpReservationClient {
    async fn hotels(&self) -> Result<Vec<Hotel>, ServiceError> {
        let request = self.client.request(Method::GET, "/hotels");
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }

    async fn hotel_id(&self, hotel_uid: Uuid) -> Result<i64, ServiceError> {
        let request = self
            .client
            .request(Method::GET, &format!("/hotels/{hotel_uid}"));
        let body: HotelIdBody = self.client.execute(request).await?.expect(StatusCode::OK)?.json()?;
        Ok(body.id)
    }

    async fn hotel(&self, hotel_id: i64) -> Result<Hotel, ServiceError> {
        let request = self
            .client
            .request(Method::GET, &format!("/hotels/hotel/{hotel_id}"));
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }

    async fn reservations(&self, username: &Username) -> Result<Vec<Reservation>, ServiceError> {
        let request = self
            .client
            .request(Method::GET, "/reservations")
            .header(USER_HEADER, username.as_str());
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }

    async fn reservation(&self, reservation_uid: Uuid) -> Result<Reservation, ServiceError> {
        let request = self
            .client
            .request(Method::GET, &format!("/reservations/{reservation_uid}"));
        self.client.execute(request).await?.expect(StatusCode::OK)?.json()
    }

    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), ServiceError> {
        let request = self
            .client
            .request(Method::POST, "/reservations")
            .header(USER_HEADER, reservation.username.as_str())
            .json(reservation);
        self.client
            .execute(request)
            .await?
            .expect(StatusCode::CREATED)
            .map(drop)
    }

    async fn cancel_reservation(&self, reservation_uid: Uuid) -> Result<(), ServiceError> {
        let request = self
            .client
            .request(Method::PATCH, &format!("/reservations/{reservation_uid}"));
        self.client
            .execute(request)
            .await?
            .expect(StatusCode::ACCEPTED)
            .map(drop)
    }
}
