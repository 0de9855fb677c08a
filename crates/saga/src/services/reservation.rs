//! Reservation service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Hotel, Reservation, ReservationStatus, Username};
use uuid::Uuid;

use crate::error::ServiceError;

/// Operations offered by the reservation backend, which also owns the hotel catalog.
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Returns the whole hotel catalog.
    async fn hotels(&self) -> Result<Vec<Hotel>, ServiceError>;

    /// Resolves a public hotel identifier to the internal numeric id.
    async fn hotel_id(&self, hotel_uid: Uuid) -> Result<i64, ServiceError>;

    /// Looks up a hotel by its internal id.
    async fn hotel(&self, hotel_id: i64) -> Result<Hotel, ServiceError>;

    /// Lists the reservations made by a user.
    async fn reservations(&self, username: &Username) -> Result<Vec<Reservation>, ServiceError>;

    /// Looks up a reservation by its identifier.
    async fn reservation(&self, reservation_uid: Uuid) -> Result<Reservation, ServiceError>;

    /// Stores a new reservation on behalf of its owner.
    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), ServiceError>;

    /// Marks a reservation as CANCELED.
    async fn cancel_reservation(&self, reservation_uid: Uuid) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryReservationState {
    hotels: Vec<Hotel>,
    reservations: HashMap<Uuid, Reservation>,
    fail_on_create: bool,
    fail_on_cancel: bool,
    unavailable: bool,
}

/// In-memory reservation service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationService {
    state: Arc<RwLock<InMemoryReservationState>>,
}

impl InMemoryReservationService {
    /// Creates a new in-memory reservation service with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hotel to the catalog.
    pub fn with_hotel(self, hotel: Hotel) -> Self {
        self.state.write().unwrap().hotels.push(hotel);
        self
    }

    /// Stores a reservation directly, bypassing the trait.
    pub fn insert(&self, reservation: Reservation) {
        self.state
            .write()
            .unwrap()
            .reservations
            .insert(reservation.reservation_uid, reservation);
    }

    /// Configures the service to fail on create calls.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the service to fail on cancel calls.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().unwrap().fail_on_cancel = fail;
    }

    /// Makes every call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the number of stored reservations, canceled ones included.
    pub fn reservation_count(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }

    /// Returns a stored reservation without going through the trait.
    pub fn get(&self, reservation_uid: Uuid) -> Option<Reservation> {
        self.state
            .read()
            .unwrap()
            .reservations
            .get(&reservation_uid)
            .cloned()
    }
}

fn injected() -> ServiceError {
    ServiceError::Unavailable("injected reservation failure".to_string())
}

fn not_found(what: String) -> ServiceError {
    ServiceError::Client {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl ReservationService for InMemoryReservationService {
    async fn hotels(&self) -> Result<Vec<Hotel>, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        Ok(state.hotels.clone())
    }

    async fn hotel_id(&self, hotel_uid: Uuid) -> Result<i64, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        state
            .hotels
            .iter()
            .find(|hotel| hotel.hotel_uid == hotel_uid)
            .map(|hotel| hotel.id)
            .ok_or_else(|| not_found(format!("hotel {hotel_uid}")))
    }

    async fn hotel(&self, hotel_id: i64) -> Result<Hotel, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        state
            .hotels
            .iter()
            .find(|hotel| hotel.id == hotel_id)
            .cloned()
            .ok_or_else(|| not_found(format!("hotel #{hotel_id}")))
    }

    async fn reservations(&self, username: &Username) -> Result<Vec<Reservation>, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        let mut owned: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|reservation| &reservation.username == username)
            .cloned()
            .collect();
        owned.sort_by_key(|reservation| (reservation.start_date, reservation.reservation_uid));
        Ok(owned)
    }

    async fn reservation(&self, reservation_uid: Uuid) -> Result<Reservation, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        state
            .reservations
            .get(&reservation_uid)
            .cloned()
            .ok_or_else(|| not_found(format!("reservation {reservation_uid}")))
    }

    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.unavailable || state.fail_on_create {
            return Err(injected());
        }
        state
            .reservations
            .insert(reservation.reservation_uid, reservation.clone());
        Ok(())
    }

    async fn cancel_reservation(&self, reservation_uid: Uuid) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.unavailable || state.fail_on_cancel {
            return Err(injected());
        }
        let reservation = state
            .reservations
            .get_mut(&reservation_uid)
            .ok_or_else(|| not_found(format!("reservation {reservation_uid}")))?;
        reservation.status = ReservationStatus::Canceled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hotel() -> Hotel {
        Hotel {
            id: 1,
            hotel_uid: Uuid::new_v4(),
            name: "Ararat Park Hyatt Moscow".to_string(),
            country: "Россия".to_string(),
            city: "Москва".to_string(),
            address: "Неглинная ул., 4".to_string(),
            stars: 5,
            price: 10000,
        }
    }

    fn reservation(username: &str) -> Reservation {
        Reservation {
            reservation_uid: Uuid::new_v4(),
            username: Username::from(username),
            payment_uid: Uuid::new_v4(),
            hotel_id: 1,
            status: ReservationStatus::Paid,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_hotel_resolution() {
        let hotel = hotel();
        let service = InMemoryReservationService::new().with_hotel(hotel.clone());

        let id = service.hotel_id(hotel.hotel_uid).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(service.hotel(id).await.unwrap(), hotel);
        assert!(service.hotel_id(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reservations_are_filtered_by_owner() {
        let service = InMemoryReservationService::new();
        service.create_reservation(&reservation("alice")).await.unwrap();
        service.create_reservation(&reservation("bob")).await.unwrap();

        let owned = service.reservations(&Username::from("alice")).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_cancel_keeps_the_record() {
        let service = InMemoryReservationService::new();
        let created = reservation("alice");
        service.create_reservation(&created).await.unwrap();

        service
            .cancel_reservation(created.reservation_uid)
            .await
            .unwrap();

        let stored = service.reservation(created.reservation_uid).await.unwrap();
        assert_eq!(stored.status, ReservationStatus::Canceled);
        assert_eq!(service.reservation_count(), 1);
    }
}
