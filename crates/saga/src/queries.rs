//! Read-side operations: catalog, loyalty and reservation views.

use std::collections::HashMap;

use common::{Hotel, Loyalty, Payment, Reservation, Username};
use uuid::Uuid;

use crate::coordinator::BookingCoordinator;
use crate::error::{Result, SagaError};
use crate::services::{LoyaltyService, PaymentService, ReservationService};

const STEP_HOTELS: &str = "hotel_lookup";
const STEP_RESERVATIONS: &str = "reservation_lookup";
const STEP_PAYMENT: &str = "payment_lookup";
const STEP_LOYALTY: &str = "loyalty_lookup";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    size: i64,
}

impl Pagination {
    /// Applies defaults and rejects out-of-range values.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Result<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(SagaError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(SagaError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from((self.page - 1).saturating_mul(self.size))
            .unwrap_or(usize::MAX)
            .min(items.len());
        let end = start.saturating_add(self.size as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of the hotel catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelPage {
    pub page: i64,
    /// Number of items on this page.
    pub page_size: usize,
    /// Size of the whole catalog.
    pub total_elements: usize,
    pub items: Vec<Hotel>,
}

/// A reservation joined with its hotel and payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDetails {
    pub reservation: Reservation,
    pub hotel: Hotel,
    pub payment: Payment,
}

/// The caller's profile: reservations plus loyalty, each degrading on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub reservations: Vec<ReservationDetails>,
    /// `None` when the loyalty backend could not answer.
    pub loyalty: Option<Loyalty>,
}

impl<R, P, L> BookingCoordinator<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    /// Returns one page of the hotel catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list_hotels(&self, pagination: Pagination) -> Result<HotelPage> {
        let hotels = self
            .reservation
            .hotels()
            .await
            .map_err(|e| SagaError::upstream(STEP_HOTELS, e))?;
        let items = pagination.slice(&hotels).to_vec();
        Ok(HotelPage {
            page: pagination.page(),
            page_size: items.len(),
            total_elements: hotels.len(),
            items,
        })
    }

    /// Returns the caller's loyalty account.
    #[tracing::instrument(skip(self), fields(username = %username))]
    pub async fn loyalty(&self, username: &Username) -> Result<Loyalty> {
        self.loyalty
            .loyalty(username)
            .await
            .map_err(|e| SagaError::upstream(STEP_LOYALTY, e))
    }

    /// Returns all of the caller's reservations with hotel and payment details.
    #[tracing::instrument(skip(self), fields(username = %username))]
    pub async fn reservations(&self, username: &Username) -> Result<Vec<ReservationDetails>> {
        let reservations = self
            .reservation
            .reservations(username)
            .await
            .map_err(|e| SagaError::upstream(STEP_RESERVATIONS, e))?;

        // Several reservations usually share a hotel.
        let mut hotels: HashMap<i64, Hotel> = HashMap::new();
        let mut details = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let hotel = match hotels.get(&reservation.hotel_id) {
                Some(hotel) => hotel.clone(),
                None => {
                    let hotel = self.fetch_hotel(reservation.hotel_id).await?;
                    hotels.insert(hotel.id, hotel.clone());
                    hotel
                }
            };
            let payment = self.fetch_payment(reservation.payment_uid).await?;
            details.push(ReservationDetails {
                reservation,
                hotel,
                payment,
            });
        }
        Ok(details)
    }

    /// Returns one reservation, provided the caller owns it.
    #[tracing::instrument(skip(self), fields(username = %username))]
    pub async fn reservation(
        &self,
        username: &Username,
        reservation_uid: Uuid,
    ) -> Result<ReservationDetails> {
        let reservation = self
            .reservation
            .reservation(reservation_uid)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SagaError::NotFound(format!("reservation {reservation_uid}"))
                } else {
                    SagaError::upstream(STEP_RESERVATIONS, e)
                }
            })?;
        if &reservation.username != username {
            return Err(SagaError::Forbidden(format!(
                "reservation {reservation_uid} belongs to another user"
            )));
        }

        let hotel = self.fetch_hotel(reservation.hotel_id).await?;
        let payment = self.fetch_payment(reservation.payment_uid).await?;
        Ok(ReservationDetails {
            reservation,
            hotel,
            payment,
        })
    }

    /// Returns the caller's reservations and loyalty, tolerating backend failures.
    #[tracing::instrument(skip(self), fields(username = %username))]
    pub async fn user_info(&self, username: &Username) -> UserInfo {
        let reservations = match self.reservations(username).await {
            Ok(reservations) => reservations,
            Err(e) => {
                tracing::warn!(error = %e, "reservations unavailable, returning an empty list");
                Vec::new()
            }
        };
        let loyalty = match self.loyalty(username).await {
            Ok(loyalty) => Some(loyalty),
            Err(e) => {
                tracing::warn!(error = %e, "loyalty unavailable, omitting it");
                None
            }
        };
        UserInfo {
            reservations,
            loyalty,
        }
    }

    async fn fetch_hotel(&self, hotel_id: i64) -> Result<Hotel> {
        self.reservation
            .hotel(hotel_id)
            .await
            .map_err(|e| SagaError::upstream(STEP_HOTELS, e))
    }

    async fn fetch_payment(&self, payment_uid: Uuid) -> Result<Payment> {
        self.payment
            .payment(payment_uid)
            .await
            .map_err(|e| SagaError::upstream(STEP_PAYMENT, e))
    }
}
