//! Booking creation saga.
//!
//! Steps run strictly in order, each consuming the previous one's output:
//!
//! 1. Validate the stay dates (before any backend is called)
//! 2. Resolve the hotel to its internal id and nightly price
//! 3. Fetch the caller's loyalty discount
//! 4. Create a PAID payment for the discounted price
//! 5. Create the PAID reservation referencing that payment
//! 6. Increment the caller's loyalty counter
//!
//! Compensation is partial. A failed increment cancels the payment but leaves
//! the reservation in place, and a failed reservation leaves the payment PAID.
//! Both gaps are logged with the orphaned identifier.

use common::{Hotel, Payment, PaymentStatus, Reservation, ReservationStatus, Username};
use uuid::Uuid;

use crate::coordinator::BookingCoordinator;
use crate::error::{Result, SagaError};
use crate::pricing::{StayDates, booking_price};
use crate::services::{LoyaltyService, PaymentService, ReservationService};
use crate::state::BookingState;

/// A request to book a hotel stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub hotel_uid: Uuid,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
}

/// The result of a completed booking saga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBooking {
    pub reservation: Reservation,
    pub hotel: Hotel,
    pub payment: Payment,
    /// Loyalty discount applied to the price, in percent.
    pub discount: u8,
}

impl<R, P, L> BookingCoordinator<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    /// Runs the booking creation saga for `username`.
    #[tracing::instrument(
        skip(self, request),
        fields(saga_type = "booking", username = %username, hotel_uid = %request.hotel_uid)
    )]
    pub async fn create_booking(
        &self,
        username: &Username,
        request: BookingRequest,
    ) -> Result<CreatedBooking> {
        metrics::counter!("booking_saga_started_total").increment(1);
        let saga_start = std::time::Instant::now();

        let result = self.run_booking(username, request).await;

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("booking_saga_duration_seconds").record(duration);
        match &result {
            Ok(booking) => {
                metrics::counter!("booking_saga_completed_total").increment(1);
                tracing::info!(
                    reservation_uid = %booking.reservation.reservation_uid,
                    payment_uid = %booking.payment.payment_uid,
                    duration,
                    "booking saga completed"
                );
            }
            Err(e) => {
                let step = e.step().unwrap_or("request");
                metrics::counter!("booking_saga_failed_total", "step" => step).increment(1);
                tracing::warn!(step, error = %e, "booking saga failed");
            }
        }
        result
    }

    async fn run_booking(
        &self,
        username: &Username,
        request: BookingRequest,
    ) -> Result<CreatedBooking> {
        // Dates first: a malformed request must never reach a backend.
        let stay = StayDates::parse(&request.start_date, &request.end_date)?;
        tracing::debug!(step = BookingState::DatesValidated.as_str(), nights = stay.nights());

        let hotel = self.resolve_hotel(request.hotel_uid).await?;
        tracing::debug!(step = BookingState::HotelResolved.as_str(), hotel_id = hotel.id);

        let discount = self
            .loyalty
            .loyalty(username)
            .await
            .map_err(|e| SagaError::upstream(BookingState::DiscountFetched.as_str(), e))?
            .discount();
        tracing::debug!(step = BookingState::DiscountFetched.as_str(), discount);

        let payment = Payment {
            payment_uid: Uuid::new_v4(),
            status: PaymentStatus::Paid,
            price: booking_price(stay.nights(), hotel.price, discount),
        };
        self.payment
            .create_payment(&payment)
            .await
            .map_err(|e| SagaError::upstream(BookingState::PaymentCreated.as_str(), e))?;
        tracing::info!(
            step = BookingState::PaymentCreated.as_str(),
            payment_uid = %payment.payment_uid,
            price = payment.price,
            "saga step completed"
        );

        let reservation = Reservation {
            reservation_uid: Uuid::new_v4(),
            username: username.clone(),
            payment_uid: payment.payment_uid,
            hotel_id: hotel.id,
            status: ReservationStatus::Paid,
            start_date: stay.start(),
            end_date: stay.end(),
        };
        if let Err(e) = self.reservation.create_reservation(&reservation).await {
            metrics::counter!("booking_orphaned_payments_total").increment(1);
            tracing::warn!(
                payment_uid = %payment.payment_uid,
                error = %e,
                "reservation failed, payment left PAID without compensation"
            );
            return Err(SagaError::upstream(
                BookingState::ReservationCreated.as_str(),
                e,
            ));
        }
        tracing::info!(
            step = BookingState::ReservationCreated.as_str(),
            reservation_uid = %reservation.reservation_uid,
            "saga step completed"
        );

        if let Err(e) = self.loyalty.increment(username).await {
            self.compensate_payment(&payment, &reservation).await;
            return Err(SagaError::upstream(
                BookingState::LoyaltyIncremented.as_str(),
                e,
            ));
        }
        tracing::info!(
            step = BookingState::LoyaltyIncremented.as_str(),
            "saga step completed"
        );

        Ok(CreatedBooking {
            reservation,
            hotel,
            payment,
            discount,
        })
    }

    async fn resolve_hotel(&self, hotel_uid: Uuid) -> Result<Hotel> {
        let step = BookingState::HotelResolved.as_str();
        let hotel_id = self
            .reservation
            .hotel_id(hotel_uid)
            .await
            .map_err(|e| {
                if e.is_client_error() {
                    SagaError::NotFound(format!("hotel {hotel_uid}"))
                } else {
                    SagaError::upstream(step, e)
                }
            })?;
        self.reservation
            .hotel(hotel_id)
            .await
            .map_err(|e| SagaError::upstream(step, e))
    }

    /// Cancels the payment after a failed loyalty increment.
    ///
    /// The reservation is intentionally left as is.
    #[tracing::instrument(skip_all, fields(payment_uid = %payment.payment_uid))]
    async fn compensate_payment(&self, payment: &Payment, reservation: &Reservation) {
        metrics::counter!("booking_compensations_total").increment(1);
        match self.payment.cancel_payment(payment.payment_uid).await {
            Ok(()) => {
                tracing::warn!(
                    reservation_uid = %reservation.reservation_uid,
                    "payment canceled, reservation not rolled back"
                );
            }
            Err(e) => {
                metrics::counter!("booking_compensation_failed_total").increment(1);
                tracing::error!(
                    reservation_uid = %reservation.reservation_uid,
                    error = %e,
                    "payment compensation failed, payment and reservation left PAID"
                );
            }
        }
    }
}
