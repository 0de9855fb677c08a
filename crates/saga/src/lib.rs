//! Booking orchestration for the hotel gateway.
//!
//! The gateway composes three independent backends (reservations and the
//! hotel catalog, payments, loyalty) into two sagas:
//!
//! - **Booking**: validate dates, resolve the hotel, fetch the loyalty
//!   discount, create the payment, create the reservation, increment loyalty.
//! - **Cancellation**: cancel the reservation, cancel its payment, decrement
//!   loyalty. A failed decrement is retried asynchronously through the
//!   [`retry`] topic until it succeeds.
//!
//! Backends are reached through the traits in [`services`], each with an
//! in-memory implementation for tests.

pub mod booking;
pub mod cancellation;
pub mod coordinator;
pub mod error;
pub mod pricing;
pub mod queries;
pub mod retry;
pub mod services;
pub mod state;

pub use booking::{BookingRequest, CreatedBooking};
pub use cancellation::{CancellationOutcome, LoyaltyDecrement};
pub use coordinator::BookingCoordinator;
pub use error::{SagaError, ServiceError};
pub use pricing::{StayDates, booking_price};
pub use queries::{HotelPage, Pagination, ReservationDetails, UserInfo};
pub use retry::{DecrementRetryWorker, RetryMessage, RetryPublisher, RetrySubscriber};
pub use services::{
    InMemoryLoyaltyService, InMemoryPaymentService, InMemoryReservationService, LoyaltyService,
    PaymentService, ReservationService,
};
pub use state::{BookingState, CancellationState};
