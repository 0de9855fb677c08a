//! Saga step state machines.

use serde::{Deserialize, Serialize};

/// Progress of a booking creation saga.
///
/// State transitions:
/// ```text
/// DatesValidated ──► HotelResolved ──► DiscountFetched ──► PaymentCreated
///                                                              │
///                 LoyaltyIncremented ◄── ReservationCreated ◄──┘
/// ```
///
/// Dates are checked before the hotel is resolved so that a malformed
/// request never reaches a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookingState {
    DatesValidated,
    HotelResolved,
    DiscountFetched,
    PaymentCreated,
    ReservationCreated,
    /// All steps completed (terminal state).
    LoyaltyIncremented,
}

impl BookingState {
    /// Returns the next state, or `None` once the saga is done.
    pub fn next(&self) -> Option<BookingState> {
        match self {
            BookingState::DatesValidated => Some(BookingState::HotelResolved),
            BookingState::HotelResolved => Some(BookingState::DiscountFetched),
            BookingState::DiscountFetched => Some(BookingState::PaymentCreated),
            BookingState::PaymentCreated => Some(BookingState::ReservationCreated),
            BookingState::ReservationCreated => Some(BookingState::LoyaltyIncremented),
            BookingState::LoyaltyIncremented => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingState::LoyaltyIncremented)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::DatesValidated => "dates_validated",
            BookingState::HotelResolved => "hotel_resolved",
            BookingState::DiscountFetched => "discount_fetched",
            BookingState::PaymentCreated => "payment_created",
            BookingState::ReservationCreated => "reservation_created",
            BookingState::LoyaltyIncremented => "loyalty_incremented",
        }
    }
}

impl std::fmt::Display for BookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a cancellation saga.
///
/// ```text
/// ReservationCancelRequested ──► ReservationCanceled ──► PaymentCanceled ──► LoyaltyDecremented
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CancellationState {
    ReservationCancelRequested,
    ReservationCanceled,
    PaymentCanceled,
    /// All steps completed (terminal state), possibly with the decrement deferred.
    LoyaltyDecremented,
}

impl CancellationState {
    pub fn next(&self) -> Option<CancellationState> {
        match self {
            CancellationState::ReservationCancelRequested => {
                Some(CancellationState::ReservationCanceled)
            }
            CancellationState::ReservationCanceled => Some(CancellationState::PaymentCanceled),
            CancellationState::PaymentCanceled => Some(CancellationState::LoyaltyDecremented),
            CancellationState::LoyaltyDecremented => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CancellationState::LoyaltyDecremented)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationState::ReservationCancelRequested => "reservation_cancel_requested",
            CancellationState::ReservationCanceled => "reservation_canceled",
            CancellationState::PaymentCanceled => "payment_canceled",
            CancellationState::LoyaltyDecremented => "loyalty_decremented",
        }
    }
}

impl std::fmt::Display for CancellationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
