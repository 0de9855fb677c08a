//! Shared types for the hotel booking gateway.
//!
//! Everything exchanged with the reservation, payment and loyalty backends
//! lives here, with field names matching the backends' JSON contracts.

pub mod date;
pub mod models;
pub mod types;

pub use models::{
    Hotel, Loyalty, LoyaltyTier, Payment, PaymentStatus, Reservation, ReservationStatus,
};
pub use types::{USER_HEADER, Username};
