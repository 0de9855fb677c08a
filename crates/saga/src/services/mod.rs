//! Backend service traits and in-memory implementations.
//!
//! The HTTP implementations live in the `clients` crate; the in-memory ones
//! here back the orchestrator's tests.

pub mod loyalty;
pub mod payment;
pub mod reservation;

pub use loyalty::{InMemoryLoyaltyService, LoyaltyService};
pub use payment::{InMemoryPaymentService, PaymentService};
pub use reservation::{InMemoryReservationService, ReservationService};
