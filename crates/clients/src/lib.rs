//! HTTP implementations of the gateway's backend services.
//!
//! Every backend gets a [`ResilientClient`]: a hard per-call timeout and a
//! circuit breaker of its own, on top of one [`ConnectionPool`] shared by all
//! backends. Responses are classified into [`saga::ServiceError`] outcomes by
//! [`UpstreamResponse::expect`].

pub mod breaker;
pub mod loyalty;
pub mod payment;
pub mod reservation;
pub mod resilience;
pub mod response;

pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, Permit};
pub use loyalty::HttpLoyaltyClient;
pub use payment::HttpPaymentClient;
pub use reservation::HttpReservationClient;
pub use resilience::{ClientConfig, ConnectionPool, ResilientClient};
pub use response::UpstreamResponse;
