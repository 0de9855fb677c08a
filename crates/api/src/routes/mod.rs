pub mod health;
pub mod hotels;
pub mod me;
pub mod metrics;
pub mod reservations;
