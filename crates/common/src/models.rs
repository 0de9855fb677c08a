//! Backend records as exchanged over the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Username;

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Paid,
    Canceled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Paid => "PAID",
            ReservationStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Canceled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hotel from the reservation backend's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    /// Internal numeric identifier, used to reference the hotel from reservations.
    #[serde(default)]
    pub id: i64,
    pub hotel_uid: Uuid,
    pub name: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub stars: i32,
    /// Price per night in the smallest currency unit.
    pub price: i64,
}

impl Hotel {
    /// Returns `"country, city, address"`.
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.country, self.city, self.address)
    }
}

/// A reservation record owned by the reservation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_uid: Uuid,
    pub username: Username,
    pub payment_uid: Uuid,
    pub hotel_id: i64,
    pub status: ReservationStatus,
    #[serde(with = "crate::date")]
    pub start_date: NaiveDate,
    #[serde(with = "crate::date")]
    pub end_date: NaiveDate,
}

/// A payment record owned by the payment backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_uid: Uuid,
    pub status: PaymentStatus,
    /// Amount in the smallest currency unit.
    pub price: i64,
}

/// Loyalty tier, derived from the number of reservations a user has made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
}

impl LoyaltyTier {
    /// Reservation count at which a user becomes SILVER.
    pub const SILVER_THRESHOLD: u32 = 10;
    /// Reservation count at which a user becomes GOLD.
    pub const GOLD_THRESHOLD: u32 = 20;

    /// Returns the tier for the given reservation count.
    pub fn for_count(reservation_count: u32) -> Self {
        if reservation_count >= Self::GOLD_THRESHOLD {
            LoyaltyTier::Gold
        } else if reservation_count >= Self::SILVER_THRESHOLD {
            LoyaltyTier::Silver
        } else {
            LoyaltyTier::Bronze
        }
    }

    /// Discount percentage granted by this tier.
    pub fn discount(&self) -> u8 {
        match self {
            LoyaltyTier::Bronze => 5,
            LoyaltyTier::Silver => 7,
            LoyaltyTier::Gold => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTier::Bronze => "BRONZE",
            LoyaltyTier::Silver => "SILVER",
            LoyaltyTier::Gold => "GOLD",
        }
    }
}

impl std::fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's loyalty account.
///
/// Only the reservation count is stored. Tier and discount are always
/// recomputed from it, so the `status` and `discount` fields sent by a
/// backend are ignored on read and rewritten on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LoyaltyRecord", into = "LoyaltyRecord")]
pub struct Loyalty {
    username: Username,
    reservation_count: u32,
}

impl Loyalty {
    /// Creates an account with the given reservation count.
    pub fn new(username: impl Into<Username>, reservation_count: u32) -> Self {
        Self {
            username: username.into(),
            reservation_count,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn reservation_count(&self) -> u32 {
        self.reservation_count
    }

    pub fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::for_count(self.reservation_count)
    }

    pub fn discount(&self) -> u8 {
        self.tier().discount()
    }

    /// Records one more reservation.
    pub fn increment(&mut self) {
        self.reservation_count = self.reservation_count.saturating_add(1);
    }

    /// Records one fewer reservation; the count never drops below zero.
    pub fn decrement(&mut self) {
        self.reservation_count = self.reservation_count.saturating_sub(1);
    }
}

#[derive(Serialize, Deserialize)]
struct LoyaltyRecord {
    #[serde(default)]
    username: Username,
    reservation_count: u32,
    #[serde(default = "default_tier")]
    status: LoyaltyTier,
    #[serde(default)]
    discount: u8,
}

fn default_tier() -> LoyaltyTier {
    LoyaltyTier::Bronze
}

impl From<LoyaltyRecord> for Loyalty {
    fn from(record: LoyaltyRecord) -> Self {
        Loyalty::new(record.username, record.reservation_count)
    }
}

impl From<Loyalty> for LoyaltyRecord {
    fn from(loyalty: Loyalty) -> Self {
        let tier = loyalty.tier();
        LoyaltyRecord {
            username: loyalty.username,
            reservation_count: loyalty.reservation_count,
            status: tier,
            discount: tier.discount(),
        }
    }
}
