//! Gateway response bodies.

use chrono::NaiveDate;
use common::{Hotel, Loyalty, LoyaltyTier, Payment, PaymentStatus, ReservationStatus};
use saga::{CreatedBooking, HotelPage, ReservationDetails, UserInfo};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelResponse {
    pub hotel_uid: Uuid,
    pub name: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub stars: i32,
    pub price: i64,
}

impl From<Hotel> for HotelResponse {
    fn from(hotel: Hotel) -> Self {
        Self {
            hotel_uid: hotel.hotel_uid,
            name: hotel.name,
            country: hotel.country,
            city: hotel.city,
            address: hotel.address,
            stars: hotel.stars,
            price: hotel.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: i64,
    pub page_size: usize,
    pub total_elements: usize,
    pub items: Vec<HotelResponse>,
}

impl From<HotelPage> for PaginationResponse {
    fn from(page: HotelPage) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total_elements: page.total_elements,
            items: page.items.into_iter().map(HotelResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
    pub hotel_uid: Uuid,
    pub name: String,
    pub full_address: String,
    pub stars: i32,
}

impl From<&Hotel> for HotelInfo {
    fn from(hotel: &Hotel) -> Self {
        Self {
            hotel_uid: hotel.hotel_uid,
            name: hotel.name.clone(),
            full_address: hotel.full_address(),
            stars: hotel.stars,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub price: i64,
}

impl From<&Payment> for PaymentInfo {
    fn from(payment: &Payment) -> Self {
        Self {
            status: payment.status,
            price: payment.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_uid: Uuid,
    pub hotel: HotelInfo,
    #[serde(serialize_with = "common::date::serialize")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "common::date::serialize")]
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub payment: PaymentInfo,
}

impl From<ReservationDetails> for ReservationResponse {
    fn from(details: ReservationDetails) -> Self {
        Self {
            reservation_uid: details.reservation.reservation_uid,
            hotel: HotelInfo::from(&details.hotel),
            start_date: details.reservation.start_date,
            end_date: details.reservation.end_date,
            status: details.reservation.status,
            payment: PaymentInfo::from(&details.payment),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationResponse {
    pub reservation_uid: Uuid,
    pub hotel_uid: Uuid,
    #[serde(serialize_with = "common::date::serialize")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "common::date::serialize")]
    pub end_date: NaiveDate,
    pub discount: u8,
    pub status: ReservationStatus,
    pub payment: PaymentInfo,
}

impl From<CreatedBooking> for CreateReservationResponse {
    fn from(booking: CreatedBooking) -> Self {
        Self {
            reservation_uid: booking.reservation.reservation_uid,
            hotel_uid: booking.hotel.hotel_uid,
            start_date: booking.reservation.start_date,
            end_date: booking.reservation.end_date,
            discount: booking.discount,
            status: booking.reservation.status,
            payment: PaymentInfo::from(&booking.payment),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyInfoResponse {
    pub status: LoyaltyTier,
    pub discount: u8,
    pub reservation_count: u32,
}

impl From<Loyalty> for LoyaltyInfoResponse {
    fn from(loyalty: Loyalty) -> Self {
        Self {
            status: loyalty.tier(),
            discount: loyalty.discount(),
            reservation_count: loyalty.reservation_count(),
        }
    }
}

/// Loyalty as shown in `/me`: no count, and `{}` when unavailable.
#[derive(Debug, Default, Serialize)]
pub struct LoyaltySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoyaltyTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub reservations: Vec<ReservationResponse>,
    pub loyalty: LoyaltySummary,
}

impl From<UserInfo> for UserInfoResponse {
    fn from(info: UserInfo) -> Self {
        let loyalty = info
            .loyalty
            .map(|loyalty| LoyaltySummary {
                status: Some(loyalty.tier()),
                discount: Some(loyalty.discount()),
            })
            .unwrap_or_default();
        Self {
            reservations: info
                .reservations
                .into_iter()
                .map(ReservationResponse::from)
                .collect(),
            loyalty,
        }
    }
}
