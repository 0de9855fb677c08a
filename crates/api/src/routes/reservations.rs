//! Reservation endpoints: listing, lookup, booking and cancellation.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use saga::{BookingRequest, LoyaltyService, PaymentService, ReservationService};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::views::{CreateReservationResponse, ReservationResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub hotel_uid: Uuid,
    pub start_date: String,
    pub end_date: String,
}

/// GET /api/v1/reservations — the caller's reservations.
#[tracing::instrument(skip(state), fields(username = %username))]
pub async fn list<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
) -> Result<Json<Vec<ReservationResponse>>, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let reservations = state.coordinator.reservations(&username).await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

/// GET /api/v1/reservations/{uid} — one of the caller's reservations.
#[tracing::instrument(skip(state, uid), fields(username = %username))]
pub async fn get<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
    uid: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ReservationResponse>, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let Path(uid) = uid?;
    let details = state.coordinator.reservation(&username, uid).await?;
    Ok(Json(details.into()))
}

/// POST /api/v1/reservations — run the booking saga.
#[tracing::instrument(skip(state, body), fields(username = %username))]
pub async fn create<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
    body: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<Json<CreateReservationResponse>, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let Json(req) = body?;
    let request = BookingRequest {
        hotel_uid: req.hotel_uid,
        start_date: req.start_date,
        end_date: req.end_date,
    };
    let booking = state.coordinator.create_booking(&username, request).await?;
    Ok(Json(booking.into()))
}

/// DELETE /api/v1/reservations/{uid} — run the cancellation saga.
#[tracing::instrument(skip(state, uid), fields(username = %username))]
pub async fn cancel<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
    uid: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let Path(uid) = uid?;
    state.coordinator.cancel_booking(&username, uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
