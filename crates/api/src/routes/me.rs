//! Caller profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use saga::{LoyaltyService, PaymentService, ReservationService};

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::views::{LoyaltyInfoResponse, UserInfoResponse};

/// GET /api/v1/me — reservations plus loyalty; degrades instead of failing.
#[tracing::instrument(skip(state), fields(username = %username))]
pub async fn user_info<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
) -> Json<UserInfoResponse>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    Json(state.coordinator.user_info(&username).await.into())
}

/// GET /api/v1/loyalty — tier, discount and reservation count.
#[tracing::instrument(skip(state), fields(username = %username))]
pub async fn loyalty<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    Identity(username): Identity,
) -> Result<Json<LoyaltyInfoResponse>, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let loyalty = state.coordinator.loyalty(&username).await?;
    Ok(Json(loyalty.into()))
}
