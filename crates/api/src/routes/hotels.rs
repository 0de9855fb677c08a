//! Hotel catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use saga::{LoyaltyService, Pagination, PaymentService, ReservationService};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::views::PaginationResponse;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// GET /api/v1/hotels?page&size — one page of the catalog.
#[tracing::instrument(skip(state, query))]
pub async fn list<R, P, L>(
    State(state): State<Arc<AppState<R, P, L>>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PaginationResponse>, ApiError>
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let Query(query) = query?;
    let pagination = Pagination::new(query.page, query.size)?;
    let page = state.coordinator.list_hotels(pagination).await?;
    Ok(Json(page.into()))
}
