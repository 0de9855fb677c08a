//! Hotel booking gateway: the public HTTP surface in front of the
//! reservation, payment and loyalty backends.
//!
//! Provides the `/api/v1` booking endpoints backed by the sagas in the
//! `saga` crate, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use clients::{ConnectionPool, HttpLoyaltyClient, HttpPaymentClient, HttpReservationClient, ResilientClient};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::retry;
use saga::{BookingCoordinator, DecrementRetryWorker, LoyaltyService, PaymentService, ReservationService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    pub coordinator: BookingCoordinator<R, P, L>,
}

impl<R, P, L> AppState<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    pub fn new(coordinator: BookingCoordinator<R, P, L>) -> Arc<Self> {
        Arc::new(Self { coordinator })
    }
}

/// State wired to the real backends over HTTP.
pub type HttpState = AppState<HttpReservationClient, HttpPaymentClient, HttpLoyaltyClient>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, P, L>(state: Arc<AppState<R, P, L>>, metrics_handle: PrometheusHandle) -> Router
where
    R: ReservationService + 'static,
    P: PaymentService + 'static,
    L: LoyaltyService + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/hotels", get(routes::hotels::list::<R, P, L>))
        .route("/me", get(routes::me::user_info::<R, P, L>))
        .route("/loyalty", get(routes::me::loyalty::<R, P, L>))
        .route(
            "/reservations",
            get(routes::reservations::list::<R, P, L>).post(routes::reservations::create::<R, P, L>),
        )
        .route(
            "/reservations/{uid}",
            get(routes::reservations::get::<R, P, L>)
                .delete(routes::reservations::cancel::<R, P, L>),
        )
        .with_state(state);

    Router::new()
        .route("/manage/health", get(routes::health::check))
        .route("/health", get(routes::health::check))
        .nest("/api/v1", api)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the HTTP backend clients, the coordinator and the loyalty retry worker.
///
/// The worker is returned unstarted; the caller decides when to spawn it.
pub fn create_http_state(
    config: &Config,
) -> Result<(Arc<HttpState>, DecrementRetryWorker<HttpLoyaltyClient>), reqwest::Error> {
    let pool = ConnectionPool::new(config.max_connections)?;
    let client_config = config.client_config();

    let reservation = HttpReservationClient::new(ResilientClient::new(
        "reservation",
        config.reservation_service.clone(),
        pool.clone(),
        client_config,
    ));
    let payment = HttpPaymentClient::new(ResilientClient::new(
        "payment",
        config.payment_service.clone(),
        pool.clone(),
        client_config,
    ));
    let loyalty = HttpLoyaltyClient::new(ResilientClient::new(
        "loyalty",
        config.loyalty_service.clone(),
        pool,
        client_config,
    ));

    let (publisher, subscriber) = retry::topic();
    let worker = DecrementRetryWorker::new(
        loyalty.clone(),
        publisher.clone(),
        subscriber,
        config.loyalty_retry_delay,
    );
    let coordinator = BookingCoordinator::new(reservation, payment, loyalty, publisher);

    Ok((AppState::new(coordinator), worker))
}
