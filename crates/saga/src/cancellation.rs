//! Booking cancellation saga.
//!
//! Cancels the reservation, then the payment it references, then decrements
//! the caller's loyalty counter. Completed steps are never rolled back. A
//! failed decrement is handed to the retry topic and the cancellation still
//! succeeds.

use common::Username;
use uuid::Uuid;

use crate::coordinator::BookingCoordinator;
use crate::error::{Result, SagaError};
use crate::services::{LoyaltyService, PaymentService, ReservationService};
use crate::state::CancellationState;

/// What happened to the caller's loyalty counter during a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoyaltyDecrement {
    /// The counter was decremented in-line.
    Applied,
    /// The decrement failed and was queued for a later retry.
    Deferred,
}

/// The result of a completed cancellation saga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationOutcome {
    pub reservation_uid: Uuid,
    pub payment_uid: Uuid,
    pub loyalty: LoyaltyDecrement,
}

impl<R, P, L> BookingCoordinator<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    /// Runs the cancellation saga for `reservation_uid` on behalf of `username`.
    #[tracing::instrument(skip(self), fields(saga_type = "cancellation", username = %username))]
    pub async fn cancel_booking(
        &self,
        username: &Username,
        reservation_uid: Uuid,
    ) -> Result<CancellationOutcome> {
        metrics::counter!("cancellation_saga_started_total").increment(1);
        let saga_start = std::time::Instant::now();

        let result = self.run_cancellation(username, reservation_uid).await;

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("cancellation_saga_duration_seconds").record(duration);
        match &result {
            Ok(outcome) => {
                metrics::counter!("cancellation_saga_completed_total").increment(1);
                tracing::info!(
                    payment_uid = %outcome.payment_uid,
                    loyalty = ?outcome.loyalty,
                    duration,
                    "cancellation saga completed"
                );
            }
            Err(e) => {
                let step = e.step().unwrap_or("request");
                metrics::counter!("cancellation_saga_failed_total", "step" => step).increment(1);
                tracing::warn!(step, error = %e, "cancellation saga failed");
            }
        }
        result
    }

    async fn run_cancellation(
        &self,
        username: &Username,
        reservation_uid: Uuid,
    ) -> Result<CancellationOutcome> {
        tracing::debug!(step = CancellationState::ReservationCancelRequested.as_str());
        self.reservation
            .cancel_reservation(reservation_uid)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SagaError::NotFound(format!("reservation {reservation_uid}"))
                } else {
                    SagaError::upstream(CancellationState::ReservationCanceled.as_str(), e)
                }
            })?;
        tracing::info!(
            step = CancellationState::ReservationCanceled.as_str(),
            "saga step completed"
        );

        // The payment step needs the payment uid held by the reservation.
        let step = CancellationState::PaymentCanceled.as_str();
        let reservation = self
            .reservation
            .reservation(reservation_uid)
            .await
            .map_err(|e| SagaError::upstream(step, e))?;
        self.payment
            .cancel_payment(reservation.payment_uid)
            .await
            .map_err(|e| SagaError::upstream(step, e))?;
        tracing::info!(
            step,
            payment_uid = %reservation.payment_uid,
            "saga step completed"
        );

        let loyalty = match self.loyalty.decrement(username).await {
            Ok(()) => {
                tracing::info!(
                    step = CancellationState::LoyaltyDecremented.as_str(),
                    "saga step completed"
                );
                LoyaltyDecrement::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "loyalty decrement failed, queued for retry");
                self.retries.publish(username.clone());
                LoyaltyDecrement::Deferred
            }
        };

        Ok(CancellationOutcome {
            reservation_uid,
            payment_uid: reservation.payment_uid,
            loyalty,
        })
    }
}
