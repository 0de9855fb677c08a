//! The gateway's booking orchestrator.

use crate::retry::RetryPublisher;
use crate::services::{LoyaltyService, PaymentService, ReservationService};

/// Orchestrates bookings across the reservation, payment and loyalty backends.
///
/// Each saga runs its steps strictly in sequence on the caller's task, since
/// every step consumes the previous one's output. The creation saga lives in
/// [`crate::booking`], the cancellation saga in [`crate::cancellation`] and
/// the read side in [`crate::queries`].
pub struct BookingCoordinator<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    pub(crate) reservation: R,
    pub(crate) payment: P,
    pub(crate) loyalty: L,
    pub(crate) retries: RetryPublisher,
}

impl<R, P, L> BookingCoordinator<R, P, L>
where
    R: ReservationService,
    P: PaymentService,
    L: LoyaltyService,
{
    /// Creates a coordinator publishing deferred loyalty decrements to `retries`.
    pub fn new(reservation: R, payment: P, loyalty: L, retries: RetryPublisher) -> Self {
        Self {
            reservation,
            payment,
            loyalty,
            retries,
        }
    }

    pub fn reservation_service(&self) -> &R {
        &self.reservation
    }

    pub fn payment_service(&self) -> &P {
        &self.payment
    }

    pub fn loyalty_service(&self) -> &L {
        &self.loyalty
    }
}
