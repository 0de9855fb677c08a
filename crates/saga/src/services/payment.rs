//! Payment service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Payment, PaymentStatus};
use uuid::Uuid;

use crate::error::ServiceError;

/// Operations offered by the payment backend.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Stores a new payment record.
    async fn create_payment(&self, payment: &Payment) -> Result<(), ServiceError>;

    /// Marks a payment as CANCELED.
    async fn cancel_payment(&self, payment_uid: Uuid) -> Result<(), ServiceError>;

    /// Looks up a payment by its identifier.
    async fn payment(&self, payment_uid: Uuid) -> Result<Payment, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<Uuid, Payment>,
    fail_on_create: bool,
    fail_on_cancel: bool,
    unavailable: bool,
}

/// In-memory payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on create calls.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the service to fail on cancel calls.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().unwrap().fail_on_cancel = fail;
    }

    /// Makes every call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the number of stored payments, canceled ones included.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }

    /// Returns a stored payment without going through the trait.
    pub fn get(&self, payment_uid: Uuid) -> Option<Payment> {
        self.state.read().unwrap().payments.get(&payment_uid).cloned()
    }
}

fn injected() -> ServiceError {
    ServiceError::Unavailable("injected payment failure".to_string())
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn create_payment(&self, payment: &Payment) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.unavailable || state.fail_on_create {
            return Err(injected());
        }
        state.payments.insert(payment.payment_uid, payment.clone());
        Ok(())
    }

    async fn cancel_payment(&self, payment_uid: Uuid) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.unavailable || state.fail_on_cancel {
            return Err(injected());
        }
        let payment = state
            .payments
            .get_mut(&payment_uid)
            .ok_or_else(|| ServiceError::Client {
                status: 404,
                message: format!("payment {payment_uid} not found"),
            })?;
        payment.status = PaymentStatus::Canceled;
        Ok(())
    }

    async fn payment(&self, payment_uid: Uuid) -> Result<Payment, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        state
            .payments
            .get(&payment_uid)
            .cloned()
            .ok_or_else(|| ServiceError::Client {
                status: 404,
                message: format!("payment {payment_uid} not found"),
            })
    }
}
