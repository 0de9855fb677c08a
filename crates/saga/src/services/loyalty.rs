//! Loyalty service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Loyalty, Username};

use crate::error::ServiceError;

/// Operations offered by the loyalty backend.
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    /// Looks up the caller's loyalty account.
    async fn loyalty(&self, username: &Username) -> Result<Loyalty, ServiceError>;

    /// Adds one reservation to the caller's counter.
    async fn increment(&self, username: &Username) -> Result<(), ServiceError>;

    /// Removes one reservation from the caller's counter.
    async fn decrement(&self, username: &Username) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryLoyaltyState {
    accounts: HashMap<Username, Loyalty>,
    fail_on_increment: bool,
    failing_decrements: u32,
    decrement_attempts: u32,
    unavailable: bool,
}

/// In-memory loyalty service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoyaltyService {
    state: Arc<RwLock<InMemoryLoyaltyState>>,
}

impl InMemoryLoyaltyService {
    /// Creates a new in-memory loyalty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account with the given reservation count.
    pub fn with_account(self, username: impl Into<Username>, reservation_count: u32) -> Self {
        let username = username.into();
        self.state.write().unwrap().accounts.insert(
            username.clone(),
            Loyalty::new(username, reservation_count),
        );
        self
    }

    /// Configures the service to fail on increment calls.
    pub fn set_fail_on_increment(&self, fail: bool) {
        self.state.write().unwrap().fail_on_increment = fail;
    }

    /// Makes the next `count` decrement calls fail.
    pub fn fail_next_decrements(&self, count: u32) {
        self.state.write().unwrap().failing_decrements = count;
    }

    /// Makes every call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the number of decrement calls received, failed ones included.
    pub fn decrement_attempts(&self) -> u32 {
        self.state.read().unwrap().decrement_attempts
    }

    /// Returns the stored reservation count for a user.
    pub fn reservation_count(&self, username: &str) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .accounts
            .get(&Username::from(username))
            .map(Loyalty::reservation_count)
    }
}

fn injected() -> ServiceError {
    ServiceError::Unavailable("injected loyalty failure".to_string())
}

fn missing(username: &Username) -> ServiceError {
    ServiceError::Client {
        status: 404,
        message: format!("no loyalty account for {username}"),
    }
}

#[async_trait]
impl LoyaltyService for InMemoryLoyaltyService {
    async fn loyalty(&self, username: &Username) -> Result<Loyalty, ServiceError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(injected());
        }
        state
            .accounts
            .get(username)
            .cloned()
            .ok_or_else(|| missing(username))
    }

    async fn increment(&self, username: &Username) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.unavailable || state.fail_on_increment {
            return Err(injected());
        }
        let account = state
            .accounts
            .get_mut(username)
            .ok_or_else(|| missing(username))?;
        account.increment();
        Ok(())
    }

    async fn decrement(&self, username: &Username) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.decrement_attempts += 1;
        if state.unavailable {
            return Err(injected());
        }
        if state.failing_decrements > 0 {
            state.failing_decrements -= 1;
            return Err(injected());
        }
        let account = state
            .accounts
            .get_mut(username)
            .ok_or_else(|| missing(username))?;
        account.decrement();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::LoyaltyTier;

    #[tokio::test]
    async fn test_increment_promotes_tier() {
        let service = InMemoryLoyaltyService::new().with_account("alice", 9);
        let alice = Username::from("alice");

        service.increment(&alice).await.unwrap();
        let account = service.loyalty(&alice).await.unwrap();
        assert_eq!(account.reservation_count(), 10);
        assert_eq!(account.tier(), LoyaltyTier::Silver);
    }

    #[tokio::test]
    async fn test_failing_decrements_are_counted() {
        let service = InMemoryLoyaltyService::new().with_account("alice", 3);
        let alice = Username::from("alice");
        service.fail_next_decrements(1);

        assert!(service.decrement(&alice).await.is_err());
        service.decrement(&alice).await.unwrap();

        assert_eq!(service.decrement_attempts(), 2);
        assert_eq!(service.reservation_count("alice"), Some(2));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let service = InMemoryLoyaltyService::new();
        let err = service.loyalty(&Username::from("nobody")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
