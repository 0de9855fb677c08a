//! Deferred loyalty-counter decrements.
//!
//! When a cancellation cannot decrement the caller's loyalty counter, a
//! [`RetryMessage`] is published on an in-process topic. A single background
//! worker consumes the topic, waits until the message is at least
//! `delay` old, and tries again. A failed retry is published anew with a
//! fresh timestamp, so a message is retried until the loyalty backend accepts
//! it. Messages live only in memory and are lost on restart.

use std::time::Duration;

use common::Username;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::services::LoyaltyService;

/// Minimum age of a message before its decrement is retried.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// A pending loyalty-counter decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryMessage {
    pub username: Username,
    pub enqueued_at: Instant,
}

impl RetryMessage {
    /// Creates a message stamped with the current time.
    pub fn new(username: Username) -> Self {
        Self {
            username,
            enqueued_at: Instant::now(),
        }
    }

    /// The earliest instant at which this message may be retried.
    pub fn due_at(&self, delay: Duration) -> Instant {
        self.enqueued_at + delay
    }
}

/// Publishing side of the retry topic.
#[derive(Debug, Clone)]
pub struct RetryPublisher {
    tx: mpsc::UnboundedSender<RetryMessage>,
}

impl RetryPublisher {
    /// Enqueues a decrement for `username` without waiting for the worker.
    pub fn publish(&self, username: Username) {
        let message = RetryMessage::new(username);
        match self.tx.send(message) {
            Ok(()) => {
                metrics::counter!("loyalty_retry_published_total").increment(1);
            }
            Err(mpsc::error::SendError(message)) => {
                tracing::error!(
                    username = %message.username,
                    "retry topic closed, loyalty decrement dropped"
                );
                metrics::counter!("loyalty_retry_dropped_total").increment(1);
            }
        }
    }
}

/// Subscribing side of the retry topic.
#[derive(Debug)]
pub struct RetrySubscriber {
    rx: mpsc::UnboundedReceiver<RetryMessage>,
}

impl RetrySubscriber {
    /// Waits for the next message; `None` once every publisher is gone.
    pub async fn next(&mut self) -> Option<RetryMessage> {
        self.rx.recv().await
    }
}

/// Creates the retry topic.
pub fn topic() -> (RetryPublisher, RetrySubscriber) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RetryPublisher { tx }, RetrySubscriber { rx })
}

/// Background consumer that retries loyalty decrements.
pub struct DecrementRetryWorker<L: LoyaltyService> {
    loyalty: L,
    publisher: RetryPublisher,
    subscriber: RetrySubscriber,
    delay: Duration,
}

impl<L: LoyaltyService + 'static> DecrementRetryWorker<L> {
    /// Creates a worker that re-publishes failures through `publisher`.
    pub fn new(
        loyalty: L,
        publisher: RetryPublisher,
        subscriber: RetrySubscriber,
        delay: Duration,
    ) -> Self {
        Self {
            loyalty,
            publisher,
            subscriber,
            delay,
        }
    }

    /// Runs the worker on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Consumes the topic until it closes.
    ///
    /// The worker keeps its own publisher, so the topic only closes if the
    /// worker is dropped; in practice this runs for the life of the process.
    pub async fn run(mut self) {
        tracing::info!(delay_secs = self.delay.as_secs_f64(), "loyalty retry worker started");
        while let Some(message) = self.subscriber.next().await {
            self.handle(message).await;
        }
        tracing::info!("loyalty retry worker stopped");
    }

    #[tracing::instrument(skip(self, message), fields(username = %message.username))]
    async fn handle(&self, message: RetryMessage) {
        tokio::time::sleep_until(message.due_at(self.delay)).await;

        match self.loyalty.decrement(&message.username).await {
            Ok(()) => {
                metrics::counter!("loyalty_retry_succeeded_total").increment(1);
                tracing::info!("deferred loyalty decrement applied");
            }
            Err(e) => {
                metrics::counter!("loyalty_retry_failed_total").increment(1);
                tracing::warn!(error = %e, "deferred loyalty decrement failed, re-publishing");
                self.publisher.publish(message.username);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryLoyaltyService;

    fn start_worker(loyalty: &InMemoryLoyaltyService) -> RetryPublisher {
        let (publisher, subscriber) = topic();
        DecrementRetryWorker::new(
            loyalty.clone(),
            publisher.clone(),
            subscriber,
            DEFAULT_RETRY_DELAY,
        )
        .spawn();
        publisher
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_the_delay_before_retrying() {
        let loyalty = InMemoryLoyaltyService::new().with_account("alice", 5);
        let publisher = start_worker(&loyalty);

        publisher.publish(Username::from("alice"));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(loyalty.decrement_attempts(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(loyalty.decrement_attempts(), 1);
        assert_eq!(loyalty.reservation_count("alice"), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_retry_is_not_repeated() {
        let loyalty = InMemoryLoyaltyService::new().with_account("alice", 5);
        let publisher = start_worker(&loyalty);

        publisher.publish(Username::from("alice"));
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(loyalty.decrement_attempts(), 1);
        assert_eq!(loyalty.reservation_count("alice"), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_retry_is_republished_with_fresh_timestamp() {
        let loyalty = InMemoryLoyaltyService::new().with_account("alice", 5);
        loyalty.fail_next_decrements(2);
        let publisher = start_worker(&loyalty);

        publisher.publish(Username::from("alice"));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(loyalty.decrement_attempts(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(loyalty.decrement_attempts(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(loyalty.decrement_attempts(), 3);
        assert_eq!(loyalty.reservation_count("alice"), Some(4));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(loyalty.decrement_attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_messages_are_retried_immediately() {
        let loyalty = InMemoryLoyaltyService::new().with_account("alice", 5);
        let (publisher, subscriber) = topic();

        publisher.publish(Username::from("alice"));
        tokio::time::sleep(Duration::from_secs(30)).await;

        DecrementRetryWorker::new(loyalty.clone(), publisher, subscriber, DEFAULT_RETRY_DELAY)
            .spawn();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(loyalty.decrement_attempts(), 1);
    }

    #[test]
    fn test_due_at_adds_delay() {
        let message = RetryMessage {
            username: Username::from("alice"),
            enqueued_at: Instant::now(),
        };
        assert_eq!(
            message.due_at(Duration::from_secs(10)) - message.enqueued_at,
            Duration::from_secs(10)
        );
    }
}
