//! Change notifications for the search indexer.
//!
//! Publishing is best effort: a failed publish drops the connection, waits a
//! jittered delay, reconnects and tries again, up to `max_retries` extra
//! attempts. After that the message is logged and dropped.

use std::time::Duration;

use vvic_core::{IndexMessage, MessageQueue, QueueConnector, QueueError};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(500);

pub struct ChangeNotifier<C: QueueConnector> {
    connector: C,
    queue: Option<C::Queue>,
    index_queue: String,
    max_retries: u32,
    reconnect_delay: Duration,
}

impl<C: QueueConnector> ChangeNotifier<C> {
    #[must_use]
    pub fn new(connector: C, index_queue: impl Into<String>) -> Self {
        Self {
            connector,
            queue: None,
            index_queue: index_queue.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn index_queue(&self) -> &str {
        &self.index_queue
    }

    /// Publishes `message` to the index queue. Returns whether it was
    /// delivered; failures are logged, never returned.
    pub async fn publish(&mut self, message: &IndexMessage) -> bool {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(
                    listing_id = message.listing_id,
                    error = %err,
                    "could not encode index message"
                );
                return false;
            }
        };

        let mut attempt = 0u32;
        loop {
            match self.try_publish(&payload).await {
                Ok(()) => return true,
                Err(err) => {
                    if attempt >= self.max_retries {
                        tracing::error!(
                            listing_id = message.listing_id,
                            attempts = attempt + 1,
                            error = %err,
                            "index notification dropped"
                        );
                        return false;
                    }
                    attempt += 1;
                    let delay = jittered(self.reconnect_delay);
                    tracing::warn!(
                        listing_id = message.listing_id,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "index notification failed, reconnecting"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn try_publish(&mut self, payload: &str) -> Result<(), QueueError> {
        // A connection that failed once is dropped, not put back.
        let queue = match self.queue.take() {
            Some(queue) => queue,
            None => self.connector.connect().await?,
        };
        queue.declare_queue(&self.index_queue).await?;
        queue.publish(&self.index_queue, payload).await?;
        self.queue = Some(queue);
        Ok(())
    }
}

/// Scales `base` by a random factor in `[0.75, 1.25)`.
fn jittered(base: Duration) -> Duration {
    if base.is_zero() {
        return base;
    }
    base.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
}
