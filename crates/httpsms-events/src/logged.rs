//! Idempotency wrapper around a listener.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::Event;
use httpsms_core::listener_log::EventListenerLog;
use httpsms_core::repository::EventListenerLogRepository;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::listener::EventListener;
use crate::panic::panic_message;

/// Runs a listener at most once per event id.
///
/// Before running, the wrapper looks up `(event id, listener name)` in the
/// listener log. A success record short-circuits. Otherwise the record is
/// saved as pending, the inner listener runs, and the outcome is saved as
/// success or failed. Failures are returned to the caller; nothing is
/// retried here.
pub struct LoggedListener {
    name: String,
    inner: Arc<dyn EventListener>,
    logs: Arc<dyn EventListenerLogRepository>,
    clock: Arc<dyn Clock>,
}

impl LoggedListener {
    /// Wraps `inner` under `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        inner: Arc<dyn EventListener>,
        logs: Arc<dyn EventListenerLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            inner,
            logs,
            clock,
        }
    }

    /// The listener name recorded in the log.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn save(&self, log: &EventListenerLog) -> Result<(), DomainError> {
        self.logs.save(log).await.inspect_err(|err| {
            error!(
                event_id = %log.event_id,
                listener = %log.listener_name,
                status = %log.status,
                error = %err,
                "cannot save listener log"
            );
        })
    }
}

#[async_trait]
impl EventListener for LoggedListener {
    #[instrument(skip_all, fields(event_id = %event.id(), listener = %self.name))]
    async fn handle(&self, cancel: &CancellationToken, event: &Event) -> Result<(), DomainError> {
        let existing = self
            .logs
            .find_by_event_and_listener(event.id(), &self.name)
            .await
            .inspect_err(|err| error!(error = %err, "cannot load listener log"))?;

        let mut log = match existing {
            Some(log) if log.is_success() => {
                debug!("event already handled by listener, skipping");
                return Ok(());
            }
            Some(mut log) => {
                log.retry(self.clock.now());
                log
            }
            None => EventListenerLog::pending(event.id(), self.name.clone(), self.clock.now()),
        };

        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        self.save(&log).await?;

        let outcome = AssertUnwindSafe(self.inner.handle(cancel, event))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(DomainError::Infrastructure(format!(
                    "listener panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        match outcome {
            Ok(()) => {
                log.succeed(self.clock.now());
                self.save(&log).await?;
                debug!("listener succeeded");
                Ok(())
            }
            Err(err) => {
                log.fail(err.to_string(), self.clock.now());
                if let Err(save_err) = self.save(&log).await {
                    debug!(error = %save_err, "returning listener error over log save error");
                }
                Err(err)
            }
        }
    }
}
