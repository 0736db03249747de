//! Recording final outcomes for individual recipients.
//!
//! A recipient is only marked completed after its record has been appended
//! to the defer or bounce log. When the log refuses the record the recipient
//! stays pending, so a later attempt records it instead of losing it.

use std::{sync::Arc, time::SystemTime};

use ferry_common::{internal, tracing::info};

use crate::{
    classify::Disposition,
    error::{DeliveryError, LogError, QueueError},
    request::{DeliveryRequest, QueueId, TraceFlags},
    state::AttemptStatus,
};

/// One entry in a defer or bounce log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord<'a> {
    pub trace_flags: TraceFlags,
    pub queue_id: &'a QueueId,
    pub original: &'a str,
    pub address: &'a str,
    pub offset: u64,
    /// The remote peer the reason came from, `none` without a session
    pub peer: &'a str,
    pub arrival_time: SystemTime,
    pub reason: &'a str,
}

/// An append-only log of per-recipient outcomes.
///
/// Concurrent attempts share one log; every append must land as a single
/// record.
pub trait StatusLog: Send + Sync {
    /// Append `record` to the log.
    ///
    /// # Errors
    /// Returns an error when the record was not durably written.
    fn append(&self, record: &StatusRecord<'_>) -> Result<(), LogError>;
}

/// The persisted queue file, as far as recipient completion is concerned.
pub trait QueueTracker: Send + Sync {
    /// Mark the recipient at `offset` as done so it is not retried.
    ///
    /// # Errors
    /// Returns an error when the queue file could not be updated.
    fn mark_delivered(&self, queue_id: &QueueId, offset: u64) -> Result<(), QueueError>;
}

/// Appends outcomes to the defer and bounce logs and keeps the recipient
/// ledger and queue file in step with them.
#[derive(Clone)]
pub struct OutcomeRecorder {
    defer_log: Arc<dyn StatusLog>,
    bounce_log: Arc<dyn StatusLog>,
    queue: Arc<dyn QueueTracker>,
    soft_bounce: bool,
}

impl std::fmt::Debug for OutcomeRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeRecorder")
            .field("soft_bounce", &self.soft_bounce)
            .finish_non_exhaustive()
    }
}

impl OutcomeRecorder {
    #[must_use]
    pub fn new(
        defer_log: Arc<dyn StatusLog>,
        bounce_log: Arc<dyn StatusLog>,
        queue: Arc<dyn QueueTracker>,
    ) -> Self {
        Self {
            defer_log,
            bounce_log,
            queue,
            soft_bounce: false,
        }
    }

    /// Send would-be bounces to the defer log instead.
    #[must_use]
    pub fn with_soft_bounce(mut self, soft_bounce: bool) -> Self {
        self.soft_bounce = soft_bounce;
        self
    }

    /// Record a temporary failure for the recipient at `index`.
    pub fn dispose_soft(
        &self,
        request: &mut DeliveryRequest,
        index: usize,
        peer: &str,
        reason: &str,
    ) -> AttemptStatus {
        self.dispose(Disposition::Defer, request, index, peer, reason)
    }

    /// Record a permanent failure for the recipient at `index`.
    pub fn dispose_hard(
        &self,
        request: &mut DeliveryRequest,
        index: usize,
        peer: &str,
        reason: &str,
    ) -> AttemptStatus {
        self.dispose(Disposition::Bounce, request, index, peer, reason)
    }

    /// Record `disposition` for the recipient at `index`, returning the bits
    /// to OR into the attempt status. Completed recipients are skipped.
    pub fn dispose(
        &self,
        disposition: Disposition,
        request: &mut DeliveryRequest,
        index: usize,
        peer: &str,
        reason: &str,
    ) -> AttemptStatus {
        if !request.recipients.is_pending(index) {
            internal!(
                level = DEBUG,
                queue_id = %request.queue_id,
                index,
                "Recipient already has an outcome on record, not disposing again"
            );
            return AttemptStatus::OK;
        }

        let disposition = self.effective(disposition);
        let result = self.record(disposition, request, index, peer, reason);

        match result {
            Ok(()) => {
                request.recipients.mark_completed(index);
                AttemptStatus::OK
            }
            Err(DeliveryError::Queue(error)) => {
                // The record is in the log already; retrying would log it twice.
                request.recipients.mark_completed(index);
                internal!(
                    level = WARN,
                    queue_id = %request.queue_id,
                    error = %error,
                    "Outcome logged but the queue file was not updated"
                );
                AttemptStatus::QUEUE_UPDATE_FAILED
            }
            Err(error) => {
                internal!(
                    level = WARN,
                    queue_id = %request.queue_id,
                    error = %error,
                    "Unable to log {disposition} outcome, recipient stays pending"
                );
                AttemptStatus::LEDGER_FAILED
            }
        }
    }

    const fn effective(&self, disposition: Disposition) -> Disposition {
        match disposition {
            Disposition::Bounce if self.soft_bounce => Disposition::Defer,
            other => other,
        }
    }

    const fn log(&self, disposition: Disposition) -> &Arc<dyn StatusLog> {
        match disposition {
            Disposition::Defer => &self.defer_log,
            Disposition::Bounce => &self.bounce_log,
        }
    }

    fn record(
        &self,
        disposition: Disposition,
        request: &DeliveryRequest,
        index: usize,
        peer: &str,
        reason: &str,
    ) -> Result<(), DeliveryError> {
        let Some(recipient) = request.recipients.get(index) else {
            return Ok(());
        };

        self.log(disposition).append(&StatusRecord {
            trace_flags: request.trace_flags,
            queue_id: &request.queue_id,
            original: &recipient.original,
            address: &recipient.address,
            offset: recipient.offset,
            peer,
            arrival_time: request.arrival_time,
            reason,
        })?;

        info!(
            queue_id = %request.queue_id,
            to = %recipient.address,
            relay = %peer,
            status = %disposition,
            "{reason}"
        );

        self.queue
            .mark_delivered(&request.queue_id, recipient.offset)?;

        Ok(())
    }
}
