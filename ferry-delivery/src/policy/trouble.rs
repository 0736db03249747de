use core::fmt::Display;
use std::sync::Arc;

use ferry_common::{Status, internal, remote, tracing::info};
use tracing::instrument;

use super::{AttemptOver, StreamFault};
use crate::{
    classify::{self, Disposition},
    config::PolicyConfig,
    error::PolicyError,
    recorder::{OutcomeRecorder, QueueTracker, StatusLog},
    request::SmtpSession,
    state::{AttemptStatus, DeliveryAttempt, DeliveryState, ErrorMask},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Host,
    Message,
}

/// Decides what happens to the recipients of a delivery attempt when the
/// remote exchanger, the message or a single recipient runs into trouble.
///
/// A soft error while other exchangers may still be tried leaves every
/// recipient alone. Anything else, or any error once the final exchanger
/// is being tried, records an outcome for each recipient in scope.
///
/// One policy can be shared between any number of concurrent attempts.
#[derive(Debug, Clone)]
pub struct FailurePolicy {
    config: PolicyConfig,
    recorder: OutcomeRecorder,
}

impl FailurePolicy {
    #[must_use]
    pub fn new(
        config: PolicyConfig,
        defer_log: Arc<dyn StatusLog>,
        bounce_log: Arc<dyn StatusLog>,
        queue: Arc<dyn QueueTracker>,
    ) -> Self {
        let recorder =
            OutcomeRecorder::new(defer_log, bounce_log, queue).with_soft_bounce(config.soft_bounce);

        Self { config, recorder }
    }

    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// The exchanger failed before any message-specific exchange, e.g. it
    /// refused the connection or rejected the greeting.
    ///
    /// Works without a session; log records then name the peer `none`.
    #[instrument(level = "trace", skip_all, fields(queue_id = %attempt.request.queue_id, code = code))]
    pub fn host_failure(
        &self,
        attempt: &mut DeliveryAttempt<'_>,
        code: u32,
        reason: impl Display,
    ) -> AttemptOver {
        self.fail_all(attempt, Scope::Host, code, &reason.to_string());
        AttemptOver
    }

    /// The exchanger rejected the message as a whole, e.g. at `MAIL FROM`
    /// or after the message content.
    ///
    /// # Errors
    /// [`PolicyError::NoSession`] when the attempt has no session, in which
    /// case nothing is changed.
    #[instrument(level = "trace", skip_all, fields(queue_id = %attempt.request.queue_id, code = code))]
    pub fn message_failure(
        &self,
        attempt: &mut DeliveryAttempt<'_>,
        code: u32,
        reason: impl Display,
    ) -> Result<AttemptOver, PolicyError> {
        if attempt.session.is_none() {
            return Err(PolicyError::NoSession);
        }

        self.fail_all(attempt, Scope::Message, code, &reason.to_string());
        Ok(AttemptOver)
    }

    /// The exchanger rejected the recipient at `index`.
    ///
    /// Only that recipient is affected and the attempt carries on with the
    /// rest, so the final server flag is left as it is. A soft rejection
    /// while other exchangers remain is only logged, with or without a
    /// session.
    ///
    /// # Errors
    /// [`PolicyError::UnknownRecipient`] for an index outside the request,
    /// and [`PolicyError::NoSession`] when an outcome has to be recorded but
    /// the attempt has no session. Nothing is changed in either case.
    #[instrument(level = "trace", skip_all, fields(queue_id = %attempt.request.queue_id, code = code, index = index))]
    pub fn recipient_failure(
        &self,
        attempt: &mut DeliveryAttempt<'_>,
        code: u32,
        index: usize,
        reason: impl Display,
    ) -> Result<(), PolicyError> {
        if index >= attempt.request.recipients.len() {
            return Err(PolicyError::UnknownRecipient(index));
        }

        let severity = classify::classify(code);
        let skipping = severity.is_soft() && !attempt.state.is_final_server();

        // The peer only ends up in a log record when the recipient is disposed.
        let peer = if skipping {
            None
        } else {
            Some(
                attempt
                    .session
                    .as_ref()
                    .map(SmtpSession::label)
                    .ok_or(PolicyError::NoSession)?,
            )
        };

        Self::check_code(&mut attempt.state, code);

        if !attempt.request.recipients.is_pending(index) {
            internal!(
                level = DEBUG,
                queue_id = %attempt.request.queue_id,
                index,
                "Recipient already has an outcome on record, ignoring failure"
            );
            return Ok(());
        }

        let reason = reason.to_string();

        match peer {
            None => {
                info!(queue_id = %attempt.request.queue_id, "{reason}");
                attempt.state.add_status(AttemptStatus::INCOMPLETE);
            }
            Some(peer) => {
                let residual = self.recorder.dispose(
                    severity.disposition(),
                    attempt.request,
                    index,
                    &peer,
                    &reason,
                );
                attempt.state.add_status(residual);
            }
        }

        Ok(())
    }

    /// The stream layer lost the connection or timed out while `stage`.
    ///
    /// # Errors
    /// [`PolicyError::NoSession`] when the attempt has no session, in which
    /// case nothing is changed.
    #[instrument(level = "trace", skip_all, fields(queue_id = %attempt.request.queue_id, fault = %fault))]
    pub fn stream_exception(
        &self,
        attempt: &mut DeliveryAttempt<'_>,
        fault: StreamFault,
        stage: &str,
    ) -> Result<AttemptOver, PolicyError> {
        let peer = attempt
            .session
            .as_ref()
            .map(SmtpSession::label)
            .ok_or(PolicyError::NoSession)?;

        let reason = fault.reason(&peer, stage);

        if attempt.state.is_final_server() {
            for index in attempt.request.recipients.pending_indices() {
                let residual = self
                    .recorder
                    .dispose_soft(attempt.request, index, &peer, &reason);
                attempt.state.add_status(residual);
            }
        } else {
            info!(queue_id = %attempt.request.queue_id, "{reason}");
            attempt.state.add_status(AttemptStatus::INCOMPLETE);
        }

        Ok(AttemptOver)
    }

    /// [`Self::stream_exception`] for a raw stream layer error code.
    ///
    /// # Errors
    /// [`PolicyError::UnknownStreamFault`] for a code the stream layer never
    /// produces. This is a broken contract between the layers and callers
    /// should treat it as fatal. Nothing is changed.
    pub fn stream_exception_code(
        &self,
        attempt: &mut DeliveryAttempt<'_>,
        code: i32,
        stage: &str,
    ) -> Result<AttemptOver, PolicyError> {
        let fault = StreamFault::try_from(code)?;
        self.stream_exception(attempt, fault, stage)
    }

    fn fail_all(&self, attempt: &mut DeliveryAttempt<'_>, scope: Scope, code: u32, reason: &str) {
        let severity = classify::classify(code);

        if severity.is_soft() && !attempt.state.is_final_server() {
            // Another exchanger may still take the message.
            info!(queue_id = %attempt.request.queue_id, "{reason}");
            attempt.state.add_status(AttemptStatus::INCOMPLETE);
        } else {
            let peer = attempt.session_label();
            let disposition = severity.disposition();

            for index in attempt.request.recipients.pending_indices() {
                let residual =
                    self.recorder
                        .dispose(disposition, attempt.request, index, &peer, reason);
                attempt.state.add_status(residual);
            }

            if scope == Scope::Host && disposition == Disposition::Defer {
                attempt.request.latch_hop_status(reason);
            }

            attempt.state.mark_final_server();
        }

        Self::check_code(&mut attempt.state, code);
    }

    fn check_code(state: &mut DeliveryState, code: u32) {
        if classify::is_anomalous(code) {
            remote!(
                level = DEBUG,
                status = ?Status::from(code),
                "Reply code points at a protocol error"
            );
            state.flag_error(ErrorMask::PROTOCOL);
        }
    }
}
