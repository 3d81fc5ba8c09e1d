//! Error reporters for messaging sessions.
//!
//! - `TracingReporter` turns failures into structured `tracing` events
//! - `ChannelReporter` forwards them to a UI (toast, status line) over a channel
//! - `FanoutReporter` sends one failure to several reporters

use courier_core::CourierError;
use courier_core::message::Target;
use courier_core::report::{ErrorReporter, FailureOrigin};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Logs every failure as a `tracing` warning.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, origin: FailureOrigin, target: &Target, error: &CourierError) {
        tracing::warn!(
            target: "courier::session",
            origin = %origin,
            target_name = %target.name,
            target_kind = %target.kind,
            transient = error.is_transient(),
            "[MessagingSession] {} failed for {}: {}",
            origin,
            target,
            error
        );
    }
}

/// Failure event sent to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionFailure {
    pub origin: FailureOrigin,
    pub target: Target,
    pub error: CourierError,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
}

/// Forwards failures over an unbounded channel.
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<SessionFailure>,
}

impl ChannelReporter {
    /// Create a new reporter with the given channel sender
    pub fn new(sender: mpsc::UnboundedSender<SessionFailure>) -> Self {
        Self { sender }
    }

    /// Create a reporter together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionFailure>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl ErrorReporter for ChannelReporter {
    fn report(&self, origin: FailureOrigin, target: &Target, error: &CourierError) {
        let failure = SessionFailure {
            origin,
            target: target.clone(),
            error: error.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Non-blocking send - if the receiver is dropped, we just skip
        let _ = self.sender.send(failure);
    }
}

/// Reports each failure to every inner reporter, in order.
#[derive(Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn ErrorReporter>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl ErrorReporter for FanoutReporter {
    fn report(&self, origin: FailureOrigin, target: &Target, error: &CourierError) {
        for reporter in &self.reporters {
            reporter.report(origin, target, error);
        }
    }
}
