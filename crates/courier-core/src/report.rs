//! Failure reporting.
//!
//! Failures that do not end a messaging session (a failed poll tick, a
//! rejected send) are handed to an `ErrorReporter` so that a UI or a log
//! can surface them.

use crate::error::CourierError;
use crate::message::Target;
use serde::Serialize;
use std::fmt;

/// The session operation a reported failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    /// A fetch attempt before the session became active
    InitialLoad,
    /// A scheduled poll tick
    PollTick,
    /// An out-of-cycle refresh (after send/delete or on request)
    Refresh,
    Send,
    Delete,
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureOrigin::InitialLoad => "initial_load",
            FailureOrigin::PollTick => "poll_tick",
            FailureOrigin::Refresh => "refresh",
            FailureOrigin::Send => "send",
            FailureOrigin::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Observability sink for non-fatal session failures.
///
/// Called from inside the session's poll task, so implementations must not
/// block.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, origin: FailureOrigin, target: &Target, error: &CourierError);
}

/// A reporter that discards everything.
pub struct NoOpReporter;

impl ErrorReporter for NoOpReporter {
    fn report(&self, _origin: FailureOrigin, _target: &Target, _error: &CourierError) {}
}
