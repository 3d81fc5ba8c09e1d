//! Application layer: messaging sessions and their collaborators.

pub mod messaging_session;
pub mod profile_view;
pub mod reporter;

pub use messaging_session::{MessagingSession, SendOutcome, SessionState, StartOutcome};
pub use profile_view::open_profile;
pub use reporter::{ChannelReporter, FanoutReporter, SessionFailure, TracingReporter};
