//! Profile view glue.
//!
//! A profile view resolves its profile first and only then knows which
//! conversation to open; this is the trigger that moves a session out of
//! `Idle`.

use crate::messaging_session::{MessagingSession, StartOutcome};
use courier_core::Result;
use courier_core::message::TargetKind;
use courier_core::profile::{Profile, ProfileApi};

/// Loads a profile and opens the conversation with its canonical name.
///
/// The session stays `Idle` if the profile cannot be loaded.
pub async fn open_profile(
    session: &MessagingSession,
    profiles: &dyn ProfileApi,
    kind: TargetKind,
    identifier: &str,
) -> Result<(Profile, StartOutcome)> {
    let profile = profiles.fetch_profile(kind, identifier).await?;
    tracing::debug!(
        "[ProfileView] Resolved {} {} to {}",
        kind,
        identifier,
        profile.name
    );

    let outcome = session.start(profile.target()).await?;
    Ok((profile, outcome))
}
