use anyhow::{Context, Result};
use courier_application::{
    ChannelReporter, FanoutReporter, MessagingSession, SessionFailure, TracingReporter,
};
use courier_core::config::RootConfig;
use courier_core::identity::{IdentityContext, StaticIdentity};
use courier_core::message::Message;
use courier_interaction::RestApiClient;
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn build_client(config: &RootConfig) -> Result<Arc<RestApiClient>> {
    let client =
        RestApiClient::from_settings(&config.server).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

/// A configured `viewer` skips the `GET /user` lookup.
pub fn identity(config: &RootConfig, client: &Arc<RestApiClient>) -> Arc<dyn IdentityContext> {
    match &config.server.viewer {
        Some(viewer) => {
            Arc::new(StaticIdentity::new(viewer.clone())) as Arc<dyn IdentityContext>
        }
        None => Arc::clone(client) as Arc<dyn IdentityContext>,
    }
}

/// Builds a session whose failures are both logged and forwarded to the terminal.
pub fn build_session(
    config: &RootConfig,
    client: &Arc<RestApiClient>,
) -> (MessagingSession, mpsc::UnboundedReceiver<SessionFailure>) {
    let (channel, failures) = ChannelReporter::channel();
    let reporter = FanoutReporter::new()
        .with(Arc::new(TracingReporter))
        .with(Arc::new(channel));

    let session = MessagingSession::new(
        client.clone(),
        identity(config, client),
        Arc::new(reporter),
        config.session.clone(),
    );
    (session, failures)
}

pub fn format_message(message: &Message) -> String {
    format!(
        "[{}] {} ({}): {}",
        message.created_at.format("%Y-%m-%d %H:%M"),
        message.author,
        message.id,
        message.content
    )
}

pub fn format_failure(failure: &SessionFailure) -> String {
    format!("! {} failed: {}", failure.origin, failure.error)
}
