use super::utils::{build_client, build_session};
use anyhow::{Context, Result, bail};
use courier_application::{SendOutcome, StartOutcome, open_profile};
use courier_core::config::RootConfig;
use courier_core::message::{SendReceipt, TargetKind};

pub async fn run(config: &RootConfig, kind: TargetKind, name: &str, content: &str) -> Result<()> {
    let client = build_client(config)?;
    // The one-shot command reports through its return value
    let (session, _failures) = build_session(config, &client);

    let (profile, outcome) = open_profile(&session, client.as_ref(), kind, name)
        .await
        .with_context(|| format!("Failed to open conversation with {} {}", kind, name))?;
    match outcome {
        StartOutcome::Started => {}
        StartOutcome::SelfConversation => {
            bail!("{} is you; cannot send a message to yourself", profile.name)
        }
        StartOutcome::Cancelled => bail!("Conversation with {} was closed", profile.name),
    }

    let outcome = session
        .send(content)
        .await
        .with_context(|| format!("Failed to send message to {}", profile.name))?;
    session.terminate();

    match outcome {
        SendOutcome::Sent(SendReceipt::Created(message)) => {
            println!("Sent message {} to {}", message.id, profile.name)
        }
        SendOutcome::Sent(SendReceipt::Acknowledged) => {
            println!("Sent message to {}", profile.name)
        }
        SendOutcome::Skipped => println!("Nothing to send"),
    }
    Ok(())
}
