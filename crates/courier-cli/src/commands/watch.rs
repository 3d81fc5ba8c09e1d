use super::utils::{build_client, build_session, format_failure, format_message};
use anyhow::{Context, Result};
use courier_application::{MessagingSession, StartOutcome, open_profile};
use courier_core::config::RootConfig;
use courier_core::message::{Conversation, TargetKind, normalize_content};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Type a message and press enter to send. Commands: /delete <id>, /refresh, /quit";

pub async fn run(config: &RootConfig, kind: TargetKind, name: &str, once: bool) -> Result<()> {
    let client = build_client(config)?;
    let (session, mut failures) = build_session(config, &client);

    let (profile, outcome) = open_profile(&session, client.as_ref(), kind, name)
        .await
        .with_context(|| format!("Failed to open conversation with {} {}", kind, name))?;

    match outcome {
        StartOutcome::Started => {}
        StartOutcome::SelfConversation => {
            println!("{} is you; there is no conversation to open.", profile.name);
            return Ok(());
        }
        StartOutcome::Cancelled => return Ok(()),
    }

    tracing::info!("[Watch] Watching {} {}", kind, profile.name);
    let mut snapshot = session.subscribe();
    println!("Conversation with {} {}", kind, profile.name);
    print_conversation(&snapshot.borrow_and_update());
    if once {
        session.terminate();
        return Ok(());
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshot.changed() => {
                if changed.is_err() {
                    break;
                }
                print_conversation(&snapshot.borrow_and_update());
            }
            Some(failure) = failures.recv() => eprintln!("{}", format_failure(&failure)),
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => {
                    if !handle_line(&session, line.trim()).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    session.terminate();
    tracing::info!("[Watch] Closed conversation with {} {}", kind, profile.name);
    Ok(())
}

/// Returns `false` when the user asked to quit.
async fn handle_line(session: &MessagingSession, line: &str) -> bool {
    let result = match line.split_once(' ').unwrap_or((line, "")) {
        ("/quit", _) => return false,
        ("/refresh", _) => session.refresh().await,
        ("/delete", id) => session.delete(id.trim()).await,
        _ => {
            // Local problems never reach the reporter
            if let Err(e) = normalize_content(line) {
                if !line.is_empty() {
                    eprintln!("! {}", e);
                }
                return true;
            }
            session.send(line).await.map(|_| ())
        }
    };

    // Remote failures are printed by the reporter channel
    if let Err(e) = result
        && e.is_invalid_state()
    {
        eprintln!("! {}", e);
    }
    true
}

fn print_conversation(conversation: &Conversation) {
    println!("--- {} message(s) ---", conversation.len());
    for message in conversation {
        println!("{}", format_message(message));
    }
}
