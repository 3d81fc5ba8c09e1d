//! Messaging session implementation.
//!
//! A `MessagingSession` drives one profile view's conversation: it loads the
//! conversation for a target, keeps it fresh with a recurring poll, sends
//! and deletes messages, and releases its poll task when the view goes away.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start--> Loading --first fetch ok--> Active
//!   \                \                          |
//!    \                \--terminate--\           | terminate
//!     \--terminate-------------------> Terminated <-/
//! ```
//!
//! The poll task is the only background work a session owns. Its handle is
//! stored in a single field and only created while that field is empty, so
//! a session never runs two timers.

use courier_core::config::SessionSettings;
use courier_core::identity::IdentityContext;
use courier_core::message::{
    Conversation, MessageApi, SendReceipt, Target, TargetKind, normalize_content,
};
use courier_core::report::{ErrorReporter, FailureOrigin};
use courier_core::{CourierError, Result};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a messaging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No target yet
    Idle,
    /// Target resolved, first fetch in flight (or failed and awaiting `refresh`)
    Loading,
    /// Polling; sends permitted
    Active,
    /// View deactivated; nothing runs anymore
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Loading => "Loading",
            SessionState::Active => "Active",
            SessionState::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

/// How a call to `start` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session is active and polling
    Started,
    /// The target is the viewer; no conversation was opened
    SelfConversation,
    /// The session was terminated while loading
    Cancelled,
}

/// How a call to `send` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(SendReceipt),
    /// Blank content; nothing was sent
    Skipped,
}

struct SessionData {
    state: SessionState,
    target: Option<Target>,
    /// Text the user is composing
    draft: String,
    poll: Option<JoinHandle<()>>,
}

/// State shared between the session handle and its poll task.
struct Shared {
    api: Arc<dyn MessageApi>,
    reporter: Arc<dyn ErrorReporter>,
    data: Mutex<SessionData>,
    /// Latest conversation; replaced wholesale, never merged
    snapshot: watch::Sender<Conversation>,
    shutdown: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the conversation and stores it if the session is still active.
    ///
    /// Failures are reported and returned; they never change the state.
    async fn refresh_snapshot(&self, target: &Target, origin: FailureOrigin) -> Result<()> {
        match self.api.fetch_messages(target).await {
            Ok(conversation) => {
                let data = self.lock();
                if data.state == SessionState::Active {
                    tracing::debug!(
                        "[MessagingSession] {} snapshot updated ({} messages)",
                        target,
                        conversation.len()
                    );
                    self.snapshot.send_replace(conversation);
                } else {
                    tracing::debug!(
                        "[MessagingSession] Discarding {} result for {} session",
                        origin,
                        data.state
                    );
                }
                Ok(())
            }
            Err(e) => {
                self.reporter.report(origin, target, &e);
                Err(e)
            }
        }
    }
}

/// Client-side orchestration of one profile view's messaging.
///
/// Dropping the session terminates it.
pub struct MessagingSession {
    shared: Arc<Shared>,
    identity: Arc<dyn IdentityContext>,
    settings: SessionSettings,
}

impl MessagingSession {
    /// Creates an idle session.
    ///
    /// # Arguments
    ///
    /// * `api` - Remote message resource
    /// * `identity` - Viewer identity, used to refuse self-conversations
    /// * `reporter` - Sink for failures that do not end the session
    /// * `settings` - Poll period and first-load retry policy
    pub fn new(
        api: Arc<dyn MessageApi>,
        identity: Arc<dyn IdentityContext>,
        reporter: Arc<dyn ErrorReporter>,
        settings: SessionSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(Conversation::new());
        Self {
            shared: Arc::new(Shared {
                api,
                reporter,
                data: Mutex::new(SessionData {
                    state: SessionState::Idle,
                    target: None,
                    draft: String::new(),
                    poll: None,
                }),
                snapshot,
                shutdown: CancellationToken::new(),
            }),
            identity,
            settings,
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    pub fn target(&self) -> Option<Target> {
        self.shared.lock().target.clone()
    }

    /// Latest fetched conversation.
    pub fn snapshot(&self) -> Conversation {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver notified every time the snapshot is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.shared.snapshot.subscribe()
    }

    pub fn draft(&self) -> String {
        self.shared.lock().draft.clone()
    }

    /// Records what the user is composing.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.shared.lock().draft = text.into();
    }

    /// Whether a poll task is currently alive.
    pub fn poll_active(&self) -> bool {
        self.shared
            .lock()
            .poll
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Opens the conversation with `target`.
    ///
    /// Valid only in `Idle`. Returns `SelfConversation` without leaving
    /// `Idle` when a user target is the viewer; group targets skip the
    /// identity lookup. Termination while starting yields `Cancelled`.
    /// The first fetch is retried per `SessionSettings`; if every attempt
    /// fails the last error is returned and the session stays in `Loading` until `refresh` or `terminate`.
    pub async fn start(&self, target: Target) -> Result<StartOutcome> {
        let state = self.state();
        if state != SessionState::Idle {
            return Err(CourierError::invalid_state("start", state));
        }

        // Only a user can be the viewer; groups never need the lookup
        if target.kind == TargetKind::User {
            let viewer = self.identity.viewer_username().await?;
            if target.is_viewer(&viewer) {
                tracing::info!(
                    "[MessagingSession] {} is the viewer, not opening a conversation",
                    target
                );
                return Ok(StartOutcome::SelfConversation);
            }
        }

        {
            let mut data = self.shared.lock();
            // Terminate or a concurrent start may have run during the identity lookup
            match data.state {
                SessionState::Idle => {}
                SessionState::Terminated => return Ok(StartOutcome::Cancelled),
                state => return Err(CourierError::invalid_state("start", state)),
            }
            data.state = SessionState::Loading;
            data.target = Some(target.clone());
        }
        tracing::info!("[MessagingSession] Loading conversation with {}", target);

        self.load_initial(&target).await
    }

    /// Fetches the conversation out of cycle.
    ///
    /// In `Active` this refreshes the snapshot; in `Loading` it re-runs the
    /// first load.
    pub async fn refresh(&self) -> Result<()> {
        let (state, target) = {
            let data = self.shared.lock();
            (data.state, data.target.clone())
        };

        match (state, target) {
            (SessionState::Active, Some(target)) => {
                self.shared
                    .refresh_snapshot(&target, FailureOrigin::Refresh)
                    .await
            }
            (SessionState::Loading, Some(target)) => {
                self.load_initial(&target).await.map(|_| ())
            }
            (state, _) => Err(CourierError::invalid_state("refresh", state)),
        }
    }

    /// Sends `content` to the target.
    ///
    /// Blank content is skipped without touching the draft or the server.
    /// Otherwise `content` becomes the draft and its trimmed form is sent;
    /// on success the draft is cleared and the conversation refreshed at
    /// once, on failure the draft is kept so the user can retry.
    pub async fn send(&self, content: &str) -> Result<SendOutcome> {
        if content.trim().is_empty() {
            tracing::debug!("[MessagingSession] Ignoring blank message");
            return Ok(SendOutcome::Skipped);
        }
        let target = self.require_active("send")?;
        self.set_draft(content);
        self.dispatch(target, content).await
    }

    /// Sends the current draft (see `send`).
    pub async fn send_draft(&self) -> Result<SendOutcome> {
        let draft = self.draft();
        if draft.trim().is_empty() {
            tracing::debug!("[MessagingSession] Ignoring blank draft");
            return Ok(SendOutcome::Skipped);
        }
        let target = self.require_active("send")?;
        self.dispatch(target, &draft).await
    }

    /// Deletes a message and refreshes the conversation.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let target = self.require_active("delete")?;

        if let Err(e) = self.shared.api.delete_message(id).await {
            self.shared.reporter.report(FailureOrigin::Delete, &target, &e);
            return Err(e);
        }
        tracing::info!("[MessagingSession] Deleted message {} in {}", id, target);

        // Refresh failures are already reported; the delete itself succeeded
        let _ = self
            .shared
            .refresh_snapshot(&target, FailureOrigin::Refresh)
            .await;
        Ok(())
    }

    /// Ends the session and releases its poll task.
    ///
    /// Idempotent: only the first call has any effect.
    pub fn terminate(&self) {
        let (previous, poll) = {
            let mut data = self.shared.lock();
            if data.state == SessionState::Terminated {
                return;
            }
            let previous = data.state;
            data.state = SessionState::Terminated;
            (previous, data.poll.take())
        };

        self.shared.shutdown.cancel();
        if let Some(handle) = poll {
            handle.abort();
        }
        tracing::info!("[MessagingSession] Terminated (was {})", previous);
    }

    fn require_active(&self, operation: &'static str) -> Result<Target> {
        let data = self.shared.lock();
        match (&data.state, &data.target) {
            (SessionState::Active, Some(target)) => Ok(target.clone()),
            (state, _) => Err(CourierError::invalid_state(operation, state)),
        }
    }

    async fn dispatch(&self, target: Target, content: &str) -> Result<SendOutcome> {
        let content = normalize_content(content)?;

        match self.shared.api.send_message(&target, content).await {
            Ok(receipt) => {
                self.shared.lock().draft.clear();
                tracing::info!("[MessagingSession] Sent message to {}", target);

                // Refresh failures are already reported; the send itself succeeded
                let _ = self
                    .shared
                    .refresh_snapshot(&target, FailureOrigin::Refresh)
                    .await;
                Ok(SendOutcome::Sent(receipt))
            }
            Err(e) => {
                self.shared.reporter.report(FailureOrigin::Send, &target, &e);
                Err(e)
            }
        }
    }

    /// Runs the bounded first-load retry loop and activates on success.
    async fn load_initial(&self, target: &Target) -> Result<StartOutcome> {
        let attempts = self.settings.initial_load_attempts.max(1);
        let shutdown = &self.shared.shutdown;
        let mut last_error = None;

        for attempt in 1..=attempts {
            let result = tokio::select! {
                _ = shutdown.cancelled() => return Ok(StartOutcome::Cancelled),
                result = self.shared.api.fetch_messages(target) => result,
            };

            match result {
                Ok(conversation) => return Ok(self.activate(target, conversation)),
                Err(e) => {
                    tracing::debug!(
                        "[MessagingSession] Initial load of {} failed (attempt {}/{})",
                        target,
                        attempt,
                        attempts
                    );
                    self.shared
                        .reporter
                        .report(FailureOrigin::InitialLoad, target, &e);
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(StartOutcome::Cancelled),
                    _ = tokio::time::sleep(self.settings.initial_load_retry_delay()) => {}
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CourierError::internal("initial load made no attempt")))
    }

    /// Moves `Loading` to `Active` and schedules the poll task.
    fn activate(&self, target: &Target, conversation: Conversation) -> StartOutcome {
        let mut data = self.shared.lock();
        if data.state != SessionState::Loading {
            // Terminated mid-flight, or a concurrent load got here first
            return if data.state == SessionState::Active {
                StartOutcome::Started
            } else {
                StartOutcome::Cancelled
            };
        }

        data.state = SessionState::Active;
        self.shared.snapshot.send_replace(conversation);

        if data.poll.is_none() {
            data.poll = Some(tokio::spawn(run_poll_loop(
                Arc::clone(&self.shared),
                target.clone(),
                self.settings.poll_interval(),
            )));
        }

        tracing::info!(
            "[MessagingSession] Conversation with {} active ({}s poll interval)",
            target,
            self.settings.poll_interval().as_secs()
        );
        StartOutcome::Started
    }
}

impl Drop for MessagingSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Recurring fetch of the conversation until the session shuts down.
///
/// A tick waits for the previous fetch to finish; ticks missed meanwhile
/// are delayed rather than fired in a burst.
async fn run_poll_loop(shared: Arc<Shared>, target: Target, period: Duration) {
    let shutdown = shared.shutdown.clone();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tracing::debug!("[MessagingSession] Tick - fetching {}", target);

        tokio::select! {
            _ = shutdown.cancelled() => break,
            // Failures are reported inside; polling carries on regardless
            _ = shared.refresh_snapshot(&target, FailureOrigin::PollTick) => {}
        }
    }

    tracing::debug!("[MessagingSession] Poll loop for {} stopped", target);
}
