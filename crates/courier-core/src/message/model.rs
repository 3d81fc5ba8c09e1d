//! Message domain model.

use crate::error::{CourierError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum message length accepted by the server, in characters.
pub const MAX_CONTENT_LENGTH: usize = 4000;

/// Kind of conversation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetKind {
    /// Direct conversation between the viewer and another user
    User,
    /// Group chat
    Group,
}

impl TargetKind {
    /// Wire name used by the `type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::User => "USER",
            TargetKind::Group => "GROUP",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(TargetKind::User),
            "GROUP" => Ok(TargetKind::Group),
            other => Err(CourierError::validation(format!(
                "Invalid message type: {other}"
            ))),
        }
    }
}

/// An addressable conversation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Username or group name
    pub name: String,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::User)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Group)
    }

    /// Whether this target designates the given viewer's own direct conversation.
    pub fn is_viewer(&self, viewer: &str) -> bool {
        self.kind == TargetKind::User && self.name == viewer
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// A single message as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Username of the sender
    pub author: String,
    pub author_email: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Server-ordered list of messages for one target.
///
/// The client never merges conversations; each fetch replaces the previous one.
pub type Conversation = Vec<Message>;

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReceipt {
    /// The backend echoed the created message
    Created(Message),
    /// The backend only acknowledged the request
    Acknowledged,
}

/// Trims the content and checks it against the server limits.
///
/// Returns the trimmed content that should go on the wire.
pub fn normalize_content(content: &str) -> Result<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CourierError::validation("content is required"));
    }
    let length = trimmed.chars().count();
    if length > MAX_CONTENT_LENGTH {
        return Err(CourierError::validation(format!(
            "content must be at most {MAX_CONTENT_LENGTH} characters (got {length})"
        )));
    }
    Ok(trimmed)
}

/// Checks a message id against the server route pattern `[a-z0-9-]+`.
pub fn validate_message_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CourierError::validation(format!("Invalid message id: {id:?}")))
    }
}
