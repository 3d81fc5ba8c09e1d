//! Message API abstraction.

use super::model::{Conversation, SendReceipt, Target};
use crate::error::Result;
use async_trait::async_trait;

/// Remote access to the `message` resource.
///
/// Implementations perform no retries; every failure is returned to the
/// caller, who decides what to do with it.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Fetches the full conversation for a target.
    ///
    /// Read-only and idempotent. Fails with `NotFound` if the target is
    /// unknown and `Transport` on network failure.
    async fn fetch_messages(&self, target: &Target) -> Result<Conversation>;

    /// Sends a message to a target.
    ///
    /// `content` must be non-empty after trimming; implementations reject it
    /// with `Validation` otherwise. Fails with `Authorization` if the viewer
    /// may not message the target.
    async fn send_message(&self, target: &Target, content: &str) -> Result<SendReceipt>;

    /// Deletes a message by id.
    async fn delete_message(&self, id: &str) -> Result<()>;
}
