//! Viewer identity.
//!
//! The identity context tells a messaging session who is looking at the
//! profile, so it can refuse to open a conversation with oneself.

use crate::error::Result;
use async_trait::async_trait;

/// Supplies the identity of the current viewer.
#[async_trait]
pub trait IdentityContext: Send + Sync {
    /// Returns the viewer's username.
    async fn viewer_username(&self) -> Result<String>;
}

/// Identity fixed at construction time.
///
/// Suitable when the surrounding shell already knows the logged-in user
/// (for example from configuration).
///
/// # Example
///
/// ```
/// use courier_core::identity::{IdentityContext, StaticIdentity};
///
/// # tokio_test_block(async {
/// let identity = StaticIdentity::new("alice");
/// assert_eq!(identity.viewer_username().await.unwrap(), "alice");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    username: String,
}

impl StaticIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[async_trait]
impl IdentityContext for StaticIdentity {
    async fn viewer_username(&self) -> Result<String> {
        Ok(self.username.clone())
    }
}
