//! Profile resources.
//!
//! Only the canonical name of a profile matters to messaging: it becomes the
//! name of the conversation target.

use crate::error::Result;
use crate::message::{Target, TargetKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A user or group profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub kind: TargetKind,
    /// Canonical username or group name as reported by the server
    pub name: String,
    pub email: Option<String>,
}

impl Profile {
    /// The conversation target this profile designates.
    pub fn target(&self) -> Target {
        Target::new(self.name.clone(), self.kind)
    }
}

/// Remote access to the `user` and `group` profile resources.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Loads the profile identified by `identifier` (username or group name).
    async fn fetch_profile(&self, kind: TargetKind, identifier: &str) -> Result<Profile>;
}
