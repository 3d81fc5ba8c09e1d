//! Message domain module.
//!
//! # Module Structure
//!
//! - `model`: targets, messages and content rules
//! - `api`: the `MessageApi` trait implemented by remote clients

mod api;
mod model;

pub use api::MessageApi;
pub use model::{
    Conversation, MAX_CONTENT_LENGTH, Message, SendReceipt, Target, TargetKind, normalize_content,
    validate_message_id,
};
