//! Wire formats of the document server's REST API.

use chrono::DateTime;
use courier_core::CourierError;
use courier_core::message::Message;
use serde::{Deserialize, Serialize};

/// Body of `GET /message`.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageListResponse {
    pub messages: Vec<MessageDto>,
}

/// One entry of a message list.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageDto {
    pub id: String,
    pub content: String,
    pub creator_name: String,
    #[serde(default)]
    pub creator_email: Option<String>,
    /// Epoch milliseconds
    pub create_date: i64,
}

impl TryFrom<MessageDto> for Message {
    type Error = CourierError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        let created_at =
            DateTime::from_timestamp_millis(dto.create_date).ok_or_else(|| {
                CourierError::Serialization {
                    format: "JSON".to_string(),
                    message: format!(
                        "create_date {} of message {} is out of range",
                        dto.create_date, dto.id
                    ),
                }
            })?;

        Ok(Message {
            id: dto.id,
            author: dto.creator_name,
            author_email: dto.creator_email,
            content: dto.content,
            created_at,
        })
    }
}

/// Form body of `PUT /message`.
#[derive(Debug, Serialize)]
pub(crate) struct SendMessageForm<'a> {
    pub target_name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: &'a str,
}

/// Body of `PUT /message`.
///
/// The reference server answers `{"status": "ok"}`; backends that echo the
/// created message are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SendMessageResponse {
    Created(MessageDto),
    Status {
        #[allow(dead_code)]
        status: String,
    },
}

/// Body of `GET /user/{username}` and `GET /user`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Body of `GET /group/{name}`.
#[derive(Debug, Deserialize)]
pub(crate) struct GroupDto {
    pub name: String,
}

/// Error body produced by the server for client and server exceptions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
