//! RestApiClient - REST implementation of the message, profile and identity services.
//!
//! Talks to the document server's `message`, `user` and `group` resources.
//! Authentication is handled by the surrounding application: if an auth
//! token is configured it is forwarded as the `auth_token` cookie.

use crate::dto::{
    ErrorBody, GroupDto, MessageListResponse, SendMessageForm, SendMessageResponse, UserDto,
};
use async_trait::async_trait;
use courier_core::config::ServerSettings;
use courier_core::identity::IdentityContext;
use courier_core::message::{
    Conversation, Message, MessageApi, SendReceipt, Target, TargetKind, normalize_content,
    validate_message_id,
};
use courier_core::profile::{Profile, ProfileApi};
use courier_core::{CourierError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a request is about, used to build `NotFound` errors.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub entity: &'a str,
    pub id: &'a str,
}

/// Client for the document server REST API.
#[derive(Clone)]
pub struct RestApiClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
    /// Viewer username, looked up once on first use
    viewer: Arc<OnceCell<String>>,
}

impl RestApiClient {
    /// Creates a new client for the API rooted at `base_url`.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| CourierError::config(format!("Invalid base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CourierError::config(format!(
                "Base URL {base_url} cannot carry a path"
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            auth_token,
            timeout: DEFAULT_TIMEOUT,
            viewer: Arc::new(OnceCell::new()),
        })
    }

    /// Creates a client from the `[server]` configuration section.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self> {
        let client = Self::new(&settings.base_url, settings.auth_token.clone())?
            .with_timeout(settings.request_timeout());

        tracing::info!(
            "[RestApiClient] Initialized with URL: {}, auth token: {}",
            client.base_url,
            if client.auth_token.is_some() {
                "present"
            } else {
                "none"
            }
        );
        Ok(client)
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the underlying HTTP client (proxies, TLS roots, ...).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Builds `<base_url>/<segments...>`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Attaches the auth cookie and timeout to a request.
    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        if let Some(token) = &self.auth_token {
            request.header(reqwest::header::COOKIE, format!("auth_token={}", token))
        } else {
            request
        }
    }

    /// Sends a request and turns non-success statuses into typed errors.
    async fn execute(&self, request: RequestBuilder, subject: Subject<'_>) -> Result<Response> {
        let response = self
            .auth_request(request)
            .send()
            .await
            .map_err(|e| CourierError::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let error = map_error_response(status, &body, subject);
        tracing::debug!(
            "[RestApiClient] {} {} failed with {}: {}",
            subject.entity,
            subject.id,
            status,
            error
        );
        Err(error)
    }

    /// Looks up the logged-in user behind the auth token.
    async fn fetch_viewer(&self) -> Result<String> {
        let request = self.client.get(self.endpoint(&["user"]));
        let response = self
            .execute(
                request,
                Subject {
                    entity: "user",
                    id: "current",
                },
            )
            .await?;
        let user: UserDto = Self::read_json(response).await?;
        match user.username {
            Some(username) if !user.anonymous => Ok(username),
            _ => Err(CourierError::authorization("Not logged in")),
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| CourierError::transport(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl MessageApi for RestApiClient {
    async fn fetch_messages(&self, target: &Target) -> Result<Conversation> {
        let request = self.client.get(self.endpoint(&["message"])).query(&[
            ("target_name", target.name.as_str()),
            ("type", target.kind.as_str()),
        ]);

        let response = self
            .execute(
                request,
                Subject {
                    entity: "target",
                    id: &target.name,
                },
            )
            .await?;
        let list: MessageListResponse = Self::read_json(response).await?;

        list.messages.into_iter().map(Message::try_from).collect()
    }

    async fn send_message(&self, target: &Target, content: &str) -> Result<SendReceipt> {
        let content = normalize_content(content)?;

        let form = SendMessageForm {
            target_name: &target.name,
            kind: target.kind.as_str(),
            content,
        };
        let request = self.client.put(self.endpoint(&["message"])).form(&form);

        let response = self
            .execute(
                request,
                Subject {
                    entity: "target",
                    id: &target.name,
                },
            )
            .await?;

        match Self::read_json::<SendMessageResponse>(response).await? {
            SendMessageResponse::Created(dto) => Ok(SendReceipt::Created(Message::try_from(dto)?)),
            SendMessageResponse::Status { .. } => Ok(SendReceipt::Acknowledged),
        }
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        validate_message_id(id)?;

        let request = self.client.delete(self.endpoint(&["message", id]));
        self.execute(
            request,
            Subject {
                entity: "message",
                id,
            },
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileApi for RestApiClient {
    async fn fetch_profile(&self, kind: TargetKind, identifier: &str) -> Result<Profile> {
        match kind {
            TargetKind::User => {
                let request = self.client.get(self.endpoint(&["user", identifier]));
                let response = self
                    .execute(
                        request,
                        Subject {
                            entity: "user",
                            id: identifier,
                        },
                    )
                    .await?;
                let user: UserDto = Self::read_json(response).await?;
                let name = user.username.ok_or_else(|| {
                    CourierError::transport(format!("Profile of user {identifier} has no username"))
                })?;
                Ok(Profile {
                    kind,
                    name,
                    email: user.email,
                })
            }
            TargetKind::Group => {
                let request = self.client.get(self.endpoint(&["group", identifier]));
                let response = self
                    .execute(
                        request,
                        Subject {
                            entity: "group",
                            id: identifier,
                        },
                    )
                    .await?;
                let group: GroupDto = Self::read_json(response).await?;
                Ok(Profile {
                    kind,
                    name: group.name,
                    email: None,
                })
            }
        }
    }
}

#[async_trait]
impl IdentityContext for RestApiClient {
    async fn viewer_username(&self) -> Result<String> {
        self.viewer
            .get_or_try_init(|| self.fetch_viewer())
            .await
            .cloned()
    }
}

/// Maps a non-success response to the error taxonomy.
///
/// The server reports `ForbiddenError` and `ValidationError` in the body
/// `type` field regardless of status; an unknown target arrives as a
/// `ValidationError` whose message starts with `Target not found`.
pub fn map_error_response(status: StatusCode, body: &str, subject: Subject<'_>) -> CourierError {
    let error_body: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = error_body
        .message
        .clone()
        .unwrap_or_else(|| format!("{} ({})", status, body.trim()));

    match error_body.kind.as_deref() {
        Some("ForbiddenError") => return CourierError::authorization(message),
        Some("ValidationError") if message.starts_with("Target not found") => {
            return CourierError::not_found(subject.entity, subject.id);
        }
        Some("NotFound") => return CourierError::not_found(subject.entity, subject.id),
        Some("ValidationError") => return CourierError::validation(message),
        _ => {}
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CourierError::authorization(message),
        StatusCode::NOT_FOUND => CourierError::not_found(subject.entity, subject.id),
        _ => CourierError::transport(format!("Server error ({}): {}", status, body.trim())),
    }
}
