//! Remote access to the document server.
//!
//! `RestApiClient` implements the core `MessageApi`, `ProfileApi` and
//! `IdentityContext` traits over the server's REST resources.

mod dto;
pub mod rest_client;

pub use rest_client::{RestApiClient, map_error_response};
