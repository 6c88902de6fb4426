//! Blocking client for the errtrap.io REST API.
//!
//! Requests authenticate with an `api_key` query parameter and talk JSON.
//! Non-success responses surface as [`ApiError::Status`] carrying the status
//! code and the body text, so callers can print the server's own message.

#![forbid(unsafe_code)]

mod client;
mod error;
mod types;
mod validate;

pub use client::{Client, ClientOptions, FileUpload, DEFAULT_BASE_URL, USER_AGENT};
pub use error::ApiError;
pub use types::{
    CreateDeployment, CreateMessage, Item, MessageOverview, MessageSearch, MessagesResult, Search,
};
pub use validate::LiveValidator;
