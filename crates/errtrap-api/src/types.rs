//! Request and response bodies for the endpoints the CLI drives.
//!
//! The service speaks camelCase JSON and RFC 3339 timestamps. Optional
//! fields are omitted from request bodies rather than sent as null.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One key/value pair in a message collection (server variables, cookies,
/// query string, form data or custom data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub key: String,
    pub value: String,
}

impl Item {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Item {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A log message to store, used both for single creates and bulk uploads.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessage {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub server_variables: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_string: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<Item>,
}

/// A stored message as returned by the message search endpoint.
///
/// Every field is optional on the wire. Unknown fields are ignored so new
/// server-side fields never break an old CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageOverview {
    pub id: Option<String>,
    pub title: Option<String>,
    pub title_template: Option<String>,
    pub application: Option<String>,
    pub detail: Option<String>,
    pub hostname: Option<String>,
    pub source: Option<String>,
    pub status_code: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_time: Option<OffsetDateTime>,
    pub r#type: Option<String>,
    pub user: Option<String>,
    pub severity: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub version: Option<String>,
    pub data: Vec<Item>,
    pub server_variables: Vec<Item>,
    pub query_string: Vec<Item>,
    pub form: Vec<Item>,
    pub cookies: Vec<Item>,
}

/// Envelope returned by the message search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagesResult {
    pub total: Option<i64>,
    pub messages: Vec<MessageOverview>,
    pub search_after: Option<String>,
}

/// Parameters for listing messages. `search_after` continues a previous page
/// and takes precedence over `page_index` on the server.
#[derive(Debug, Clone, Default)]
pub struct MessageSearch {
    pub page_index: u32,
    pub page_size: u32,
    pub query: Option<String>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub include_headers: bool,
    pub search_after: Option<String>,
}

/// Body for deleting messages matching a query within a date range.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub to: Option<OffsetDateTime>,
}

/// Body for registering a new deployment.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeployment {
    pub version: String,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
}
