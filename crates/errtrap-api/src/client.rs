use std::time::Duration;

use reqwest::blocking::{multipart, Client as HttpClient, Response};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::types::{CreateDeployment, CreateMessage, MessageSearch, MessagesResult, Search};

/// Production endpoint. Overridable for tests through [`ClientOptions`].
pub const DEFAULT_BASE_URL: &str = "https://api.errtrap.io";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("errtrap-cli/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`Client::new`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub api_key: String,
    /// Replaces [`DEFAULT_BASE_URL`] when set. A trailing slash is trimmed.
    pub base_url: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
}

/// A file to attach to a multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Blocking client for the errtrap.io REST API.
pub struct Client {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        let http = build_http(options.proxy_host.as_deref(), options.proxy_port)?;
        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        Ok(Client {
            http,
            base_url,
            api_key: options.api_key,
        })
    }

    /// Server side diagnostics for a log: a list of problem descriptions,
    /// empty when the service accepts the key and log ID pair.
    pub fn diagnose_log(&self, log_id: &str) -> Result<Vec<String>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/v3/logs/{log_id}/diagnose")))
            .query(&[("api_key", self.api_key.as_str())])
            .send()?;
        Ok(check(resp)?.json()?)
    }

    /// Stores one message. Returns the id of the created message when the
    /// server names it in the Location header.
    pub fn create_message(
        &self,
        log_id: &str,
        message: &CreateMessage,
    ) -> Result<Option<String>, ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/v3/messages/{log_id}")))
            .query(&[("api_key", self.api_key.as_str())])
            .json(message)
            .send()?;
        let resp = check(resp)?;
        let id = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned);
        Ok(id)
    }

    /// Stores a batch of messages in one request.
    pub fn create_messages(
        &self,
        log_id: &str,
        messages: &[CreateMessage],
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/v3/messages/{log_id}/bulk")))
            .query(&[("api_key", self.api_key.as_str())])
            .json(messages)
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Lists messages matching the search, newest first.
    pub fn search_messages(
        &self,
        log_id: &str,
        search: &MessageSearch,
    ) -> Result<MessagesResult, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/v3/messages/{log_id}")))
            .query(&SearchParams::new(search, &self.api_key))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    /// Deletes every message matching the search.
    pub fn delete_messages(&self, log_id: &str, search: &Search) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/v3/messages/{log_id}")))
            .query(&[("api_key", self.api_key.as_str())])
            .json(search)
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Registers a deployment, optionally scoped to a single log.
    pub fn create_deployment(&self, deployment: &CreateDeployment) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/v3/deployments"))
            .query(&[("api_key", self.api_key.as_str())])
            .json(deployment)
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Uploads a source map and the matching minified JavaScript for the
    /// online path the script is served from.
    pub fn upload_sourcemap(
        &self,
        log_id: &str,
        path: &str,
        source_map: FileUpload,
        script: FileUpload,
    ) -> Result<(), ApiError> {
        let form = multipart::Form::new()
            .text("path", path.to_owned())
            .part("sourceMap", file_part(source_map)?)
            .part("minifiedJavaScript", file_part(script)?);
        let resp = self
            .http
            .post(self.url(&format!("/v3/sourcemaps/{log_id}")))
            .query(&[("api_key", self.api_key.as_str())])
            .multipart(form)
            .send()?;
        check(resp)?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Query string for the message search endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams<'a> {
    page_index: u32,
    page_size: u32,
    include_headers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    to: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_after: Option<&'a str>,
    // The auth parameter is snake_case, unlike the rest of the API.
    #[serde(rename = "api_key")]
    api_key: &'a str,
}

impl<'a> SearchParams<'a> {
    fn new(search: &'a MessageSearch, api_key: &'a str) -> Self {
        SearchParams {
            page_index: search.page_index,
            page_size: search.page_size,
            include_headers: search.include_headers,
            query: search.query.as_deref(),
            from: search.from,
            to: search.to,
            search_after: search.search_after.as_deref(),
            api_key,
        }
    }
}

fn file_part(upload: FileUpload) -> Result<multipart::Part, ApiError> {
    Ok(multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(upload.content_type)?)
}

/// Maps non-success responses to [`ApiError::Status`], reading the body text
/// so the caller can surface the server's message.
pub(crate) fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Underlying HTTP client shared with the schema fetcher: 60 second timeout,
/// CLI user agent, optional proxy.
pub(crate) fn build_http(
    proxy_host: Option<&str>,
    proxy_port: Option<u16>,
) -> Result<HttpClient, ApiError> {
    let mut builder = HttpClient::builder().timeout(TIMEOUT).user_agent(USER_AGENT);
    if let (Some(host), Some(port)) = (proxy_host, proxy_port) {
        builder = builder.proxy(reqwest::Proxy::all(format!("http://{host}:{port}"))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn search_params_use_the_service_naming() {
        let search = MessageSearch {
            page_size: 100,
            query: Some("*".to_owned()),
            from: Some(datetime!(2026-08-01 00:00:00 UTC)),
            search_after: Some("token-1".to_owned()),
            ..MessageSearch::default()
        };

        let json = serde_json::to_value(SearchParams::new(&search, "key")).unwrap();
        assert_eq!(json["pageIndex"], 0);
        assert_eq!(json["pageSize"], 100);
        assert_eq!(json["includeHeaders"], false);
        assert_eq!(json["query"], "*");
        assert_eq!(json["from"], "2026-08-01T00:00:00Z");
        assert_eq!(json["searchAfter"], "token-1");
        assert_eq!(json["api_key"], "key");
        assert!(!json.as_object().unwrap().contains_key("to"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::new(ClientOptions {
            api_key: "key".to_owned(),
            base_url: Some("http://127.0.0.1:8080/".to_owned()),
            ..ClientOptions::default()
        })
        .unwrap();
        assert_eq!(
            client.url("/v3/messages/abc"),
            "http://127.0.0.1:8080/v3/messages/abc"
        );
    }

    #[test]
    fn user_agent_carries_the_crate_version() {
        assert!(USER_AGENT.starts_with("errtrap-cli/"));
        assert!(!USER_AGENT.ends_with('/'));
    }
}
