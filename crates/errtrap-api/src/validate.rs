use anyhow::Result;
use errtrap_diagnose::remote::{RemoteValidator, SchemaFetcher};

use crate::client::{build_http, check, Client, ClientOptions};
use crate::error::ApiError;

/// Live implementations of the callouts the diagnosis engine needs.
///
/// Credentials come from the scanned project files, not from this struct, so
/// key validation builds a client per call. Schema documents are fetched with
/// the same timeout, user agent and proxy settings as API calls.
#[derive(Debug, Clone, Default)]
pub struct LiveValidator {
    pub base_url: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
}

impl RemoteValidator for LiveValidator {
    fn validate(&self, api_key: &str, log_id: &str) -> Result<Vec<String>> {
        let client = Client::new(ClientOptions {
            api_key: api_key.to_owned(),
            base_url: self.base_url.clone(),
            proxy_host: self.proxy_host.clone(),
            proxy_port: self.proxy_port,
        })?;
        Ok(client.diagnose_log(log_id)?)
    }
}

impl SchemaFetcher for LiveValidator {
    fn fetch(&self, url: &str) -> Result<String> {
        let http = build_http(self.proxy_host.as_deref(), self.proxy_port)?;
        let resp = check(http.get(url).send().map_err(ApiError::from)?)?;
        Ok(resp.text().map_err(ApiError::from)?)
    }
}
