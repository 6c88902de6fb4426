//! Capabilities the engine needs from the outside world.
//!
//! Both traits are implemented over HTTP by `errtrap-api` and by in-memory
//! stubs in tests. The engine itself never touches the network.

use anyhow::Result;

/// Server side validation of an API key and log ID pair.
///
/// Called at most once per detector run, and only after both credentials
/// passed the local shape checks. The returned strings are problem
/// descriptions; an empty list means the service accepted the pair.
pub trait RemoteValidator {
    fn validate(&self, api_key: &str, log_id: &str) -> Result<Vec<String>>;
}

/// Fetches XML schema documents by URL for the schema validator.
///
/// Only called for `http`/`https` locations; file system locations are read
/// directly by the validator.
pub trait SchemaFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}
