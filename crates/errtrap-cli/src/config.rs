//! The optional `errtrap.toml` configuration file and its merge with flags.

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use clap::Args;
use serde::Deserialize;

use errtrap_api::{Client, ClientOptions};

pub const CONFIG_FILE: &str = "errtrap.toml";

/// `errtrap.toml` as found in the working directory. Intentionally permissive
/// so future fields never break an old CLI.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
}

/// `[api]` section: defaults for the credential and connection flags.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiSection {
    pub key: Option<String>,
    pub log_id: Option<String>,
    pub base_url: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
}

/// Loads `errtrap.toml` from the working directory. A missing file yields
/// the defaults; a malformed one is an error.
pub fn load_default() -> Result<ConfigFile> {
    load(Utf8Path::new(CONFIG_FILE))
}

pub fn load(path: &Utf8Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    parse(&text).with_context(|| format!("parse {path}"))
}

fn parse(text: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(text)?)
}

/// Connection flags shared by every command that talks to the API.
#[derive(Args, Clone, Debug, Default)]
pub struct ApiArgs {
    /// API key with permission to execute the command.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL of the API, mainly useful against a test server.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Hostname of an HTTP proxy to route API calls through.
    #[arg(long)]
    pub proxy_host: Option<String>,

    /// Port of the HTTP proxy.
    #[arg(long)]
    pub proxy_port: Option<u16>,
}

/// Flags merged over the config file. Flags always win.
#[derive(Clone, Debug, Default)]
pub struct ApiSettings {
    pub api_key: Option<String>,
    pub log_id: Option<String>,
    pub base_url: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
}

impl ApiSettings {
    pub fn resolve(config: &ConfigFile, args: &ApiArgs, log_id: Option<&str>) -> Self {
        ApiSettings {
            api_key: args.api_key.clone().or_else(|| config.api.key.clone()),
            log_id: log_id
                .map(str::to_owned)
                .or_else(|| config.api.log_id.clone()),
            base_url: args.base_url.clone().or_else(|| config.api.base_url.clone()),
            proxy_host: args
                .proxy_host
                .clone()
                .or_else(|| config.api.proxy_host.clone()),
            proxy_port: args.proxy_port.or(config.api.proxy_port),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!("no API key given: pass --api-key or set [api] key in errtrap.toml"),
        }
    }

    pub fn require_log_id(&self) -> Result<&str> {
        match self.log_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => bail!("no log ID given: pass --log-id or set [api] log_id in errtrap.toml"),
        }
    }

    /// Builds an API client from the resolved settings.
    pub fn client(&self) -> Result<Client> {
        let api_key = self.require_api_key()?.to_owned();
        Ok(Client::new(ClientOptions {
            api_key,
            base_url: self.base_url.clone(),
            proxy_host: self.proxy_host.clone(),
            proxy_port: self.proxy_port,
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_api_section() {
        let config = parse(
            r#"
            [api]
            key = "0123456789abcdef0123456789abcdef"
            log_id = "d1b44e1f-eae5-4b23-b31f-327ada6978da"
            base_url = "http://127.0.0.1:5000"
            proxy_host = "proxy.local"
            proxy_port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(
            config.api.key.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(config.api.proxy_port, Some(8080));
    }

    #[test]
    fn empty_text_yields_defaults() {
        let config = parse("").unwrap();
        assert!(config.api.key.is_none());
        assert!(config.api.log_id.is_none());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let config = parse("[api]\nkey = \"k\"\nfuture = true\n[other]\nx = 1\n").unwrap();
        assert_eq!(config.api.key.as_deref(), Some("k"));
    }

    #[test]
    fn flags_override_the_file() {
        let config = parse("[api]\nkey = \"from-file\"\nlog_id = \"file-id\"\n").unwrap();
        let args = ApiArgs {
            api_key: Some("from-flag".to_owned()),
            ..ApiArgs::default()
        };
        let settings = ApiSettings::resolve(&config, &args, None);
        assert_eq!(settings.api_key.as_deref(), Some("from-flag"));
        assert_eq!(settings.log_id.as_deref(), Some("file-id"));
    }

    #[test]
    fn missing_key_is_a_clear_error() {
        let settings = ApiSettings::default();
        let err = settings.require_api_key().unwrap_err();
        assert!(err.to_string().contains("--api-key"));
        let err = settings.require_log_id().unwrap_err();
        assert!(err.to_string().contains("--log-id"));
    }
}
