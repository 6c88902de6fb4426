//! Errtrap.Log4Net: the log4net appender.
//!
//! The appender can be declared in `web.config`, `app.config` or a dedicated
//! `log4net.config`; the last candidate that actually declares it supplies
//! the credentials. A dedicated `log4net.config` is also validated against
//! the published schema since log4net silently ignores misspelled elements.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::schema::{self, SchemaRef};
use crate::textscan;
use crate::{keys, versions};

const APPENDER_TYPE: &str = "type=\"errtrap.log4net.ErrtrapAppender, errtrap.log4net\"";

const SCHEMAS: &[SchemaRef] = &[SchemaRef {
    namespace: "",
    location: "https://errtrap.io/schemas/log4net.xsd",
}];

const HINTS: &[&str] = &[
    "Make sure that your log4net.config file is valid and contains the code for Errtrap.Log4Net.",
    "Include the following app setting in the app.config/web.config file to enable log4net's internal logger and inspect the console for any errors: <add key=\"log4net.Internal.Debug\" value=\"true\"/>.",
];

fn declares_appender(content: &str) -> bool {
    textscan::contains_ci(content, "<log4net")
        && textscan::contains_ci(content, "name=\"ErrtrapAppender\"")
        && textscan::contains_ci(content, APPENDER_TYPE)
}

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["errtrap.log4net"]);

    let mut config: Option<String> = None;
    for name in ["web.config", "app.config", "log4net.config"] {
        let Some(content) = cx.read_sibling(name) else {
            continue;
        };
        if !declares_appender(&content) {
            continue;
        }
        if name == "log4net.config" {
            schema::validate_against_schemas(cx, name, &content, SCHEMAS);
        }
        config = Some(content);
    }

    if config.is_none() {
        cx.error("log4net configuration for the errtrap appender could not be found.");
    }

    match &config {
        Some(content) => {
            let api_key = textscan::extract_after(content, APPENDER_TYPE, "apiKey value=\"", 32);
            let log_id = textscan::extract_after(content, APPENDER_TYPE, "logId value=\"", 36);
            keys::diagnose_keys(cx, api_key, log_id);
        }
        None => cx.note("No file content found for log4net"),
    }

    cx.hint_once(HINTS);
    Ok(())
}
