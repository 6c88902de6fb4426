//! Errtrap classic: system.web modules configured through `web.config`.
//!
//! The oldest integration family. Everything lives in `web.config`, so the
//! checks are literal: the config sections, the module registration, and the
//! error log element all have one canonical spelling. Checks are case
//! sensitive, as the config system itself is.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::textscan;
use crate::{keys, versions};

const ERROR_LOG_TYPE: &str = "type=\"Errtrap.ErrorLog, Errtrap\"";

/// Literal web.config requirements and the finding for each missing one.
const REQUIRED: &[(&str, &str)] = &[
    (
        "<sectionGroup name=\"errtrap\"",
        "No section group named 'errtrap' found in web.config.",
    ),
    (
        "<section name=\"errorLog\"",
        "No section named 'errorLog' found in web.config.",
    ),
    (
        "<add name=\"ErrorLog\" type=\"Errtrap.ErrorLogModule, Errtrap\"",
        "No error log module found in httpModules or modules in web.config.",
    ),
    ("<errtrap>", "No <errtrap> element found in web.config."),
    ("<errorLog ", "No <errorLog> element found in web.config."),
    (
        ERROR_LOG_TYPE,
        "No <errorLog> with type Errtrap.ErrorLog found in web.config.",
    ),
];

const HINTS: &[&str] = &[
    "Make sure that you have the errtrap.corelibrary NuGet package installed in the latest stable version.",
    "Make sure that your web.config file is valid and that it contains the errtrap configuration.",
];

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(
        cx,
        &["errtrap", "errtrap.aspnet", "errtrap.mvc", "errtrap.webapi"],
    );

    if cx.packages.contains_key("errtrap.bootstrapper") {
        cx.error(
            "errtrap cannot be configured using the legacy bootstrapper (remove the errtrap.bootstrapper NuGet package).",
        );
    }

    match cx.read_sibling("web.config") {
        Some(web_config) => {
            for (needle, message) in REQUIRED {
                if !web_config.contains(needle) {
                    cx.error(*message);
                }
            }
            let api_key = textscan::extract_after(&web_config, ERROR_LOG_TYPE, " apiKey=\"", 32);
            let log_id = textscan::extract_after(&web_config, ERROR_LOG_TYPE, " logId=\"", 36);
            keys::diagnose_keys(cx, api_key, log_id);
        }
        None => cx.error("Web.config file not found."),
    }

    cx.hint_once(HINTS);
    Ok(())
}
