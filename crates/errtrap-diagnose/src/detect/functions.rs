//! Errtrap.Functions: the Azure Functions integration.
//!
//! Registration happens in the function app's startup code; only the
//! `AddErrtrap` call is required, there is no middleware to order. Local
//! runs keep credentials in the `Values` section of `local.settings.json`,
//! so that file is the fallback rather than `appsettings.json`.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::textscan;
use crate::{keys, versions};

const REGISTRATION: &str = ".AddErrtrap(";
const API_KEY_MARKER: &str = ".ApiKey = \"";
const LOG_ID_MARKER: &str = ".LogId = new Guid(\"";

const HINTS: &[&str] = &[
    "Make sure that you are calling the AddErrtrap method from the startup code of the function app.",
    "When running locally, store the API key and log ID in the Values section of the local.settings.json file.",
];

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["errtrap.functions"]);

    let mut api_key: Option<String> = None;
    let mut log_id: Option<String> = None;
    let mut configured = false;
    for name in ["Startup.cs", "Program.cs"] {
        let Some(source) = cx.read_sibling(name) else {
            continue;
        };
        if !source.contains(REGISTRATION) {
            continue;
        }
        configured = true;
        if let Some(value) = textscan::extract_after(&source, REGISTRATION, API_KEY_MARKER, 32) {
            api_key = Some(value.to_string());
        }
        if let Some(value) = textscan::extract_after(&source, REGISTRATION, LOG_ID_MARKER, 36) {
            log_id = Some(value.to_string());
        }
    }

    if !configured {
        cx.error("A call to AddErrtrap was not found in Startup.cs or Program.cs.");
    }

    if api_key.is_none() || log_id.is_none() {
        if let Some(settings) = cx.read_sibling("local.settings.json") {
            if api_key.is_none() {
                api_key = textscan::extract_after(&settings, "\"Values\":", "\"ApiKey\": \"", 32)
                    .map(str::to_string);
            }
            if log_id.is_none() {
                log_id = textscan::extract_after(&settings, "\"Values\":", "\"LogId\": \"", 36)
                    .map(str::to_string);
            }
        }
    }

    keys::diagnose_keys(cx, api_key.as_deref(), log_id.as_deref());
    cx.hint_once(HINTS);
    Ok(())
}
