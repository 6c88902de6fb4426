//! Errtrap.AspNetCore: middleware registered in `Startup.cs` or `Program.cs`.
//!
//! Besides presence and credentials this detector checks middleware order.
//! `UseErrtrap` only sees exceptions thrown below it in the pipeline, so it
//! has to come after anything that handles exceptions and before anything
//! that dispatches requests.

use anyhow::Result;

use crate::detect::DetectorRun;
use crate::textscan::{self, OrderingRule, Placement};
use crate::{keys, versions};

const REGISTRATION: &str = ".AddErrtrap(";
const ACTIVATION: &str = ".UseErrtrap(";
const API_KEY_MARKER: &str = ".ApiKey = \"";
const LOG_ID_MARKER: &str = ".LogId = new Guid(\"";

const ORDERING: &[OrderingRule] = &[
    OrderingRule { marker: ".UseDeveloperExceptionPage(", placement: Placement::After },
    OrderingRule { marker: ".UseExceptionHandler(", placement: Placement::After },
    OrderingRule { marker: ".UseAuthorization(", placement: Placement::After },
    OrderingRule { marker: ".UseAuthentication(", placement: Placement::After },
    OrderingRule { marker: ".UseEndpoints(", placement: Placement::Before },
    OrderingRule { marker: ".MapControllerRoute(", placement: Placement::Before },
    OrderingRule { marker: ".UseMvc(", placement: Placement::Before },
    OrderingRule { marker: ".UsePiranha(", placement: Placement::Before },
    OrderingRule { marker: ".UseUmbraco(", placement: Placement::Before },
];

const HINTS: &[&str] = &[
    "Make sure that you are calling both the AddErrtrap and UseErrtrap methods in the Program.cs or Startup.cs file.",
    "Make sure that you call the UseErrtrap method after invoking other Use* methods that in any way inspect exceptions (like UseDeveloperExceptionPage and UseExceptionHandler).",
    "Make sure that you call the UseErrtrap method before invoking UseMvc, UseEndpoints, and similar.",
];

pub(crate) fn run(cx: &mut DetectorRun<'_>) -> Result<()> {
    versions::diagnose_versions(cx, &["errtrap.aspnetcore"]);

    let mut api_key: Option<String> = None;
    let mut log_id: Option<String> = None;
    let mut pipeline: Option<String> = None;
    for name in ["Startup.cs", "Program.cs"] {
        let Some(source) = cx.read_sibling(name) else {
            continue;
        };
        if !source.contains(REGISTRATION) || !source.contains(ACTIVATION) {
            continue;
        }
        if let Some(value) = textscan::extract_after(&source, REGISTRATION, API_KEY_MARKER, 32) {
            api_key = Some(value.to_string());
        }
        if let Some(value) = textscan::extract_after(&source, REGISTRATION, LOG_ID_MARKER, 36) {
            log_id = Some(value.to_string());
        }
        pipeline = Some(source);
    }

    match &pipeline {
        None => cx.error(
            "A call to AddErrtrap and UseErrtrap was not found in Startup.cs or Program.cs.",
        ),
        Some(source) => {
            if let Some(rule) = textscan::first_ordering_violation(source, ACTIVATION, ORDERING) {
                let relation = match rule.placement {
                    Placement::After => "after",
                    Placement::Before => "before",
                };
                cx.error(format!(
                    "UseErrtrap must be called {relation} {}",
                    rule.call_name()
                ));
            }
        }
    }

    if api_key.is_none() || log_id.is_none() {
        if let Some(settings) = cx.read_sibling("appsettings.json") {
            if api_key.is_none() {
                api_key = textscan::extract_after(&settings, "\"Errtrap\":", "\"ApiKey\": \"", 32)
                    .map(str::to_string);
            }
            if log_id.is_none() {
                log_id = textscan::extract_after(&settings, "\"Errtrap\":", "\"LogId\": \"", 36)
                    .map(str::to_string);
            }
        }
    }

    keys::diagnose_keys(cx, api_key.as_deref(), log_id.as_deref());
    cx.hint_once(HINTS);
    Ok(())
}
