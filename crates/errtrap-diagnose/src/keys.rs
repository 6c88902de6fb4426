//! Credential shape checks and the remote validation step.

use crate::detect::DetectorRun;

/// An API key is a GUID without hyphens: 32 hex characters.
pub fn is_api_key(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A log ID is a canonical hyphenated GUID: 8-4-4-4-12 hex groups.
pub fn is_log_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(at, b)| match at {
        8 | 13 | 18 | 23 => *b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

/// Validates whatever credentials the detector managed to extract. Shape
/// problems stop before the network; a shaped pair goes to the service and
/// every reported problem becomes a finding.
pub(crate) fn diagnose_keys(
    cx: &mut DetectorRun<'_>,
    api_key: Option<&str>,
    log_id: Option<&str>,
) {
    let api_key = api_key.map(str::trim).filter(|v| !v.is_empty());
    let log_id = log_id.map(str::trim).filter(|v| !v.is_empty());
    let (Some(api_key), Some(log_id)) = (api_key, log_id) else {
        cx.note("Could not find API key or log ID");
        return;
    };

    if !is_api_key(api_key) {
        cx.error(format!("Invalid API key: {api_key}"));
        return;
    }
    if !is_log_id(log_id) {
        cx.error(format!("Invalid log ID: {log_id}"));
        return;
    }

    match cx.remote.validate(api_key, log_id) {
        Ok(problems) => {
            for problem in problems {
                cx.error(problem);
            }
        }
        Err(e) => cx.error(format!("{e:#}")),
    }
}
