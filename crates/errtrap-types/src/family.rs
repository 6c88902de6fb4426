use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One supported error-logging integration family.
///
/// Variant order is dispatch order: detectors run in this order for every
/// manifest, and `BTreeMap<FamilyId, _>` iteration (hints) follows it too.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FamilyId {
    AspNetCore,
    ExtensionsLogging,
    Classic,
    Log4Net,
    NLog,
    Serilog,
    Functions,
}

impl FamilyId {
    pub const ALL: [FamilyId; 7] = [
        FamilyId::AspNetCore,
        FamilyId::ExtensionsLogging,
        FamilyId::Classic,
        FamilyId::Log4Net,
        FamilyId::NLog,
        FamilyId::Serilog,
        FamilyId::Functions,
    ];

    /// Proper-case package name shown in detection lines and hint headers.
    pub fn display_name(self) -> &'static str {
        match self {
            FamilyId::AspNetCore => "Errtrap.AspNetCore",
            FamilyId::ExtensionsLogging => "Errtrap.Extensions.Logging",
            FamilyId::Classic => "Errtrap",
            FamilyId::Log4Net => "Errtrap.Log4Net",
            FamilyId::NLog => "Errtrap.NLog",
            FamilyId::Serilog => "Serilog.Sinks.Errtrap",
            FamilyId::Functions => "Errtrap.Functions",
        }
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
