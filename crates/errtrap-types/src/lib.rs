//! Stable DTOs shared across the errtrap workspace.
//!
//! This crate is intentionally boring:
//! - integration family identifiers and display names
//! - the diagnosis report emitted at the end of a run
//! - canonical path handling for report output

#![forbid(unsafe_code)]

pub mod family;
pub mod path;
pub mod report;

pub use family::FamilyId;
pub use path::ProjectPath;
pub use report::{Detection, DiagnosisReport, Finding, SCHEMA_DIAGNOSIS_V1};
