//! Installation diagnostics for errtrap integrations.
//!
//! The engine walks a project tree, indexes errtrap packages out of every
//! manifest it finds, and runs one detector per integration family that the
//! manifest triggers. Detectors are heuristic: they scan well-known files
//! with plain text primitives (see [`textscan`]) rather than parsing the
//! target language, and they accumulate findings instead of failing fast.
//! The result is a [`errtrap_types::DiagnosisReport`] that renders the same
//! whether one detector or all seven ran.
//!
//! Network access is abstracted behind the traits in [`remote`], so the whole
//! engine runs offline in tests.

#![forbid(unsafe_code)]

mod detect;
mod engine;
mod keys;
mod schema;
mod versions;

pub mod remote;
pub mod textscan;

#[cfg(test)]
mod test_support;

pub use engine::run_diagnosis;
