//! Rendering of diagnosis reports for terminal and plain-text surfaces.

#![forbid(unsafe_code)]

mod line;
mod styled;
mod text;

pub use line::{lines, Line};
pub use styled::render_styled;
pub use text::render_text;
