use console::style;
use errtrap_types::DiagnosisReport;

use crate::line::{lines, Line};

/// Renders a report with terminal colors: green detections and all-clear,
/// red findings, dim notes and hints. Color is dropped automatically when
/// stdout is not a terminal.
pub fn render_styled(report: &DiagnosisReport) -> String {
    let mut out = String::new();
    for line in lines(report) {
        match line {
            Line::Detection { family, manifest } => {
                out.push_str(&format!(
                    "Found {} in {}.\n",
                    style(family).green(),
                    style(manifest).dim()
                ));
            }
            Line::Finding {
                message,
                attribution,
            } => {
                let rendered = match attribution {
                    Some(attribution) => format!("- {message} ({attribution})"),
                    None => format!("- {message}"),
                };
                out.push_str(&format!("{}\n", style(rendered).red()));
            }
            Line::Note(note) => out.push_str(&format!("{}\n", style(note).dim())),
            Line::HintHeader(family) => {
                out.push_str(&format!("{}\n", style(format!("Hints for {family}:")).dim()));
            }
            Line::Hint(hint) => out.push_str(&format!("  * {}\n", style(hint).dim())),
            Line::AllClear => {
                out.push_str(&format!("{}\n", style("No issues found").green()));
            }
            Line::NothingToScan => {
                out.push_str(&format!(
                    "{}\n",
                    style("No project or packages files found").red()
                ));
            }
        }
    }
    out
}
