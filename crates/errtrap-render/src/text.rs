use errtrap_types::DiagnosisReport;

use crate::line::{lines, Line};

/// Renders a report as unstyled text, one entry per line.
pub fn render_text(report: &DiagnosisReport) -> String {
    let mut out = String::new();
    for line in lines(report) {
        match line {
            Line::Detection { family, manifest } => {
                out.push_str(&format!("Found {family} in {manifest}.\n"));
            }
            Line::Finding {
                message,
                attribution,
            } => match attribution {
                Some(attribution) => out.push_str(&format!("- {message} ({attribution})\n")),
                None => out.push_str(&format!("- {message}\n")),
            },
            Line::Note(note) => {
                out.push_str(&note);
                out.push('\n');
            }
            Line::HintHeader(family) => out.push_str(&format!("Hints for {family}:\n")),
            Line::Hint(hint) => out.push_str(&format!("  * {hint}\n")),
            Line::AllClear => out.push_str("No issues found\n"),
            Line::NothingToScan => out.push_str("No project or packages files found\n"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use errtrap_types::{FamilyId, ProjectPath};

    #[test]
    fn renders_a_failing_run() {
        let mut report = DiagnosisReport::new(ProjectPath::new("/work/app"));
        report.manifests_scanned = 1;
        report.detection(FamilyId::Classic, ProjectPath::new("/work/app/App.csproj"));
        report.error(
            Some(FamilyId::Classic),
            Some(ProjectPath::new("/work/app/App.csproj")),
            "Web.config file not found.",
        );
        report.hint_once(FamilyId::Classic, &["Check the web.config transforms."]);

        let text = render_text(&report);
        assert_eq!(
            text,
            "Found Errtrap in /work/app/App.csproj.\n\
             - Web.config file not found. (Errtrap, /work/app/App.csproj)\n\
             Hints for Errtrap:\n\
             \x20 * Check the web.config transforms.\n"
        );
    }

    #[test]
    fn renders_a_clean_run() {
        let mut report = DiagnosisReport::new(ProjectPath::new("/work/app"));
        report.manifests_scanned = 2;
        let text = render_text(&report);
        assert_eq!(text, "No issues found\n");
    }

    #[test]
    fn renders_an_empty_walk() {
        let mut report = DiagnosisReport::new(ProjectPath::new("/work/empty"));
        report.nothing_to_scan = true;
        assert_eq!(render_text(&report), "No project or packages files found\n");
    }
}
