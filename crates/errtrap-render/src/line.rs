use errtrap_types::{DiagnosisReport, FamilyId, Finding};

/// One line of a rendered report, in print order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// "Found {family} in {manifest}."
    Detection { family: FamilyId, manifest: String },
    /// "- {message}", with the producing family and manifest when known.
    Finding {
        message: String,
        attribution: Option<String>,
    },
    Note(String),
    /// Header of a family's hint block.
    HintHeader(FamilyId),
    Hint(String),
    /// Closing line of a run without findings.
    AllClear,
    /// Closing line when the walk found no manifests at all.
    NothingToScan,
}

/// Flattens a report into presentation order: detections, findings, notes,
/// hint blocks, then the summary. A run with findings gets no summary line.
pub fn lines(report: &DiagnosisReport) -> Vec<Line> {
    let mut out = Vec::new();
    for detection in &report.detections {
        out.push(Line::Detection {
            family: detection.family,
            manifest: detection.manifest.to_string(),
        });
    }
    for finding in &report.findings {
        out.push(Line::Finding {
            message: finding.message.clone(),
            attribution: attribution(finding),
        });
    }
    for note in &report.notes {
        out.push(Line::Note(note.clone()));
    }
    for (family, hints) in &report.hints {
        out.push(Line::HintHeader(*family));
        for hint in hints {
            out.push(Line::Hint(hint.clone()));
        }
    }
    if report.nothing_to_scan {
        out.push(Line::NothingToScan);
    } else if !report.any_error() {
        out.push(Line::AllClear);
    }
    out
}

fn attribution(finding: &Finding) -> Option<String> {
    match (finding.family, &finding.manifest) {
        (Some(family), Some(manifest)) => Some(format!("{family}, {manifest}")),
        (Some(family), None) => Some(family.to_string()),
        (None, Some(manifest)) => Some(manifest.to_string()),
        (None, None) => None,
    }
}
