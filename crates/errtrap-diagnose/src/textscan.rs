//! Text scanning primitives shared by the detectors.
//!
//! Detectors never parse C#, XML or JSON properly when looking for
//! configuration values. They anchor on well-known literals and pull fixed
//! width tokens out of the surrounding text. The helpers here keep that
//! honest: anchors and markers are located case-insensitively (ASCII), the
//! marker search starts at the anchor rather than at the top of the file, and
//! a token is only returned when the full width is present.

/// Byte offset of the first case-insensitive occurrence of `needle` in
/// `haystack` at or after `from`. ASCII case folding only, which covers every
/// marker the detectors use.
pub fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    if from > hay.len() {
        return None;
    }
    let pat = needle.as_bytes();
    if pat.is_empty() {
        return Some(from);
    }
    if pat.len() > hay.len() - from {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&at| hay[at..at + pat.len()].eq_ignore_ascii_case(pat))
}

/// Case-insensitive `str::contains`.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle, 0).is_some()
}

/// Extracts exactly `width` bytes immediately following `marker`, where the
/// search for `marker` starts at the first occurrence of `anchor`. Returns
/// `None` when either literal is missing or fewer than `width` bytes remain.
///
/// The extracted tokens are ASCII (API keys and GUIDs), so bytes and
/// characters coincide; a token that would split a multi-byte character is
/// treated as absent rather than truncated.
pub fn extract_after<'c>(
    content: &'c str,
    anchor: &str,
    marker: &str,
    width: usize,
) -> Option<&'c str> {
    let anchor_at = find_ci(content, anchor, 0)?;
    let marker_at = find_ci(content, marker, anchor_at)?;
    let begin = marker_at + marker.len();
    content.get(begin..begin.checked_add(width)?)
}

/// Where a framework call has to sit relative to the activation call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The activation call must appear after this marker.
    After,
    /// The activation call must appear before this marker.
    Before,
}

/// One ordering constraint between the activation call and another call in
/// the same source file.
#[derive(Clone, Copy, Debug)]
pub struct OrderingRule {
    /// Call marker as it appears in source, e.g. `".UseExceptionHandler("`.
    pub marker: &'static str,
    pub placement: Placement,
}

impl OrderingRule {
    /// Marker stripped down to the bare method name, for messages.
    pub fn call_name(&self) -> &'static str {
        self.marker.trim_start_matches('.').trim_end_matches('(')
    }
}

/// Checks `activation` against each rule in order and returns the first rule
/// it violates. Rules whose marker does not occur in `content` are skipped,
/// and later rules are never consulted once one fails. Matching here is case
/// sensitive since the markers are exact method calls.
///
/// Returns `None` when `activation` itself is absent; presence is the
/// caller's concern.
pub fn first_ordering_violation<'r>(
    content: &str,
    activation: &str,
    rules: &'r [OrderingRule],
) -> Option<&'r OrderingRule> {
    let activation_at = content.find(activation)?;
    rules.iter().find(|rule| match content.find(rule.marker) {
        Some(marker_at) => match rule.placement {
            Placement::After => activation_at < marker_at,
            Placement::Before => activation_at > marker_at,
        },
        None => false,
    })
}
