//! Section parser for free-text SWOT replies.
//!
//! The upstream contract is "plain text, optionally containing the five
//! English section labels". Headers may arrive in any order, wrapped in
//! markdown bold or heading markers, and any of them may be absent.
//! The parser is total: it always returns a `SwotSections`, degrading to
//! empty sections plus a fixed error summary instead of propagating failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Summary text used when the parser itself fails.
pub const PARSE_ERROR_SUMMARY: &str = "Error parsing analysis.";

/// Structured SWOT output. All fields default to empty; `summary` is plain
/// text while the four category fields are ordered bullet lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwotSections {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SectionKind {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
    Summary,
}

/// Literal labels matched case-insensitively at line start. The colon is part
/// of the label; a label word mid-sentence is never a header.
const LABELS: &[(SectionKind, &str)] = &[
    (SectionKind::Strengths, "strengths:"),
    (SectionKind::Weaknesses, "weaknesses:"),
    (SectionKind::Opportunities, "opportunities:"),
    (SectionKind::Threats, "threats:"),
    (SectionKind::Summary, "summary:"),
];

static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-•*]|\d+\.)\s*").expect("valid bullet regex"));

/// Parse one free-text analysis into structured sections.
///
/// Total function: any internal panic degrades to empty sections with
/// [`PARSE_ERROR_SUMMARY`], never an error or abort.
pub fn parse_swot_text(text: &str) -> SwotSections {
    std::panic::catch_unwind(|| parse_inner(text)).unwrap_or_else(|_| SwotSections {
        summary: PARSE_ERROR_SUMMARY.to_string(),
        ..SwotSections::default()
    })
}

fn parse_inner(text: &str) -> SwotSections {
    let lines = normalize_lines(text);

    // Split at header boundaries, keeping same-line remainders and the order
    // in which labels occur. Text before the first header is ignored.
    let mut segments: Vec<(SectionKind, Vec<String>)> = Vec::new();
    for line in &lines {
        if let Some((kind, rest)) = match_header(line) {
            let mut seg_lines = Vec::new();
            if !rest.is_empty() {
                seg_lines.push(rest.to_string());
            }
            segments.push((kind, seg_lines));
        } else if let Some((_, seg_lines)) = segments.last_mut() {
            seg_lines.push(line.clone());
        }
    }

    // First occurrence of a label wins; a repeated header still terminated the
    // previous section above, but its own text is discarded here.
    let mut sections = SwotSections::default();
    let mut filled = std::collections::HashSet::new();
    let mut summary_seen = false;
    for (kind, seg_lines) in segments {
        if !filled.insert(kind) {
            continue;
        }
        match kind {
            SectionKind::Strengths => sections.strengths = extract_items(&seg_lines),
            SectionKind::Weaknesses => sections.weaknesses = extract_items(&seg_lines),
            SectionKind::Opportunities => sections.opportunities = extract_items(&seg_lines),
            SectionKind::Threats => sections.threats = extract_items(&seg_lines),
            SectionKind::Summary => {
                summary_seen = true;
                sections.summary = seg_lines.join("\n").trim().to_string();
            }
        }
    }

    // No explicit summary header: fall back to the last paragraph of the full
    // text, unless that paragraph itself opens with a section header.
    if !summary_seen {
        if let Some(last) = paragraphs(&lines).into_iter().last() {
            let opens_with_header = last
                .lines()
                .next()
                .and_then(match_header)
                .is_some();
            if !opens_with_header {
                sections.summary = last;
            }
        }
    }

    sections
}

/// Normalize raw reply text line by line: drop `**` bold markup and leading
/// markdown heading markers, preserving everything else.
fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.replace("**", "");
            strip_heading_marker(&line).to_string()
        })
        .collect()
}

/// Strip a leading `#`-run only when it reads as a markdown heading marker
/// (followed by whitespace). `#1 brand` stays intact.
fn strip_heading_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return line;
    }
    let after = trimmed.trim_start_matches('#');
    if after.starts_with(char::is_whitespace) {
        after.trim_start()
    } else {
        line
    }
}

/// Match a section header anchored at line start (leading whitespace allowed).
/// Returns the section kind and the same-line remainder after the colon.
fn match_header(line: &str) -> Option<(SectionKind, &str)> {
    let trimmed = line.trim_start();
    let lower = trimmed.to_lowercase();
    for (kind, label) in LABELS {
        // Labels are ASCII, so the lowered prefix has the same byte length.
        if lower.starts_with(label) {
            return Some((*kind, trimmed[label.len()..].trim()));
        }
    }
    None
}

/// Extract list items from a section body. Bullet-prefixed lines win; when a
/// section has none, each blank-line-separated paragraph becomes one item.
fn extract_items(lines: &[String]) -> Vec<String> {
    let mut items = Vec::new();
    for line in lines {
        if let Some(m) = BULLET_PREFIX.find(line) {
            let item = line[m.end()..].trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    if !items.is_empty() {
        return items;
    }
    paragraphs(lines)
}

/// Group lines into blank-line-separated paragraphs. Inner lines are trimmed
/// and joined with a single space; empty paragraphs are dropped.
fn paragraphs(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_sections_parse_in_order() {
        let text = "Strengths:\n- A\n- B\nWeaknesses:\n- C";
        let s = parse_swot_text(text);
        assert_eq!(s.strengths, vec!["A", "B"]);
        assert_eq!(s.weaknesses, vec!["C"]);
        assert!(s.opportunities.is_empty());
        assert!(s.threats.is_empty());
        assert_eq!(s.summary, "");
    }

    #[test]
    fn empty_input_yields_defaults() {
        assert_eq!(parse_swot_text(""), SwotSections::default());
    }

    #[test]
    fn headers_out_of_canonical_order() {
        let text = "Threats:\n- late entrants\nStrengths:\n- brand recall";
        let s = parse_swot_text(text);
        assert_eq!(s.threats, vec!["late entrants"]);
        assert_eq!(s.strengths, vec!["brand recall"]);
    }

    #[test]
    fn bold_and_heading_markup_is_stripped() {
        let text = "## **Strengths:**\n- **Strong** presence\n### Summary:\nSolid overall.";
        let s = parse_swot_text(text);
        assert_eq!(s.strengths, vec!["Strong presence"]);
        assert_eq!(s.summary, "Solid overall.");
    }

    #[test]
    fn same_line_header_content_is_kept() {
        let text = "Strengths: market leadership\nWeaknesses: thin margins";
        let s = parse_swot_text(text);
        assert_eq!(s.strengths, vec!["market leadership"]);
        assert_eq!(s.weaknesses, vec!["thin margins"]);
    }

    #[test]
    fn numbered_and_unicode_bullets() {
        let text = "Opportunities:\n1. emerging markets\n2. partnerships\nThreats:\n• regulation\n* churn";
        let s = parse_swot_text(text);
        assert_eq!(s.opportunities, vec!["emerging markets", "partnerships"]);
        assert_eq!(s.threats, vec!["regulation", "churn"]);
    }

    #[test]
    fn paragraph_fallback_when_no_bullets() {
        let text = "Strengths:\nWide distribution network.\n\nLoyal customer base.\nWeaknesses:\n- debt";
        let s = parse_swot_text(text);
        assert_eq!(
            s.strengths,
            vec!["Wide distribution network.", "Loyal customer base."]
        );
        assert_eq!(s.weaknesses, vec!["debt"]);
    }

    #[test]
    fn label_mid_sentence_is_not_a_header() {
        let text = "Strengths:\n- the brand's key strengths: speed and reach";
        let s = parse_swot_text(text);
        assert_eq!(s.strengths, vec!["the brand's key strengths: speed and reach"]);
        assert!(s.weaknesses.is_empty());
    }

    #[test]
    fn summary_falls_back_to_last_paragraph() {
        let text = "Strengths:\n- A\n\nOverall the brand is in decent shape.";
        let s = parse_swot_text(text);
        assert_eq!(s.strengths, vec!["A"]);
        assert_eq!(s.summary, "Overall the brand is in decent shape.");
    }

    #[test]
    fn summary_fallback_skips_header_like_paragraph() {
        let text = "Strengths:\n- A\n- B\nWeaknesses:\n- C";
        // The whole text is one paragraph opening with "Strengths:"; the
        // fallback must not copy it into the summary.
        assert_eq!(parse_swot_text(text).summary, "");
    }

    #[test]
    fn duplicate_header_keeps_first_occurrence() {
        let text = "Strengths:\n- first\nStrengths:\n- second";
        assert_eq!(parse_swot_text(text).strengths, vec!["first"]);
    }

    #[test]
    fn parser_is_idempotent() {
        let text = "Weaknesses:\n- a\n\nSummary:\nfine";
        assert_eq!(parse_swot_text(text), parse_swot_text(text));
    }

    #[test]
    fn plain_text_without_headers_or_blank_lines() {
        let s = parse_swot_text("just a single line of commentary");
        assert!(s.strengths.is_empty());
        assert!(s.threats.is_empty());
        // One paragraph exists, so the summary fallback picks it up.
        assert_eq!(s.summary, "just a single line of commentary");
    }
}
