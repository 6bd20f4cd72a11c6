//! Placeholder-marker catalog and normalization.
//!
//! Model configuration templates arrive in several placeholder dialects
//! accumulated over the years: `[@NAME]`, `{@NAME}`, `{{% NAME %}}`,
//! `{% NAME %}` (with or without inner padding), `<NAME>`, and the
//! canonical `{{ NAME }}`. The substitution back ends only understand the
//! canonical double-brace form, so [`normalize`] rewrites any recognized
//! dialect into it before discovery and rendering.
//!
//! Matching is line-oriented and first-match-wins: the first catalog entry
//! whose open and close literals both appear on a line claims that line,
//! and every `open…close` span on it is rewritten. Longer open literals
//! are ordered before their prefixes (`{{%` before `{%`) so the more
//! specific dialect wins; lines mixing dialects are outside the contract.

/// One supported placeholder dialect, as an (open, close) literal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpec {
    /// Literal that opens a placeholder in this dialect.
    pub open: &'static str,
    /// Literal that closes a placeholder in this dialect.
    pub close: &'static str,
}

/// Canonical open delimiter understood by the substitution back ends.
pub const CANONICAL_OPEN: &str = "{{";
/// Canonical close delimiter understood by the substitution back ends.
pub const CANONICAL_CLOSE: &str = "}}";

/// The ordered catalog of recognized placeholder dialects.
///
/// Order matters: the normalizer scans this list per line and the first
/// matching spec wins. The canonical form is a member so that rewriting it
/// is the identity (inner whitespace collapses to a single space each
/// side); `<NAME>` sits last because its delimiters are the most prone to
/// false positives in ordinary text.
pub const MARKER_CATALOG: &[MarkerSpec] = &[
    MarkerSpec { open: "[@", close: "]" },
    MarkerSpec { open: "{@", close: "}" },
    MarkerSpec { open: "{{%", close: "%}}" },
    MarkerSpec { open: "{%", close: "%}" },
    MarkerSpec { open: CANONICAL_OPEN, close: CANONICAL_CLOSE },
    MarkerSpec { open: "<", close: ">" },
];

/// Rewrite every recognized non-canonical marker in `text` into the
/// canonical `{{ name }}` form, returning a new buffer.
///
/// The input is never mutated. Lines containing no recognized marker pass
/// through unchanged, and normalizing already-canonical text is a no-op,
/// so `normalize(normalize(t)) == normalize(t)` for all `t`.
pub fn normalize(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> String {
    for spec in MARKER_CATALOG {
        if line_matches(line, spec) {
            return rewrite_line(line, spec);
        }
    }
    line.to_string()
}

/// A spec matches when its open literal appears and its close literal
/// appears somewhere after it.
fn line_matches(line: &str, spec: &MarkerSpec) -> bool {
    match line.find(spec.open) {
        Some(idx) => line[idx + spec.open.len()..].contains(spec.close),
        None => false,
    }
}

/// Rewrite every `open…close` span on the line to `{{ name }}`, with the
/// inner text trimmed and re-padded with exactly one space per side.
fn rewrite_line(line: &str, spec: &MarkerSpec) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut rest = line;

    while let Some(open_idx) = rest.find(spec.open) {
        let after_open = open_idx + spec.open.len();
        let close_rel = match rest[after_open..].find(spec.close) {
            Some(idx) => idx,
            None => break,
        };

        let inner = &rest[after_open..after_open + close_rel];
        out.push_str(&rest[..open_idx]);
        out.push_str(CANONICAL_OPEN);
        out.push(' ');
        out.push_str(inner.trim());
        out.push(' ');
        out.push_str(CANONICAL_CLOSE);

        rest = &rest[after_open + close_rel + spec.close.len()..];
    }

    out.push_str(rest);
    out
}
