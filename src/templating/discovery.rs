//! Variable discovery over normalized templates.
//!
//! [`discover`] returns the distinct placeholder names a template
//! references, in first-appearance order (the order used for deterministic
//! error messages). The primary path tokenizes every canonical
//! `{{ … }}` expression: string literals and numbers are skipped, keywords
//! are not variables, dotted paths contribute their root segment, filter
//! names after `|`, function calls, and keyword arguments are excluded.
//!
//! A legacy line-oriented scan survives as a fallback, triggered only when
//! the tokenizer finds nothing. It takes the substring between the first
//! `{{` and the first `}}` of each line and skips any line containing the
//! token `or`, a heuristic inherited from an earlier implementation that
//! also skips legitimate names containing `or`. It is deprecated,
//! diagnostic-only, and announces itself with a warning when used.

use std::collections::HashSet;

use crate::templating::markers::{CANONICAL_CLOSE, CANONICAL_OPEN};

/// Expression keywords that must never be treated as variable names.
const KEYWORDS: &[&str] = &[
    "or", "and", "not", "in", "is", "true", "false", "True", "False",
];

/// Collect the distinct variable names referenced by `text`, in
/// discovery order.
pub fn discover(text: &str) -> Vec<String> {
    let variables = scan_expressions(text);
    if !variables.is_empty() {
        return variables;
    }

    let fallback = legacy_line_scan(text);
    if !fallback.is_empty() {
        tracing::warn!(
            count = fallback.len(),
            "expression scan found no variables; using deprecated line-scan fallback"
        );
    }
    fallback
}

/// Primary path: tokenize every `{{ … }}` expression in the text.
fn scan_expressions(text: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut seen = HashSet::new();
    let mut rest = text;

    while let Some(open_idx) = rest.find(CANONICAL_OPEN) {
        let after_open = open_idx + CANONICAL_OPEN.len();
        let close_rel = match rest[after_open..].find(CANONICAL_CLOSE) {
            Some(idx) => idx,
            None => break,
        };

        let expr = &rest[after_open..after_open + close_rel];
        for root in expression_roots(expr) {
            if seen.insert(root.clone()) {
                variables.push(root);
            }
        }

        rest = &rest[after_open + close_rel + CANONICAL_CLOSE.len()..];
    }

    variables
}

/// Extract the root identifiers of all free variables in one expression.
///
/// Used by discovery and by the renderer when deciding which markers
/// reference known-missing variables.
pub(crate) fn expression_roots(expr: &str) -> Vec<String> {
    let mut roots = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    // Set after `|`: the next identifier is a filter name, not a variable.
    let mut expecting_filter = false;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '"' || c == '\'' {
            i = skip_string_literal(expr, i, c);
        } else if c.is_ascii_digit() {
            i = skip_number(expr, i);
        } else if c == '|' {
            expecting_filter = true;
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let (token, next) = scan_identifier(expr, i);
            i = next;

            if expecting_filter {
                expecting_filter = false;
                continue;
            }

            let root = token.split('.').next().unwrap_or(token);
            if KEYWORDS.contains(&root) {
                continue;
            }
            // `name(` is a function call, `name=` a keyword argument.
            match next_significant_char(expr, i) {
                Some('(') => continue,
                Some('=') if !matches!(char_at(expr, i, 1), Some('=')) => continue,
                _ => {}
            }
            roots.push(root.to_string());
        } else {
            i += 1;
        }
    }

    roots
}

fn skip_string_literal(expr: &str, start: usize, quote: char) -> usize {
    let bytes = expr.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() && bytes[i] as char != quote {
        i += 1;
    }
    if i < bytes.len() { i + 1 } else { i }
}

fn skip_number(expr: &str, start: usize) -> usize {
    let bytes = expr.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn scan_identifier(expr: &str, start: usize) -> (&str, usize) {
    let bytes = expr.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            i += 1;
        } else {
            break;
        }
    }
    (&expr[start..i], i)
}

/// First non-whitespace character at or after `from`.
fn next_significant_char(expr: &str, from: usize) -> Option<char> {
    expr[from.min(expr.len())..]
        .chars()
        .find(|c| !c.is_whitespace())
}

/// Character `offset` positions past the first significant character.
fn char_at(expr: &str, from: usize, offset: usize) -> Option<char> {
    let trimmed = expr[from.min(expr.len())..].trim_start();
    trimmed.chars().nth(offset)
}

/// Fallback path: the legacy line scan.
///
/// For every line containing both canonical delimiters, the substring
/// between the first `{{` and the first `}}` is trimmed and treated as a
/// variable name, except on lines containing the token `or` (assumed to
/// carry a default-value expression).
fn legacy_line_scan(text: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut seen = HashSet::new();

    for line in text.split('\n') {
        if line.contains("or") {
            continue;
        }
        let start = match line.find(CANONICAL_OPEN) {
            Some(idx) => idx,
            None => continue,
        };
        let stop = match line.find(CANONICAL_CLOSE) {
            Some(idx) => idx,
            None => continue,
        };
        if stop <= start + CANONICAL_OPEN.len() {
            continue;
        }

        let name = line[start + CANONICAL_OPEN.len()..stop].trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            variables.push(name.to_string());
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_variables_in_discovery_order() {
        let text = "NAME1={{ NAME1 }}\nNAME2={{ NAME2 }}\n";
        assert_eq!(discover(text), vec!["NAME1", "NAME2"]);
    }

    #[test]
    fn deduplicates_repeated_variables() {
        let text = "{{ A }} {{ B }} {{ A }}";
        assert_eq!(discover(text), vec!["A", "B"]);
    }

    #[test]
    fn empty_template_discovers_nothing() {
        assert!(discover("just text\nno markers\n").is_empty());
    }

    #[test]
    fn dotted_paths_contribute_the_root_segment() {
        assert_eq!(discover("{{ env.HOME }}"), vec!["env"]);
        assert_eq!(discover("{{ model.resolution }}"), vec!["model"]);
    }

    #[test]
    fn default_value_expressions_still_yield_the_variable() {
        // The tokenizer handles what the legacy scan could only skip.
        assert_eq!(discover(r#"{{ NAME or "default" }}"#), vec!["NAME"]);
    }

    #[test]
    fn string_literals_are_not_variables() {
        assert_eq!(discover(r#"{{ "literal" }}"#), Vec::<String>::new());
        assert_eq!(discover(r#"{{ X or "Y_NOT_A_VAR" }}"#), vec!["X"]);
    }

    #[test]
    fn filter_names_are_not_variables() {
        assert_eq!(discover("{{ NAME | upper }}"), vec!["NAME"]);
    }

    #[test]
    fn filter_keyword_arguments_are_not_variables() {
        assert_eq!(
            discover(r#"{{ NAME | default(value="x") }}"#),
            vec!["NAME"]
        );
    }

    #[test]
    fn function_calls_are_not_variables() {
        assert_eq!(discover("{{ now() }}"), Vec::<String>::new());
    }

    #[test]
    fn keywords_are_not_variables() {
        assert_eq!(discover("{{ A and not B }}"), vec!["A", "B"]);
        assert_eq!(discover("{{ true }}"), Vec::<String>::new());
    }

    #[test]
    fn comparison_operands_are_both_found() {
        assert_eq!(discover("{{ A == B }}"), vec!["A", "B"]);
    }

    #[test]
    fn fallback_catches_names_the_tokenizer_cannot() {
        // A name starting with a digit is invisible to the tokenizer but
        // still looks like a marker to the legacy scan.
        assert_eq!(discover("{{ 4DVAR }}"), vec!["4DVAR"]);
    }

    #[test]
    fn fallback_skips_lines_containing_or() {
        // Legacy heuristic: with nothing tokenizable anywhere, a line
        // containing "or" is skipped wholesale.
        let text = "{{ 4DVAR }}\n{{ 9north }}\n";
        assert_eq!(discover(text), vec!["4DVAR"]);
    }

    #[test]
    fn expression_roots_handles_multiple_identifiers() {
        assert_eq!(expression_roots("A + B.c - 2"), vec!["A", "B"]);
    }
}
