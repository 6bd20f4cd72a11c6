//! Substitution back ends.
//!
//! [`SubstitutionBackend`] is the narrow seam between the shared engine
//! (normalization, discovery, missing-variable policy) and the code that
//! actually interpolates text. Two adapters implement it:
//!
//! - [`JinjaBackend`] drives tera and supports the full expression
//!   language (conditionals, filters, defaults). Tera hard-errors on
//!   unbound variables, so markers referencing known-missing variables are
//!   protected with unique placeholders before rendering and restored
//!   verbatim afterwards, which is what lets the `warn` policy leave
//!   residual markers in the output.
//! - [`LiteralBackend`] performs plain canonical-marker replacement with
//!   no expression language, and strips trailing whitespace from each
//!   output line (the convention of the non-Jinja renderer it replaces).
//!
//! Both adapters expose the process environment as the implicit `env`
//! namespace; caller-supplied values always win over same-named entries.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};

use super::discovery::expression_roots;
use super::error::RenderError;
use super::markers::{CANONICAL_CLOSE, CANONICAL_OPEN};
use super::values::ValueMapping;

/// Maximum Levenshtein distance, as a percentage of the target length,
/// for a bound name to qualify as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Prefix for the placeholders that shield unresolved markers from tera.
const PROTECT_PREFIX: &str = "__TMPLKIT_UNRESOLVED_";

/// The substitution seam: given template text and resolved bindings,
/// produce rendered text.
pub trait SubstitutionBackend {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render `text` against `values`. `missing` lists the variables the
    /// policy engine already knows have no binding, so the back end can
    /// leave their markers untouched instead of failing on them.
    fn render(
        &self,
        text: &str,
        values: &ValueMapping,
        missing: &[String],
    ) -> Result<String, RenderError>;
}

/// Tera-backed renderer with the full expression language.
pub struct JinjaBackend;

impl SubstitutionBackend for JinjaBackend {
    fn name(&self) -> &'static str {
        "jinja"
    }

    fn render(
        &self,
        text: &str,
        values: &ValueMapping,
        missing: &[String],
    ) -> Result<String, RenderError> {
        // Shield markers for known-missing variables; tera would error on
        // them, and the warn policy wants them verbatim in the output.
        let (protected, placeholders) = protect_unresolved(text, missing);
        if !placeholders.is_empty() {
            tracing::debug!(count = placeholders.len(), "protected unresolved markers");
        }

        let context = build_context(values);

        // A fresh Tera instance per render; the engine is stateless
        // between calls and an empty instance is just empty maps.
        let mut tera = Tera::default();
        let rendered = tera
            .render_str(&protected, &context)
            .map_err(|e| parse_tera_error(&e, &protected, values))?;

        Ok(restore_unresolved(&rendered, &placeholders))
    }
}

/// Plain marker replacement with no expression language.
///
/// Consumes canonical-form text only (the pipeline normalizes
/// unconditionally for this back end). Unresolved markers are left in
/// place, so it never fails intrinsically.
pub struct LiteralBackend;

impl SubstitutionBackend for LiteralBackend {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn render(
        &self,
        text: &str,
        values: &ValueMapping,
        _missing: &[String],
    ) -> Result<String, RenderError> {
        let mut out = text.to_string();

        for (key, value) in values {
            let marker = format!("{CANONICAL_OPEN} {key} {CANONICAL_CLOSE}");
            if out.contains(&marker) {
                out = out.replace(&marker, &literal_value(value));
            }
        }

        out = substitute_env_markers(&out);

        // Trailing-whitespace-per-line strip is this renderer's output
        // convention.
        let stripped = out
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(stripped)
    }
}

/// Render a value as literal substitution text. Nested values fall back
/// to their JSON spelling.
fn literal_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Replace `{{ env.NAME }}` markers with live environment values. Markers
/// for unset variables are left in place.
fn substitute_env_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(open_idx) = rest.find(CANONICAL_OPEN) else {
            break;
        };
        let after_open = open_idx + CANONICAL_OPEN.len();
        let Some(close_rel) = rest[after_open..].find(CANONICAL_CLOSE) else {
            break;
        };
        let close_end = after_open + close_rel + CANONICAL_CLOSE.len();

        let inner = rest[after_open..after_open + close_rel].trim();
        let replacement = inner
            .strip_prefix("env.")
            .and_then(|name| std::env::var(name).ok());

        out.push_str(&rest[..open_idx]);
        match replacement {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open_idx..close_end]),
        }
        rest = &rest[close_end..];
    }

    out.push_str(rest);
    out
}

/// Build the tera context: the process environment first, under the
/// implicit `env` namespace, then caller values (caller wins on a name
/// collision).
fn build_context(values: &ValueMapping) -> TeraContext {
    let mut context = TeraContext::new();

    let env: serde_json::Map<String, Value> = std::env::vars()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    context.insert("env", &Value::Object(env));

    for (key, value) in values {
        context.insert(key, value);
    }

    context
}

/// Replace every `{{ … }}` span whose expression references a missing
/// variable with a unique placeholder, remembering the original text.
fn protect_unresolved(text: &str, missing: &[String]) -> (String, HashMap<String, String>) {
    let mut placeholders = HashMap::new();
    if missing.is_empty() {
        return (text.to_string(), placeholders);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut counter = 0usize;

    loop {
        let Some(open_idx) = rest.find(CANONICAL_OPEN) else {
            break;
        };
        let after_open = open_idx + CANONICAL_OPEN.len();
        let Some(close_rel) = rest[after_open..].find(CANONICAL_CLOSE) else {
            break;
        };
        let close_end = after_open + close_rel + CANONICAL_CLOSE.len();

        let expr = &rest[after_open..after_open + close_rel];
        let references_missing = expression_roots(expr)
            .iter()
            .any(|root| missing.iter().any(|m| m == root));

        out.push_str(&rest[..open_idx]);
        if references_missing {
            let id = format!("{PROTECT_PREFIX}{counter}__");
            counter += 1;
            placeholders.insert(id.clone(), rest[open_idx..close_end].to_string());
            out.push_str(&id);
        } else {
            out.push_str(&rest[open_idx..close_end]);
        }
        rest = &rest[close_end..];
    }

    out.push_str(rest);
    (out, placeholders)
}

/// Put the original marker text back where the placeholders were.
fn restore_unresolved(text: &str, placeholders: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (id, original) in placeholders {
        out = out.replace(id, original);
    }
    out
}

/// Parse a tera error into a structured [`RenderError`].
fn parse_tera_error(
    error: &tera::Error,
    template_text: &str,
    values: &ValueMapping,
) -> RenderError {
    let line = extract_line_from_tera_error(error);
    let context_lines = match line {
        Some(line) => extract_context_lines(template_text, line, 2),
        None => Vec::new(),
    };

    let message = format_tera_error(error);
    if let Some(variable) = extract_variable_name(&message) {
        let bound = bound_names(values);
        let suggestions = find_similar_names(&variable, &bound);
        return RenderError::VariableNotFound {
            variable,
            suggestions,
            line,
            context_lines,
        };
    }

    RenderError::SyntaxError {
        message,
        line,
        context_lines,
    }
}

/// Extract a variable name from a "Variable `foo` not found" message.
fn extract_variable_name(message: &str) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    re.captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a 1-indexed line number from tera's `line:column` notation.
fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
    let debug = format!("{error:?}");
    let re = Regex::new(r"(\d+):(\d+)").ok()?;
    re.captures(&debug)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Up to `radius` lines either side of the error line, with 1-indexed
/// line numbers.
fn extract_context_lines(text: &str, error_line: usize, radius: usize) -> Vec<(usize, String)> {
    let lines: Vec<&str> = text.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return Vec::new();
    }

    let start = error_line.saturating_sub(radius + 1);
    let end = (error_line + radius).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(idx, line)| (start + idx + 1, line.to_string()))
        .collect()
}

/// Names available for suggestions: the bound value keys plus the
/// implicit namespace.
fn bound_names(values: &ValueMapping) -> Vec<String> {
    let mut names: Vec<String> = values.keys().cloned().collect();
    names.push("env".to_string());
    names
}

/// Closest bound names by Levenshtein distance, best three within the
/// similarity threshold.
fn find_similar_names(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> = available
        .iter()
        .map(|name| (name.clone(), levenshtein(target, name)))
        .collect();

    scored.sort_by_key(|(_, distance)| *distance);
    scored
        .into_iter()
        .filter(|(_, distance)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(name, _)| name)
        .collect()
}

/// Flatten a tera error chain into one readable message, dropping the
/// internal one-off template name.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = Vec::new();
    let mut all = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        all.push(err.to_string());
        current = err.source();
    }

    for msg in all {
        let cleaned = msg
            .replace("while rendering '__tera_one_off'", "")
            .replace("Failed to render '__tera_one_off'", "")
            .replace("Failed to parse '__tera_one_off'", "")
            .replace("'__tera_one_off'", "template")
            .trim()
            .to_string();
        if !cleaned.is_empty() {
            messages.push(cleaned);
        }
    }

    if messages.is_empty() {
        "template rendering failed".to_string()
    } else {
        messages.join(": ")
    }
}
