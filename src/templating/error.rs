//! Structured errors for back-end rendering failures.
//!
//! Back-end errors (tera) arrive as opaque message chains; this module
//! gives them a typed shape with the detail a user needs to fix the
//! template without re-running under instrumentation: the variable name,
//! the line number when the back end reports one, surrounding template
//! lines, and did-you-mean suggestions.

/// A failure raised by a substitution back end.
#[derive(Debug)]
pub enum RenderError {
    /// The back end hit a variable with no binding. This only occurs for
    /// references the discovery pass could not see (e.g. names used inside
    /// block tags); ordinary missing variables are handled by the policy
    /// engine before rendering starts.
    VariableNotFound {
        /// The unresolved variable name.
        variable: String,
        /// Close matches among the bound names, best first.
        suggestions: Vec<String>,
        /// 1-indexed template line, when the back end reports one.
        line: Option<usize>,
        /// Nearby template lines as (line number, text) pairs.
        context_lines: Vec<(usize, String)>,
    },

    /// Any other back-end failure: malformed expression syntax, a type
    /// error inside a conditional, an unknown filter.
    SyntaxError {
        /// Cleaned-up message chain from the back end.
        message: String,
        /// 1-indexed template line, when the back end reports one.
        line: Option<usize>,
        /// Nearby template lines as (line number, text) pairs.
        context_lines: Vec<(usize, String)>,
    },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::VariableNotFound { variable, .. } => {
                write!(f, "Template variable not found: '{variable}'")
            }
            RenderError::SyntaxError { message, .. } => {
                write!(f, "Template syntax error: {message}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl RenderError {
    /// Render a multi-line, user-facing report with line context and
    /// suggestions.
    pub fn format_with_context(&self) -> String {
        match self {
            RenderError::VariableNotFound {
                variable,
                suggestions,
                line,
                context_lines,
            } => {
                let mut msg = String::new();
                msg.push_str(&format!("Variable: {variable}\n"));
                if let Some(line) = line {
                    msg.push_str(&format!("Line: {line}\n"));
                }
                if !suggestions.is_empty() {
                    msg.push_str("Did you mean one of these?\n");
                    for suggestion in suggestions {
                        msg.push_str(&format!("  - {suggestion}\n"));
                    }
                }
                push_context_lines(&mut msg, context_lines);
                msg
            }
            RenderError::SyntaxError {
                message,
                line,
                context_lines,
            } => {
                let mut msg = String::new();
                msg.push_str(&format!("Error: {message}\n"));
                if let Some(line) = line {
                    msg.push_str(&format!("Line: {line}\n"));
                }
                push_context_lines(&mut msg, context_lines);
                msg
            }
        }
    }
}

fn push_context_lines(msg: &mut String, context_lines: &[(usize, String)]) {
    if context_lines.is_empty() {
        return;
    }
    msg.push_str("Template context:\n");
    for (number, text) in context_lines {
        msg.push_str(&format!("  {number:>4} | {text}\n"));
    }
}
