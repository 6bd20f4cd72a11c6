//! Missing-variable policy.
//!
//! After discovery, the engine computes the set difference between the
//! variables a template references and the keys the caller resolved.
//! [`MissingPolicy`] selects what happens when that difference is
//! non-empty: abort ([`MissingPolicy::Fail`]), log and render with the
//! unresolved markers left verbatim ([`MissingPolicy::Warn`], the
//! default), or drop every line referencing a missing variable before
//! rendering ([`MissingPolicy::Skip`]).
//!
//! Skip-pruning is deliberately coarse: a line is dropped when it contains
//! a missing name as a plain substring, not merely as a resolved marker.
//! The guarantee is one-sided: a dropped line never appears in the final
//! output and no partial line survives.

use clap::ValueEnum;

use crate::templating::values::ValueMapping;

/// Namespaces the renderer always binds, so they never count as missing.
/// `env` carries the process environment (see the Jinja back end).
pub const IMPLICIT_NAMESPACES: &[&str] = &["env"];

/// Behavior when a discovered variable has no caller-supplied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MissingPolicy {
    /// Abort the render; nothing is written to the output path.
    Fail,
    /// Log the missing variables and render with residual markers.
    #[default]
    Warn,
    /// Drop every line referencing a missing variable, then render.
    Skip,
}

/// Compute the discovered variables with no entry in `resolved`, in
/// discovery order. Implicit namespaces are excluded.
pub fn find_missing(discovered: &[String], resolved: &ValueMapping) -> Vec<String> {
    discovered
        .iter()
        .filter(|name| {
            !resolved.contains_key(name.as_str())
                && !IMPLICIT_NAMESPACES.contains(&name.as_str())
        })
        .cloned()
        .collect()
}

/// Remove every line containing any missing variable name as a substring.
///
/// Returns the pruned text and the number of lines dropped. Line
/// boundaries elsewhere are preserved, including a trailing newline.
pub fn drop_missing_lines(text: &str, missing: &[String]) -> (String, usize) {
    let mut kept = Vec::new();
    let mut dropped = 0;

    for line in text.split('\n') {
        if missing.iter().any(|name| line.contains(name.as_str())) {
            dropped += 1;
        } else {
            kept.push(line);
        }
    }

    (kept.join("\n"), dropped)
}
