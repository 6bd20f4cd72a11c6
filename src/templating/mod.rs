//! Template rendering engine.
//!
//! One canonical marker-substitution engine usable by two front ends: a
//! Jinja-flavored renderer (tera) and a literal renderer with no
//! expression language. Each render call is a sequential, synchronous
//! pipeline with no state surviving between calls:
//!
//! ```text
//! read -> normalize (optional) -> discover -> missing-policy
//!      -> resolve -> back-end render -> atomic write -> cleanup
//! ```
//!
//! - [`markers`] holds the placeholder-dialect catalog and the normalizer
//!   that rewrites every recognized dialect into canonical `{{ name }}`.
//! - [`discovery`] extracts the variable names a template references.
//! - [`policy`] computes missing variables and applies the configured
//!   [`MissingPolicy`] (fail / warn / skip).
//! - [`values`] owns the caller mapping type and the Fortran-boolean
//!   adapter.
//! - [`backend`] is the substitution seam with the two adapters.
//!
//! When normalization or skip-pruning rewrites the template, the engine
//! works on a private temporary copy with a unique path per call; the
//! caller's template is never touched and the copy is deleted on every
//! exit path. Output is written atomically, so a failed render never
//! leaves partial output at the destination.

pub mod backend;
pub mod discovery;
pub mod error;
pub mod markers;
pub mod policy;
pub mod values;

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use tempfile::NamedTempFile;

pub use backend::{JinjaBackend, LiteralBackend, SubstitutionBackend};
pub use error::RenderError;
pub use markers::{MARKER_CATALOG, MarkerSpec, normalize};
pub use policy::MissingPolicy;
pub use values::{ValueMapping, mapping_from_yaml};

use crate::core::TmplkitError;
use crate::utils;

/// Which substitution back end a render uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendKind {
    /// Tera, with the full expression language.
    #[default]
    Jinja,
    /// Plain canonical-marker replacement.
    Literal,
}

/// What a successful render tolerated or removed. Serializable so
/// callers can emit it in machine-readable run reports.
#[derive(Debug, Default, Serialize)]
pub struct RenderSummary {
    /// Variables left unresolved under the `warn` policy (empty under
    /// `fail` and `skip`).
    pub missing: Vec<String>,
    /// Lines removed by the `skip` policy.
    pub dropped_lines: usize,
}

/// The rendering engine. Stateless between calls; construct once and
/// reuse, or build per call; both are equivalent.
#[derive(Debug, Clone)]
pub struct Renderer {
    policy: MissingPolicy,
    backend: BackendKind,
    normalize_markers: bool,
    f90_bool: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// A renderer with the default configuration: `warn` policy, Jinja
    /// back end, no marker normalization, no boolean adaptation.
    pub fn new() -> Self {
        Self {
            policy: MissingPolicy::default(),
            backend: BackendKind::default(),
            normalize_markers: false,
            f90_bool: false,
        }
    }

    /// Select the missing-variable policy.
    #[must_use]
    pub fn with_policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Select the substitution back end.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Rewrite non-canonical placeholder dialects before rendering.
    #[must_use]
    pub fn with_marker_normalization(mut self, enabled: bool) -> Self {
        self.normalize_markers = enabled;
        self
    }

    /// Adapt boolean values to Fortran-90 `T`/`F` tokens.
    #[must_use]
    pub fn with_f90_bool(mut self, enabled: bool) -> Self {
        self.f90_bool = enabled;
        self
    }

    /// Render `template` with `values` and write the result to `output`.
    ///
    /// Configuration errors (missing template, empty mapping for a
    /// template that needs variables) are raised before any output I/O.
    /// Under the `fail` policy a missing variable aborts with nothing
    /// written; under `warn` residual markers stay in the output; under
    /// `skip` lines referencing missing variables are dropped.
    pub fn render_to_file(
        &self,
        template: &Path,
        output: &Path,
        values: &ValueMapping,
    ) -> Result<RenderSummary, TmplkitError> {
        let (mut working, discovered) = self.prepare(template)?;
        tracing::debug!(
            template = %template.display(),
            variables = discovered.len(),
            backend = ?self.backend,
            "template prepared"
        );

        // Implicit namespaces resolve without caller values, so a template
        // that only reads `env` renders fine against an empty mapping.
        let needs_values = discovered
            .iter()
            .any(|name| !policy::IMPLICIT_NAMESPACES.contains(&name.as_str()));
        if values.is_empty() && needs_values {
            return Err(TmplkitError::EmptyValueMapping {
                path: template.to_path_buf(),
            });
        }

        let missing = policy::find_missing(&discovered, values);
        let mut summary = RenderSummary::default();

        if !missing.is_empty() {
            match self.policy {
                MissingPolicy::Fail => {
                    return Err(TmplkitError::MissingVariables {
                        template: template.to_path_buf(),
                        variables: missing,
                    });
                }
                MissingPolicy::Warn => {
                    tracing::warn!(
                        template = %template.display(),
                        missing = missing.join(", "),
                        "rendering with unresolved variables"
                    );
                    summary.missing = missing.clone();
                }
                MissingPolicy::Skip => {
                    let (pruned, dropped) =
                        policy::drop_missing_lines(working.text(), &missing);
                    working.replace_text(pruned)?;
                    summary.dropped_lines = dropped;
                    tracing::debug!(dropped, "skip policy pruned lines");
                }
            }
        }

        let resolved = values::resolve(values, self.f90_bool);
        let backend = self.backend_impl();
        let text = working.contents()?;
        let rendered = backend
            .render(&text, &resolved, &missing)
            .map_err(|source| TmplkitError::RenderFailed {
                output: output.to_path_buf(),
                source,
            })?;

        utils::fs::atomic_write(output, rendered.as_bytes())?;
        tracing::debug!(output = %output.display(), "render complete");
        Ok(summary)
    }

    /// List the variables `template` references, in discovery order.
    pub fn discover_variables(&self, template: &Path) -> Result<Vec<String>, TmplkitError> {
        let (_working, discovered) = self.prepare(template)?;
        Ok(discovered)
    }

    /// Read the template, stage a working copy when the pipeline will
    /// rewrite it, normalize when requested, and run discovery.
    fn prepare(&self, template: &Path) -> Result<(WorkingCopy, Vec<String>), TmplkitError> {
        if !template.is_file() {
            return Err(TmplkitError::TemplateNotFound {
                path: template.to_path_buf(),
            });
        }

        let raw = utils::fs::read_text(template)?;

        // The literal back end only understands canonical markers, so the
        // pipeline normalizes unconditionally for it.
        let needs_normalize =
            self.normalize_markers || self.backend == BackendKind::Literal;
        // Skip-pruning also rewrites, and must never touch the original.
        let needs_staging = needs_normalize || self.policy == MissingPolicy::Skip;

        let mut working = WorkingCopy::new(raw, needs_staging)?;
        if needs_normalize {
            let normalized = markers::normalize(working.text());
            working.replace_text(normalized)?;
        }

        let discovered = discovery::discover(working.text());
        Ok((working, discovered))
    }

    fn backend_impl(&self) -> &'static dyn SubstitutionBackend {
        match self.backend {
            BackendKind::Jinja => &JinjaBackend,
            BackendKind::Literal => &LiteralBackend,
        }
    }
}

/// The template text a render operates on.
///
/// When the pipeline rewrites the template (normalization or
/// skip-pruning), the text is staged to a uniquely named temporary file
/// and every rewrite lands there; the back end reads its input back from
/// that file. The [`NamedTempFile`] guard deletes the copy on every exit
/// path. Without rewrites the text stays in memory and no file is
/// created.
struct WorkingCopy {
    text: String,
    staged: Option<NamedTempFile>,
}

impl WorkingCopy {
    fn new(text: String, staged: bool) -> Result<Self, TmplkitError> {
        let staged = if staged {
            let file = NamedTempFile::new()?;
            fs::write(file.path(), &text)?;
            tracing::debug!(path = %file.path().display(), "staged private template copy");
            Some(file)
        } else {
            None
        };
        Ok(Self { text, staged })
    }

    fn text(&self) -> &str {
        &self.text
    }

    /// Path of the staged copy, if one exists.
    #[cfg(test)]
    fn staged_path(&self) -> Option<std::path::PathBuf> {
        self.staged.as_ref().map(|f| f.path().to_path_buf())
    }

    fn replace_text(&mut self, text: String) -> Result<(), TmplkitError> {
        if let Some(file) = &self.staged {
            fs::write(file.path(), &text)?;
        }
        self.text = text;
        Ok(())
    }

    /// The text handed to the back end, read back from the staged copy
    /// when one exists.
    fn contents(&self) -> Result<String, TmplkitError> {
        match &self.staged {
            Some(file) => Ok(utils::fs::read_text(file.path())?),
            None => Ok(self.text.clone()),
        }
    }
}
