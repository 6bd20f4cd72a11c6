//! The `render` subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::core::TmplkitError;
use crate::templating::{
    BackendKind, MissingPolicy, Renderer, ValueMapping, mapping_from_yaml, values,
};
use crate::utils;

/// Render a template against a value mapping and write the output file.
#[derive(Args)]
pub struct RenderCommand {
    /// Path to the template file.
    #[arg(short, long)]
    template: PathBuf,

    /// Path of the rendered output file (created or overwritten).
    #[arg(short, long)]
    output: PathBuf,

    /// YAML file with NAME: value pairs.
    #[arg(long)]
    values: Option<PathBuf>,

    /// Inline override, repeatable; later occurrences win over the
    /// values file and over earlier --set entries.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// What to do when a template variable has no value.
    #[arg(long, value_enum, default_value_t = MissingPolicy::Warn)]
    on_missing: MissingPolicy,

    /// Rewrite legacy placeholder dialects ([@X], {@X}, {%X%}, <X>) to
    /// canonical {{ X }} form before rendering.
    #[arg(long)]
    normalize_markers: bool,

    /// Substitute Fortran-90 tokens (T/F) for boolean values.
    #[arg(long)]
    f90_bool: bool,

    /// Substitution back end.
    #[arg(long, value_enum, default_value_t = BackendKind::Jinja)]
    engine: BackendKind,
}

impl RenderCommand {
    /// Execute the render.
    pub fn execute(self) -> Result<()> {
        let mapping = self.build_mapping()?;

        let renderer = Renderer::new()
            .with_policy(self.on_missing)
            .with_backend(self.engine)
            .with_marker_normalization(self.normalize_markers)
            .with_f90_bool(self.f90_bool);

        let summary = renderer.render_to_file(&self.template, &self.output, &mapping)?;

        // The engine already warned per unresolved variable; this is the
        // run summary only.
        if !summary.missing.is_empty() {
            tracing::info!(
                unresolved = summary.missing.len(),
                "output contains residual markers"
            );
        }
        if summary.dropped_lines > 0 {
            tracing::info!(dropped = summary.dropped_lines, "lines dropped by skip policy");
        }
        tracing::info!(
            template = %self.template.display(),
            output = %self.output.display(),
            "rendered"
        );
        Ok(())
    }

    /// Assemble the caller mapping: values file first, then `--set`
    /// overrides in order.
    fn build_mapping(&self) -> Result<ValueMapping> {
        let mut mapping = match &self.values {
            Some(path) => {
                let text = utils::fs::read_text(path).map_err(|e| TmplkitError::Config {
                    message: format!("cannot read values file {}: {e}", path.display()),
                })?;
                mapping_from_yaml(&text)?
            }
            None => ValueMapping::new(),
        };

        for expr in &self.set {
            let (key, raw) = expr.split_once('=').ok_or_else(|| TmplkitError::Config {
                message: format!("--set expects KEY=VALUE, got {expr:?}"),
            })?;
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(TmplkitError::InvalidValueKey {
                    key: key.to_string(),
                    reason: "variable names must be non-empty and contain no whitespace"
                        .to_string(),
                }
                .into());
            }
            mapping.insert(key.to_string(), values::value_from_yaml(raw)?);
        }

        Ok(mapping)
    }
}
