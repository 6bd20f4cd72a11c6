//! tmplkit - template rendering for model configuration files
//!
//! tmplkit takes a text template containing placeholder markers in any of
//! several supported dialects, substitutes values from a caller-provided
//! mapping, enforces a configurable missing-variable policy, and writes
//! the rendered result to an output file.
//!
//! # Architecture Overview
//!
//! Rendering is a single synchronous pipeline with no state between calls:
//!
//! 1. **Normalize**: legacy placeholder dialects (`[@X]`, `{@X}`,
//!    `{%X%}`, `{{% X %}}`, `<X>`) are rewritten to canonical `{{ X }}`
//!    form on a private working copy; the caller's template is never
//!    modified.
//! 2. **Discover**: the variables the template references are extracted
//!    with an expression tokenizer (a legacy line scan survives as a
//!    deprecated fallback).
//! 3. **Policy**: missing variables either abort the render (`fail`),
//!    are logged and left verbatim (`warn`, the default), or cause the
//!    lines referencing them to be dropped (`skip`).
//! 4. **Resolve**: values are adapted for the consumer format
//!    (optionally rewriting booleans to Fortran-90 `T`/`F` tokens).
//! 5. **Render**: a substitution back end interpolates the text, either
//!    tera with the full expression language or a literal marker
//!    replacer. The process environment is available inside templates as
//!    the implicit `env` namespace; caller values take precedence.
//! 6. **Write**: output lands atomically; a failed render never leaves
//!    partial output.
//!
//! # Core Modules
//!
//! - [`templating`] - the rendering engine (markers, discovery, policy,
//!   values, back ends)
//! - [`core`] - error taxonomy and user-facing error display
//! - [`cli`] - the `tmplkit` command-line interface
//! - [`utils`] - filesystem helpers (atomic writes, normalized reads)
//!
//! # Example
//!
//! ```rust,no_run
//! use tmplkit::templating::{MissingPolicy, Renderer, ValueMapping};
//! use serde_json::json;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut values = ValueMapping::new();
//! values.insert("NAME1".to_string(), json!("ham"));
//! values.insert("NAME2".to_string(), json!("eggs"));
//!
//! Renderer::new()
//!     .with_policy(MissingPolicy::Fail)
//!     .render_to_file(
//!         Path::new("model.conf.tmpl"),
//!         Path::new("model.conf"),
//!         &values,
//!     )?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod templating;
pub mod utils;

pub use crate::core::{TmplkitError, user_friendly_error};
pub use crate::templating::{
    BackendKind, MissingPolicy, RenderSummary, Renderer, ValueMapping,
};
