//! Core types and error handling for tmplkit.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`TmplkitError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users

pub mod error;

pub use error::{ErrorContext, TmplkitError, user_friendly_error};
