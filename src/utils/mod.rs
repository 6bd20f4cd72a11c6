//! Cross-platform utilities and helpers.
//!
//! This module holds the filesystem helpers the rendering pipeline relies
//! on; see [`fs`] for atomic writes and context-carrying reads.

pub mod fs;
