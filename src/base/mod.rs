//! Foundation types for the gatework analysis core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`QualifiedName`] - `library.unit` identifiers
//! - [`SourceFile`] - in-memory source text handed in by the caller
//!
//! This module has NO dependencies on other gatework modules.

mod name;
mod source;

pub use name::QualifiedName;
pub use source::SourceFile;
