//! In-memory source files.

use std::sync::Arc;

/// A source file handed to the analysis core by the caller.
///
/// The core performs no I/O: the caller walks directories, filters by
/// extension, reads each file once, and passes the results in. Both
/// fields are `Arc` so files can be shared cheaply across design units
/// and worker threads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFile {
    /// Display path, used for extern ordering and diagnostics.
    pub path: Arc<str>,
    /// Full file contents.
    pub text: Arc<str>,
}

impl SourceFile {
    /// Create a source file from a path and its contents.
    pub fn new(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}
