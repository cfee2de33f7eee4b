//! Semantic-version engine for block releases.
//!
//! Release and install logic is strict where the structural scanner is
//! lenient: a release with a non-increasing explicit version is refused
//! outright. Parsing, by contrast, is deliberately forgiving: any
//! missing or unparsable component reads as zero. That leniency can
//! mask typos as valid low versions; it is preserved as-is pending a
//! product decision.

use std::fmt;

use thiserror::Error;

/// A `major.minor.patch` triple with total lexicographic ordering.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Which component a release bump increments.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

/// The one fatal error of the version engine.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum VersionError {
    /// An explicitly requested release version must exceed the current one.
    #[error("invalid version selection: {target} does not increase on {current}")]
    NotIncreasing { target: Version, current: Version },
}

impl Version {
    /// Create a version from its components.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse text like `v1.2.3`, `1.2` or `2`.
    ///
    /// A leading `v` is stripped; components beyond the third are
    /// ignored; absent or unparsable components default to zero, so
    /// this never fails.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
        let mut parts = text.split('.');
        let mut component = |part: Option<&str>| {
            part.and_then(|p| p.trim().parse::<u64>().ok()).unwrap_or(0)
        };
        Self {
            major: component(parts.next()),
            minor: component(parts.next()),
            patch: component(parts.next()),
        }
    }

    /// The release tag form, `vX.Y.Z`.
    pub fn tag(&self) -> String {
        format!("v{self}")
    }

    /// The larger of two versions; ties resolve to the right operand.
    pub fn newer(self, other: Self) -> Self {
        if self <= other { other } else { self }
    }

    /// Increment one component and zero everything below it.
    pub fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self::new(self.major + 1, 0, 0),
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

/// Check an explicitly requested release version against the current one.
///
/// The release must not proceed unless `target` strictly increases.
pub fn validate_explicit(target: Version, current: Version) -> Result<(), VersionError> {
    if target > current {
        Ok(())
    } else {
        Err(VersionError::NotIncreasing { target, current })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
