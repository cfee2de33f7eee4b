//! The design book: every known unit, queryable by qualified name.
//!
//! Assembly runs in two phases. A cheap **survey** pass records which
//! file declares each
//! entity/package header, producing the [`UnitIndex`] that reference
//! resolution consults while files are being parsed. The full per-file
//! parse results are then merged into the [`DesignBook`] in a
//! deterministic, single-threaded reduction.
//!
//! Both structures are partitioned into a "current block" scope and a
//! "library cache" scope; current takes precedence on lookup.

use indexmap::IndexMap;
use tracing::debug;

use crate::base::{QualifiedName, SourceFile};
use crate::unit::{DesignUnit, DesignUnitKind};

/// Which partition of the book a file belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The block currently being analyzed.
    Current,
    /// Every other installed block in the workspace.
    Cache,
}

// ============================================================================
// SURVEY INDEX
// ============================================================================

/// Maps qualified names to the file that declares them.
///
/// Built by a line-level scan for `entity NAME` and `package NAME`
/// headers before any real parsing happens, so the unit builder can
/// resolve `use` clauses and instantiations against units it has not
/// parsed yet.
#[derive(Debug, Default)]
pub struct UnitIndex {
    current: IndexMap<QualifiedName, SourceFile>,
    cache: IndexMap<QualifiedName, SourceFile>,
}

impl UnitIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one file's headers into the given scope.
    ///
    /// Only `entity NAME` and `package NAME` (not `package body`) lines
    /// register; duplicate names keep the first file seen.
    pub fn survey(&mut self, library: &str, file: &SourceFile, scope: Scope) {
        let map = match scope {
            Scope::Current => &mut self.current,
            Scope::Cache => &mut self.cache,
        };
        for line in file.text.lines() {
            let mut words = line.split_whitespace();
            let Some(first) = words.next() else { continue };
            let Some(second) = words.next() else { continue };
            let is_header = first.eq_ignore_ascii_case("entity")
                || (first.eq_ignore_ascii_case("package")
                    && !second.eq_ignore_ascii_case("body"));
            if is_header {
                map.entry(QualifiedName::new(library, second))
                    .or_insert_with(|| file.clone());
            }
        }
    }

    /// Find the file declaring a qualified name, current scope first.
    pub fn locate(&self, name: &QualifiedName) -> Option<&SourceFile> {
        self.current.get(name).or_else(|| self.cache.get(name))
    }
}

// ============================================================================
// DESIGN BOOK
// ============================================================================

/// The merged map of fully parsed design units.
#[derive(Debug, Default)]
pub struct DesignBook {
    current: IndexMap<QualifiedName, DesignUnit>,
    cache: IndexMap<QualifiedName, DesignUnit>,
}

impl DesignBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a unit by qualified name; current scope takes precedence.
    pub fn lookup(&self, name: &QualifiedName) -> Option<&DesignUnit> {
        self.current.get(name).or_else(|| self.cache.get(name))
    }

    /// Insert a unit into the current-block scope.
    pub fn insert_current(&mut self, unit: DesignUnit) {
        merge_unit(&mut self.current, unit);
    }

    /// Insert a unit into the library-cache scope. Names already present
    /// in the current scope are left alone at lookup time; within the
    /// cache the usual collision policy applies.
    pub fn insert_cache(&mut self, unit: DesignUnit) {
        merge_unit(&mut self.cache, unit);
    }

    /// Units of the current block, in insertion order.
    pub fn current_units(&self) -> impl Iterator<Item = &DesignUnit> {
        self.current.values()
    }

    /// All units across both scopes, current first.
    pub fn units(&self) -> impl Iterator<Item = &DesignUnit> {
        self.current.values().chain(self.cache.values())
    }

    /// Number of units in the current scope.
    pub fn current_len(&self) -> usize {
        self.current.len()
    }
}

/// Insert a unit into a scope map under the collision policy.
///
/// Complementary kinds merge: an architecture folds into its entity and
/// a package body into its package, whichever arrived first. Any other
/// duplicate is dropped, first insertion wins. Callers feed files in a
/// fixed order, so the outcome is deterministic.
pub(crate) fn merge_unit(map: &mut IndexMap<QualifiedName, DesignUnit>, unit: DesignUnit) {
    let Some(existing) = map.get_mut(unit.name()) else {
        map.insert(unit.name().clone(), unit);
        return;
    };
    if complements(existing.kind(), unit.kind()) {
        existing.absorb(unit);
    } else if complements(unit.kind(), existing.kind()) {
        // The primary kind arrived second: it takes over the slot
        // (IndexMap keeps the original position) and inherits the edges
        // collected so far.
        let prior = std::mem::replace(existing, unit);
        existing.absorb(prior);
    } else {
        debug!(name = %unit.name(), "duplicate design unit dropped");
    }
}

/// Whether `secondary` is the companion context of `primary`.
fn complements(primary: &DesignUnitKind, secondary: &DesignUnitKind) -> bool {
    matches!(
        (primary, secondary),
        (DesignUnitKind::Entity, DesignUnitKind::Architecture { .. })
            | (DesignUnitKind::Package, DesignUnitKind::PackageBody)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(lib: &str, name: &str) -> DesignUnit {
        DesignUnit::new(QualifiedName::new(lib, name), DesignUnitKind::Entity, "e.vhd".into())
    }

    fn arch(lib: &str, of: &str) -> DesignUnit {
        let mut unit = DesignUnit::new(
            QualifiedName::new(lib, of),
            DesignUnitKind::Architecture { name: "rtl".into() },
            "a.vhd".into(),
        );
        unit.add_dependency(QualifiedName::new(lib, "leaf"));
        unit
    }

    #[test]
    fn test_survey_finds_headers() {
        let file = SourceFile::new(
            "pkg.vhd",
            "library ieee;\npackage utils is\nend package;\npackage body utils is\nend;",
        );
        let mut index = UnitIndex::new();
        index.survey("blk", &file, Scope::Current);

        let name = QualifiedName::new("blk", "utils");
        assert_eq!(index.locate(&name).map(|f| f.path.as_ref()), Some("pkg.vhd"));
    }

    #[test]
    fn test_locate_prefers_current_scope() {
        let cur = SourceFile::new("cur.vhd", "entity top is");
        let old = SourceFile::new("old.vhd", "entity top is");
        let mut index = UnitIndex::new();
        index.survey("blk", &old, Scope::Cache);
        index.survey("blk", &cur, Scope::Current);

        let name = QualifiedName::new("blk", "top");
        assert_eq!(index.locate(&name).map(|f| f.path.as_ref()), Some("cur.vhd"));
    }

    #[test]
    fn test_architecture_folds_into_entity() {
        let mut book = DesignBook::new();
        book.insert_current(entity("blk", "top"));
        book.insert_current(arch("blk", "top"));

        let unit = book.lookup(&QualifiedName::new("blk", "top")).unwrap();
        assert_eq!(unit.kind(), &DesignUnitKind::Entity);
        assert_eq!(unit.dependencies().count(), 1);
        assert_eq!(book.current_len(), 1);
    }

    #[test]
    fn test_entity_arriving_after_architecture_takes_over() {
        let mut book = DesignBook::new();
        book.insert_current(arch("blk", "top"));
        book.insert_current(entity("blk", "top"));

        let unit = book.lookup(&QualifiedName::new("blk", "top")).unwrap();
        assert_eq!(unit.kind(), &DesignUnitKind::Entity);
        assert_eq!(unit.dependencies().count(), 1);
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let mut book = DesignBook::new();
        book.insert_current(entity("blk", "top"));
        let mut later = entity("blk", "top");
        later.add_dependency(QualifiedName::new("blk", "x"));
        book.insert_current(later);

        let unit = book.lookup(&QualifiedName::new("blk", "top")).unwrap();
        assert_eq!(unit.dependencies().count(), 0);
    }
}
