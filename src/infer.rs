//! Top-level and testbench inference over a design book.
//!
//! Both inferences are advisory: a failure is a structured result the
//! caller can surface or override, never an error. The caller persists
//! inferred names only when they change.

use indexmap::IndexSet;
use tracing::info;

use crate::base::QualifiedName;
use crate::book::DesignBook;
use crate::unit::DesignUnitKind;

/// Outcome of top-level inference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TopLevel {
    /// Exactly one candidate survived elimination.
    Found(QualifiedName),
    /// Every candidate was instantiated somewhere; nothing is on top.
    NotFound,
    /// More than one candidate survived; the caller must disambiguate.
    Ambiguous(Vec<QualifiedName>),
}

/// Outcome of testbench inference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Bench {
    Found(QualifiedName),
    NotFound,
}

/// Infer the synthesizable top-level unit of the current block.
///
/// Candidates are the block's non-testbench entities. Each non-testbench
/// unit's dependency edges eliminate the units it instantiates;
/// testbenches are excluded from the candidate set but their edges do
/// not eliminate (a bench instantiating the top must not knock it out).
pub fn infer_top_level(book: &DesignBook) -> TopLevel {
    let mut candidates: IndexSet<QualifiedName> = book
        .current_units()
        .filter(|unit| matches!(unit.kind(), DesignUnitKind::Entity) && !unit.is_testbench())
        .map(|unit| unit.name().clone())
        .collect();

    for unit in book.current_units() {
        if unit.is_testbench() {
            continue;
        }
        for dep in unit.dependencies() {
            candidates.shift_remove(dep);
        }
    }

    let mut names: Vec<QualifiedName> = candidates.into_iter().collect();
    match names.len() {
        0 => {
            info!("no top-level design unit detected");
            TopLevel::NotFound
        }
        1 => {
            let top = names.remove(0);
            info!(%top, "detected top-level design unit");
            TopLevel::Found(top)
        }
        _ => {
            info!(count = names.len(), "multiple top-level candidates detected");
            TopLevel::Ambiguous(names)
        }
    }
}

/// Infer which testbench exercises the given top-level unit.
///
/// A testbench matches when the top-level's qualified name, or its bare
/// unit name, appears among the bench's dependency edges. The first
/// match in deterministic book order wins; further matches are a
/// documented ambiguity the caller may resolve explicitly.
pub fn infer_bench(book: &DesignBook, top: &QualifiedName) -> Bench {
    for unit in book.current_units() {
        if !unit.is_testbench() {
            continue;
        }
        let matched = unit
            .dependencies()
            .any(|dep| dep == top || dep.name() == top.name());
        if matched {
            info!(bench = %unit.name(), "detected testbench for top-level");
            return Bench::Found(unit.name().clone());
        }
    }
    info!(%top, "no testbench found for top-level");
    Bench::NotFound
}
