//! Design units extracted from HDL source.

use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::base::QualifiedName;

/// Which kind of design unit a [`DesignUnit`] is.
///
/// An explicit tagged variant: entities, architectures, packages and
/// package bodies share one shape but are never confused by which code
/// path produced them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DesignUnitKind {
    Entity,
    /// An architecture body. The unit is keyed by its target entity's
    /// qualified name (architecture names like `rtl` are not unique
    /// across a workspace); the field keeps the declared name.
    Architecture { name: SmolStr },
    Package,
    PackageBody,
}

/// A single entity, architecture, package, or package body, together
/// with everything the dependency graph needs to know about it.
#[derive(Clone, Debug)]
pub struct DesignUnit {
    name: QualifiedName,
    kind: DesignUnitKind,
    file: Arc<str>,
    port_text: Option<String>,
    generic_text: Option<String>,
    dependencies: IndexSet<QualifiedName>,
    externs: IndexSet<(QualifiedName, Arc<str>)>,
    is_testbench: bool,
}

impl DesignUnit {
    /// Create a unit as its context opens in the unit builder.
    ///
    /// Entities start flagged as testbenches; the flag is cleared the
    /// moment a port clause is seen and is final once the unit closes.
    pub fn new(name: QualifiedName, kind: DesignUnitKind, file: Arc<str>) -> Self {
        let is_testbench = matches!(kind, DesignUnitKind::Entity);
        Self {
            name,
            kind,
            file,
            port_text: None,
            generic_text: None,
            dependencies: IndexSet::new(),
            externs: IndexSet::new(),
            is_testbench,
        }
    }

    /// The unit's qualified name.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// The unit's kind.
    pub fn kind(&self) -> &DesignUnitKind {
        &self.kind
    }

    /// Path of the file this unit was parsed from.
    pub fn file(&self) -> &Arc<str> {
        &self.file
    }

    /// Raw port-clause text as written (entities only).
    pub fn port_text(&self) -> Option<&str> {
        self.port_text.as_deref()
    }

    /// Raw generic-clause text as written (entities only).
    pub fn generic_text(&self) -> Option<&str> {
        self.generic_text.as_deref()
    }

    /// Units this one instantiates or declares components for, in
    /// discovery order.
    pub fn dependencies(&self) -> impl Iterator<Item = &QualifiedName> {
        self.dependencies.iter()
    }

    /// External `(package, file)` references used to order file inclusion.
    pub fn externs(&self) -> impl Iterator<Item = &(QualifiedName, Arc<str>)> {
        self.externs.iter()
    }

    /// Whether this unit is inferred to be a testbench.
    pub fn is_testbench(&self) -> bool {
        self.is_testbench
    }

    pub fn add_dependency(&mut self, dep: QualifiedName) {
        self.dependencies.insert(dep);
    }

    pub fn add_extern(&mut self, name: QualifiedName, file: Arc<str>) {
        self.externs.insert((name, file));
    }

    /// Record that a port clause was observed: an entity exposing ports
    /// is not a testbench.
    pub fn clear_testbench(&mut self) {
        self.is_testbench = false;
    }

    /// Attach the reconstructed port-clause text; implies ports exist.
    pub fn set_port_text(&mut self, text: String) {
        self.is_testbench = false;
        self.port_text = Some(text);
    }

    pub fn set_generic_text(&mut self, text: String) {
        self.generic_text = Some(text);
    }

    /// Fold another unit's edges into this one.
    ///
    /// Used when an `Architecture` meets its `Entity` (or a
    /// `PackageBody` its `Package`) under the same qualified name: the
    /// primary unit keeps its identity and gains the other's
    /// dependencies and externs.
    pub fn absorb(&mut self, other: DesignUnit) {
        self.dependencies.extend(other.dependencies);
        self.externs.extend(other.externs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: DesignUnitKind) -> DesignUnit {
        DesignUnit::new(QualifiedName::new("gates", "and_gate"), kind, "a.vhd".into())
    }

    #[test]
    fn test_entity_defaults_to_testbench() {
        assert!(unit(DesignUnitKind::Entity).is_testbench());
        assert!(!unit(DesignUnitKind::Package).is_testbench());
    }

    #[test]
    fn test_port_clause_clears_testbench() {
        let mut ent = unit(DesignUnitKind::Entity);
        ent.set_port_text("port ( clk : in bit );".to_owned());
        assert!(!ent.is_testbench());
        assert_eq!(ent.port_text(), Some("port ( clk : in bit );"));
    }

    #[test]
    fn test_dependencies_keep_order_and_dedupe() {
        let mut ent = unit(DesignUnitKind::Entity);
        ent.add_dependency(QualifiedName::new("gates", "xor_gate"));
        ent.add_dependency(QualifiedName::new("gates", "or_gate"));
        ent.add_dependency(QualifiedName::new("gates", "xor_gate"));
        let deps: Vec<String> = ent.dependencies().map(|d| d.to_string()).collect();
        assert_eq!(deps, vec!["gates.xor_gate", "gates.or_gate"]);
    }

    #[test]
    fn test_absorb_merges_edges() {
        let mut ent = unit(DesignUnitKind::Entity);
        let mut arch = unit(DesignUnitKind::Architecture { name: "rtl".into() });
        arch.add_dependency(QualifiedName::new("gates", "nand_gate"));
        arch.add_extern(QualifiedName::new("util", "pkg"), "u.vhd".into());
        ent.absorb(arch);
        assert_eq!(ent.dependencies().count(), 1);
        assert_eq!(ent.externs().count(), 1);
    }
}
