//! Text generation from captured entity interfaces.
//!
//! Everything here works off the raw `port ( ... );` / `generic ( ... );`
//! clause text stored on a [`DesignUnit`]; an entity without ports
//! renders empty output. The layouts (indentation, `=>` associations,
//! trailing commas) match what downstream tooling pastes into a user's
//! editor, so they are part of the contract.

use smol_str::SmolStr;

use crate::unit::DesignUnit;

/// One port or generic group: `a, b : in std_logic` becomes two names
/// sharing a definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PortDecl {
    pub names: Vec<SmolStr>,
    pub definition: String,
}

/// How an instantiation template names its target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstantiationStyle {
    /// `uX : name`; requires a component declaration in scope.
    Component,
    /// `uX : entity lib.name`, a direct entity instantiation.
    Entity { library: SmolStr },
}

/// Parse the unit's stored port clause into declaration groups.
pub fn port_declarations(unit: &DesignUnit) -> Vec<PortDecl> {
    unit.port_text().map(parse_groups).unwrap_or_default()
}

/// Parse the unit's stored generic clause into declaration groups.
pub fn generic_declarations(unit: &DesignUnit) -> Vec<PortDecl> {
    unit.generic_text().map(parse_groups).unwrap_or_default()
}

/// A paste-ready `component ... end component;` declaration.
pub fn component_declaration(unit: &DesignUnit) -> String {
    let mut text = format!("component {}\n", unit.name().name());
    if let Some(generic) = unit.generic_text() {
        text.push_str(generic);
        text.push('\n');
    }
    if let Some(port) = unit.port_text() {
        text.push_str(port);
        text.push('\n');
    }
    text.push_str("end component;\n");
    text
}

/// A paste-ready instantiation template with `name=>name` associations.
pub fn instantiation(unit: &DesignUnit, style: &InstantiationStyle) -> String {
    let name = unit.name().name();
    let mut text = match style {
        InstantiationStyle::Component => format!("uX : {name}\n"),
        InstantiationStyle::Entity { library } => {
            format!("uX : entity {library}.{name}\n")
        }
    };
    let generics = flatten_names(&generic_declarations(unit));
    if !generics.is_empty() {
        text.push_str("generic map(\n");
        push_associations(&mut text, &generics);
        text.push_str(")\n");
    }
    let ports = flatten_names(&port_declarations(unit));
    if !ports.is_empty() {
        text.push_str("port map(\n");
        push_associations(&mut text, &ports);
        text.push_str(");\n");
    }
    text
}

/// `signal NAME : TYPE;` lines for every port, direction keyword dropped,
/// ready to paste above an instantiation.
pub fn signal_declarations(unit: &DesignUnit) -> String {
    let mut text = String::new();
    for group in port_declarations(unit) {
        let definition = strip_direction(&group.definition);
        for name in &group.names {
            text.push_str("signal ");
            text.push_str(name);
            text.push_str(" : ");
            text.push_str(definition);
            text.push_str(";\n");
        }
    }
    text
}

fn push_associations(text: &mut String, names: &[SmolStr]) {
    for (i, name) in names.iter().enumerate() {
        text.push_str("    ");
        text.push_str(name);
        text.push_str("=>");
        text.push_str(name);
        if i + 1 != names.len() {
            text.push(',');
        }
        text.push('\n');
    }
}

fn flatten_names(groups: &[PortDecl]) -> Vec<SmolStr> {
    groups.iter().flat_map(|g| g.names.iter().cloned()).collect()
}

/// Split captured clause text into `names : definition` groups.
///
/// The text looks like `port(a, b : in bit; q : out bit);`. Only the
/// region between the outermost parentheses matters; `;` splits groups
/// at depth zero so vector ranges stay intact.
fn parse_groups(clause: &str) -> Vec<PortDecl> {
    let Some(open) = clause.find('(') else {
        return Vec::new();
    };
    let Some(close) = clause.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    let inner = &clause[open + 1..close];

    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                push_group(&mut groups, &inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_group(&mut groups, &inner[start..]);
    groups
}

fn push_group(groups: &mut Vec<PortDecl>, raw: &str) {
    let Some((left, right)) = raw.split_once(':') else {
        return;
    };
    let names: Vec<SmolStr> = left
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(SmolStr::new)
        .collect();
    let definition = right.trim().to_owned();
    if !names.is_empty() && !definition.is_empty() {
        groups.push(PortDecl { names, definition });
    }
}

/// Drop a leading mode keyword (`in`, `out`, `inout`, `buffer`,
/// `linkage`) from a port definition.
fn strip_direction(definition: &str) -> &str {
    let mut words = definition.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or_default();
    let is_mode = matches!(
        first.to_ascii_lowercase().as_str(),
        "in" | "out" | "inout" | "buffer" | "linkage"
    );
    match words.next() {
        Some(rest) if is_mode => rest.trim_start(),
        _ => definition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::QualifiedName;
    use crate::unit::DesignUnitKind;

    fn adder() -> DesignUnit {
        let mut unit = DesignUnit::new(
            QualifiedName::new("math", "adder"),
            DesignUnitKind::Entity,
            "adder.vhd".into(),
        );
        unit.set_generic_text("generic(WIDTH : natural);".to_owned());
        unit.set_port_text(
            "port(a, b : in std_logic_vector(WIDTH-1 downto 0); s : out std_logic_vector(WIDTH-1 downto 0));"
                .to_owned(),
        );
        unit
    }

    #[test]
    fn test_port_groups_share_definitions() {
        let groups = port_declarations(&adder());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].names, vec!["a", "b"]);
        assert_eq!(groups[0].definition, "in std_logic_vector(WIDTH-1 downto 0)");
        assert_eq!(groups[1].names, vec!["s"]);
    }

    #[test]
    fn test_component_declaration_layout() {
        let text = component_declaration(&adder());
        assert_eq!(
            text,
            "component adder\n\
             generic(WIDTH : natural);\n\
             port(a, b : in std_logic_vector(WIDTH-1 downto 0); s : out std_logic_vector(WIDTH-1 downto 0));\n\
             end component;\n"
        );
    }

    #[test]
    fn test_component_instantiation_layout() {
        let text = instantiation(&adder(), &InstantiationStyle::Component);
        let expected = "uX : adder\n\
                        generic map(\n    WIDTH=>WIDTH\n)\n\
                        port map(\n    a=>a,\n    b=>b,\n    s=>s\n);\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_entity_instantiation_names_library() {
        let style = InstantiationStyle::Entity {
            library: "math".into(),
        };
        let text = instantiation(&adder(), &style);
        assert!(text.starts_with("uX : entity math.adder\n"));
    }

    #[test]
    fn test_signal_declarations_drop_direction() {
        let text = signal_declarations(&adder());
        assert_eq!(
            text,
            "signal a : std_logic_vector(WIDTH-1 downto 0);\n\
             signal b : std_logic_vector(WIDTH-1 downto 0);\n\
             signal s : std_logic_vector(WIDTH-1 downto 0);\n"
        );
    }

    #[test]
    fn test_unit_without_ports_renders_empty() {
        let bench = DesignUnit::new(
            QualifiedName::new("math", "tb_adder"),
            DesignUnitKind::Entity,
            "tb.vhd".into(),
        );
        assert!(port_declarations(&bench).is_empty());
        assert_eq!(signal_declarations(&bench), "");
        assert_eq!(instantiation(&bench, &InstantiationStyle::Component), "uX : tb_adder\n");
    }
}
