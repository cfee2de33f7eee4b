//! Per-file unit builder.
//!
//! A stateful pass over one file's structural token stream that extracts
//! design units and their dependency edges. The machine has seven
//! explicit states; a well-formed file starts and ends in
//! [`State::Outside`]. Anything still open at end-of-file is discarded
//! with a warning and the rest of the batch is unaffected.
//!
//! References that cannot be resolved against the [`UnitIndex`] are
//! silently dropped: `ieee` and friends live outside the managed block
//! system and are expected to miss.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::base::{QualifiedName, SourceFile};
use crate::book::{UnitIndex, merge_unit};
use crate::lexer::{Token, TokenizeOptions, tokenize};
use crate::unit::{DesignUnit, DesignUnitKind};

/// Read-only snapshot a single file is parsed against.
///
/// Nothing here is mutated during parsing, so files may be processed in
/// parallel against one shared context.
#[derive(Clone, Copy)]
pub struct FileContext<'a> {
    /// The current block's library; `work` references rewrite to this.
    pub library: &'a str,
    /// Installed block/library names supplied by the caller.
    pub known_libraries: &'a FxHashSet<SmolStr>,
    /// Survey index used to resolve `use` clauses and instantiations.
    pub index: &'a UnitIndex,
}

/// Parser context, one per open design-unit region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Outside,
    InEntity,
    InArchDecl,
    InArchBody,
    InPkgDecl,
    InPkgBodyDecl,
    InPkgBodyBody,
}

/// `use` clauses buffered between units; they attach to the next unit
/// that opens, then the buffer clears.
#[derive(Default)]
struct PendingUses {
    deps: Vec<QualifiedName>,
    externs: Vec<(QualifiedName, Arc<str>)>,
}

/// Extract all design units declared in one file.
///
/// Returns the per-file unit map; zero units is a valid outcome.
pub fn parse_file(
    file: &SourceFile,
    ctx: &FileContext<'_>,
) -> IndexMap<QualifiedName, DesignUnit> {
    debug!(path = %file.path, "parsing design file");
    let tokens = tokenize(&file.text, TokenizeOptions::structural());
    let clauses = extract_clauses(&file.text);

    let mut builder = UnitBuilder {
        file,
        ctx,
        clauses,
        state: State::Outside,
        local_libraries: FxHashSet::default(),
        pending: PendingUses::default(),
        open: None,
        close_name: SmolStr::default(),
        pending_end: false,
        units: IndexMap::new(),
    };
    builder.run(&tokens);

    if builder.state != State::Outside {
        warn!(
            path = %file.path,
            "file ended inside an open design unit; trailing unit discarded"
        );
    }
    builder.units
}

struct UnitBuilder<'a> {
    file: &'a SourceFile,
    ctx: &'a FileContext<'a>,
    clauses: FxHashMap<SmolStr, EntityClauses>,
    state: State,
    /// Libraries declared by this file's own `library` clauses.
    local_libraries: FxHashSet<SmolStr>,
    pending: PendingUses,
    /// The unit whose region is currently open.
    open: Option<DesignUnit>,
    /// Token that closes the open region (unit, architecture, or body name).
    close_name: SmolStr,
    /// Set by `end`; the following tokens decide which region closes.
    pending_end: bool,
    units: IndexMap<QualifiedName, DesignUnit>,
}

impl UnitBuilder<'_> {
    fn run(&mut self, tokens: &[Token]) {
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if self.pending_end {
                i += self.on_end_follower(token);
                continue;
            }
            let next = tokens.get(i + 1);
            i += match token.text() {
                "library" if self.state == State::Outside => self.on_library(next),
                "use" if self.state == State::Outside => self.on_use(next),
                "entity" => self.on_entity(next),
                "architecture" => self.on_architecture(tokens, i),
                "package" => self.on_package(tokens, i),
                "component" => self.on_component(next),
                "port" if self.state == State::InEntity => {
                    // An entity exposing ports is not a testbench; the
                    // clause text itself attaches at close.
                    if let Some(unit) = self.open.as_mut() {
                        unit.clear_testbench();
                    }
                    1
                }
                "begin" => self.on_begin(),
                ":" if self.state == State::InArchBody => self.on_instantiation(tokens, i),
                "end" => {
                    self.pending_end = true;
                    1
                }
                _ => 1,
            };
        }
    }

    /// The token right after `end` decides once what closes.
    ///
    /// An inner `end record;` / `end if;` / `end component;` must not
    /// leave the close pending, or the next real declaration gets eaten
    /// and any later body word equal to the close name ends the region
    /// early.
    fn on_end_follower(&mut self, token: &Token) -> usize {
        if token.text() == "end" {
            // `end; end NAME;`: a fresh `end` restarts the decision.
            return 1;
        }
        let closes = match token.text() {
            "entity" => self.state == State::InEntity,
            "architecture" => matches!(self.state, State::InArchDecl | State::InArchBody),
            "package" => matches!(
                self.state,
                State::InPkgDecl | State::InPkgBodyDecl | State::InPkgBodyBody
            ),
            word => word == self.close_name.as_str(),
        };
        if closes {
            self.close();
        } else {
            self.pending_end = false;
        }
        1
    }

    /// `library X;` is file-local for the rest of the file.
    fn on_library(&mut self, next: Option<&Token>) -> usize {
        let Some(name) = next.filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        self.local_libraries.insert(SmolStr::new(name.text()));
        2
    }

    /// `use L.P[.ITEM];` between units.
    fn on_use(&mut self, next: Option<&Token>) -> usize {
        let Some(target) = next.filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        let parts: Vec<&str> = target.text().split('.').collect();
        if parts.len() < 2 {
            return 2;
        }
        let declared = parts[0];
        if declared != "work" && !self.knows_library(declared) {
            return 2;
        }
        let library = self.rewrite_library(declared);
        let package = QualifiedName::new(&library, parts[1]);
        // Names outside the managed block system miss here; that is fine.
        let Some(located) = self.ctx.index.locate(&package) else {
            return 2;
        };
        if declared != "work" {
            self.pending.externs.push((package.clone(), located.path.clone()));
        }
        if let Some(&item) = parts.get(2) {
            if item == "all" {
                for component in scan_components(&located.text) {
                    self.pending.deps.push(QualifiedName::new(&library, &component));
                }
            } else {
                self.pending.deps.push(QualifiedName::new(&library, item));
            }
        }
        2
    }

    fn on_entity(&mut self, next: Option<&Token>) -> usize {
        // Inside an architecture body, `entity` belongs to a
        // direct-entity instantiation; the `:` rule records that edge.
        if self.state != State::Outside {
            return 1;
        }
        let Some(name) = next.filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        let unit = DesignUnit::new(
            QualifiedName::new(self.ctx.library, name.text()),
            DesignUnitKind::Entity,
            self.file.path.clone(),
        );
        self.open_unit(unit, name.text(), State::InEntity);
        2
    }

    /// `architecture A of E is` opens; `end architecture` closes.
    fn on_architecture(&mut self, tokens: &[Token], i: usize) -> usize {
        if self.state != State::Outside {
            return 1;
        }
        let Some(name) = tokens.get(i + 1).filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        let of = tokens.get(i + 2).is_some_and(|t| t.matches("of"));
        let target = match tokens.get(i + 3) {
            Some(entity) if of => entity.text(),
            // No `of ENTITY` to anchor to: fall back to the declared name.
            _ => name.text(),
        };
        let unit = DesignUnit::new(
            QualifiedName::new(self.ctx.library, target),
            DesignUnitKind::Architecture {
                name: SmolStr::new(name.text()),
            },
            self.file.path.clone(),
        );
        let close = SmolStr::new(name.text());
        self.open_unit(unit, &close, State::InArchDecl);
        if of { 4 } else { 2 }
    }

    /// `package NAME is` / `package body NAME is` open; `end package`
    /// (optionally `body`) closes either.
    fn on_package(&mut self, tokens: &[Token], i: usize) -> usize {
        if self.state != State::Outside {
            return 1;
        }
        let Some(next) = tokens.get(i + 1).filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        if next.matches("body") {
            let Some(name) = tokens.get(i + 2).filter(|t| !t.is_delimiter()) else {
                return 2;
            };
            let unit = DesignUnit::new(
                QualifiedName::new(self.ctx.library, name.text()),
                DesignUnitKind::PackageBody,
                self.file.path.clone(),
            );
            self.open_unit(unit, name.text(), State::InPkgBodyDecl);
            3
        } else {
            let unit = DesignUnit::new(
                QualifiedName::new(self.ctx.library, next.text()),
                DesignUnitKind::Package,
                self.file.path.clone(),
            );
            self.open_unit(unit, next.text(), State::InPkgDecl);
            2
        }
    }

    /// A component declaration implies usage of that component.
    fn on_component(&mut self, next: Option<&Token>) -> usize {
        if self.state != State::InArchDecl {
            return 1;
        }
        let Some(name) = next.filter(|t| !t.is_delimiter()) else {
            return 1;
        };
        let dep = QualifiedName::new(self.ctx.library, name.text());
        if let Some(unit) = self.open.as_mut() {
            unit.add_dependency(dep);
        }
        2
    }

    fn on_begin(&mut self) -> usize {
        match self.state {
            State::InArchDecl => self.state = State::InArchBody,
            State::InPkgBodyDecl => self.state = State::InPkgBodyBody,
            _ => {}
        }
        1
    }

    /// `label : [entity] L.P.E | L.E | component_name` in a statement region.
    fn on_instantiation(&mut self, tokens: &[Token], i: usize) -> usize {
        // Object declarations inside process bodies also put names
        // before a `:`; those are not instantiation labels.
        if is_declaration_colon(tokens, i) {
            return 1;
        }
        let Some(mut target) = tokens.get(i + 1) else {
            return 1;
        };
        let mut consumed = 2;
        if target.matches("entity") {
            let Some(direct) = tokens.get(i + 2) else {
                return 2;
            };
            target = direct;
            consumed = 3;
        }
        let parts: Vec<&str> = target.text().split('.').collect();
        if parts.len() < 2 {
            // Plain component instantiation; the component declaration
            // or `use ... .all` already produced the edge.
            return consumed;
        }
        let declared = parts[0];
        let library = self.rewrite_library(declared);
        let entity = parts[parts.len() - 1];
        let via = if parts.len() >= 3 {
            QualifiedName::new(&library, parts[parts.len() - 2])
        } else {
            QualifiedName::new(&library, entity)
        };
        let Some(located) = self.ctx.index.locate(&via) else {
            return consumed;
        };
        let path = located.path.clone();
        if let Some(unit) = self.open.as_mut() {
            if declared != "work" {
                unit.add_extern(via, path);
            }
            unit.add_dependency(QualifiedName::new(&library, entity));
        }
        consumed
    }

    fn knows_library(&self, name: &str) -> bool {
        self.ctx.known_libraries.contains(name) || self.local_libraries.contains(name)
    }

    fn rewrite_library(&self, declared: &str) -> String {
        if declared == "work" {
            self.ctx.library.to_ascii_lowercase()
        } else {
            declared.to_ascii_lowercase()
        }
    }

    /// Open a region: the buffered pending uses attach here and clear.
    fn open_unit(&mut self, mut unit: DesignUnit, close_name: &str, state: State) {
        let pending = std::mem::take(&mut self.pending);
        for dep in pending.deps {
            unit.add_dependency(dep);
        }
        for (name, path) in pending.externs {
            unit.add_extern(name, path);
        }
        self.open = Some(unit);
        self.close_name = SmolStr::new(close_name.to_ascii_lowercase());
        self.state = state;
        self.pending_end = false;
    }

    /// Close the open region: finalize the unit and return to `Outside`.
    fn close(&mut self) {
        if let Some(mut unit) = self.open.take() {
            if self.state == State::InEntity {
                let key = SmolStr::new(unit.name().name());
                if let Some(clauses) = self.clauses.remove(&key) {
                    if let Some(port) = clauses.port {
                        unit.set_port_text(port);
                    }
                    if let Some(generic) = clauses.generic {
                        unit.set_generic_text(generic);
                    }
                }
            }
            merge_unit(&mut self.units, unit);
        }
        self.state = State::Outside;
        self.pending_end = false;
        self.close_name = SmolStr::default();
    }
}

/// Whether the `:` at `i` belongs to an object declaration like
/// `variable v : t;` rather than an instantiation label.
///
/// Walks left over the declared names (extra names keep their trailing
/// comma in the structural stream) and checks for a declaring keyword.
fn is_declaration_colon(tokens: &[Token], i: usize) -> bool {
    let Some(mut j) = i.checked_sub(2) else {
        return false;
    };
    while j > 0 && tokens[j].text().ends_with(',') {
        j -= 1;
    }
    matches!(
        tokens[j].text(),
        "variable" | "constant" | "signal" | "file" | "shared"
    )
}

// ============================================================================
// CLAUSE EXTRACTION
// ============================================================================

#[derive(Default)]
struct EntityClauses {
    port: Option<String>,
    generic: Option<String>,
}

/// Capture each entity's raw `port ( ... );` and `generic ( ... );` text
/// from the display-mode token stream, keyed by lowercased entity name.
fn extract_clauses(text: &str) -> FxHashMap<SmolStr, EntityClauses> {
    let tokens = tokenize(text, TokenizeOptions::display());
    let mut out: FxHashMap<SmolStr, EntityClauses> = FxHashMap::default();
    let mut current: Option<SmolStr> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if token.matches("entity") {
            let after_colon = i > 0 && tokens[i - 1].text() == ":";
            if let Some(name) = tokens.get(i + 1).filter(|t| !t.is_delimiter()) {
                if !after_colon {
                    current = Some(SmolStr::new(name.text().to_ascii_lowercase()));
                    i += 2;
                    continue;
                }
            }
        } else if token.matches("end") {
            current = None;
        } else if let Some(entity) = current.clone() {
            if (token.matches("port") || token.matches("generic"))
                && tokens.get(i + 1).is_some_and(|t| t.text() == "(")
            {
                let (clause, end) = capture_clause(&tokens, i);
                let entry = out.entry(entity).or_default();
                if token.matches("port") {
                    entry.port = Some(clause);
                } else {
                    entry.generic = Some(clause);
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Collect `keyword ( balanced )` plus a trailing `;`, rebuilt with
/// single spaces except next to parentheses and terminators.
fn capture_clause(tokens: &[Token], start: usize) -> (String, usize) {
    let mut depth = 0usize;
    let mut end = start + 1;
    while end < tokens.len() {
        match tokens[end].text() {
            "(" => depth += 1,
            ")" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    end += 1;
                    break;
                }
            }
            _ => {}
        }
        end += 1;
    }
    if tokens.get(end).is_some_and(|t| t.text() == ";") {
        end += 1;
    }

    let mut text = String::new();
    let mut prev: Option<&str> = None;
    for token in &tokens[start..end] {
        let word = token.text();
        let tight = matches!(word, "(" | ")" | ";" | ",") || prev == Some("(");
        if prev.is_some() && !tight {
            text.push(' ');
        }
        text.push_str(word);
        prev = Some(word);
    }
    (text, end)
}

// ============================================================================
// COMPONENT SUB-SCAN
// ============================================================================

/// Line-wise scan for `component NAME` declarations in a package's
/// source text, used when a `use ... .all` pulls in everything.
pub(crate) fn scan_components(text: &str) -> Vec<SmolStr> {
    let mut components = Vec::new();
    for line in text.lines() {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else { continue };
        if !first.eq_ignore_ascii_case("component") {
            continue;
        }
        if let Some(name) = words.next() {
            let name = name.trim_end_matches(';');
            if !name.is_empty() {
                components.push(SmolStr::new(name.to_ascii_lowercase()));
            }
        }
    }
    components
}
