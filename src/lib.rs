//! # gatework
//!
//! Source-analysis core for HDL block management: structural scanning of
//! VHDL files, dependency-graph assembly, top-level/testbench inference,
//! and release-version logic.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! analysis → survey + parallel parse + merge + inference pipeline
//!   ↓
//! infer    → top-level and testbench detection over a design book
//! render   → component/instantiation/signal text generation
//!   ↓
//! book     → unit index (survey) and merged design book
//!   ↓
//! parser   → per-file unit builder state machine
//!   ↓
//! lexer    → whitespace/delimiter tokenizer, display + structural modes
//! unit     → design-unit record and kinds
//!   ↓
//! base     → primitives (QualifiedName, SourceFile)
//! ```
//!
//! `version` stands alone: release-version parsing, ordering, and bumps.

/// Foundation types: qualified names and source-file snapshots
pub mod base;

/// Design book and survey index
pub mod book;

/// Top-level and testbench inference
pub mod infer;

/// Tokenizer for structural and display streams
pub mod lexer;

/// Per-file design-unit extraction
pub mod parser;

/// Interface-text generation from captured clauses
pub mod render;

/// Design-unit records
pub mod unit;

/// Release-version engine
pub mod version;

/// End-to-end analysis pipeline
pub mod analysis;

// Re-export the types a typical caller touches.
pub use analysis::{Analysis, AnalysisInput, CacheFile, analyze};
pub use base::{QualifiedName, SourceFile};
pub use book::{DesignBook, Scope, UnitIndex};
pub use infer::{Bench, TopLevel};
pub use unit::{DesignUnit, DesignUnitKind};
pub use version::{BumpKind, Version, VersionError};
