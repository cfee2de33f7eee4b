//! Analysis entry point: survey, parse, merge, infer.
//!
//! One call does everything and nothing persists between calls. Files
//! are parsed in parallel against a read-only snapshot; merging back
//! into the book is single-threaded in the caller's file order, so two
//! runs over the same input always produce the same book.

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::info;

use crate::base::{QualifiedName, SourceFile};
use crate::book::{DesignBook, Scope, UnitIndex};
use crate::infer::{self, Bench, TopLevel};
use crate::parser::{FileContext, parse_file};
use crate::unit::DesignUnit;

/// A cached file together with the library its block was installed under.
#[derive(Clone, Debug)]
pub struct CacheFile {
    pub library: SmolStr,
    pub file: SourceFile,
}

/// Everything one analysis run needs; the caller gathers files and
/// library names, this module never touches the filesystem.
#[derive(Clone, Debug)]
pub struct AnalysisInput {
    /// Library name of the block under analysis; `work` rewrites to it.
    pub library: SmolStr,
    /// Installed library names a file may reference by `library X;`-free
    /// prefix.
    pub known_libraries: FxHashSet<SmolStr>,
    /// Source files of the current block, in a fixed order.
    pub current: Vec<SourceFile>,
    /// Source files of every installed block.
    pub cache: Vec<CacheFile>,
}

/// The result of one analysis run.
#[derive(Debug)]
pub struct Analysis {
    pub book: DesignBook,
    pub top: TopLevel,
    pub bench: Bench,
}

/// Run the whole pipeline over one input snapshot.
pub fn analyze(input: &AnalysisInput) -> Analysis {
    info!(
        library = %input.library,
        current = input.current.len(),
        cache = input.cache.len(),
        "analyzing block"
    );

    let mut index = UnitIndex::new();
    for file in &input.current {
        index.survey(&input.library, file, Scope::Current);
    }
    for cached in &input.cache {
        index.survey(&cached.library, &cached.file, Scope::Cache);
    }

    let ctx = FileContext {
        library: &input.library,
        known_libraries: &input.known_libraries,
        index: &index,
    };
    let current_maps: Vec<IndexMap<QualifiedName, DesignUnit>> = input
        .current
        .par_iter()
        .map(|file| parse_file(file, &ctx))
        .collect();
    let cache_maps: Vec<IndexMap<QualifiedName, DesignUnit>> = input
        .cache
        .par_iter()
        .map(|cached| {
            let ctx = FileContext {
                library: &cached.library,
                known_libraries: &input.known_libraries,
                index: &index,
            };
            parse_file(&cached.file, &ctx)
        })
        .collect();

    // Deterministic reduction: current scope first, then cache, each in
    // the caller's file order.
    let mut book = DesignBook::new();
    for map in current_maps {
        for (_, unit) in map {
            book.insert_current(unit);
        }
    }
    for map in cache_maps {
        for (_, unit) in map {
            book.insert_cache(unit);
        }
    }

    let top = infer::infer_top_level(&book);
    let bench = match &top {
        TopLevel::Found(name) => infer::infer_bench(&book, name),
        _ => Bench::NotFound,
    };
    Analysis { book, top, bench }
}
