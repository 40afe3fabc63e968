//! Library references: triple-slash directives as macro symbols.
//!
//! A directive such as `/// <reference path="./globals.d.ts" />` pulls
//! another file into the compilation. It is recorded as a macro symbol named
//! by the directive's literal value, located at the directive, with an
//! INCLUDE reference to the module symbol of the file it resolves to.

use std::path::Path;

use tracing::debug;

use crate::error::IndexResult;
use crate::graph::{
    DefinitionKind, FileId, NameDelimiter, NameHierarchy, ReferenceKind, SourceRange, SymbolId,
    SymbolKind,
};
use crate::hierarchy::record_file_module;
use crate::writer::GraphWriter;

/// One resolved directive of a file.
#[derive(Debug, Clone, Copy)]
pub struct LibraryReference<'a> {
    /// Literal value of the directive (`./globals.d.ts`, `node`, `es2015`).
    pub name: &'a str,
    /// Span of the directive comment in the including file.
    pub location: SourceRange,
    /// File the directive resolved to.
    pub target: &'a Path,
}

/// Record the macro symbol and INCLUDE edge for one directive.
///
/// `target_extent` gives the full range of the target file once it has a
/// file id; it becomes the scope of the target's module symbol.
pub fn record_library_reference(
    writer: &mut GraphWriter<'_>,
    reference: &LibraryReference<'_>,
    target_extent: impl FnOnce(FileId) -> SourceRange,
) -> IndexResult<SymbolId> {
    let (_, module) = record_file_module(writer, reference.target, target_extent)?;

    let hierarchy = NameHierarchy::root(NameDelimiter::Scope, reference.name);
    let macro_id = writer.record_symbol(&hierarchy, SymbolKind::Macro, DefinitionKind::Explicit)?;
    writer.attach_location(macro_id, &reference.location)?;

    if let Some(module_id) = module {
        writer.record_reference(
            macro_id,
            module_id,
            ReferenceKind::Include,
            Some(&reference.location),
        )?;
    }
    debug!(
        "library reference {} -> {}",
        reference.name,
        reference.target.display()
    );
    Ok(macro_id)
}

// ============================================================================
// Tests
// ============================================================================
