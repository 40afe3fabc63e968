//! TypeScript front-end and traversal for tsgraph.
//!
//! This crate turns TypeScript sources into graph writes:
//! - Project resolution from `tsconfig.json` or a single file
//! - Program loading with tree-sitter, following reference directives
//! - Front-end diagnostics (syntax errors, unresolved directives)
//! - Traversal dispatch over declaration shapes
//!
//! The pass order inside one indexing transaction is fixed: all
//! diagnostics first, then per file its module symbol, its library
//! references and finally the full tree traversal.

pub mod directives;
pub mod filter;
pub mod indexer;
pub mod program;
pub mod project;
pub mod scope;
pub mod syntax;

use tracing::info;
use tsgraph_core::config::IndexOptions;
use tsgraph_core::diagnostics::record_diagnostic;
use tsgraph_core::error::IndexResult;
use tsgraph_core::hierarchy::{record_file_module, ModuleLayout};
use tsgraph_core::library::{record_library_reference, LibraryReference};
use tsgraph_core::session::run_session;
use tsgraph_core::store::GraphStore;
use tsgraph_core::text::{to_range, Point};
use tsgraph_core::writer::{GraphWriter, IndexStats};

pub use indexer::index_file;
pub use program::{Program, SourceFile};
pub use project::{ConfigError, ProjectConfig};

/// Write every file of `program` through `writer`.
pub fn index_program(writer: &mut GraphWriter<'_>, program: &Program) -> IndexResult<()> {
    for diagnostic in program.diagnostics() {
        record_diagnostic(writer, &diagnostic)?;
    }

    for file in program.source_files() {
        info!("indexing {}", file.path().display());
        let lines = file.lines();
        let (file_id, module) =
            record_file_module(writer, file.path(), |id| lines.full_range(id))?;

        for directive in file.directives() {
            let Some(resolution) = &directive.resolution else {
                continue;
            };
            let reference = LibraryReference {
                name: &directive.value,
                location: lines.range(file_id, directive.span),
                target: &resolution.path,
            };
            record_library_reference(writer, &reference, |id| {
                to_range(id, Point::default(), resolution.end)
            })?;
        }

        index_file(writer, file, file_id, module)?;
    }
    Ok(())
}

/// Load `project`, then index it into `store` in one session.
///
/// Loading happens before the store is opened; the session then opens,
/// optionally clears, indexes and always closes the store.
pub fn index_project(
    store: &mut dyn GraphStore,
    project: &ProjectConfig,
    options: &IndexOptions,
) -> IndexResult<IndexStats> {
    let program = Program::load(project)?;
    let layout =
        ModuleLayout::for_project_root(project.root(), options.dependency_marker.value.clone());
    run_session(
        store,
        &options.store_path.value,
        layout,
        options.clear.value,
        |writer| index_program(writer, &program),
    )
}
