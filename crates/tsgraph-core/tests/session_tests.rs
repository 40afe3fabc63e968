//! Session-level tests: commit boundaries, rollback, and store lifecycle.

use std::path::Path;

use tempfile::TempDir;
use tsgraph_core::error::IndexError;
use tsgraph_core::graph::{DefinitionKind, NameDelimiter, NameHierarchy, SymbolKind};
use tsgraph_core::hierarchy::{record_file_module, ModuleLayout};
use tsgraph_core::session::run_session;
use tsgraph_core::store::{GraphStore, JsonStore, MemoryStore};
use tsgraph_core::text::LineIndex;
use tsgraph_core::writer::GraphWriter;

fn layout() -> ModuleLayout {
    ModuleLayout::for_project_root(Path::new("/w/project"), "node_modules")
}

fn index_one_file(writer: &mut GraphWriter<'_>) -> Result<(), IndexError> {
    let lines = LineIndex::new("declare var X: number;\n");
    let (file_id, _) = record_file_module(writer, Path::new("/w/project/a.d.ts"), |id| {
        lines.full_range(id)
    })?;
    let x = writer.record_symbol(
        &NameHierarchy::root(NameDelimiter::Scope, "X"),
        SymbolKind::GlobalVariable,
        DefinitionKind::Explicit,
    )?;
    writer.attach_location(
        x,
        &tsgraph_core::graph::SourceRange::new(file_id, (1, 13), (1, 14)),
    )?;
    Ok(())
}

#[test]
fn test_clear_is_committed_before_indexing() {
    let mut store = MemoryStore::new();
    // Pre-existing content from an earlier run.
    run_session(&mut store, Path::new("mem"), layout(), false, index_one_file).unwrap();
    assert_eq!(store.commits().len(), 1);

    run_session(&mut store, Path::new("mem"), layout(), true, index_one_file).unwrap();

    let commits = store.commits();
    assert_eq!(commits.len(), 3);
    assert!(commits[1].is_empty(), "clear must be its own commit");
    assert!(!commits[2].is_empty());
    assert_eq!(commits[2].symbols.len(), 2);
    assert_eq!(store.stats().clears, 1);
    assert_eq!(store.stats().closes, 2);
}

#[test]
fn test_failed_pass_leaves_cleared_state() {
    let mut store = MemoryStore::new();
    run_session(&mut store, Path::new("mem"), layout(), false, index_one_file).unwrap();

    let err = run_session(&mut store, Path::new("mem"), layout(), true, |writer| {
        index_one_file(writer)?;
        Err(IndexError::internal("front-end crashed"))
    })
    .unwrap_err();

    assert!(matches!(err, IndexError::Internal { .. }));
    assert!(!store.is_open());
    assert!(store.data().is_empty());
    assert_eq!(store.stats().closes, 2);
}

#[test]
fn test_failed_pass_without_clear_keeps_previous_graph() {
    let mut store = MemoryStore::new();
    run_session(&mut store, Path::new("mem"), layout(), false, index_one_file).unwrap();
    let before = store.data().clone();

    run_session(&mut store, Path::new("mem"), layout(), false, |writer| {
        writer.record_symbol(
            &NameHierarchy::root(NameDelimiter::Scope, "Y"),
            SymbolKind::GlobalVariable,
            DefinitionKind::Explicit,
        )?;
        Err(IndexError::internal("stop"))
    })
    .unwrap_err();

    assert_eq!(store.data(), &before);
}

#[test]
fn test_open_failure_aborts_before_indexing() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing-dir").join("index.json");
    let mut store = JsonStore::new();
    let mut ran = false;
    let err = run_session(&mut store, &target, layout(), false, |_| {
        ran = true;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, IndexError::StoreIo { operation: "open", .. }));
    assert!(!ran);
}

#[test]
fn test_json_store_round_trip_through_session() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("index.tsgraph.json");

    let mut store = JsonStore::new();
    let stats = run_session(&mut store, &target, layout(), true, index_one_file).unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.symbols, 2);

    let document = JsonStore::load(&target).unwrap();
    let module = document
        .graph
        .symbol_by_elements(&["project", "a.d.ts"])
        .unwrap();
    assert_eq!(module.kind, Some(SymbolKind::Module));
    let x = document
        .graph
        .symbol_by_hierarchy(&NameHierarchy::root(NameDelimiter::Scope, "X"))
        .unwrap();
    assert_eq!(x.locations[0].start_col, 13);
}

#[test]
fn test_reindex_without_clear_reuses_rows() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("index.tsgraph.json");
    let mut store = JsonStore::new();
    run_session(&mut store, &target, layout(), false, index_one_file).unwrap();
    run_session(&mut store, &target, layout(), false, index_one_file).unwrap();

    let document = JsonStore::load(&target).unwrap();
    assert_eq!(document.graph.files.len(), 1);
    assert_eq!(document.graph.symbols.len(), 2);
}
