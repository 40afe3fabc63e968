//! Module and package symbols derived from file paths.
//!
//! Every file gets a module symbol whose hierarchy is its path, split into
//! segments, relative to the layout base. Each dependency-directory marker
//! segment (`node_modules`) in that path also yields a package symbol
//! `[marker, next]`, linked to the module by an INCLUDE reference. The two
//! hierarchies share the path delimiter but are not nested in each other.

use std::path::{Component, Path, PathBuf};

use crate::error::IndexResult;
use crate::graph::{
    DefinitionKind, FileId, NameDelimiter, NameHierarchy, ReferenceKind, SourceRange, SymbolId,
    SymbolKind,
};
use crate::registry::normalize_path;
use crate::writer::GraphWriter;

/// How file paths map to module and package hierarchies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    base: PathBuf,
    dependency_marker: String,
}

impl ModuleLayout {
    pub fn new(base: impl Into<PathBuf>, dependency_marker: impl Into<String>) -> Self {
        ModuleLayout {
            base: base.into(),
            dependency_marker: dependency_marker.into(),
        }
    }

    /// Layout whose first element is the project directory's own name.
    pub fn for_project_root(root: &Path, dependency_marker: impl Into<String>) -> Self {
        let root = normalize_path(root);
        let base = root.parent().map(Path::to_path_buf).unwrap_or(root);
        ModuleLayout::new(base, dependency_marker)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn dependency_marker(&self) -> &str {
        &self.dependency_marker
    }

    /// Path segments of `path` below the base.
    ///
    /// A path outside the base keeps all of its normal components. Returns
    /// `None` only for a path with no normal component at all (`/`).
    pub fn module_hierarchy(&self, path: &Path) -> Option<NameHierarchy> {
        let path = normalize_path(path);
        let relative = path.strip_prefix(&self.base).unwrap_or(&path);
        let segments = relative.components().filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        });
        NameHierarchy::from_elements(NameDelimiter::Path, segments)
    }

    /// One `[marker, next]` hierarchy per marker occurrence in `module`.
    pub fn package_hierarchies(&self, module: &NameHierarchy) -> Vec<NameHierarchy> {
        module
            .elements()
            .windows(2)
            .filter(|pair| pair[0] == self.dependency_marker)
            .filter_map(|pair| {
                NameHierarchy::from_elements(NameDelimiter::Path, [&pair[0], &pair[1]])
            })
            .collect()
    }
}

/// Record the module symbol of a file, plus its dependency packages.
///
/// `scope` is the range spanning the whole file. A file whose module symbol
/// already exists in this session is not recorded again.
pub fn record_module(
    writer: &mut GraphWriter<'_>,
    path: &Path,
    scope: &SourceRange,
) -> IndexResult<Option<SymbolId>> {
    let Some(module) = writer.layout().module_hierarchy(path) else {
        return Ok(None);
    };
    if let Some(existing) = writer.symbol(&module) {
        return Ok(Some(existing));
    }
    let module_id = writer.record_symbol(&module, SymbolKind::Module, DefinitionKind::Explicit)?;
    writer.attach_scope(module_id, scope)?;

    for package in writer.layout().package_hierarchies(&module) {
        let package_id =
            writer.record_symbol(&package, SymbolKind::Package, DefinitionKind::Implicit)?;
        writer.attach_scope(package_id, scope)?;
        writer.record_reference(package_id, module_id, ReferenceKind::Include, None)?;
    }
    Ok(Some(module_id))
}

/// Register `path` and record its module symbol with the given full range.
pub fn record_file_module(
    writer: &mut GraphWriter<'_>,
    path: &Path,
    full_range: impl FnOnce(FileId) -> SourceRange,
) -> IndexResult<(FileId, Option<SymbolId>)> {
    let file_id = writer.get_or_create_file(path)?;
    let module = record_module(writer, path, &full_range(file_id))?;
    Ok((file_id, module))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphData;
    use crate::store::{GraphStore, MemoryStore};
    use crate::writer::IndexState;

    fn elements(h: &NameHierarchy) -> Vec<&str> {
        h.elements().iter().map(String::as_str).collect()
    }

    fn index_paths(layout: ModuleLayout, paths: &[&str]) -> GraphData {
        let mut store = MemoryStore::new();
        store.open(Path::new("mem")).unwrap();
        store.begin_transaction().unwrap();
        let mut state = IndexState::new(layout);
        {
            let mut writer = GraphWriter::new(&mut store, &mut state);
            for path in paths {
                record_file_module(&mut writer, Path::new(path), |id| {
                    SourceRange::new(id, (1, 1), (3, 1))
                })
                .unwrap();
            }
        }
        store.commit_transaction().unwrap();
        store.data().clone()
    }

    #[test]
    fn test_module_hierarchy_starts_at_project_name() {
        let layout = ModuleLayout::for_project_root(Path::new("/w/project"), "node_modules");
        let module = layout
            .module_hierarchy(Path::new("/w/project/src/index.ts"))
            .unwrap();
        assert_eq!(elements(&module), ["project", "src", "index.ts"]);
        assert_eq!(module.delimiter(), NameDelimiter::Path);
    }

    #[test]
    fn test_path_outside_base_keeps_all_segments() {
        let layout = ModuleLayout::new("/w/project", "node_modules");
        let module = layout.module_hierarchy(Path::new("/usr/lib/x.d.ts")).unwrap();
        assert_eq!(elements(&module), ["usr", "lib", "x.d.ts"]);
    }

    #[test]
    fn test_dependency_package_linked_by_include() {
        let layout = ModuleLayout::for_project_root(Path::new("/w/project"), "node_modules");
        let data = index_paths(layout, &["/w/project/node_modules/lodash/index.ts"]);

        let module = data
            .symbol_by_elements(&["project", "node_modules", "lodash", "index.ts"])
            .unwrap();
        let package = data.symbol_by_elements(&["node_modules", "lodash"]).unwrap();
        assert_eq!(module.kind, Some(SymbolKind::Module));
        assert_eq!(package.kind, Some(SymbolKind::Package));
        assert_eq!(module.scopes, package.scopes);

        let edges: Vec<_> = data.references_from(package.id).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, module.id);
        assert_eq!(edges[0].kind, ReferenceKind::Include);
    }

    #[test]
    fn test_nested_dependencies_yield_one_package_each() {
        let layout = ModuleLayout::new("/w", "node_modules");
        let data = index_paths(
            layout,
            &["/w/app/node_modules/a/node_modules/b/index.d.ts"],
        );
        assert!(data.symbol_by_elements(&["node_modules", "a"]).is_some());
        assert!(data.symbol_by_elements(&["node_modules", "b"]).is_some());
        assert_eq!(data.references.len(), 2);
    }

    #[test]
    fn test_package_shared_by_files_is_one_symbol() {
        let layout = ModuleLayout::new("/w", "node_modules");
        let data = index_paths(
            layout,
            &[
                "/w/node_modules/lodash/index.d.ts",
                "/w/node_modules/lodash/fp.d.ts",
                "/w/node_modules/lodash/index.d.ts",
            ],
        );
        let package = data.symbol_by_elements(&["node_modules", "lodash"]).unwrap();
        assert_eq!(package.scopes.len(), 2);
        assert_eq!(data.references_from(package.id).count(), 2);
        assert_eq!(data.symbols_of_kind(SymbolKind::Module).count(), 2);
    }

    #[test]
    fn test_marker_as_last_segment_is_ignored() {
        let layout = ModuleLayout::new("/w", "node_modules");
        let module = layout.module_hierarchy(Path::new("/w/node_modules")).unwrap();
        assert!(layout.package_hierarchies(&module).is_empty());
    }
}
