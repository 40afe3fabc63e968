//! Traversal dispatch: declaration shapes to symbols and references.
//!
//! [`index_file`] walks one syntax tree depth first. Each node is classified
//! into a [`NodeKind`]; declaration shapes get their own arm, everything
//! else is recursed into without producing a symbol. Scopes are tracked in
//! a [`ScopeArena`] so names and the global predicate come from an explicit
//! frame chain.
//!
//! What each arm records:
//!
//! | Shape | Symbol | Location | Scope | Signature |
//! |-------|--------|----------|-------|-----------|
//! | namespace / ambient module | `Namespace` | name | declaration | - |
//! | class / interface | `Class` / `Interface` | name | declaration | - |
//! | method / field / accessor | `Method` / `Field` | name | - | member |
//! | call / construct / index signature | `Method` / `Field` | signature | - | signature |
//! | enum / enum member | `Enum` / `EnumConstant` | name | declaration | member |
//! | function | `Function` | name | declaration | header |
//! | variable binding | `GlobalVariable` | binding | - | statement |
//! | type alias | `Type` + `Typedef` | name | declaration | statement |
//! | import / export specifier | `GlobalVariable` (implicit) | specifier | - | - |
//!
//! Top-level symbols are only recorded when every enclosing frame is a
//! declaration space; members only when their owner was recorded. Leading
//! comments of every visited node are folded into atomic ranges.

use tree_sitter::Node;
use tsgraph_core::error::IndexResult;
use tsgraph_core::graph::{
    DefinitionKind, FileId, NameDelimiter, NameHierarchy, ReferenceKind, SourceRange, SymbolId,
    SymbolKind,
};
use tsgraph_core::text::Span;
use tsgraph_core::writer::GraphWriter;

use crate::program::SourceFile;
use crate::scope::{FrameKind, ScopeArena, ScopeId};
use crate::syntax::{has_token, leading_trivia, span, text, unquote, NodeKind};

/// Where the traversal currently is.
#[derive(Debug, Clone, Copy)]
struct Context<'t> {
    scope: ScopeId,
    /// Outermost statement (`export`, `declare`, `const`) wrapping the
    /// current declaration within its scope.
    statement: Option<Node<'t>>,
}

impl<'t> Context<'t> {
    fn wrapped(self, node: Node<'t>) -> Self {
        Context {
            scope: self.scope,
            statement: Some(self.statement.unwrap_or(node)),
        }
    }

    fn enter(self, scope: ScopeId) -> Self {
        Context {
            scope,
            statement: None,
        }
    }
}

/// Index one parsed file whose module symbol is already recorded.
pub fn index_file(
    writer: &mut GraphWriter<'_>,
    file: &SourceFile,
    file_id: FileId,
    module: Option<SymbolId>,
) -> IndexResult<()> {
    let mut indexer = FileIndexer {
        writer,
        file,
        file_id,
        module,
        scopes: ScopeArena::new(),
    };
    let root = file.tree().root_node();
    let cx = Context {
        scope: indexer.scopes.root(),
        statement: None,
    };
    indexer.visit_children(root, cx)
}

struct FileIndexer<'w, 'a, 't> {
    writer: &'w mut GraphWriter<'a>,
    file: &'t SourceFile,
    file_id: FileId,
    module: Option<SymbolId>,
    scopes: ScopeArena,
}

impl<'w, 'a, 't> FileIndexer<'w, 'a, 't> {
    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn visit(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let kind = NodeKind::classify(node.kind());
        if kind == NodeKind::Comment {
            return Ok(());
        }
        self.record_trivia(node)?;

        match kind {
            NodeKind::AmbientDeclaration => self.visit_ambient(node, cx),
            NodeKind::ExportStatement | NodeKind::VariableStatement => {
                self.visit_children(node, cx.wrapped(node))
            }
            NodeKind::ModuleDeclaration => self.visit_module(node, cx),
            NodeKind::ClassDeclaration => self.visit_class(node, cx, true),
            NodeKind::ClassExpression => self.visit_class(node, cx, false),
            NodeKind::InterfaceDeclaration => self.visit_interface(node, cx),
            NodeKind::EnumDeclaration => self.visit_enum(node, cx),
            NodeKind::TypeAliasDeclaration => self.visit_type_alias(node, cx),
            NodeKind::FunctionDeclaration | NodeKind::FunctionSignature => {
                self.visit_function(node, cx)
            }
            NodeKind::FunctionExpression => {
                let scope = self.scopes.push(cx.scope, FrameKind::Function, None, false);
                self.visit_children(node, cx.enter(scope))
            }
            NodeKind::VariableDeclarator => self.visit_declarator(node, cx),
            NodeKind::MethodDefinition | NodeKind::MethodSignature => self.visit_method(node, cx),
            NodeKind::FieldDefinition => self.visit_field(node, cx),
            NodeKind::CallSignature => self.visit_signature(node, cx, "()", SymbolKind::Method),
            NodeKind::ConstructSignature => {
                self.visit_signature(node, cx, "new()", SymbolKind::Method)
            }
            NodeKind::IndexSignature => self.visit_signature(node, cx, "[]", SymbolKind::Field),
            NodeKind::ImportSpecifier => self.visit_specifier(node, true),
            NodeKind::ExportSpecifier => self.visit_specifier(node, false),
            NodeKind::StatementBlock | NodeKind::BlockScope => {
                let scope = self.scopes.push(cx.scope, FrameKind::Block, None, false);
                self.visit_children(node, cx.enter(scope))
            }
            NodeKind::ObjectType => {
                let scope = self.scopes.push(cx.scope, FrameKind::TypeLiteral, None, false);
                self.visit_children(node, cx.enter(scope))
            }
            NodeKind::ObjectLiteral => {
                let scope = self.scopes.push(cx.scope, FrameKind::ObjectLiteral, None, false);
                self.visit_children(node, cx.enter(scope))
            }
            // Assignment and call shapes are not classified yet.
            NodeKind::CallExpression | NodeKind::AssignmentExpression | NodeKind::Other => {
                self.visit_children(node, cx)
            }
            NodeKind::Comment => Ok(()),
        }
    }

    fn visit_children(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, cx)?;
        }
        Ok(())
    }

    /// Visit every named child except `skip`.
    fn visit_children_except(
        &mut self,
        node: Node<'t>,
        skip: Option<Node<'t>>,
        cx: Context<'t>,
    ) -> IndexResult<()> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) != skip {
                self.visit(child, cx)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------------

    fn visit_ambient(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        if has_token(node, "global") {
            let scope = self
                .scopes
                .push(cx.scope, FrameKind::GlobalAugmentation, None, true);
            let mut cursor = node.walk();
            let body = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "statement_block");
            return match body {
                Some(body) => self.visit_children(body, cx.enter(scope)),
                None => Ok(()),
            };
        }
        self.visit_children(node, cx.wrapped(node))
    }

    fn visit_module(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let Some(name) = node.child_by_field_name("name") else {
            return self.visit_children(node, cx);
        };
        let mut scope = cx.scope;

        if name.kind() == "string" {
            let module_name = unquote(self.text(name));
            let recorded = self.record_namespace(scope, module_name, span(name), node)?;
            scope = self
                .scopes
                .push(scope, FrameKind::AmbientModule, Some(module_name), recorded);
        } else if self.text(name) == "global"
            && self.scopes.kind(scope) == FrameKind::AmbientModule
        {
            scope = self
                .scopes
                .push(scope, FrameKind::GlobalAugmentation, None, true);
        } else {
            for (segment, segment_span) in dotted_segments(name, self.file.text()) {
                let recorded = self.record_namespace(scope, segment, segment_span, node)?;
                scope = self
                    .scopes
                    .push(scope, FrameKind::Namespace, Some(segment), recorded);
            }
        }

        match node.child_by_field_name("body") {
            Some(body) => self.visit_children(body, cx.enter(scope)),
            None => Ok(()),
        }
    }

    fn record_namespace(
        &mut self,
        scope: ScopeId,
        name: &str,
        location: Span,
        declaration: Node<'t>,
    ) -> IndexResult<bool> {
        if !self.scopes.is_global(scope) {
            return Ok(false);
        }
        let hierarchy = self.scopes.qualified_name(scope, name);
        let id = self.writer.record_symbol(
            &hierarchy,
            SymbolKind::Namespace,
            DefinitionKind::Explicit,
        )?;
        let location = self.span_range(location);
        self.writer.attach_location(id, &location)?;
        let range = self.range(declaration);
        self.writer.attach_scope(id, &range)?;
        Ok(true)
    }

    fn visit_class(
        &mut self,
        node: Node<'t>,
        cx: Context<'t>,
        is_declaration: bool,
    ) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");
        let name_text = name.map(|n| self.text(n));

        let id = match name {
            Some(name) if is_declaration && self.scopes.is_global(cx.scope) => {
                Some(self.record_type(node, name, cx.scope, SymbolKind::Class)?)
            }
            _ => None,
        };
        let scope = self
            .scopes
            .push(cx.scope, FrameKind::Class, name_text, id.is_some());

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) == name {
                continue;
            }
            if Some(child) == body {
                self.record_trivia(child)?;
                self.visit_children(child, cx.enter(scope))?;
                continue;
            }
            if child.kind() == "class_heritage" {
                if let Some(id) = id {
                    self.record_bases(id, child)?;
                }
            }
            self.visit(child, cx)?;
        }
        Ok(())
    }

    fn visit_interface(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");
        let name_text = name.map(|n| self.text(n));

        let id = match name {
            Some(name) if self.scopes.is_global(cx.scope) => {
                Some(self.record_type(node, name, cx.scope, SymbolKind::Interface)?)
            }
            _ => None,
        };
        let scope = self
            .scopes
            .push(cx.scope, FrameKind::Interface, name_text, id.is_some());

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) == name {
                continue;
            }
            if Some(child) == body {
                self.record_trivia(child)?;
                self.visit_children(child, cx.enter(scope))?;
                continue;
            }
            if child.kind() == "extends_type_clause" {
                if let Some(id) = id {
                    self.record_bases(id, child)?;
                }
            }
            self.visit(child, cx)?;
        }
        Ok(())
    }

    /// Record a class or interface at its name.
    fn record_type(
        &mut self,
        node: Node<'t>,
        name: Node<'t>,
        scope: ScopeId,
        kind: SymbolKind,
    ) -> IndexResult<SymbolId> {
        let hierarchy = self.scopes.qualified_name(scope, self.text(name));
        let id = self
            .writer
            .record_symbol(&hierarchy, kind, DefinitionKind::Explicit)?;
        let range = self.range(name);
        self.writer.attach_location(id, &range)?;
        let range = self.range(node);
        self.writer.attach_scope(id, &range)?;
        Ok(id)
    }

    /// INHERITANCE edges from `from` to every named base in a heritage clause.
    fn record_bases(&mut self, from: SymbolId, clause: Node<'t>) -> IndexResult<()> {
        let mut cursor = clause.walk();
        for child in clause.named_children(&mut cursor) {
            match child.kind() {
                "extends_clause" | "implements_clause" => self.record_bases(from, child)?,
                _ => {
                    if let Some(base) = base_name(child) {
                        self.record_inheritance(from, base)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn record_inheritance(&mut self, from: SymbolId, base: Node<'t>) -> IndexResult<()> {
        let elements = self
            .text(base)
            .split('.')
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let Some(hierarchy) = NameHierarchy::from_elements(NameDelimiter::Scope, elements) else {
            return Ok(());
        };
        let to = self
            .writer
            .record_symbol(&hierarchy, SymbolKind::Type, DefinitionKind::Implicit)?;
        let location = self.range(base);
        self.writer
            .record_reference(from, to, ReferenceKind::Inheritance, Some(&location))?;
        Ok(())
    }

    fn visit_enum(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let name_text = name.map(|n| self.text(n));
        let recorded = match name {
            Some(name) if self.scopes.is_global(cx.scope) => {
                self.record_type(node, name, cx.scope, SymbolKind::Enum)?;
                true
            }
            _ => false,
        };
        let scope = self
            .scopes
            .push(cx.scope, FrameKind::Enum, name_text, recorded);

        let Some(body) = node.child_by_field_name("body") else {
            return Ok(());
        };
        self.record_trivia(body)?;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() == "comment" {
                continue;
            }
            self.record_trivia(member)?;
            let member_name = match member.kind() {
                "enum_assignment" => member.child_by_field_name("name"),
                _ => Some(member),
            };
            if let Some(leaf) = member_name.and_then(|n| self.member_name(n)) {
                if self.scopes.owns_members(scope) {
                    let hierarchy = self.scopes.qualified_name(scope, leaf);
                    let id = self.writer.record_symbol(
                        &hierarchy,
                        SymbolKind::EnumConstant,
                        DefinitionKind::Explicit,
                    )?;
                    if let Some(name) = member_name {
                        let range = self.range(name);
                        self.writer.attach_location(id, &range)?;
                    }
                    let range = self.range(member);
                    self.writer.attach_signature(id, &range)?;
                }
            }
            if let Some(value) = member.child_by_field_name("value") {
                self.visit(value, cx.enter(scope))?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    fn visit_method(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let leaf = name.and_then(|n| self.member_name(n));

        if let (Some(name), Some(leaf)) = (name, leaf) {
            if self.scopes.owns_members(cx.scope) {
                let kind = if has_token(node, "get") || has_token(node, "set") {
                    SymbolKind::Field
                } else {
                    SymbolKind::Method
                };
                self.record_member(cx.scope, leaf, kind, name, node)?;
                if leaf == "constructor" {
                    self.record_parameter_properties(cx.scope, node)?;
                }
            }
        }

        let scope = self
            .scopes
            .push(cx.scope, FrameKind::Function, leaf, false);
        self.visit_children_except(node, name, cx.enter(scope))
    }

    fn visit_field(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        if let Some(name) = name {
            if let Some(leaf) = self.member_name(name) {
                if self.scopes.owns_members(cx.scope) {
                    self.record_member(cx.scope, leaf, SymbolKind::Field, name, node)?;
                }
            }
        }
        self.visit_children_except(node, name, cx)
    }

    /// Call, construct and index signatures: leaf members with no children.
    fn visit_signature(
        &mut self,
        node: Node<'t>,
        cx: Context<'t>,
        leaf: &str,
        kind: SymbolKind,
    ) -> IndexResult<()> {
        if self.scopes.owns_members(cx.scope) {
            self.record_member(cx.scope, leaf, kind, node, node)?;
        }
        Ok(())
    }

    fn record_member(
        &mut self,
        owner: ScopeId,
        leaf: &str,
        kind: SymbolKind,
        name: Node<'t>,
        member: Node<'t>,
    ) -> IndexResult<SymbolId> {
        let hierarchy = self.scopes.qualified_name(owner, leaf);
        let id = self
            .writer
            .record_symbol(&hierarchy, kind, DefinitionKind::Explicit)?;
        let range = self.range(name);
        self.writer.attach_location(id, &range)?;
        let range = self.range(member);
        self.writer.attach_signature(id, &range)?;
        Ok(id)
    }

    /// `constructor(private readonly x: T)` declares member `x` of the type.
    fn record_parameter_properties(
        &mut self,
        owner: ScopeId,
        constructor: Node<'t>,
    ) -> IndexResult<()> {
        let Some(parameters) = constructor.child_by_field_name("parameters") else {
            return Ok(());
        };
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            if !matches!(parameter.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            if !is_parameter_property(parameter) {
                continue;
            }
            let Some(pattern) = parameter.child_by_field_name("pattern") else {
                continue;
            };
            if pattern.kind() != "identifier" {
                continue;
            }
            let leaf = self.text(pattern);
            self.record_member(owner, leaf, SymbolKind::Field, pattern, parameter)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Functions, Variables, Aliases
    // ------------------------------------------------------------------------

    fn visit_function(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let name_text = name.map(|n| self.text(n));

        if let Some(name) = name {
            if self.scopes.is_global(cx.scope) {
                let hierarchy = self.scopes.qualified_name(cx.scope, self.text(name));
                let id = self.writer.record_symbol(
                    &hierarchy,
                    SymbolKind::Function,
                    DefinitionKind::Explicit,
                )?;
                let range = self.range(name);
                self.writer.attach_location(id, &range)?;
                let range = self.range(node);
                self.writer.attach_scope(id, &range)?;
                let header = self.header_span(node, cx);
                let header = self.span_range(header);
                self.writer.attach_signature(id, &header)?;
            }
        }

        let scope = self
            .scopes
            .push(cx.scope, FrameKind::Function, name_text, false);
        self.visit_children_except(node, name, cx.enter(scope))
    }

    /// From the wrapping statement to just before the body.
    fn header_span(&self, node: Node<'t>, cx: Context<'t>) -> Span {
        let start = cx.statement.unwrap_or(node).start_byte();
        let Some(body) = node.child_by_field_name("body") else {
            let end = cx.statement.unwrap_or(node).end_byte();
            return Span::new(start, end);
        };
        let head = &self.file.text()[start..body.start_byte()];
        Span::new(start, start + head.trim_end().len())
    }

    fn visit_declarator(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        if let Some(name) = name {
            if self.scopes.is_global(cx.scope) {
                let signature = self.range(cx.statement.unwrap_or(node));
                for binding in bound_identifiers(name) {
                    let hierarchy = self.scopes.qualified_name(cx.scope, self.text(binding));
                    let id = self.writer.record_symbol(
                        &hierarchy,
                        SymbolKind::GlobalVariable,
                        DefinitionKind::Explicit,
                    )?;
                    let range = self.range(binding);
                    self.writer.attach_location(id, &range)?;
                    self.writer.attach_signature(id, &signature)?;
                }
            }
        }
        self.visit_children_except(node, name, cx)
    }

    fn visit_type_alias(&mut self, node: Node<'t>, cx: Context<'t>) -> IndexResult<()> {
        let name = node.child_by_field_name("name");
        let value = node.child_by_field_name("value");

        if let Some(name) = name {
            if self.scopes.is_global(cx.scope) {
                let hierarchy = self.scopes.qualified_name(cx.scope, self.text(name));
                let alias = self.writer.record_symbol(
                    &hierarchy,
                    SymbolKind::Type,
                    DefinitionKind::Explicit,
                )?;
                let range = self.range(name);
                self.writer.attach_location(alias, &range)?;
                let range = self.range(node);
                self.writer.attach_scope(alias, &range)?;
                let signature = self.range(cx.statement.unwrap_or(node));
                self.writer.attach_signature(alias, &signature)?;
                if let Some(value) = value {
                    self.record_alias_target(alias, value)?;
                }
            }
        }
        self.visit_children_except(node, name, cx)
    }

    /// The aliased type's text as a typedef symbol, used by the alias.
    fn record_alias_target(&mut self, alias: SymbolId, value: Node<'t>) -> IndexResult<()> {
        let type_text = self.file.type_text(value);
        if type_text.is_empty() {
            return Ok(());
        }
        let hierarchy = NameHierarchy::root(NameDelimiter::Scope, type_text);
        let target = self.writer.record_symbol(
            &hierarchy,
            SymbolKind::Typedef,
            DefinitionKind::Implicit,
        )?;
        let location = self.range(value);
        self.writer.attach_location(target, &location)?;
        self.writer
            .record_reference(alias, target, ReferenceKind::Usage, Some(&location))?;
        Ok(())
    }

    fn visit_specifier(&mut self, node: Node<'t>, is_import: bool) -> IndexResult<()> {
        let Some(name) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let leaf = unquote(self.text(name));
        if leaf.is_empty() {
            return Ok(());
        }
        let hierarchy = NameHierarchy::root(NameDelimiter::Scope, leaf);
        let id = self.writer.record_symbol(
            &hierarchy,
            SymbolKind::GlobalVariable,
            DefinitionKind::Implicit,
        )?;
        let location = self.range(node);
        self.writer.attach_location(id, &location)?;
        if let (true, Some(module)) = (is_import, self.module) {
            self.writer
                .record_reference(module, id, ReferenceKind::Import, Some(&location))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn record_trivia(&mut self, node: Node<'t>) -> IndexResult<()> {
        let trivia = leading_trivia(node, self.file.text());
        if !trivia.is_empty() {
            self.writer
                .record_leading_trivia(self.file_id, self.file.lines(), &trivia)?;
        }
        Ok(())
    }

    fn text(&self, node: Node<'t>) -> &'t str {
        text(node, self.file.text())
    }

    /// Statically known name of a member; `None` for computed names.
    fn member_name(&self, name: Node<'t>) -> Option<&'t str> {
        match name.kind() {
            "computed_property_name" => None,
            "string" => Some(unquote(self.text(name))).filter(|s| !s.is_empty()),
            _ => Some(self.text(name)).filter(|s| !s.is_empty()),
        }
    }

    fn range(&self, node: Node<'t>) -> SourceRange {
        self.file.range(self.file_id, node)
    }

    fn span_range(&self, span: Span) -> SourceRange {
        self.file.lines().range(self.file_id, span)
    }
}

/// The named type a heritage entry refers to, if any.
fn base_name(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier"
        | "type_identifier"
        | "member_expression"
        | "nested_identifier"
        | "nested_type_identifier" => Some(node),
        "generic_type" => node.child_by_field_name("name").and_then(base_name),
        _ => None,
    }
}

/// Constructor parameters with a modifier are also members.
fn is_parameter_property(parameter: Node<'_>) -> bool {
    let mut cursor = parameter.walk();
    let has_modifier = parameter
        .named_children(&mut cursor)
        .any(|c| matches!(c.kind(), "accessibility_modifier" | "override_modifier"));
    has_modifier || has_token(parameter, "readonly")
}

/// Identifiers bound by a declarator's name, including destructuring.
fn bound_identifiers(pattern: Node<'_>) -> Vec<Node<'_>> {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => vec![pattern],
        "pair_pattern" => pattern
            .child_by_field_name("value")
            .map(bound_identifiers)
            .unwrap_or_default(),
        "assignment_pattern" | "object_assignment_pattern" => pattern
            .child_by_field_name("left")
            .map(bound_identifiers)
            .unwrap_or_default(),
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = pattern.walk();
            let children: Vec<Node<'_>> = pattern.named_children(&mut cursor).collect();
            children.into_iter().flat_map(bound_identifiers).collect()
        }
        _ => Vec::new(),
    }
}

/// Segments of a possibly dotted namespace name with their spans.
fn dotted_segments<'t>(name: Node<'_>, source: &'t str) -> Vec<(&'t str, Span)> {
    let start = name.start_byte();
    let full = text(name, source);
    let mut segments = Vec::new();
    let mut offset = 0;
    for part in full.split('.') {
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            let lead = part.len() - part.trim_start().len();
            let segment_start = start + offset + lead;
            segments.push((trimmed, Span::new(segment_start, segment_start + trimmed.len())));
        }
        offset += part.len() + 1;
    }
    segments
}

// ============================================================================
// Tests
// ============================================================================
