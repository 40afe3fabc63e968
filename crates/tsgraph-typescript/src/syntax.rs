//! Node-kind enumeration and small syntax helpers over tree-sitter nodes.
//!
//! The indexer dispatches on [`NodeKind`], a closed set of the declaration
//! shapes it cares about. Every grammar kind not listed maps to
//! [`NodeKind::Other`] and is only recursed into.

use tree_sitter::Node;
use tsgraph_core::text::Span;
use tsgraph_core::trivia::{TriviaItem, TriviaKind};

/// Declaration shapes the traversal distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Comment,
    /// `declare ...` and `declare global { ... }`.
    AmbientDeclaration,
    ExportStatement,
    /// `namespace A.B {}`, `module X {}`, `declare module "x" {}`.
    ModuleDeclaration,
    ClassDeclaration,
    ClassExpression,
    InterfaceDeclaration,
    EnumDeclaration,
    TypeAliasDeclaration,
    FunctionDeclaration,
    /// Body-less function: overloads and `declare function`.
    FunctionSignature,
    FunctionExpression,
    VariableStatement,
    VariableDeclarator,
    MethodDefinition,
    MethodSignature,
    FieldDefinition,
    CallSignature,
    ConstructSignature,
    IndexSignature,
    ImportSpecifier,
    ExportSpecifier,
    StatementBlock,
    /// Statements other than `{}` that open a block scope.
    BlockScope,
    ObjectType,
    /// `{ a: 1, m() {} }` in expression position.
    ObjectLiteral,
    CallExpression,
    AssignmentExpression,
    Other,
}

impl NodeKind {
    pub fn classify(kind: &str) -> Self {
        match kind {
            "comment" => NodeKind::Comment,
            "ambient_declaration" => NodeKind::AmbientDeclaration,
            "export_statement" => NodeKind::ExportStatement,
            "internal_module" | "module" => NodeKind::ModuleDeclaration,
            "class_declaration" | "abstract_class_declaration" => NodeKind::ClassDeclaration,
            "class" => NodeKind::ClassExpression,
            "interface_declaration" => NodeKind::InterfaceDeclaration,
            "enum_declaration" => NodeKind::EnumDeclaration,
            "type_alias_declaration" => NodeKind::TypeAliasDeclaration,
            "function_declaration" | "generator_function_declaration" => {
                NodeKind::FunctionDeclaration
            }
            "function_signature" => NodeKind::FunctionSignature,
            "function_expression" | "function" | "arrow_function" | "generator_function" => {
                NodeKind::FunctionExpression
            }
            "lexical_declaration" | "variable_declaration" => NodeKind::VariableStatement,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "method_definition" => NodeKind::MethodDefinition,
            "method_signature" | "abstract_method_signature" => NodeKind::MethodSignature,
            "public_field_definition" | "property_signature" => NodeKind::FieldDefinition,
            "call_signature" => NodeKind::CallSignature,
            "construct_signature" => NodeKind::ConstructSignature,
            "index_signature" => NodeKind::IndexSignature,
            "import_specifier" => NodeKind::ImportSpecifier,
            "export_specifier" => NodeKind::ExportSpecifier,
            "statement_block" => NodeKind::StatementBlock,
            "for_statement" | "for_in_statement" | "catch_clause" | "switch_body"
            | "class_static_block" => NodeKind::BlockScope,
            "object_type" => NodeKind::ObjectType,
            "object" => NodeKind::ObjectLiteral,
            "call_expression" | "new_expression" => NodeKind::CallExpression,
            "assignment_expression" | "augmented_assignment_expression" => {
                NodeKind::AssignmentExpression
            }
            _ => NodeKind::Other,
        }
    }
}

pub fn span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

pub fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Whether `node` has an anonymous child token spelled `token`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Strip one pair of matching quotes.
pub fn unquote(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Source text with every whitespace run collapsed to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comments immediately preceding `node` among its siblings, in order.
///
/// A comment that shares a line with the end of the previous sibling
/// trails that sibling and is not part of this node's trivia.
pub fn leading_trivia<'a>(node: Node<'_>, source: &'a str) -> Vec<TriviaItem<'a>> {
    if node.kind() == "comment" {
        return Vec::new();
    }
    let mut comments = Vec::new();
    let mut anchor_row = None;
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            anchor_row = Some(sibling.end_position().row);
            break;
        }
        comments.push(sibling);
        prev = sibling.prev_sibling();
    }

    comments
        .into_iter()
        .rev()
        .filter(|comment| Some(comment.start_position().row) != anchor_row)
        .map(|comment| {
            let body = text(comment, source);
            let kind = if body.starts_with("//") {
                TriviaKind::SingleLineComment
            } else {
                TriviaKind::MultiLineComment
            };
            TriviaItem::new(kind, span(comment), body)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
