//! Arena of lexical scope frames.
//!
//! Frames are pushed as the traversal enters a declaration that opens a
//! scope and are never removed; each frame points at its enclosing frame by
//! index. Symbol names are assembled by walking these indexes upward, and
//! "is this declaration global?" is a predicate over the same chain.

use tsgraph_core::graph::{NameDelimiter, NameHierarchy};

/// Index of a frame in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    SourceFile,
    Namespace,
    /// `declare module "name" { ... }`.
    AmbientModule,
    /// `declare global { ... }`: contributes no name, restarts naming.
    GlobalAugmentation,
    Class,
    Interface,
    Enum,
    /// Object type literal; its members have no addressable owner.
    TypeLiteral,
    /// Object literal expression; its methods and accessors belong to no type.
    ObjectLiteral,
    Function,
    Block,
}

impl FrameKind {
    /// Frames whose declarations are visible beyond the frame itself.
    pub fn is_declaration_space(&self) -> bool {
        matches!(
            self,
            FrameKind::SourceFile
                | FrameKind::Namespace
                | FrameKind::AmbientModule
                | FrameKind::GlobalAugmentation
        )
    }

    /// Frames that own members (class, interface, enum).
    pub fn is_type_container(&self) -> bool {
        matches!(self, FrameKind::Class | FrameKind::Interface | FrameKind::Enum)
    }
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    name: Option<String>,
    parent: Option<ScopeId>,
    /// Whether the declaration owning this frame was recorded.
    recorded: bool,
}

#[derive(Debug, Clone)]
pub struct ScopeArena {
    frames: Vec<Frame>,
}

impl ScopeArena {
    /// Arena holding only the source-file frame.
    pub fn new() -> Self {
        ScopeArena {
            frames: vec![Frame {
                kind: FrameKind::SourceFile,
                name: None,
                parent: None,
                recorded: true,
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push(
        &mut self,
        parent: ScopeId,
        kind: FrameKind,
        name: Option<&str>,
        recorded: bool,
    ) -> ScopeId {
        self.frames.push(Frame {
            kind,
            name: name.map(str::to_string),
            parent: Some(parent),
            recorded,
        });
        ScopeId(self.frames.len() - 1)
    }

    pub fn kind(&self, id: ScopeId) -> FrameKind {
        self.frames[id.0].kind
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether a declaration directly inside `id` is globally addressable.
    ///
    /// True when every frame from `id` up to the source file is a
    /// declaration space; any function, block or type body in between
    /// makes the declaration local.
    pub fn is_global(&self, id: ScopeId) -> bool {
        self.chain(id).all(|frame| frame.kind.is_declaration_space())
    }

    /// Whether `id` is a recorded class, interface or enum, so that a
    /// member declared directly inside it gets a symbol.
    pub fn owns_members(&self, id: ScopeId) -> bool {
        let frame = &self.frames[id.0];
        frame.kind.is_type_container() && frame.recorded
    }

    /// Hierarchy of `leaf` declared directly inside `id`.
    ///
    /// Names are collected outermost first; the walk stops at a global
    /// augmentation, whose contents live at the global root.
    pub fn qualified_name(&self, id: ScopeId, leaf: &str) -> NameHierarchy {
        let mut names = vec![leaf.to_string()];
        for frame in self.chain(id) {
            if frame.kind == FrameKind::GlobalAugmentation {
                break;
            }
            if let Some(name) = &frame.name {
                names.push(name.clone());
            }
        }
        names.reverse();
        NameHierarchy::from_elements(NameDelimiter::Scope, names)
            .unwrap_or_else(|| NameHierarchy::root(NameDelimiter::Scope, leaf))
    }

    fn chain(&self, id: ScopeId) -> impl Iterator<Item = &Frame> + '_ {
        std::iter::successors(Some(&self.frames[id.0]), move |frame| {
            frame.parent.map(|p| &self.frames[p.0])
        })
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
