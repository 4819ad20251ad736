//! Declaration model consumed by every pass.
//!
//! Hosts construct this tree once per source file (see the `buildable-syntax` crate). Passes
//! only ever read it, and report their results as decisions, specs or diagnostics rather than by
//! mutating the tree.

pub mod ty;

use std::fmt::{self, Display};

pub use self::ty::TypeExpr;
use crate::{args::AttributeArguments, span::Span};

/// Any declaration that may carry an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decl {
    Container(ContainerDecl),
    Property(PropertyDecl),
    Other(OtherDecl),
}

impl Decl {
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Container(container) => &container.attributes,
            Self::Property(property) => &property.attributes,
            Self::Other(other) => &other.attributes,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Container(container) => container.span,
            Self::Property(property) => property.span,
            Self::Other(other) => other.span,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match self {
            Self::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerDecl> {
        match self {
            Self::Container(container) => Some(container),
            _ => None,
        }
    }
}

/// Type declaration with a member list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerDecl {
    pub kind: ContainerKind,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<Modifier>,
    /// Direct members, in source order. Nested containers appear here but are never recursed
    /// into by the passes themselves.
    pub members: Vec<Decl>,
    pub span: Span,
}

impl ContainerDecl {
    /// Struct, class or actor.
    pub fn is_nominal(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::Struct | ContainerKind::Class | ContainerKind::Actor
        )
    }

    /// Property members alongside their index in [`Self::members`].
    pub fn properties(&self) -> impl Iterator<Item = (usize, &PropertyDecl)> {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, member)| member.as_property().map(|property| (i, property)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Struct,
    Class,
    Actor,
    Enum,
    Protocol,
    Extension,
}

impl ContainerKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Actor => "actor",
            Self::Enum => "enum",
            Self::Protocol => "protocol",
            Self::Extension => "extension",
        }
    }
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single `var`/`let` statement, possibly declaring several bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<Modifier>,
    pub specifier: BindingSpecifier,
    pub bindings: Vec<Binding>,
    pub span: Span,
}

impl PropertyDecl {
    pub fn is_constant(&self) -> bool {
        self.specifier == BindingSpecifier::Let
    }

    /// Type-level rather than instance-level (`static` or `class`).
    pub fn is_static(&self) -> bool {
        self.modifiers
            .iter()
            .any(|modifier| matches!(modifier.kind, ModifierKind::Static | ModifierKind::Class))
    }

    /// Strictest access level written on the declaration, ignoring set-scoped modifiers such as
    /// `private(set)`. [`None`] when no access modifier applies to the whole property.
    pub fn access_level(&self) -> Option<AccessLevel> {
        self.modifiers
            .iter()
            .filter_map(|modifier| match modifier.kind {
                ModifierKind::Access {
                    level,
                    setter_only: false,
                } => Some(level),
                _ => None,
            })
            .min()
    }

    /// First accessor block attached to any of the bindings.
    pub fn accessor_block(&self) -> Option<&AccessorBlock> {
        self.bindings
            .iter()
            .find_map(|binding| binding.accessors.as_ref())
    }

    pub fn accessor_kind(&self) -> AccessorKind {
        self.accessor_block()
            .map(AccessorBlock::kind)
            .unwrap_or(AccessorKind::StoredOrSimpleComputed)
    }

    /// Marker already written on the property, if any. Hosts guarantee at most one is present.
    pub fn existing_marker(&self) -> Option<Marker> {
        self.attributes.iter().find_map(Attribute::marker)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingSpecifier {
    Var,
    Let,
}

/// One `pattern: Type = initializer { accessors }` entry of a property statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub pattern: Pattern,
    /// Declared type, when written.
    pub ty: Option<TypeExpr>,
    pub has_initializer: bool,
    pub accessors: Option<AccessorBlock>,
    pub span: Span,
}

impl Binding {
    pub fn name(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Identifier(name) => Some(name),
            Pattern::Other => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Identifier(String),
    /// Tuple destructuring or wildcard.
    Other,
}

/// Classification of how a property may be read and written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    /// Stored property, optionally with `willSet`/`didSet` observers.
    StoredOrSimpleComputed,
    ComputedGetOnly,
    ComputedGetSet,
    /// Accessor requirements without bodies (`{ get set }`).
    ProtocolRequirement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessorBlock {
    /// Braced body with no accessor keywords, an implicit getter.
    Getter { span: Span },
    Accessors { accessors: Vec<Accessor>, span: Span },
}

impl AccessorBlock {
    pub fn span(&self) -> Span {
        match self {
            Self::Getter { span } | Self::Accessors { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> AccessorKind {
        let Self::Accessors { accessors, .. } = self else {
            return AccessorKind::ComputedGetOnly;
        };

        if accessors.iter().all(|accessor| !accessor.has_body) {
            AccessorKind::ProtocolRequirement
        } else if accessors.iter().any(|accessor| accessor.specifier.is_mutating()) {
            AccessorKind::ComputedGetSet
        } else if accessors.iter().all(|accessor| accessor.specifier.is_observer()) {
            AccessorKind::StoredOrSimpleComputed
        } else {
            AccessorKind::ComputedGetOnly
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub specifier: AccessorSpecifier,
    pub has_body: bool,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorSpecifier {
    Get,
    Set,
    Read,
    Modify,
    WillSet,
    DidSet,
    Init,
    Address,
    MutableAddress,
}

impl AccessorSpecifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "get" => Self::Get,
            "set" => Self::Set,
            "_read" | "read" => Self::Read,
            "_modify" | "modify" => Self::Modify,
            "willSet" => Self::WillSet,
            "didSet" => Self::DidSet,
            "init" => Self::Init,
            "unsafeAddress" => Self::Address,
            "unsafeMutableAddress" => Self::MutableAddress,
            _ => return None,
        })
    }

    /// Accessor through which the property can be written.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Set | Self::Modify | Self::MutableAddress)
    }

    pub fn is_observer(&self) -> bool {
        matches!(self, Self::WillSet | Self::DidSet)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    Access {
        level: AccessLevel,
        /// Written as `level(set)`, restricting only the setter.
        setter_only: bool,
    },
    Static,
    Class,
    Other(String),
}

/// Access control levels, ordered from most to least restrictive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    Private,
    FilePrivate,
    Internal,
    Package,
    Public,
    Open,
}

impl AccessLevel {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "private" => Self::Private,
            "fileprivate" => Self::FilePrivate,
            "internal" => Self::Internal,
            "package" => Self::Package,
            "public" => Self::Public,
            "open" => Self::Open,
            _ => return None,
        })
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::FilePrivate => "fileprivate",
            Self::Internal => "internal",
            Self::Package => "package",
            Self::Public => "public",
            Self::Open => "open",
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An `@Name(arguments)` annotation attached to a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written, including any module qualification.
    pub name: String,
    pub arguments: AttributeArguments,
    pub span: Span,
}

impl Attribute {
    pub fn new(name: impl Into<String>, arguments: AttributeArguments, span: Span) -> Self {
        Self {
            name: name.into(),
            arguments,
            span,
        }
    }

    /// Argument-less attribute standing in for a marker that was decided on rather than
    /// written.
    pub fn synthetic(marker: Marker) -> Self {
        Self::new(marker.name(), AttributeArguments::default(), Span::default())
    }

    pub fn marker(&self) -> Option<Marker> {
        Marker::from_name(&self.name)
    }
}

/// Classification recorded on a property for the synthesis pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Tracked,
    Ignored,
}

impl Marker {
    pub const TRACKED_NAME: &'static str = "BuildableTracked";
    pub const IGNORED_NAME: &'static str = "BuildableIgnored";

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tracked => Self::TRACKED_NAME,
            Self::Ignored => Self::IGNORED_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::TRACKED_NAME => Some(Self::Tracked),
            Self::IGNORED_NAME => Some(Self::Ignored),
            _ => None,
        }
    }
}

/// Declaration that is neither a container nor a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtherDecl {
    pub kind: OtherDeclKind,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtherDeclKind {
    Function,
    Initializer,
    Deinitializer,
    Subscript,
    EnumCase,
    TypeAlias,
    AssociatedType,
    Import,
    Operator,
    PrecedenceGroup,
    Macro,
}

impl OtherDeclKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Function => "func",
            Self::Initializer => "init",
            Self::Deinitializer => "deinit",
            Self::Subscript => "subscript",
            Self::EnumCase => "case",
            Self::TypeAlias => "typealias",
            Self::AssociatedType => "associatedtype",
            Self::Import => "import",
            Self::Operator => "operator",
            Self::PrecedenceGroup => "precedencegroup",
            Self::Macro => "macro",
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    //! Shorthand for building declarations in tests.

    use super::*;

    pub fn property(specifier: BindingSpecifier, bindings: Vec<Binding>) -> PropertyDecl {
        PropertyDecl {
            attributes: Vec::new(),
            modifiers: Vec::new(),
            specifier,
            bindings,
            span: Span::new(0, 10),
        }
    }

    pub fn var(name: &str, ty: TypeExpr) -> PropertyDecl {
        property(BindingSpecifier::Var, vec![binding(name, ty)])
    }

    pub fn binding(name: &str, ty: TypeExpr) -> Binding {
        Binding {
            pattern: Pattern::Identifier(name.to_string()),
            ty: Some(ty),
            has_initializer: false,
            accessors: None,
            span: Span::default(),
        }
    }

    pub fn accessor(specifier: AccessorSpecifier, has_body: bool) -> Accessor {
        Accessor {
            specifier,
            has_body,
            span: Span::default(),
        }
    }

    pub fn accessors(list: impl IntoIterator<Item = Accessor>) -> AccessorBlock {
        AccessorBlock::Accessors {
            accessors: list.into_iter().collect(),
            span: Span::new(4, 8),
        }
    }

    pub fn modifier(kind: ModifierKind) -> Modifier {
        Modifier {
            kind,
            span: Span::default(),
        }
    }

    pub fn access(level: AccessLevel) -> Modifier {
        modifier(ModifierKind::Access {
            level,
            setter_only: false,
        })
    }

    pub fn access_set(level: AccessLevel) -> Modifier {
        modifier(ModifierKind::Access {
            level,
            setter_only: true,
        })
    }

    pub fn container(kind: ContainerKind, members: Vec<Decl>) -> ContainerDecl {
        ContainerDecl {
            kind,
            name: "Sample".to_string(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            members,
            span: Span::new(0, 100),
        }
    }

    impl PropertyDecl {
        pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
            self.modifiers.extend(modifiers);
            self
        }

        pub fn with_marker(mut self, marker: Marker) -> Self {
            self.attributes.push(Attribute::synthetic(marker));
            self
        }

        pub fn with_accessors(mut self, block: AccessorBlock) -> Self {
            self.bindings[0].accessors = Some(block);
            self
        }
    }
}
