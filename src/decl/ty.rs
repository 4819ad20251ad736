//! Type expressions as written in a declaration.

use std::fmt::{self, Display, Write};

/// A type as it appears in source. Nothing here is resolved: names are kept as written, so an
/// alias of a function type is just a [`TypeExpr::Named`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// Possibly qualified, possibly generic name (`Int`, `Swift.Array<Element>`).
    Named(Vec<PathSegment>),
    /// `T?`
    Optional(Box<TypeExpr>),
    /// `T!`
    ImplicitlyUnwrapped(Box<TypeExpr>),
    /// `[T]`
    Array(Box<TypeExpr>),
    /// `[K: V]`
    Dictionary { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// Parenthesised list of types. A single element is a grouping rather than a real tuple.
    Tuple(Vec<TupleElement>),
    /// `(A, B) async throws -> R`
    Function(FunctionType),
    /// Type with leading attributes and/or an ownership specifier (`@Sendable () -> Void`,
    /// `inout Int`).
    Attributed {
        attributes: Vec<String>,
        specifier: Option<String>,
        ty: Box<TypeExpr>,
    },
    /// `some P`
    Opaque(Box<TypeExpr>),
    /// `any P`
    Existential(Box<TypeExpr>),
    /// `T.Type` or `P.Protocol`
    Metatype {
        base: Box<TypeExpr>,
        kind: MetatypeKind,
    },
    /// `A & B`
    Composition(Vec<TypeExpr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub generics: Vec<TypeExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleElement {
    /// Label(s) exactly as written, such as `x` or `_ x`.
    pub label: Option<String>,
    pub ty: TypeExpr,
    /// Trailing `...`, only meaningful for function parameters.
    pub variadic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<TupleElement>,
    pub is_async: bool,
    pub throws: Option<Throws>,
    pub output: Box<TypeExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Throws {
    /// `throws`
    Untyped,
    /// `throws(E)`
    Typed(Box<TypeExpr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetatypeKind {
    Type,
    Protocol,
}

impl TypeExpr {
    /// Unqualified, non-generic name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(vec![PathSegment {
            name: name.into(),
            generics: Vec::new(),
        }])
    }

    /// Unqualified name with generic arguments.
    pub fn generic(name: impl Into<String>, generics: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Named(vec![PathSegment {
            name: name.into(),
            generics: generics.into_iter().collect(),
        }])
    }

    pub fn optional(ty: TypeExpr) -> Self {
        Self::Optional(Box::new(ty))
    }

    pub fn array(ty: TypeExpr) -> Self {
        Self::Array(Box::new(ty))
    }

    /// Unlabelled tuple (or grouping, for a single element).
    pub fn tuple(elements: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Tuple(elements.into_iter().map(TupleElement::unlabelled).collect())
    }

    /// Synchronous, non-throwing function type with unlabelled parameters.
    pub fn function(params: impl IntoIterator<Item = TypeExpr>, output: TypeExpr) -> Self {
        Self::Function(FunctionType {
            params: params.into_iter().map(TupleElement::unlabelled).collect(),
            is_async: false,
            throws: None,
            output: Box::new(output),
        })
    }

    /// Whether a value of this type must be captured as escaping when passed as a parameter
    /// and stored.
    ///
    /// Function types qualify directly, as do attributed function types. A parenthesised
    /// grouping of exactly one element is looked through recursively. Optionals, tuples of more
    /// than one element and named types (including aliases of function types) never qualify.
    pub fn requires_escaping(&self) -> bool {
        match self {
            Self::Function(_) => true,
            Self::Tuple(elements) => match elements.as_slice() {
                [only] => only.ty.requires_escaping(),
                _ => false,
            },
            Self::Attributed { ty, .. } => ty.requires_escaping(),
            _ => false,
        }
    }
}

impl TupleElement {
    pub fn unlabelled(ty: TypeExpr) -> Self {
        Self {
            label: None,
            ty,
            variadic: false,
        }
    }
}

fn write_separated<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(path) => write_separated(f, path, "."),
            Self::Optional(ty) => write!(f, "{ty}?"),
            Self::ImplicitlyUnwrapped(ty) => write!(f, "{ty}!"),
            Self::Array(ty) => write!(f, "[{ty}]"),
            Self::Dictionary { key, value } => write!(f, "[{key}: {value}]"),
            Self::Tuple(elements) => {
                f.write_char('(')?;
                write_separated(f, elements, ", ")?;
                f.write_char(')')
            }
            Self::Function(function) => write!(f, "{function}"),
            Self::Attributed {
                attributes,
                specifier,
                ty,
            } => {
                for attribute in attributes {
                    write!(f, "@{attribute} ")?;
                }
                if let Some(specifier) = specifier {
                    write!(f, "{specifier} ")?;
                }
                write!(f, "{ty}")
            }
            Self::Opaque(ty) => write!(f, "some {ty}"),
            Self::Existential(ty) => write!(f, "any {ty}"),
            Self::Metatype { base, kind } => match kind {
                MetatypeKind::Type => write!(f, "{base}.Type"),
                MetatypeKind::Protocol => write!(f, "{base}.Protocol"),
            },
            Self::Composition(types) => write_separated(f, types, " & "),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.generics.is_empty() {
            f.write_char('<')?;
            write_separated(f, &self.generics, ", ")?;
            f.write_char('>')?;
        }

        Ok(())
    }
}

impl Display for TupleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}: ")?;
        }
        write!(f, "{}", self.ty)?;
        if self.variadic {
            f.write_str("...")?;
        }

        Ok(())
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        write_separated(f, &self.params, ", ")?;
        f.write_char(')')?;

        if self.is_async {
            f.write_str(" async")?;
        }
        match &self.throws {
            Some(Throws::Untyped) => f.write_str(" throws")?,
            Some(Throws::Typed(error)) => write!(f, " throws({error})")?,
            None => {}
        }

        write!(f, " -> {}", self.output)
    }
}
