//! Arguments passed to an annotation, and typed access to them.

use crate::{
    diagnostic::{Diagnostic, DiagnosticKind, LiteralKind},
    span::Span,
};

/// Value of a single argument. Only literals can be consumed by the passes, anything else is
/// kept as its source text so it can be reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
    Expr(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: ArgValue,
    /// Covers the label (when present) through the end of the expression.
    pub span: Span,
}

impl Argument {
    pub fn labelled(label: impl Into<String>, value: ArgValue, span: Span) -> Self {
        Self {
            label: Some(label.into()),
            value,
            span,
        }
    }
}

/// Ordered argument list of an annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeArguments {
    arguments: Vec<Argument>,
}

/// Result of looking up a typed argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Present(T),
    Absent,
    /// The argument exists, but isn't a literal of the requested kind.
    NotLiteral(Span),
}

impl AttributeArguments {
    pub fn new(arguments: impl IntoIterator<Item = Argument>) -> Self {
        Self {
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter()
    }

    /// First argument with the given label.
    pub fn get(&self, label: &str) -> Option<&Argument> {
        self.arguments
            .iter()
            .find(|argument| argument.label.as_deref() == Some(label))
    }

    pub fn string(&self, label: &str) -> Lookup<&str> {
        match self.get(label) {
            None => Lookup::Absent,
            Some(Argument {
                value: ArgValue::Str(value),
                ..
            }) => Lookup::Present(value),
            Some(argument) => Lookup::NotLiteral(argument.span),
        }
    }

    pub fn bool(&self, label: &str) -> Lookup<bool> {
        match self.get(label) {
            None => Lookup::Absent,
            Some(Argument {
                value: ArgValue::Bool(value),
                ..
            }) => Lookup::Present(*value),
            Some(argument) => Lookup::NotLiteral(argument.span),
        }
    }
}

impl<'a> IntoIterator for &'a AttributeArguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments.iter()
    }
}

impl<T> Lookup<T> {
    /// Collapse into the value (if any), turning a non-literal into an
    /// [`DiagnosticKind::UnknownLiteralExpr`] anchored at the argument.
    pub fn literal(self, expected: LiteralKind) -> Result<Option<T>, Diagnostic> {
        match self {
            Self::Present(value) => Ok(Some(value)),
            Self::Absent => Ok(None),
            Self::NotLiteral(span) => Err(Diagnostic::new(
                DiagnosticKind::UnknownLiteralExpr(expected),
                span,
            )),
        }
    }
}
