use std::fmt::{self, Display};

use derive_more::Deref;

use crate::span::Span;

/// Domain of diagnostics raised by the container-level annotation.
pub const BUILDABLE_DOMAIN: &str = "Buildable";
/// Domain of diagnostics raised by the property-level annotation.
pub const TRACKED_DOMAIN: &str = "BuildableTracked";
/// Domain of diagnostics shared by every annotation.
pub const GENERAL_DOMAIN: &str = "General";

/// Every way an annotation can be misapplied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("@Buildable can only be applied to nominal types (class, struct, and actors).")]
    NonNominalType,
    #[error("@BuildableTracked cannot be applied to non-variable declarations.")]
    NonVariableDeclaration,
    #[error("@BuildableTracked cannot be applied to a \"let\" constant.")]
    LetConstant,
    #[error("@BuildableTracked cannot be applied to \"static\" or \"class\" properties.")]
    StaticProperty,
    #[error("@BuildableTracked cannot be applied to a get-only computed property.")]
    GetOnlyComputedProperty,
    #[error("@BuildableTracked cannot be applied to properties in a protocol declaration.")]
    ProtocolProperty,
    #[error("Expression is unknown. Value for the argument must be a literal of type \"{0}\"")]
    UnknownLiteralExpr(LiteralKind),
    #[error("@{annotation} has no parameter named \"{label}\"")]
    UnexpectedArgument { annotation: String, label: String },
    #[error("Argument \"{label}\" is passed to @{annotation} more than once")]
    DuplicateArgument { annotation: String, label: String },
}

impl DiagnosticKind {
    pub fn domain(&self) -> &'static str {
        match self {
            Self::NonNominalType => BUILDABLE_DOMAIN,
            Self::NonVariableDeclaration
            | Self::LetConstant
            | Self::StaticProperty
            | Self::GetOnlyComputedProperty
            | Self::ProtocolProperty => TRACKED_DOMAIN,
            Self::UnknownLiteralExpr(_)
            | Self::UnexpectedArgument { .. }
            | Self::DuplicateArgument { .. } => GENERAL_DOMAIN,
        }
    }

    /// Identifier within [`Self::domain`], stable across releases.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NonNominalType => "nonNominalType",
            Self::NonVariableDeclaration => "nonVariableDeclaration",
            Self::LetConstant => "letConstant",
            Self::StaticProperty => "staticProperty",
            Self::GetOnlyComputedProperty => "getOnlyComputedProperty",
            Self::ProtocolProperty => "protocolProperty",
            Self::UnknownLiteralExpr(_) => "unknownExpression",
            Self::UnexpectedArgument { .. } => "unexpectedArgument",
            Self::DuplicateArgument { .. } => "duplicateArgument",
        }
    }
}

/// Kind of literal an argument must be written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Bool,
}

impl Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "String",
            Self::Bool => "Bool",
        })
    }
}

/// Every diagnostic is fatal to the declaration it was raised on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
        }
    }
}

/// A misapplied annotation, anchored at the syntax responsible for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub anchor: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, anchor: Span) -> Self {
        Self { kind, anchor }
    }

    pub fn domain(&self) -> &'static str {
        self.kind.domain()
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn anchor(&self) -> Span {
        self.anchor
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.kind)
    }
}

/// Diagnostics accumulated over a single pass. Passes collect every applicable diagnostic
/// before giving up, so a user sees all problems with a declaration at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, thiserror::Error)]
#[error("{} error(s) in annotated declaration", .0.len())]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Record the error of `result` (if any), passing through the value.
    pub fn record<T>(&mut self, result: Result<T, Diagnostic>) -> Option<T> {
        result.map_err(|diagnostic| self.push(diagnostic)).ok()
    }

    /// Take over the diagnostics of a failed pass, passing through the value of a successful one.
    pub fn absorb<T>(&mut self, result: Result<T, Self>) -> Option<T> {
        result.map_err(|diagnostics| self.extend(diagnostics)).ok()
    }

    /// Succeed with `value` only if nothing has been reported.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
