//! Engine behind the `@Buildable` family of annotations.
//!
//! A container annotated with `@Buildable` has its settable properties marked `@BuildableTracked`
//! (see [`propagate()`]), and every tracked property gets a fluent setter that returns a modified
//! copy of the value (see [`synthesize()`] and [`lower()`]). Hosts parse their source into a
//! [`Decl`] tree, dispatch annotations through [`Transformer`], and turn the results back into
//! source.

pub mod args;
pub mod decl;
pub mod diagnostic;
pub mod lower;
pub mod options;
pub mod propagate;
pub mod registry;
pub mod span;
pub mod synthesize;
pub mod validate;

pub use args::{ArgValue, Argument, AttributeArguments, Lookup};
pub use decl::{
    AccessLevel, AccessorKind, Attribute, ContainerDecl, ContainerKind, Decl, Marker,
    PropertyDecl, TypeExpr,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, LiteralKind, Severity};
pub use lower::{SetterDecl, lower};
pub use options::{BuildableOptions, TrackedOptions};
pub use propagate::{Decision, Propagation, propagate};
pub use registry::{Expansion, Transformer};
pub use span::Span;
pub use synthesize::{SetterSpec, synthesize};
pub use validate::{Context, validate};
