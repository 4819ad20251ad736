//! Options accepted by each annotation, read from its argument list.

use std::collections::HashSet;

use crate::{
    args::AttributeArguments,
    decl::Marker,
    diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, LiteralKind},
};

/// Options of the container-level annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildableOptions {
    /// Attach the Tracked marker to eligible members (otherwise the Ignored marker).
    pub tracked_by_default: bool,
}

impl BuildableOptions {
    pub const ANNOTATION: &'static str = "Buildable";
    pub const TRACKED_BY_DEFAULT: &'static str = "trackedByDefault";

    pub fn from_arguments(arguments: &AttributeArguments) -> Result<Self, Diagnostics> {
        let mut diagnostics = check_labels(Self::ANNOTATION, arguments, &[Self::TRACKED_BY_DEFAULT]);

        let tracked_by_default = diagnostics
            .record(arguments.bool(Self::TRACKED_BY_DEFAULT).literal(LiteralKind::Bool))
            .flatten()
            .unwrap_or(true);

        diagnostics.into_result(Self { tracked_by_default })
    }
}

impl Default for BuildableOptions {
    fn default() -> Self {
        Self {
            tracked_by_default: true,
        }
    }
}

/// Options of the property-level annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackedOptions {
    /// Overridden name of the generated function.
    pub name: Option<String>,
    /// Mark the setter parameter as escaping even if the type doesn't look like a function.
    pub force_escaping: bool,
}

impl TrackedOptions {
    pub const ANNOTATION: &'static str = Marker::TRACKED_NAME;
    pub const NAME: &'static str = "name";
    pub const FORCE_ESCAPING: &'static str = "forceEscaping";

    pub fn from_arguments(arguments: &AttributeArguments) -> Result<Self, Diagnostics> {
        let mut diagnostics = check_labels(
            Self::ANNOTATION,
            arguments,
            &[Self::NAME, Self::FORCE_ESCAPING],
        );

        let name = diagnostics
            .record(arguments.string(Self::NAME).literal(LiteralKind::String))
            .flatten()
            .map(str::to_string);

        let force_escaping = diagnostics
            .record(arguments.bool(Self::FORCE_ESCAPING).literal(LiteralKind::Bool))
            .flatten()
            .unwrap_or(false);

        diagnostics.into_result(Self {
            name,
            force_escaping,
        })
    }
}

/// Report unlabelled, unknown and repeated arguments.
fn check_labels(annotation: &str, arguments: &AttributeArguments, known: &[&str]) -> Diagnostics {
    let mut seen = HashSet::new();

    arguments
        .iter()
        .filter_map(|argument| {
            let label = argument.label.as_deref().unwrap_or("_");

            let kind = if !known.contains(&label) {
                DiagnosticKind::UnexpectedArgument {
                    annotation: annotation.to_string(),
                    label: label.to_string(),
                }
            } else if !seen.insert(label) {
                DiagnosticKind::DuplicateArgument {
                    annotation: annotation.to_string(),
                    label: label.to_string(),
                }
            } else {
                return None;
            };

            Some(Diagnostic::new(kind, argument.span))
        })
        .collect()
}
