//! Dispatch from annotation names to the pass that handles them.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    decl::{Attribute, Decl, Marker},
    diagnostic::Diagnostics,
    lower::{SetterDecl, lower},
    options::{BuildableOptions, TrackedOptions},
    propagate::{Propagation, propagate},
    synthesize::synthesize,
    validate::{Context, validate},
};

lazy_static! {
    static ref TRANSFORMERS: HashMap<&'static str, Transformer> = HashMap::from([
        (BuildableOptions::ANNOTATION, Transformer::Propagate),
        (Marker::TRACKED_NAME, Transformer::Synthesize),
        (Marker::IGNORED_NAME, Transformer::Inert),
    ]);
}

/// Pass responsible for an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transformer {
    /// Container annotation, decides markers for each member.
    Propagate,
    /// Tracked marker, produces setters alongside the property.
    Synthesize,
    /// Ignored marker, only recorded so propagation leaves the property alone.
    Inert,
}

/// Output of running a [`Transformer`] over a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Markers to attach to the members of the container.
    Markers(Propagation),
    /// Declarations to insert directly after the annotated one.
    Peers(Vec<SetterDecl>),
    None,
}

impl Transformer {
    /// Transformer registered for an annotation name. Module-qualified names (`Module.Name`) are
    /// looked up by their final component.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.rsplit('.').next().unwrap_or(name);

        TRANSFORMERS.get(name).copied()
    }

    pub fn for_attribute(attribute: &Attribute) -> Option<Self> {
        Self::lookup(&attribute.name)
    }

    /// Run the pass for `attribute` attached to `decl`.
    ///
    /// Shape problems with `decl` and problems with the annotation's arguments are reported
    /// together.
    pub fn expand(&self, attribute: &Attribute, decl: &Decl) -> Result<Expansion, Diagnostics> {
        match self {
            Self::Propagate => {
                let mut diagnostics = validate(decl, Context::Container);
                let options =
                    diagnostics.absorb(BuildableOptions::from_arguments(&attribute.arguments));

                let (Some(options), Some(container)) =
                    (diagnostics.into_result(options)?, decl.as_container())
                else {
                    return Ok(Expansion::None);
                };

                Ok(Expansion::Markers(propagate(container, &options)?))
            }
            Self::Synthesize => {
                let mut diagnostics = validate(decl, Context::TrackedProperty);
                let options =
                    diagnostics.absorb(TrackedOptions::from_arguments(&attribute.arguments));

                let Some(options) = diagnostics.into_result(options)? else {
                    return Ok(Expansion::None);
                };

                let peers = synthesize(decl, &options)?.iter().map(lower).collect();

                Ok(Expansion::Peers(peers))
            }
            Self::Inert => Ok(Expansion::None),
        }
    }
}
