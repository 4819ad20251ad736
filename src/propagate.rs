//! Marker propagation from a container annotation to its members.

use crate::{
    decl::{AccessorKind, ContainerDecl, Marker, PropertyDecl},
    diagnostic::Diagnostics,
    options::BuildableOptions,
    validate,
};

/// What should happen to a single member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Attach the Tracked marker.
    Tracked,
    /// Attach the Ignored marker.
    Ignored,
    NoChange,
}

impl Decision {
    pub fn marker(&self) -> Option<Marker> {
        match self {
            Self::Tracked => Some(Marker::Tracked),
            Self::Ignored => Some(Marker::Ignored),
            Self::NoChange => None,
        }
    }
}

/// Decision for every direct member of a container, indexed the same as
/// [`ContainerDecl::members`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    decisions: Vec<Decision>,
}

impl Propagation {
    /// Decision for the member at `index`. Anything out of range is left alone.
    pub fn decision(&self, index: usize) -> Decision {
        self.decisions
            .get(index)
            .copied()
            .unwrap_or(Decision::NoChange)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Decision)> + '_ {
        self.decisions.iter().copied().enumerate()
    }

    /// Members that should receive a marker, and which one.
    pub fn markers(&self) -> impl Iterator<Item = (usize, Marker)> + '_ {
        self.iter()
            .filter_map(|(i, decision)| decision.marker().map(|marker| (i, marker)))
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Decide which markers the members of `container` should receive.
///
/// Members are considered independently of one another, and only direct members are visited.
/// Containers that aren't nominal types produce a diagnostic and no decisions at all.
pub fn propagate(
    container: &ContainerDecl,
    options: &BuildableOptions,
) -> Result<Propagation, Diagnostics> {
    validate::check_container(container).into_result(())?;

    let decisions = container
        .members
        .iter()
        .map(|member| {
            member
                .as_property()
                .map(|property| decide(property, options))
                .unwrap_or(Decision::NoChange)
        })
        .collect();

    Ok(Propagation { decisions })
}

fn decide(property: &PropertyDecl, options: &BuildableOptions) -> Decision {
    let names = || {
        property
            .bindings
            .iter()
            .filter_map(|binding| binding.name())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if let Some(marker) = property.existing_marker() {
        log::debug!("`{}` already marked {marker:?}", names());
        return Decision::NoChange;
    }

    if property.is_constant() || property.is_static() {
        log::debug!("`{}` is constant or type-level, skipping", names());
        return Decision::NoChange;
    }

    if matches!(
        property.accessor_kind(),
        AccessorKind::ComputedGetOnly | AccessorKind::ProtocolRequirement
    ) {
        log::debug!("`{}` has no setter, skipping", names());
        return Decision::NoChange;
    }

    // Statements declaring several bindings are decided once, synthesis fans out per binding.
    let decision = if options.tracked_by_default {
        Decision::Tracked
    } else {
        Decision::Ignored
    };

    log::debug!("`{}` -> {decision:?}", names());

    decision
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    use crate::decl::{
        AccessorBlock, AccessorSpecifier, BindingSpecifier, ContainerKind, Decl, ModifierKind,
        OtherDecl, OtherDeclKind, TypeExpr, test_utils::*,
    };
    use crate::span::Span;

    fn string() -> TypeExpr {
        TypeExpr::named("String")
    }

    fn tracked() -> BuildableOptions {
        BuildableOptions::default()
    }

    fn ignored() -> BuildableOptions {
        BuildableOptions {
            tracked_by_default: false,
        }
    }

    fn single(property: PropertyDecl, options: BuildableOptions) -> Decision {
        let container = container(ContainerKind::Struct, vec![Decl::Property(property)]);
        propagate(&container, &options).unwrap().decision(0)
    }

    #[rstest]
    #[case::stored(var("p1", string()), Decision::Tracked)]
    #[case::public(
        var("p1", string()).with_modifiers([access(crate::decl::AccessLevel::Public)]),
        Decision::Tracked
    )]
    #[case::function_typed(var("p1", TypeExpr::function([], TypeExpr::named("Void"))), Decision::Tracked)]
    #[case::get_set(
        var("p1", string()).with_accessors(accessors([
            accessor(AccessorSpecifier::Get, true),
            accessor(AccessorSpecifier::Set, true),
        ])),
        Decision::Tracked
    )]
    #[case::multi_binding(
        property(BindingSpecifier::Var, vec![binding("p1", string()), binding("p2", TypeExpr::named("Int"))]),
        Decision::Tracked
    )]
    #[case::already_tracked(var("p1", string()).with_marker(Marker::Tracked), Decision::NoChange)]
    #[case::already_ignored(var("p1", string()).with_marker(Marker::Ignored), Decision::NoChange)]
    #[case::constant(property(BindingSpecifier::Let, vec![binding("p1", string())]), Decision::NoChange)]
    #[case::static_(var("s1", string()).with_modifiers([modifier(ModifierKind::Static)]), Decision::NoChange)]
    #[case::class(var("c1", string()).with_modifiers([modifier(ModifierKind::Class)]), Decision::NoChange)]
    #[case::implicit_getter(
        var("p1", string()).with_accessors(AccessorBlock::Getter { span: Span::default() }),
        Decision::NoChange
    )]
    #[case::explicit_getter(
        var("p1", string()).with_accessors(accessors([accessor(AccessorSpecifier::Get, true)])),
        Decision::NoChange
    )]
    #[case::requirement(
        var("p1", string()).with_accessors(accessors([
            accessor(AccessorSpecifier::Get, false),
            accessor(AccessorSpecifier::Set, false),
        ])),
        Decision::NoChange
    )]
    fn tracked_by_default(#[case] property: PropertyDecl, #[case] expected: Decision) {
        assert_eq!(single(property, tracked()), expected);
    }

    #[rstest]
    #[case::stored(var("p1", string()), Decision::Ignored)]
    #[case::already_tracked(var("p1", string()).with_marker(Marker::Tracked), Decision::NoChange)]
    #[case::constant(property(BindingSpecifier::Let, vec![binding("p1", string())]), Decision::NoChange)]
    fn ignored_by_default(#[case] property: PropertyDecl, #[case] expected: Decision) {
        assert_eq!(single(property, ignored()), expected);
    }

    #[test]
    fn sample_struct() {
        let mut p2 = binding("p2", string());
        p2.has_initializer = true;

        let container = container(
            ContainerKind::Struct,
            vec![
                Decl::Property(var("p1", string())),
                Decl::Property(property(BindingSpecifier::Var, vec![p2])),
            ],
        );

        let propagation = propagate(&container, &tracked()).unwrap();
        assert_eq!(
            propagation.markers().collect::<Vec<_>>(),
            [(0, Marker::Tracked), (1, Marker::Tracked)]
        );
    }

    #[test]
    fn non_property_members_are_left_alone() {
        let container = container(
            ContainerKind::Class,
            vec![
                Decl::Other(OtherDecl {
                    kind: OtherDeclKind::Function,
                    attributes: Vec::new(),
                    span: Span::default(),
                }),
                Decl::Container(container(ContainerKind::Struct, vec![Decl::Property(var(
                    "ip1",
                    string(),
                ))])),
                Decl::Property(var("op1", string())),
            ],
        );

        let propagation = propagate(&container, &tracked()).unwrap();
        assert_eq!(
            propagation.iter().collect::<Vec<_>>(),
            [
                (0, Decision::NoChange),
                (1, Decision::NoChange),
                (2, Decision::Tracked)
            ]
        );
    }

    #[test]
    fn empty_container() {
        let propagation = propagate(&container(ContainerKind::Actor, Vec::new()), &tracked()).unwrap();
        assert!(propagation.is_empty());
    }

    #[rstest]
    #[case::enum_(ContainerKind::Enum)]
    #[case::protocol(ContainerKind::Protocol)]
    #[case::extension(ContainerKind::Extension)]
    fn non_nominal(#[case] kind: ContainerKind) {
        let container = container(
            kind,
            vec![
                Decl::Other(OtherDecl {
                    kind: OtherDeclKind::EnumCase,
                    attributes: Vec::new(),
                    span: Span::default(),
                }),
                Decl::Property(var("p1", string())),
            ],
        );

        let diagnostics = propagate(&container, &tracked()).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "nonNominalType");
        assert_eq!(diagnostics[0].anchor, container.span);
    }

    #[test]
    fn idempotent() {
        let container = container(
            ContainerKind::Struct,
            vec![
                Decl::Property(var("p1", string())),
                Decl::Property(var("p2", string()).with_marker(Marker::Ignored)),
                Decl::Property(property(BindingSpecifier::Let, vec![binding("p3", string())])),
            ],
        );

        let first = propagate(&container, &tracked()).unwrap();

        // Attach the decided markers, as a host would, and propagate again.
        let mut marked = container.clone();
        for (i, marker) in first.markers() {
            if let Decl::Property(property) = &mut marked.members[i] {
                property.attributes.push(crate::decl::Attribute::synthetic(marker));
            }
        }

        let second = propagate(&marked, &tracked()).unwrap();
        assert_eq!(second.markers().count(), 0);
        assert_eq!(propagate(&marked, &tracked()).unwrap(), second);
    }
}
