use crate::{
    decl::{AccessorBlock, AccessorKind, ContainerDecl, Decl, PropertyDecl},
    diagnostic::{Diagnostic, DiagnosticKind, Diagnostics},
    span::Span,
};

/// Which annotation a declaration is being checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    /// Container-level annotation, propagating markers to members.
    Container,
    /// Property-level annotation, synthesising setters.
    TrackedProperty,
}

/// Check that an annotation may be applied to `decl`. Every applicable problem is reported, an
/// empty result means the declaration is valid.
pub fn validate(decl: &Decl, context: Context) -> Diagnostics {
    let diagnostics = match context {
        Context::Container => validate_container(decl),
        Context::TrackedProperty => validate_tracked(decl),
    };

    if !diagnostics.is_empty() {
        log::debug!(
            "{} diagnostic(s) for {context:?} annotation at {:?}",
            diagnostics.len(),
            decl.span()
        );
    }

    diagnostics
}

fn validate_container(decl: &Decl) -> Diagnostics {
    match decl {
        Decl::Container(container) => check_container(container),
        _ => Diagnostic::new(DiagnosticKind::NonNominalType, decl.span()).into(),
    }
}

pub(crate) fn check_container(container: &ContainerDecl) -> Diagnostics {
    if container.is_nominal() {
        Diagnostics::new()
    } else {
        Diagnostic::new(DiagnosticKind::NonNominalType, container.span).into()
    }
}

fn validate_tracked(decl: &Decl) -> Diagnostics {
    let Decl::Property(property) = decl else {
        return Diagnostic::new(DiagnosticKind::NonVariableDeclaration, decl.span()).into();
    };

    let mut diagnostics = Diagnostics::new();

    if property.is_constant() {
        diagnostics.push(Diagnostic::new(DiagnosticKind::LetConstant, property.span));
    }

    if property.is_static() {
        diagnostics.push(Diagnostic::new(DiagnosticKind::StaticProperty, property.span));
    }

    match property.accessor_kind() {
        AccessorKind::ProtocolRequirement => diagnostics.push(Diagnostic::new(
            DiagnosticKind::ProtocolProperty,
            accessor_anchor(property),
        )),
        AccessorKind::ComputedGetOnly => diagnostics.push(Diagnostic::new(
            DiagnosticKind::GetOnlyComputedProperty,
            accessor_anchor(property),
        )),
        AccessorKind::StoredOrSimpleComputed | AccessorKind::ComputedGetSet => {}
    }

    diagnostics
}

fn accessor_anchor(property: &PropertyDecl) -> Span {
    property
        .accessor_block()
        .map(AccessorBlock::span)
        .unwrap_or(property.span)
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    use super::Context;

    use crate::decl::{
        AccessLevel, AccessorSpecifier, BindingSpecifier, ContainerKind, ModifierKind, OtherDecl,
        OtherDeclKind, TypeExpr, test_utils::*,
    };

    fn string() -> TypeExpr {
        TypeExpr::named("String")
    }

    fn ids(diagnostics: &Diagnostics) -> Vec<&'static str> {
        diagnostics.iter().map(|diagnostic| diagnostic.id()).collect()
    }

    #[rstest]
    #[case::stored(var("p1", string()))]
    #[case::get_set(var("p1", string()).with_accessors(accessors([
        accessor(AccessorSpecifier::Get, true),
        accessor(AccessorSpecifier::Set, true),
    ])))]
    #[case::observed(var("p1", string()).with_accessors(accessors([
        accessor(AccessorSpecifier::WillSet, true),
    ])))]
    #[case::private(var("p1", string()).with_modifiers([access_set(AccessLevel::Private)]))]
    fn tracked_valid(#[case] property: PropertyDecl) {
        assert!(validate(&Decl::Property(property), Context::TrackedProperty).is_empty());
    }

    #[rstest]
    #[case::constant(
        property(BindingSpecifier::Let, vec![binding("p1", string())]),
        vec!["letConstant"]
    )]
    #[case::static_(
        var("p1", string()).with_modifiers([modifier(ModifierKind::Static)]),
        vec!["staticProperty"]
    )]
    #[case::get_only(
        var("p1", string()).with_accessors(accessors([accessor(AccessorSpecifier::Get, true)])),
        vec!["getOnlyComputedProperty"]
    )]
    #[case::protocol(
        var("p1", string()).with_accessors(accessors([accessor(AccessorSpecifier::Get, false)])),
        vec!["protocolProperty"]
    )]
    #[case::everything(
        property(BindingSpecifier::Let, vec![binding("p1", string())])
            .with_modifiers([modifier(ModifierKind::Class)])
            .with_accessors(accessors([accessor(AccessorSpecifier::Get, true)])),
        vec!["letConstant", "staticProperty", "getOnlyComputedProperty"]
    )]
    fn tracked_invalid(#[case] property: PropertyDecl, #[case] expected: Vec<&str>) {
        let diagnostics = validate(&Decl::Property(property), Context::TrackedProperty);
        assert_eq!(ids(&diagnostics), expected);
    }

    #[test]
    fn accessor_errors_anchor_at_block() {
        let property =
            var("p1", string()).with_accessors(accessors([accessor(AccessorSpecifier::Get, true)]));
        let block_span = property.accessor_block().unwrap().span();

        let diagnostics = validate(&Decl::Property(property), Context::TrackedProperty);
        assert_eq!(diagnostics[0].anchor, block_span);
    }

    #[rstest]
    #[case::function(OtherDeclKind::Function)]
    #[case::enum_case(OtherDeclKind::EnumCase)]
    #[case::type_alias(OtherDeclKind::TypeAlias)]
    fn tracked_non_variable(#[case] kind: OtherDeclKind) {
        let decl = Decl::Other(OtherDecl {
            kind,
            attributes: Vec::new(),
            span: Span::new(3, 20),
        });

        let diagnostics = validate(&decl, Context::TrackedProperty);
        assert_eq!(ids(&diagnostics), ["nonVariableDeclaration"]);
        assert_eq!(diagnostics[0].anchor, Span::new(3, 20));
    }

    #[test]
    fn tracked_on_container() {
        let decl = Decl::Container(container(ContainerKind::Struct, Vec::new()));
        assert_eq!(
            ids(&validate(&decl, Context::TrackedProperty)),
            ["nonVariableDeclaration"]
        );
    }

    #[rstest]
    #[case::struct_(ContainerKind::Struct, vec![])]
    #[case::class(ContainerKind::Class, vec![])]
    #[case::actor(ContainerKind::Actor, vec![])]
    #[case::enum_(ContainerKind::Enum, vec!["nonNominalType"])]
    #[case::protocol(ContainerKind::Protocol, vec!["nonNominalType"])]
    #[case::extension(ContainerKind::Extension, vec!["nonNominalType"])]
    fn container_kinds(#[case] kind: ContainerKind, #[case] expected: Vec<&str>) {
        let decl = Decl::Container(container(kind, Vec::new()));
        assert_eq!(ids(&validate(&decl, Context::Container)), expected);
    }

    #[test]
    fn container_on_property() {
        let decl = Decl::Property(var("p1", string()));
        assert_eq!(ids(&validate(&decl, Context::Container)), ["nonNominalType"]);
    }
}
