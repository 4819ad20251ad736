//! Setter synthesis for a single tracked property.

use crate::{
    decl::{AccessLevel, Binding, Decl, TypeExpr},
    diagnostic::Diagnostics,
    options::TrackedOptions,
    validate::{self, Context},
};

/// Everything needed to materialise one setter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetterSpec {
    pub function_name: String,
    /// Field assigned by the setter, always the binding's own name.
    pub field_name: String,
    pub parameter_type: TypeExpr,
    /// Parameter must be annotated `@escaping`.
    pub requires_escaping: bool,
    /// Modifier written in front of the generated function, if any.
    pub access_level: Option<AccessLevel>,
}

/// Produce one [`SetterSpec`] per binding of a tracked property.
///
/// Validation accumulates every problem with the declaration before failing, and no specs are
/// produced if anything was reported. Bindings that have no resolvable type or aren't simple
/// identifiers are skipped without a diagnostic.
pub fn synthesize(decl: &Decl, options: &TrackedOptions) -> Result<Vec<SetterSpec>, Diagnostics> {
    validate::validate(decl, Context::TrackedProperty).into_result(())?;

    // Validation guarantees a property.
    let Some(property) = decl.as_property() else {
        return Ok(Vec::new());
    };

    let access_level = property.access_level();

    let specs = property
        .bindings
        .iter()
        .zip(binding_types(&property.bindings))
        .filter_map(|(binding, ty)| {
            let (Some(name), Some(ty)) = (binding.name(), ty) else {
                log::trace!("skipping binding without a name or type at {:?}", binding.span);
                return None;
            };

            let spec = SetterSpec {
                function_name: options.name.clone().unwrap_or_else(|| name.to_string()),
                field_name: name.to_string(),
                parameter_type: ty.clone(),
                requires_escaping: options.force_escaping || ty.requires_escaping(),
                access_level,
            };

            log::debug!(
                "setter `{}` for `{}: {}` (escaping: {}, access: {:?})",
                spec.function_name,
                spec.field_name,
                spec.parameter_type,
                spec.requires_escaping,
                spec.access_level
            );

            Some(spec)
        })
        .collect();

    Ok(specs)
}

/// Resolve the type of every binding. In `var a, b: Int` the untyped, uninitialised `a` shares
/// the type written on `b`.
fn binding_types(bindings: &[Binding]) -> Vec<Option<&TypeExpr>> {
    let mut next = None;

    let mut types = bindings
        .iter()
        .rev()
        .map(|binding| {
            match (&binding.ty, binding.has_initializer) {
                (Some(ty), _) => next = Some(ty),
                (None, true) => next = None,
                (None, false) => {}
            }

            next
        })
        .collect::<Vec<_>>();

    types.reverse();
    types
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    use crate::{
        decl::{
            AccessorBlock, AccessorSpecifier, BindingSpecifier, Modifier, ModifierKind, OtherDecl,
            OtherDeclKind, Pattern, PropertyDecl, test_utils::*,
            ty::{FunctionType, Throws, TupleElement},
        },
        span::Span,
    };

    fn string() -> TypeExpr {
        TypeExpr::named("String")
    }

    fn int() -> TypeExpr {
        TypeExpr::named("Int")
    }

    fn void() -> TypeExpr {
        TypeExpr::named("Void")
    }

    fn specs(property: PropertyDecl, options: TrackedOptions) -> Vec<SetterSpec> {
        synthesize(&Decl::Property(property), &options).unwrap()
    }

    fn only(property: PropertyDecl) -> SetterSpec {
        let mut specs = specs(property, TrackedOptions::default());
        assert_eq!(specs.len(), 1);
        specs.remove(0)
    }

    fn ids(diagnostics: &Diagnostics) -> Vec<&'static str> {
        diagnostics.iter().map(|diagnostic| diagnostic.id()).collect()
    }

    #[test]
    fn simple() {
        assert_eq!(
            only(var("p1", string())),
            SetterSpec {
                function_name: "p1".to_string(),
                field_name: "p1".to_string(),
                parameter_type: string(),
                requires_escaping: false,
                access_level: None,
            }
        );
    }

    #[test]
    fn renamed() {
        let specs = specs(
            var("lastName", string()),
            TrackedOptions {
                name: Some("setLastName".to_string()),
                force_escaping: false,
            },
        );

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].function_name, "setLastName");
        assert_eq!(specs[0].field_name, "lastName");
        assert_eq!(specs[0].parameter_type, string());
    }

    #[rstest]
    #[case::none(vec![], None)]
    #[case::public(vec![access(AccessLevel::Public)], Some(AccessLevel::Public))]
    #[case::fileprivate(vec![access(AccessLevel::FilePrivate)], Some(AccessLevel::FilePrivate))]
    #[case::public_private_set(
        vec![access(AccessLevel::Public), access_set(AccessLevel::Private)],
        Some(AccessLevel::Public)
    )]
    #[case::private_set(vec![access_set(AccessLevel::Private)], None)]
    #[case::open(
        vec![access(AccessLevel::Open), modifier(ModifierKind::Other("final".to_string()))],
        Some(AccessLevel::Open)
    )]
    fn access_level(#[case] modifiers: Vec<Modifier>, #[case] expected: Option<AccessLevel>) {
        assert_eq!(
            only(var("p1", string()).with_modifiers(modifiers)).access_level,
            expected
        );
    }

    #[rstest]
    // () -> Void
    #[case::p1(TypeExpr::function([], void()))]
    // (String?) -> Void
    #[case::p2(TypeExpr::function([TypeExpr::optional(string())], void()))]
    // () -> String?
    #[case::p3(TypeExpr::function([], TypeExpr::optional(string())))]
    // (() -> String)
    #[case::p4(TypeExpr::tuple([TypeExpr::function([], string())]))]
    // ((() -> String))
    #[case::p5(TypeExpr::tuple([TypeExpr::tuple([TypeExpr::function([], string())])]))]
    // (Int, String) async throws -> Void
    #[case::p6(TypeExpr::Function(FunctionType {
        params: vec![TupleElement::unlabelled(int()), TupleElement::unlabelled(string())],
        is_async: true,
        throws: Some(Throws::Untyped),
        output: Box::new(void()),
    }))]
    // (String) -> (Int) -> Void
    #[case::p7(TypeExpr::function([string()], TypeExpr::function([int()], void())))]
    // @Sendable () -> Void
    #[case::p8(TypeExpr::Attributed {
        attributes: vec!["Sendable".to_string()],
        specifier: None,
        ty: Box::new(TypeExpr::function([], void())),
    })]
    fn function_types_escape(#[case] ty: TypeExpr) {
        let spec = only(var("p", ty.clone()));
        assert!(spec.requires_escaping);
        assert_eq!(spec.parameter_type, ty);
    }

    #[rstest]
    #[case::plain(string())]
    #[case::optional_function(TypeExpr::optional(TypeExpr::tuple([TypeExpr::function([], string())])))]
    #[case::tuple(TypeExpr::tuple([TypeExpr::function([], string()), int()]))]
    #[case::alias(TypeExpr::named("AliasedFunctionType"))]
    fn non_function_types_do_not_escape(#[case] ty: TypeExpr) {
        assert!(!only(var("p", ty)).requires_escaping);
    }

    #[test]
    fn force_escaping() {
        let specs = specs(
            var("p", TypeExpr::named("AliasedFunctionType")),
            TrackedOptions {
                name: None,
                force_escaping: true,
            },
        );

        assert!(specs[0].requires_escaping);
    }

    #[test]
    fn multi_binding() {
        let property = property(BindingSpecifier::Var, vec![binding("a", int()), binding("b", string())])
            .with_modifiers([access(AccessLevel::Internal)]);

        let specs = specs(property, TrackedOptions::default());
        assert_eq!(
            specs
                .iter()
                .map(|spec| (spec.function_name.as_str(), spec.parameter_type.to_string()))
                .collect::<Vec<_>>(),
            [("a", "Int".to_string()), ("b", "String".to_string())]
        );
        assert!(
            specs
                .iter()
                .all(|spec| spec.access_level == Some(AccessLevel::Internal))
        );
    }

    #[test]
    fn shared_type_annotation() {
        let mut a = binding("a", int());
        a.ty = None;

        let specs = specs(
            property(BindingSpecifier::Var, vec![a, binding("b", int())]),
            TrackedOptions::default(),
        );

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].field_name, "a");
        assert_eq!(specs[0].parameter_type, int());
    }

    #[test]
    fn untyped_bindings_are_skipped() {
        let mut inferred = binding("inferred", int());
        inferred.ty = None;
        inferred.has_initializer = true;

        let mut destructured = binding("_", int());
        destructured.pattern = Pattern::Other;

        let specs = specs(
            property(
                BindingSpecifier::Var,
                vec![inferred, destructured, binding("typed", string())],
            ),
            TrackedOptions::default(),
        );

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].field_name, "typed");
    }

    #[test]
    fn get_set_and_observed() {
        let get_set = var("p", int()).with_accessors(accessors([
            accessor(AccessorSpecifier::Get, true),
            accessor(AccessorSpecifier::Set, true),
        ]));
        let observed =
            var("p", int()).with_accessors(accessors([accessor(AccessorSpecifier::DidSet, true)]));

        assert_eq!(only(get_set).field_name, "p");
        assert_eq!(only(observed).field_name, "p");
    }

    #[rstest]
    #[case::constant(property(BindingSpecifier::Let, vec![binding("p1", int())]), vec!["letConstant"])]
    #[case::static_(
        var("p1", int()).with_modifiers([modifier(ModifierKind::Static)]),
        vec!["staticProperty"]
    )]
    #[case::get_only(
        var("p1", int()).with_accessors(accessors([accessor(AccessorSpecifier::Get, true)])),
        vec!["getOnlyComputedProperty"]
    )]
    #[case::implicit_getter(
        var("p1", int()).with_accessors(AccessorBlock::Getter { span: Span::new(12, 19) }),
        vec!["getOnlyComputedProperty"]
    )]
    #[case::protocol(
        var("p1", int()).with_accessors(accessors([
            accessor(AccessorSpecifier::Get, false),
            accessor(AccessorSpecifier::Set, false),
        ])),
        vec!["protocolProperty"]
    )]
    #[case::static_constant(
        property(BindingSpecifier::Let, vec![binding("p1", int())])
            .with_modifiers([modifier(ModifierKind::Static)]),
        vec!["letConstant", "staticProperty"]
    )]
    fn invalid(#[case] property: PropertyDecl, #[case] expected: Vec<&str>) {
        let diagnostics = synthesize(&Decl::Property(property), &TrackedOptions::default()).unwrap_err();
        assert_eq!(ids(&diagnostics), expected);
    }

    #[test]
    fn get_only_anchors_at_accessor_block() {
        let property = var("p1", int()).with_accessors(AccessorBlock::Getter {
            span: Span::new(12, 19),
        });

        let diagnostics = synthesize(&Decl::Property(property), &TrackedOptions::default()).unwrap_err();
        assert_eq!(diagnostics[0].anchor, Span::new(12, 19));
    }

    #[test]
    fn non_variable() {
        let decl = Decl::Other(OtherDecl {
            kind: OtherDeclKind::Function,
            attributes: Vec::new(),
            span: Span::new(0, 20),
        });

        let diagnostics = synthesize(&decl, &TrackedOptions::default()).unwrap_err();
        assert_eq!(ids(&diagnostics), ["nonVariableDeclaration"]);
    }
}
