use std::fmt::{self, Display, Write};

use crate::{
    decl::{AccessLevel, TypeExpr},
    synthesize::SetterSpec,
};

/// Default indentation unit of generated function bodies.
pub const DEFAULT_INDENT_UNIT: &str = "    ";

pub fn lower(spec: &SetterSpec) -> SetterDecl {
    SetterDecl {
        access_level: spec.access_level,
        name: spec.function_name.clone(),
        parameter: ParameterType {
            escaping: spec.requires_escaping,
            ty: spec.parameter_type.clone(),
        },
        field: spec.field_name.clone(),
    }
}

/// Sibling function declaration produced for a tracked binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetterDecl {
    /// Modifier in front of `func`, if any.
    pub access_level: Option<AccessLevel>,
    /// Name of the function.
    pub name: String,
    /// Type of the single, unlabelled parameter.
    pub parameter: ParameterType,
    /// Field of the copy that is assigned.
    pub field: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterType {
    pub escaping: bool,
    pub ty: TypeExpr,
}

impl SetterDecl {
    /// Render the declaration with every line prefixed by `indent`, and the body indented one
    /// further `unit`. No trailing newline is written.
    pub fn render(&self, indent: &str, unit: &str) -> String {
        let mut out = String::new();

        // Writing to a `String` can't fail.
        let _ = self.write(&mut out, indent, unit);

        out
    }

    fn write(&self, out: &mut impl Write, indent: &str, unit: &str) -> fmt::Result {
        write!(out, "{indent}")?;
        if let Some(access_level) = self.access_level {
            write!(out, "{access_level} ")?;
        }
        writeln!(
            out,
            "func {}(_ value: {}) -> Self {{",
            self.name, self.parameter
        )?;

        writeln!(out, "{indent}{unit}var copy = self")?;
        writeln!(out, "{indent}{unit}copy.{} = value", self.field)?;
        writeln!(out, "{indent}{unit}return copy")?;
        write!(out, "{indent}}}")
    }
}

impl Display for SetterDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, "", DEFAULT_INDENT_UNIT)
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.escaping {
            f.write_str("@escaping ")?;
        }

        write!(f, "{}", self.ty)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    fn spec(ty: TypeExpr) -> SetterSpec {
        SetterSpec {
            function_name: "p1".to_string(),
            field_name: "p1".to_string(),
            requires_escaping: ty.requires_escaping(),
            parameter_type: ty,
            access_level: None,
        }
    }

    #[test]
    fn simple() {
        assert_eq!(
            lower(&spec(TypeExpr::named("String"))).to_string(),
            "func p1(_ value: String) -> Self {\n    var copy = self\n    copy.p1 = value\n    return copy\n}"
        );
    }

    #[test]
    fn renamed_public() {
        let decl = lower(&SetterSpec {
            function_name: "setLastName".to_string(),
            field_name: "lastName".to_string(),
            parameter_type: TypeExpr::named("String"),
            requires_escaping: false,
            access_level: Some(AccessLevel::Public),
        });

        assert_eq!(
            decl.to_string(),
            "public func setLastName(_ value: String) -> Self {\n    var copy = self\n    copy.lastName = value\n    return copy\n}"
        );
    }

    #[rstest]
    #[case::function(
        TypeExpr::function([TypeExpr::optional(TypeExpr::named("String"))], TypeExpr::named("Void")),
        "@escaping (String?) -> Void"
    )]
    #[case::grouped(
        TypeExpr::tuple([TypeExpr::function([], TypeExpr::named("String"))]),
        "@escaping (() -> String)"
    )]
    #[case::optional(
        TypeExpr::optional(TypeExpr::tuple([TypeExpr::function([], TypeExpr::named("String"))])),
        "(() -> String)?"
    )]
    fn parameter(#[case] ty: TypeExpr, #[case] expected: &str) {
        assert_eq!(lower(&spec(ty)).parameter.to_string(), expected);
    }

    #[test]
    fn indented() {
        let rendered = lower(&spec(TypeExpr::named("Int"))).render("  ", "\t");

        assert_eq!(
            rendered,
            "  func p1(_ value: Int) -> Self {\n  \tvar copy = self\n  \tcopy.p1 = value\n  \treturn copy\n  }"
        );
    }
}
