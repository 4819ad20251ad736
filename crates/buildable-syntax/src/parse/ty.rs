use buildable::decl::ty::{FunctionType, MetatypeKind, PathSegment, Throws, TupleElement, TypeExpr};
use proc_macro2::{Delimiter, Span as TokenSpan};
use syn::{Token, parse::ParseStream};

use super::{
    adjacent, any_ident, group, keyword, peek_arrow, peek_group, peek_keyword, peek_punct, punct,
    within,
};

/// Ownership and isolation specifiers that may precede a type.
const SPECIFIERS: &[&str] = &[
    "inout",
    "borrowing",
    "consuming",
    "__owned",
    "__shared",
    "sending",
    "isolated",
];

/// Parse a type, returning it alongside the span of its final token.
pub fn parse_type(input: ParseStream) -> syn::Result<(TypeExpr, TokenSpan)> {
    let (first, mut last) = postfix(input)?;
    let mut types = vec![first];

    while peek_punct(input, '&') {
        punct(input, '&')?;
        let (ty, end) = postfix(input)?;
        types.push(ty);
        last = end;
    }

    let ty = match types.len() {
        1 => types.remove(0),
        _ => TypeExpr::Composition(types),
    };

    Ok((ty, last))
}

fn postfix(input: ParseStream) -> syn::Result<(TypeExpr, TokenSpan)> {
    let (mut ty, mut last) = prefix(input)?;

    loop {
        if peek_punct(input, '?') && adjacent(input, last) {
            last = punct(input, '?')?.span();
            ty = TypeExpr::Optional(Box::new(ty));
        } else if peek_punct(input, '!') && adjacent(input, last) {
            last = punct(input, '!')?.span();
            ty = TypeExpr::ImplicitlyUnwrapped(Box::new(ty));
        } else if let Some(kind) = peek_metatype(input) {
            punct(input, '.')?;
            last = any_ident(input)?.span();
            ty = TypeExpr::Metatype {
                base: Box::new(ty),
                kind,
            };
        } else {
            break;
        }
    }

    Ok((ty, last))
}

fn peek_metatype(input: ParseStream) -> Option<MetatypeKind> {
    let (dot, rest) = input.cursor().punct()?;
    if dot.as_char() != '.' {
        return None;
    }

    match rest.ident()? {
        (ident, _) if ident == "Type" => Some(MetatypeKind::Type),
        (ident, _) if ident == "Protocol" => Some(MetatypeKind::Protocol),
        _ => None,
    }
}

fn prefix(input: ParseStream) -> syn::Result<(TypeExpr, TokenSpan)> {
    let mut attributes = Vec::new();

    while peek_punct(input, '@') {
        punct(input, '@')?;
        let name = any_ident(input)?;
        let mut attribute = name.to_string();

        // `@convention(c)`
        if peek_group(input, Delimiter::Parenthesis) && adjacent(input, name.span()) {
            let group = group(input, Delimiter::Parenthesis)?;
            attribute = format!("{attribute}({})", group.stream());
        }

        attributes.push(attribute);
    }

    let specifier = match input.cursor().ident() {
        Some((ident, rest)) if SPECIFIERS.iter().any(|s| ident == *s) && starts_type(rest) => {
            Some(any_ident(input)?.to_string())
        }
        _ => None,
    };

    if !attributes.is_empty() || specifier.is_some() {
        let (ty, last) = postfix(input)?;

        return Ok((
            TypeExpr::Attributed {
                attributes,
                specifier,
                ty: Box::new(ty),
            },
            last,
        ));
    }

    let opaque = peek_keyword(input, "some");
    if (opaque || peek_keyword(input, "any"))
        && input
            .cursor()
            .ident()
            .is_some_and(|(_, rest)| starts_type(rest))
    {
        any_ident(input)?;
        let (ty, last) = parse_type(input)?;
        let ty = Box::new(ty);

        return Ok((
            if opaque {
                TypeExpr::Opaque(ty)
            } else {
                TypeExpr::Existential(ty)
            },
            last,
        ));
    }

    base(input)
}

fn starts_type(cursor: syn::buffer::Cursor) -> bool {
    cursor.ident().is_some()
        || cursor.group(Delimiter::Parenthesis).is_some()
        || cursor.group(Delimiter::Bracket).is_some()
        || cursor.punct().is_some_and(|(punct, _)| punct.as_char() == '@')
}

fn base(input: ParseStream) -> syn::Result<(TypeExpr, TokenSpan)> {
    if peek_group(input, Delimiter::Parenthesis) {
        let group = group(input, Delimiter::Parenthesis)?;
        let elements = within(&group, tuple_elements)?;

        function_or_tuple(input, elements, group.span())
    } else if peek_group(input, Delimiter::Bracket) {
        let group = group(input, Delimiter::Bracket)?;

        let ty = within(&group, |input| {
            let (key, _) = parse_type(input)?;

            if peek_punct(input, ':') {
                punct(input, ':')?;
                let (value, _) = parse_type(input)?;

                Ok(TypeExpr::Dictionary {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            } else {
                Ok(TypeExpr::Array(Box::new(key)))
            }
        })?;

        Ok((ty, group.span()))
    } else if input.cursor().ident().is_some() {
        named(input)
    } else {
        Err(input.error("expected type"))
    }
}

/// Effects and an arrow after a parenthesised list make it a function type.
fn function_or_tuple(
    input: ParseStream,
    elements: Vec<TupleElement>,
    mut last: TokenSpan,
) -> syn::Result<(TypeExpr, TokenSpan)> {
    let is_async = peek_keyword(input, "async");
    if is_async {
        last = keyword(input, "async")?.span();
    }

    let throws = if peek_keyword(input, "throws") || peek_keyword(input, "rethrows") {
        let throws = any_ident(input)?;
        last = throws.span();

        if peek_group(input, Delimiter::Parenthesis) && adjacent(input, last) {
            let group = group(input, Delimiter::Parenthesis)?;
            last = group.span();

            let error = within(&group, |input| parse_type(input).map(|(ty, _)| ty))?;
            Some(Throws::Typed(Box::new(error)))
        } else {
            Some(Throws::Untyped)
        }
    } else {
        None
    };

    if !peek_arrow(input) {
        if is_async || throws.is_some() {
            return Err(input.error("expected `->`"));
        }

        return Ok((TypeExpr::Tuple(elements), last));
    }

    input.parse::<Token![->]>()?;
    let (output, last) = parse_type(input)?;

    Ok((
        TypeExpr::Function(FunctionType {
            params: elements,
            is_async,
            throws,
            output: Box::new(output),
        }),
        last,
    ))
}

fn tuple_elements(input: ParseStream) -> syn::Result<Vec<TupleElement>> {
    let mut elements = Vec::new();

    while !input.is_empty() {
        let label = label(input)?;
        let (ty, _) = parse_type(input)?;

        let variadic = input.peek(Token![...]);
        if variadic {
            input.parse::<Token![...]>()?;
        }

        elements.push(TupleElement {
            label,
            ty,
            variadic,
        });

        if !input.is_empty() {
            punct(input, ',')?;
        }
    }

    Ok(elements)
}

/// `name:` or `external internal:` in front of a tuple element.
fn label(input: ParseStream) -> syn::Result<Option<String>> {
    let cursor = input.cursor();
    let is_colon = |cursor: syn::buffer::Cursor| {
        cursor
            .punct()
            .is_some_and(|(punct, _)| punct.as_char() == ':')
    };

    let Some((_, rest)) = cursor.ident() else {
        return Ok(None);
    };

    let words = if is_colon(rest) {
        1
    } else if rest.ident().is_some_and(|(_, rest)| is_colon(rest)) {
        2
    } else {
        return Ok(None);
    };

    let mut label = any_ident(input)?.to_string();
    if words == 2 {
        label.push(' ');
        label.push_str(&any_ident(input)?.to_string());
    }
    punct(input, ':')?;

    Ok(Some(label))
}

fn named(input: ParseStream) -> syn::Result<(TypeExpr, TokenSpan)> {
    let mut segments = Vec::new();

    loop {
        let name = any_ident(input)?;
        let mut last = name.span();
        let mut generics = Vec::new();

        if peek_punct(input, '<') {
            punct(input, '<')?;

            while !peek_punct(input, '>') {
                let (ty, _) = parse_type(input)?;
                generics.push(ty);

                if !peek_punct(input, ',') {
                    break;
                }
                punct(input, ',')?;
            }

            last = punct(input, '>')?.span();
        }

        segments.push(PathSegment {
            name: name.to_string(),
            generics,
        });

        let continues = match input.cursor().punct() {
            Some((dot, rest)) if dot.as_char() == '.' => {
                rest.ident().is_some() && peek_metatype(input).is_none()
            }
            _ => false,
        };

        if !continues {
            return Ok((TypeExpr::Named(segments), last));
        }

        punct(input, '.')?;
    }
}
