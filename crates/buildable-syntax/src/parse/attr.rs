use buildable::{ArgValue, Argument, Attribute, AttributeArguments};
use proc_macro2::{Delimiter, TokenTree};
use syn::{Lit, parse::ParseStream};

use super::{Ctx, adjacent, any_ident, group, peek_group, peek_punct, punct, within};

/// `@Name`, `@Module.Name` or `@Name(arguments)`.
pub fn attribute(input: ParseStream, ctx: &Ctx) -> syn::Result<Attribute> {
    let at = punct(input, '@')?;

    let first = any_ident(input)?;
    let mut name = first.to_string();
    let mut last = first.span();

    while peek_qualified(input) {
        punct(input, '.')?;
        let segment = any_ident(input)?;
        name.push('.');
        name.push_str(&segment.to_string());
        last = segment.span();
    }

    let arguments = if peek_group(input, Delimiter::Parenthesis) && adjacent(input, last) {
        let group = group(input, Delimiter::Parenthesis)?;
        last = group.span();
        within(&group, |input| arguments(input, ctx))?
    } else {
        AttributeArguments::default()
    };

    Ok(Attribute::new(name, arguments, ctx.span(at.span(), last)))
}

fn peek_qualified(input: ParseStream) -> bool {
    match input.cursor().punct() {
        Some((dot, rest)) if dot.as_char() == '.' => rest.ident().is_some(),
        _ => false,
    }
}

fn arguments(input: ParseStream, ctx: &Ctx) -> syn::Result<AttributeArguments> {
    let mut arguments = Vec::new();

    while !input.is_empty() {
        let first = input.span();

        let label = if peek_label(input) {
            let label = any_ident(input)?;
            punct(input, ':')?;
            Some(label.to_string())
        } else {
            None
        };

        let expr = expression(input)?;
        let (Some(start), Some(end)) = (expr.first(), expr.last()) else {
            return Err(input.error("expected expression"));
        };

        let value = classify(&expr, ctx.text(start.span(), end.span()));
        let span = ctx.span(first, end.span());

        arguments.push(Argument { label, value, span });

        if !input.is_empty() {
            punct(input, ',')?;
        }
    }

    Ok(AttributeArguments::new(arguments))
}

/// `label:` (but not `label::`).
fn peek_label(input: ParseStream) -> bool {
    let Some((_, rest)) = input.cursor().ident() else {
        return false;
    };

    match rest.punct() {
        Some((colon, rest)) if colon.as_char() == ':' => {
            !rest.punct().is_some_and(|(next, _)| next.as_char() == ':')
        }
        _ => false,
    }
}

/// Every token up to the next top-level comma.
fn expression(input: ParseStream) -> syn::Result<Vec<TokenTree>> {
    let mut tokens = Vec::new();

    while !input.is_empty() && !peek_punct(input, ',') {
        tokens.push(input.parse::<TokenTree>()?);
    }

    Ok(tokens)
}

fn classify(expr: &[TokenTree], text: &str) -> ArgValue {
    match expr {
        [TokenTree::Literal(literal)] => match Lit::new(literal.clone()) {
            Lit::Str(string) => ArgValue::Str(string.value()),
            _ => ArgValue::Expr(text.to_string()),
        },
        [TokenTree::Ident(ident)] if ident == "true" => ArgValue::Bool(true),
        [TokenTree::Ident(ident)] if ident == "false" => ArgValue::Bool(false),
        _ => ArgValue::Expr(text.to_string()),
    }
}
