use buildable::decl::{
    AccessLevel, Accessor, AccessorBlock, AccessorSpecifier, Attribute, Binding, BindingSpecifier,
    ContainerDecl, ContainerKind, Decl, Modifier, ModifierKind, OtherDecl, OtherDeclKind, Pattern,
    PropertyDecl,
};
use proc_macro2::{Delimiter, Group, Span as TokenSpan, TokenStream, TokenTree};
use syn::{buffer::Cursor, parse::ParseStream};

use super::{
    Ctx, adjacent, any_ident, attr, group, peek_group, peek_keyword, peek_punct, punct,
    token_tree, ty, within,
};

/// Keywords introducing a declaration.
const DECL_KEYWORDS: &[&str] = &[
    "var",
    "let",
    "struct",
    "class",
    "actor",
    "enum",
    "protocol",
    "extension",
    "func",
    "init",
    "deinit",
    "subscript",
    "case",
    "typealias",
    "associatedtype",
    "import",
    "operator",
    "precedencegroup",
    "macro",
];

/// Declaration modifiers other than access levels, `static` and `class`.
const MODIFIERS: &[&str] = &[
    "final",
    "override",
    "mutating",
    "nonmutating",
    "lazy",
    "weak",
    "unowned",
    "dynamic",
    "optional",
    "required",
    "convenience",
    "indirect",
    "nonisolated",
    "isolated",
    "distributed",
    "prefix",
    "postfix",
    "infix",
    "consuming",
    "borrowing",
    "__consuming",
];

/// Modifiers that may precede an individual accessor.
const ACCESSOR_MODIFIERS: &[&str] = &["mutating", "nonmutating", "__consuming", "consuming", "borrowing"];

/// Members of a container body, or the top level of a file.
pub fn members(input: ParseStream, ctx: &Ctx) -> syn::Result<Vec<Decl>> {
    let mut members = Vec::new();

    while !input.is_empty() {
        if skip_trivia(input)? {
            continue;
        }

        if let Some(member) = member(input, ctx)? {
            members.push(member);
        }
    }

    Ok(members)
}

/// Skip one separator, doc comment or compiler directive. Returns whether anything was skipped.
fn skip_trivia(input: ParseStream) -> syn::Result<bool> {
    if peek_punct(input, ';') {
        punct(input, ';')?;
        return Ok(true);
    }

    if !peek_punct(input, '#') {
        return Ok(false);
    }

    let hash = punct(input, '#')?;

    // Doc comments arrive as `#[doc = "..."]` or `#![doc = "..."]`.
    if peek_punct(input, '!') {
        punct(input, '!')?;
    }
    if peek_group(input, Delimiter::Bracket) {
        group(input, Delimiter::Bracket)?;
        return Ok(true);
    }

    // `#if`, `#endif`, `#warning("...")`: everything on the directive's line.
    let line = hash.span().start().line;
    while !input.is_empty() && input.span().start().line == line {
        token_tree(input)?;
    }

    Ok(true)
}

fn member(input: ParseStream, ctx: &Ctx) -> syn::Result<Option<Decl>> {
    let start = input.span();
    let mut attributes = Vec::new();
    let mut modifiers = Vec::new();

    loop {
        if peek_doc_comment(input) {
            skip_trivia(input)?;
        } else if peek_punct(input, '@') {
            attributes.push(attr::attribute(input, ctx)?);
        } else if let Some(modifier) = modifier(input, ctx)? {
            modifiers.push(modifier);
        } else {
            break;
        }
    }

    if input.is_empty() {
        return Err(input.error("expected declaration"));
    }

    let Some((keyword, _)) = input.cursor().ident() else {
        skip_statement(input)?;
        return Ok(None);
    };

    let head = Head {
        attributes,
        modifiers,
        start,
    };

    let decl = match keyword.to_string().as_str() {
        "var" | "let" => Decl::Property(property(input, ctx, head)?),
        "struct" => Decl::Container(container(input, ctx, head, ContainerKind::Struct)?),
        "class" => Decl::Container(container(input, ctx, head, ContainerKind::Class)?),
        "actor" => Decl::Container(container(input, ctx, head, ContainerKind::Actor)?),
        "enum" => Decl::Container(container(input, ctx, head, ContainerKind::Enum)?),
        "protocol" => Decl::Container(container(input, ctx, head, ContainerKind::Protocol)?),
        "extension" => Decl::Container(container(input, ctx, head, ContainerKind::Extension)?),
        "func" => Decl::Other(other(input, ctx, head, OtherDeclKind::Function, true)?),
        "init" => Decl::Other(other(input, ctx, head, OtherDeclKind::Initializer, true)?),
        "deinit" => Decl::Other(other(input, ctx, head, OtherDeclKind::Deinitializer, true)?),
        "subscript" => Decl::Other(other(input, ctx, head, OtherDeclKind::Subscript, true)?),
        "precedencegroup" => {
            Decl::Other(other(input, ctx, head, OtherDeclKind::PrecedenceGroup, true)?)
        }
        "case" => Decl::Other(other(input, ctx, head, OtherDeclKind::EnumCase, false)?),
        "typealias" => Decl::Other(other(input, ctx, head, OtherDeclKind::TypeAlias, false)?),
        "associatedtype" => {
            Decl::Other(other(input, ctx, head, OtherDeclKind::AssociatedType, false)?)
        }
        "operator" => Decl::Other(other(input, ctx, head, OtherDeclKind::Operator, false)?),
        "macro" => Decl::Other(other(input, ctx, head, OtherDeclKind::Macro, false)?),
        "import" => Decl::Other(import(input, ctx, head)?),
        _ => {
            skip_statement(input)?;
            return Ok(None);
        }
    };

    Ok(Some(decl))
}

/// Attributes and modifiers written before a declaration keyword.
struct Head {
    attributes: Vec<Attribute>,
    modifiers: Vec<Modifier>,
    /// First token of the declaration.
    start: TokenSpan,
}

fn peek_doc_comment(input: ParseStream) -> bool {
    let Some((hash, rest)) = input.cursor().punct() else {
        return false;
    };

    let rest = match rest.punct() {
        Some((bang, rest)) if bang.as_char() == '!' => rest,
        _ => rest,
    };

    hash.as_char() == '#' && rest.group(Delimiter::Bracket).is_some()
}

fn modifier(input: ParseStream, ctx: &Ctx) -> syn::Result<Option<Modifier>> {
    let Some((ident, rest)) = input.cursor().ident() else {
        return Ok(None);
    };
    let word = ident.to_string();

    let mut kind = if let Some(level) = AccessLevel::from_keyword(&word) {
        ModifierKind::Access {
            level,
            setter_only: false,
        }
    } else if word == "static" {
        ModifierKind::Static
    } else if word == "class" {
        // `class var` and `class func` rather than a class declaration.
        let Some((next, _)) = rest.ident() else {
            return Ok(None);
        };
        let next = next.to_string();

        if !(["var", "let", "func", "subscript", "typealias"].contains(&next.as_str())
            || is_modifier(&next))
        {
            return Ok(None);
        }

        ModifierKind::Class
    } else if MODIFIERS.contains(&word.as_str()) {
        ModifierKind::Other(word)
    } else {
        return Ok(None);
    };

    let ident = any_ident(input)?;
    let mut last = ident.span();

    // `private(set)`, `unowned(safe)`, `nonisolated(unsafe)`
    if peek_group(input, Delimiter::Parenthesis) && adjacent(input, last) {
        let group = group(input, Delimiter::Parenthesis)?;
        last = group.span();

        if let ModifierKind::Access { setter_only, .. } = &mut kind {
            *setter_only = group.stream().to_string() == "set";
        }
    }

    Ok(Some(Modifier {
        kind,
        span: ctx.span(ident.span(), last),
    }))
}

fn is_modifier(word: &str) -> bool {
    AccessLevel::from_keyword(word).is_some()
        || word == "static"
        || word == "class"
        || MODIFIERS.contains(&word)
}

fn property(input: ParseStream, ctx: &Ctx, head: Head) -> syn::Result<PropertyDecl> {
    let keyword = any_ident(input)?;
    let specifier = if keyword == "let" {
        BindingSpecifier::Let
    } else {
        BindingSpecifier::Var
    };

    let mut last = keyword.span();
    let mut bindings = vec![binding(input, ctx, &mut last)?];

    while peek_punct(input, ',') {
        last = punct(input, ',')?.span();
        bindings.push(binding(input, ctx, &mut last)?);
    }

    Ok(PropertyDecl {
        attributes: head.attributes,
        modifiers: head.modifiers,
        specifier,
        bindings,
        span: ctx.span(head.start, last),
    })
}

fn binding(input: ParseStream, ctx: &Ctx, last: &mut TokenSpan) -> syn::Result<Binding> {
    let first = input.span();

    let pattern = if peek_group(input, Delimiter::Parenthesis) {
        *last = group(input, Delimiter::Parenthesis)?.span();
        Pattern::Other
    } else {
        let name = any_ident(input)?;
        *last = name.span();

        if name == "_" {
            Pattern::Other
        } else {
            Pattern::Identifier(name.to_string())
        }
    };

    let ty = if peek_punct(input, ':') {
        punct(input, ':')?;
        let (ty, end) = ty::parse_type(input)?;
        *last = end;
        Some(ty)
    } else {
        None
    };

    let has_initializer = peek_punct(input, '=');
    if has_initializer {
        *last = punct(input, '=')?.span();
        *last = skip_until(input, *last, Stop::Initializer)?;
    }

    let accessors = match input.cursor().group(Delimiter::Brace) {
        Some((content, _, _)) if !has_initializer || starts_with_observer(content) => {
            let group = group(input, Delimiter::Brace)?;
            *last = group.span();
            Some(accessor_block(&group, ctx)?)
        }
        _ => None,
    };

    Ok(Binding {
        pattern,
        ty,
        has_initializer,
        accessors,
        span: ctx.span(first, *last),
    })
}

fn starts_with_observer(content: Cursor) -> bool {
    content
        .ident()
        .is_some_and(|(ident, _)| ident == "willSet" || ident == "didSet")
}

fn accessor_block(block: &Group, ctx: &Ctx) -> syn::Result<AccessorBlock> {
    let span = ctx.span(block.span(), block.span());

    within(block, |input| {
        let fork = input.fork();
        while peek_punct(&fork, '@') {
            attr::attribute(&fork, ctx)?;
        }
        while ACCESSOR_MODIFIERS.iter().any(|word| peek_keyword(&fork, word)) {
            any_ident(&fork)?;
        }

        let is_list = fork
            .cursor()
            .ident()
            .is_some_and(|(ident, _)| AccessorSpecifier::from_keyword(&ident.to_string()).is_some());

        if !is_list {
            input.parse::<TokenStream>()?;
            return Ok(AccessorBlock::Getter { span });
        }

        let mut accessors = Vec::new();
        while !input.is_empty() {
            if skip_trivia(input)? {
                continue;
            }

            accessors.push(accessor(input, ctx)?);
        }

        Ok(AccessorBlock::Accessors { accessors, span })
    })
}

fn accessor(input: ParseStream, ctx: &Ctx) -> syn::Result<Accessor> {
    let first = input.span();

    while peek_punct(input, '@') {
        attr::attribute(input, ctx)?;
    }
    while ACCESSOR_MODIFIERS.iter().any(|word| peek_keyword(input, word)) {
        any_ident(input)?;
    }

    let keyword = any_ident(input)?;
    let specifier = AccessorSpecifier::from_keyword(&keyword.to_string())
        .ok_or_else(|| syn::Error::new(keyword.span(), "expected accessor"))?;
    let mut last = keyword.span();

    // `set(newValue)`
    if peek_group(input, Delimiter::Parenthesis) {
        last = group(input, Delimiter::Parenthesis)?.span();
    }

    // Effects, such as `get async throws(MyError)`.
    while peek_keyword(input, "async") || peek_keyword(input, "throws") {
        last = any_ident(input)?.span();

        if peek_group(input, Delimiter::Parenthesis) && adjacent(input, last) {
            last = group(input, Delimiter::Parenthesis)?.span();
        }
    }

    let has_body = peek_group(input, Delimiter::Brace);
    if has_body {
        last = group(input, Delimiter::Brace)?.span();
    }

    Ok(Accessor {
        specifier,
        has_body,
        span: ctx.span(first, last),
    })
}

fn container(
    input: ParseStream,
    ctx: &Ctx,
    head: Head,
    kind: ContainerKind,
) -> syn::Result<ContainerDecl> {
    any_ident(input)?;

    let first = any_ident(input)?;
    let mut name = first.to_string();

    // `extension Outer.Inner`
    if kind == ContainerKind::Extension {
        while let Some((dot, rest)) = input.cursor().punct() {
            if dot.as_char() != '.' || rest.ident().is_none() {
                break;
            }

            punct(input, '.')?;
            name.push('.');
            name.push_str(&any_ident(input)?.to_string());
        }
    }

    // Generic parameters, inheritance and where clauses run up to the body.
    while !input.is_empty() && !peek_group(input, Delimiter::Brace) {
        token_tree(input)?;
    }
    let body = group(input, Delimiter::Brace)?;

    let members = within(&body, |input| members(input, ctx))?;

    Ok(ContainerDecl {
        kind,
        name,
        attributes: head.attributes,
        modifiers: head.modifiers,
        members,
        span: ctx.span(head.start, body.span()),
    })
}

fn other(
    input: ParseStream,
    ctx: &Ctx,
    head: Head,
    kind: OtherDeclKind,
    has_body: bool,
) -> syn::Result<OtherDecl> {
    let keyword = any_ident(input)?;
    let stop = if has_body { Stop::Body } else { Stop::Member };
    let last = skip_until(input, keyword.span(), stop)?;

    Ok(OtherDecl {
        kind,
        attributes: head.attributes,
        span: ctx.span(head.start, last),
    })
}

/// `import Module.Submodule` or `import struct Module.Type`.
fn import(input: ParseStream, ctx: &Ctx, head: Head) -> syn::Result<OtherDecl> {
    any_ident(input)?;

    if input
        .cursor()
        .ident()
        .is_some_and(|(ident, rest)| DECL_KEYWORDS.contains(&ident.to_string().as_str()) && rest.ident().is_some())
    {
        any_ident(input)?;
    }

    let mut last = any_ident(input)?.span();
    while peek_punct(input, '.') {
        punct(input, '.')?;
        last = any_ident(input)?.span();
    }

    Ok(OtherDecl {
        kind: OtherDeclKind::Import,
        attributes: head.attributes,
        span: ctx.span(head.start, last),
    })
}

/// Consume an unrecognised statement.
fn skip_statement(input: ParseStream) -> syn::Result<()> {
    let first = token_tree(input)?;
    let last = skip_until(input, first.span(), Stop::Member)?;

    log::trace!("skipped statement ending at {:?}", last.end());

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stop {
    /// Before anything that starts another member.
    Member,
    /// After the first braced body, or before another member if there is none.
    Body,
    /// Before another member, a top-level comma, or an observer block.
    Initializer,
}

/// Consume tokens following `last` until `stop` applies, returning the span of the final token
/// consumed (`last` if nothing was).
fn skip_until(input: ParseStream, last: TokenSpan, stop: Stop) -> syn::Result<TokenSpan> {
    input.step(|cursor| {
        let mut rest = *cursor;
        let mut last = last;
        let mut previous = None::<TokenTree>;
        let mut generics = 0usize;

        while let Some((tree, next)) = rest.token_tree() {
            let new_line = tree.span().start().line > last.end().line;
            let after_dot = matches!(&previous, Some(TokenTree::Punct(p)) if p.as_char() == '.');

            if !after_dot && starts_member(rest, new_line) {
                break;
            }

            match &tree {
                TokenTree::Punct(p) if stop == Stop::Initializer && p.as_char() == ',' && generics == 0 => {
                    break;
                }
                TokenTree::Group(group)
                    if stop == Stop::Initializer
                        && group.delimiter() == Delimiter::Brace
                        && rest
                            .group(Delimiter::Brace)
                            .is_some_and(|(content, _, _)| starts_with_observer(content)) =>
                {
                    break;
                }
                // `Dictionary<String, Int>()` rather than a comparison.
                TokenTree::Punct(p)
                    if p.as_char() == '<'
                        && matches!(&previous, Some(TokenTree::Ident(_)))
                        && tree.span().start() == last.end() =>
                {
                    generics += 1;
                }
                TokenTree::Punct(p)
                    if p.as_char() == '>'
                        && generics > 0
                        && !matches!(&previous, Some(TokenTree::Punct(q)) if q.as_char() == '-') =>
                {
                    generics -= 1;
                }
                _ => {}
            }

            let is_body = matches!(&tree, TokenTree::Group(group) if group.delimiter() == Delimiter::Brace);

            last = tree.span();
            previous = Some(tree);
            rest = next;

            if stop == Stop::Body && is_body {
                break;
            }
        }

        Ok((last, rest))
    })
}

/// Whether the token at `cursor` begins a new member. Modifiers, attributes and directives only
/// count at the start of a line, since they also appear inside declarations.
fn starts_member(cursor: Cursor, new_line: bool) -> bool {
    if let Some((ident, _)) = cursor.ident() {
        let word = ident.to_string();
        return DECL_KEYWORDS.contains(&word.as_str()) || (new_line && is_modifier(&word));
    }

    if let Some((punct, _)) = cursor.punct() {
        return match punct.as_char() {
            ';' => true,
            '@' | '#' => new_line,
            _ => false,
        };
    }

    false
}
