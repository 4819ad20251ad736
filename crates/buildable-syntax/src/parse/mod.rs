//! Parser for the declaration language annotations are written in.
//!
//! Source text is tokenised with [`proc_macro2`], which is close enough to the declaration
//! language that only a handful of constructs (backtick identifiers, string interpolation, key
//! paths) fail to lex. The token stream is then parsed with [`syn`]'s parsing infrastructure.

mod attr;
mod decl;
mod ty;

use buildable::{Decl, Marker, Span};
use proc_macro2::{Delimiter, Group, Ident, Punct, Spacing, TokenStream, TokenTree};
use syn::{
    ext::IdentExt,
    parse::{ParseStream, Parser},
};
use thiserror::Error;

use crate::source::SourceFile;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unable to tokenise source: {message}")]
    Lex { message: String, span: Span },
    #[error("{message}")]
    Syntax { message: String, span: Span },
    #[error("declaration cannot be both @BuildableTracked and @BuildableIgnored")]
    ConflictingMarkers { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            Self::Lex { span, .. } | Self::Syntax { span, .. } | Self::ConflictingMarkers { span } => {
                *span
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "lex",
            Self::Syntax { .. } => "syntax",
            Self::ConflictingMarkers { .. } => "conflictingMarkers",
        }
    }
}

/// Parse every top-level declaration of `source`.
pub fn parse(source: &SourceFile) -> Result<Vec<Decl>, ParseError> {
    let tokens = source
        .text()
        .parse::<TokenStream>()
        .map_err(|error| ParseError::Lex {
            message: error.to_string(),
            span: source.span(error.span(), error.span()),
        })?;

    let ctx = Ctx { source };

    let decls = (|input: ParseStream| decl::members(input, &ctx))
        .parse2(tokens)
        .map_err(|error| ParseError::Syntax {
            message: error.to_string(),
            span: source.span(error.span(), error.span()),
        })?;

    check_markers(&decls)?;

    log::debug!("parsed {} top-level declaration(s) from {}", decls.len(), source.name());

    Ok(decls)
}

fn check_markers(decls: &[Decl]) -> Result<(), ParseError> {
    for decl in decls {
        let markers = decl
            .attributes()
            .iter()
            .filter_map(|attribute| attribute.marker())
            .collect::<Vec<_>>();

        if markers.contains(&Marker::Tracked) && markers.contains(&Marker::Ignored) {
            return Err(ParseError::ConflictingMarkers { span: decl.span() });
        }

        if let Decl::Container(container) = decl {
            check_markers(&container.members)?;
        }
    }

    Ok(())
}

/// State shared by every parser function.
pub(crate) struct Ctx<'a> {
    pub source: &'a SourceFile,
}

impl Ctx<'_> {
    pub fn span(&self, first: proc_macro2::Span, last: proc_macro2::Span) -> Span {
        self.source.span(first, last)
    }

    pub fn text(&self, first: proc_macro2::Span, last: proc_macro2::Span) -> &str {
        self.source.slice(self.span(first, last))
    }
}

pub(crate) fn peek_keyword(input: ParseStream, keyword: &str) -> bool {
    input.cursor().ident().is_some_and(|(ident, _)| ident == keyword)
}

pub(crate) fn peek_punct(input: ParseStream, ch: char) -> bool {
    input
        .cursor()
        .punct()
        .is_some_and(|(punct, _)| punct.as_char() == ch)
}

pub(crate) fn peek_group(input: ParseStream, delimiter: Delimiter) -> bool {
    input.cursor().group(delimiter).is_some()
}

/// `->`
pub(crate) fn peek_arrow(input: ParseStream) -> bool {
    match input.cursor().punct() {
        Some((minus, rest)) if minus.as_char() == '-' && minus.spacing() == Spacing::Joint => rest
            .punct()
            .is_some_and(|(gt, _)| gt.as_char() == '>'),
        _ => false,
    }
}

/// Whether the next token starts exactly where `last` ends.
pub(crate) fn adjacent(input: ParseStream, last: proc_macro2::Span) -> bool {
    !input.is_empty() && input.span().start() == last.end()
}

pub(crate) fn any_ident(input: ParseStream) -> syn::Result<Ident> {
    Ident::parse_any(input)
}

pub(crate) fn keyword(input: ParseStream, keyword: &str) -> syn::Result<Ident> {
    input.step(|cursor| match cursor.ident() {
        Some((ident, rest)) if ident == keyword => Ok((ident, rest)),
        _ => Err(cursor.error(format!("expected `{keyword}`"))),
    })
}

pub(crate) fn punct(input: ParseStream, ch: char) -> syn::Result<Punct> {
    input.step(|cursor| match cursor.punct() {
        Some((punct, rest)) if punct.as_char() == ch => Ok((punct, rest)),
        _ => Err(cursor.error(format!("expected `{ch}`"))),
    })
}

pub(crate) fn group(input: ParseStream, delimiter: Delimiter) -> syn::Result<Group> {
    input.step(|cursor| match cursor.token_tree() {
        Some((TokenTree::Group(group), rest)) if group.delimiter() == delimiter => {
            Ok((group, rest))
        }
        _ => Err(cursor.error(match delimiter {
            Delimiter::Parenthesis => "expected `(`",
            Delimiter::Brace => "expected `{`",
            Delimiter::Bracket => "expected `[`",
            Delimiter::None => "expected group",
        })),
    })
}

pub(crate) fn token_tree(input: ParseStream) -> syn::Result<TokenTree> {
    input.parse()
}

/// Run `parser` over the contents of `group`, requiring every token to be consumed.
pub(crate) fn within<T>(
    group: &Group,
    parser: impl FnOnce(ParseStream) -> syn::Result<T>,
) -> syn::Result<T> {
    parser.parse2(group.stream())
}
