//! Rewrites a source file by running every registered annotation over its declarations.

use buildable::{
    Attribute, Decl, Diagnostics, Expansion, Marker, SetterDecl, Span, Transformer,
    lower::DEFAULT_INDENT_UNIT,
};

use crate::{
    parse::{ParseError, parse},
    source::SourceFile,
};

/// How far expansion goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    /// Only propagate markers from container annotations to their members.
    Markers,
    /// Propagate markers, then synthesise setters for every tracked property.
    #[default]
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandOptions {
    pub stage: Stage,
    /// Indentation unit of generated function bodies.
    pub indent: String,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            stage: Stage::default(),
            indent: DEFAULT_INDENT_UNIT.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expanded {
    /// Rewritten source text.
    pub source: String,
    /// Everything reported while expanding. Declarations they refer to are left untouched.
    pub diagnostics: Diagnostics,
}

/// Expand every annotation in `source`.
pub fn expand(source: &SourceFile, options: &ExpandOptions) -> Result<Expanded, ParseError> {
    let decls = parse(source)?;

    let mut expander = Expander {
        source,
        options,
        edits: Vec::new(),
        diagnostics: Diagnostics::new(),
    };

    for decl in &decls {
        expander.visit(decl);
    }

    log::debug!(
        "{}: {} edit(s), {} diagnostic(s)",
        source.name(),
        expander.edits.len(),
        expander.diagnostics.len()
    );

    Ok(expander.finish())
}

/// Replacement of a span of the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

impl Edit {
    fn insert(at: usize, text: String) -> Self {
        Self {
            span: Span::new(at, at),
            text,
        }
    }

    fn remove(span: Span) -> Self {
        Self {
            span,
            text: String::new(),
        }
    }
}

struct Expander<'a> {
    source: &'a SourceFile,
    options: &'a ExpandOptions,
    edits: Vec<Edit>,
    diagnostics: Diagnostics,
}

impl Expander<'_> {
    fn visit(&mut self, decl: &Decl) {
        let mut edits = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut propagation = None;

        for attribute in decl.attributes() {
            let Some(transformer) = Transformer::for_attribute(attribute) else {
                continue;
            };

            if self.options.stage == Stage::Markers && transformer != Transformer::Propagate {
                continue;
            }

            let Some(expansion) = diagnostics.absorb(transformer.expand(attribute, decl)) else {
                continue;
            };

            edits.push(self.consume(attribute));

            match expansion {
                Expansion::Markers(markers) => propagation = Some(markers),
                Expansion::Peers(peers) => edits.extend(self.peers(decl, &peers)),
                Expansion::None => {}
            }
        }

        if diagnostics.is_empty() {
            self.edits.extend(edits);
        } else {
            log::debug!(
                "leaving declaration at {}..{} unchanged",
                decl.span().start,
                decl.span().end
            );
            self.diagnostics.extend(diagnostics);
            propagation = None;
        }

        let Decl::Container(container) = decl else {
            return;
        };

        for (index, member) in container.members.iter().enumerate() {
            if let Some(marker) = propagation
                .as_ref()
                .and_then(|propagation| propagation.decision(index).marker())
            {
                self.propagated(member, marker);
            }

            self.visit(member);
        }
    }

    /// Apply a marker decided on by the container rather than written on the member.
    fn propagated(&mut self, member: &Decl, marker: Marker) {
        match (self.options.stage, marker) {
            (Stage::Markers, _) => {
                let edit = self.attach(member, marker);
                self.edits.push(edit);
            }
            (Stage::Full, Marker::Tracked) => {
                let attribute = Attribute::synthetic(marker);

                match Transformer::Synthesize.expand(&attribute, member) {
                    Ok(Expansion::Peers(peers)) => {
                        let edit = self.peers(member, &peers);
                        self.edits.extend(edit);
                    }
                    Ok(_) => {}
                    Err(diagnostics) => self.diagnostics.extend(diagnostics),
                }
            }
            (Stage::Full, Marker::Ignored) => {}
        }
    }

    /// Write `marker` in front of `member`, on its own line if the member starts its line.
    fn attach(&self, member: &Decl, marker: Marker) -> Edit {
        let start = member.span().start;

        let text = if self.source.starts_line(start) {
            format!("@{}\n{}", marker.name(), self.source.indentation(start))
        } else {
            format!("@{} ", marker.name())
        };

        Edit::insert(start, text)
    }

    /// Remove `attribute`, along with its line if nothing else is written on it.
    fn consume(&self, attribute: &Attribute) -> Edit {
        let Span { start, end } = attribute.span;
        let text = self.source.text();

        if self.source.starts_line(start) && self.source.ends_line(end) {
            let line_end = self.source.line_end(end);
            let next_line = (line_end + 1).min(text.len());

            return Edit::remove(Span::new(self.source.line_start(start), next_line));
        }

        let rest = &text[end..];
        let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();

        Edit::remove(Span::new(start, end + trailing))
    }

    /// Insert `peers` after `decl`, each preceded by a blank line.
    fn peers(&self, decl: &Decl, peers: &[SetterDecl]) -> Option<Edit> {
        if peers.is_empty() {
            return None;
        }

        let span = decl.span();
        let indent = self.source.indentation(span.start);

        let mut text = String::new();
        for peer in peers {
            text.push_str("\n\n");
            text.push_str(&peer.render(indent, &self.options.indent));
        }

        let line_end = self.source.line_end(span.end);
        let rest = self.source.text()[span.end..line_end].trim_start();

        if rest.is_empty() || rest.starts_with("//") {
            Some(Edit::insert(line_end, text))
        } else {
            // Whatever follows on the line moves onto its own.
            text.push('\n');
            text.push_str(indent);
            Some(Edit::insert(span.end, text))
        }
    }

    fn finish(self) -> Expanded {
        Expanded {
            source: apply(self.source.text(), self.edits),
            diagnostics: self.diagnostics,
        }
    }
}

/// Apply `edits` to `text`. Edits overlapping an earlier one are dropped.
fn apply(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for edit in edits {
        if edit.span.start < cursor {
            log::warn!(
                "dropping edit at {}..{} overlapping an earlier edit",
                edit.span.start,
                edit.span.end
            );
            continue;
        }

        out.push_str(&text[cursor..edit.span.start]);
        out.push_str(&edit.text);
        cursor = edit.span.end;
    }

    out.push_str(&text[cursor..]);

    out
}
