//! Presentation of diagnostics and parse errors, either rendered for a terminal or as JSON.

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use buildable::{Diagnostic, Severity, Span};
use miette::{GraphicalReportHandler, LabeledSpan, NamedSource, SourceCode};
use serde::Serialize;

use crate::{parse::ParseError, source::SourceFile};

/// Domain of errors raised while parsing, rather than by an annotation.
pub const PARSE_DOMAIN: &str = "Parse";

/// A diagnostic or parse error, tied to the file it was raised in.
#[derive(Clone, Debug)]
pub struct Report {
    pub domain: &'static str,
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    code: String,
    source: Arc<NamedSource<String>>,
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report {}

impl miette::Diagnostic for Report {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&*self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at(
            self.span.range(),
            self.message.clone(),
        ))))
    }
}

/// Builds [`Report`]s for a single source file.
pub struct Reporter<'a> {
    source: &'a SourceFile,
    named: Arc<NamedSource<String>>,
}

impl<'a> Reporter<'a> {
    pub fn new(source: &'a SourceFile) -> Self {
        Self {
            source,
            named: Arc::new(NamedSource::new(source.name(), source.text().to_string())),
        }
    }

    pub fn diagnostic(&self, diagnostic: &Diagnostic) -> Report {
        self.build(
            diagnostic.domain(),
            diagnostic.id(),
            diagnostic.severity(),
            diagnostic.message(),
            diagnostic.anchor(),
        )
    }

    pub fn parse_error(&self, error: &ParseError) -> Report {
        self.build(
            PARSE_DOMAIN,
            error.id(),
            Severity::Error,
            error.to_string(),
            error.span(),
        )
    }

    fn build(
        &self,
        domain: &'static str,
        id: &'static str,
        severity: Severity,
        message: String,
        span: Span,
    ) -> Report {
        Report {
            domain,
            id,
            severity,
            message,
            span,
            code: format!("{domain}::{id}"),
            source: self.named.clone(),
        }
    }

    /// Render `reports` with source snippets, one after another.
    pub fn human(&self, reports: &[Report]) -> Result<String, fmt::Error> {
        let handler = GraphicalReportHandler::new();
        let mut out = String::new();

        for report in reports {
            handler.render_report(&mut out, report)?;
        }

        Ok(out)
    }

    /// Render `reports` as a JSON array.
    pub fn json(&self, reports: &[Report]) -> serde_json::Result<String> {
        let reports = reports
            .iter()
            .map(|report| JsonReport {
                file: self.source.name(),
                domain: report.domain,
                id: report.id,
                severity: report.severity.to_string(),
                message: &report.message,
                start: self.location(report.span.start),
                end: self.location(report.span.end),
                text: self.source.slice(report.span),
            })
            .collect::<Vec<_>>();

        serde_json::to_string_pretty(&reports)
    }

    fn location(&self, offset: usize) -> Location {
        let (line, column) = self.source.line_column(offset);

        Location {
            offset,
            line,
            column,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    domain: &'static str,
    id: &'static str,
    severity: String,
    message: &'a str,
    start: Location,
    end: Location,
    /// Source text the report is anchored at.
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Location {
    offset: usize,
    line: usize,
    column: usize,
}
