use buildable::Span;
use proc_macro2::LineColumn;

/// Text of a single source file, with enough bookkeeping to map token locations back to bytes.
#[derive(Clone, Debug)]
pub struct SourceFile {
    name: String,
    text: String,
    /// Byte offset at which each line begins.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();

        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.range()).unwrap_or_default()
    }

    /// Byte offset of a location reported by the lexer. Lines are 1-based, columns are 0-based and
    /// counted in characters.
    pub fn offset(&self, location: LineColumn) -> usize {
        let Some(&line_start) = self.line_starts.get(location.line.saturating_sub(1)) else {
            return self.text.len();
        };

        let line_end = self.line_end(line_start);

        self.text[line_start..line_end]
            .char_indices()
            .nth(location.column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(line_end)
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let column = self
            .text
            .get(self.line_starts[line]..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or_default();

        (line + 1, column + 1)
    }

    /// Span from the start of `first` through the end of `last`.
    pub fn span(&self, first: proc_macro2::Span, last: proc_macro2::Span) -> Span {
        Span::new(self.offset(first.start()), self.offset(last.end()))
    }

    /// Offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => self.line_starts[line],
            Err(line) => self.line_starts[line.saturating_sub(1)],
        }
    }

    /// Offset of the newline ending the line containing `offset` (or the end of the text).
    pub fn line_end(&self, offset: usize) -> usize {
        self.text[offset.min(self.text.len())..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(self.text.len())
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = &self.text[start..self.line_end(start)];

        &line[..line.len() - line.trim_start().len()]
    }

    /// Only whitespace precedes `offset` on its line.
    pub fn starts_line(&self, offset: usize) -> bool {
        self.text[self.line_start(offset)..offset]
            .chars()
            .all(char::is_whitespace)
    }

    /// Only whitespace follows `offset` on its line.
    pub fn ends_line(&self, offset: usize) -> bool {
        self.text[offset..self.line_end(offset)]
            .chars()
            .all(char::is_whitespace)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    fn source() -> SourceFile {
        SourceFile::new("Sample.swift", "struct A {\n    var é: Int\n}\n")
    }

    #[rstest]
    #[case::first(LineColumn { line: 1, column: 0 }, 0)]
    #[case::second_line(LineColumn { line: 2, column: 4 }, 15)]
    #[case::after_multibyte(LineColumn { line: 2, column: 9 }, 21)]
    #[case::past_line_end(LineColumn { line: 2, column: 80 }, 26)]
    #[case::past_file_end(LineColumn { line: 9, column: 0 }, 29)]
    fn offset(#[case] location: LineColumn, #[case] expected: usize) {
        assert_eq!(source().offset(location), expected);
    }

    #[rstest]
    #[case(0, 0, 10)]
    #[case(10, 0, 10)]
    #[case(11, 11, 26)]
    #[case(20, 11, 26)]
    #[case(27, 27, 28)]
    fn lines(#[case] offset: usize, #[case] start: usize, #[case] end: usize) {
        let source = source();
        assert_eq!(source.line_start(offset), start);
        assert_eq!(source.line_end(offset), end);
    }

    #[rstest]
    #[case::start(0, (1, 1))]
    #[case::indented(15, (2, 5))]
    #[case::after_multibyte(21, (2, 10))]
    #[case::line_start(27, (3, 1))]
    #[case::end(29, (4, 1))]
    fn line_column(#[case] offset: usize, #[case] expected: (usize, usize)) {
        assert_eq!(source().line_column(offset), expected);
    }

    #[test]
    fn indentation() {
        let source = source();

        assert_eq!(source.indentation(20), "    ");
        assert_eq!(source.indentation(3), "");
        assert!(source.starts_line(15));
        assert!(!source.starts_line(19));
        assert!(source.ends_line(26));
        assert!(!source.ends_line(25));
    }
}
