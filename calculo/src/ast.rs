//! Source locations for parsed input

/// Span representing a location in source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span) -> Self {
        let (line, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// A zero-width span at a byte offset of single-line input
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
            line: 1,
            col: offset + 1,
        }
    }
}
