use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use crate::common::source::Source;

/// A region of a `Source`, used to point at the offending text in
/// diagnostics. Two `Span`s can only be combined if they share a `Source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    source: Option<Rc<Source>>,
    offset: usize,
    length: usize,
}

impl Span {
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span { source: Some(Rc::clone(source)), offset, length }
    }

    /// A zero-width span pointing at a single offset, used for EOF and
    /// point-like diagnostics.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span { source: Some(Rc::clone(source)), offset, length: 1 }
    }

    pub fn empty() -> Span {
        Span { source: None, offset: 0, length: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    /// The smallest span that contains both `a` and `b`.
    pub fn combine(a: &Span, b: &Span) -> Span {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }
        if a.source != b.source {
            panic!("can't combine two spans from different sources");
        }

        let offset = a.offset.min(b.offset);
        let end = (a.offset + a.length).max(b.offset + b.length);
        Span { source: a.source.clone(), offset, length: end - offset }
    }

    pub fn contents(&self) -> &str {
        let source = self.source.as_ref().expect("an empty span has no contents");
        &source.contents[self.offset..self.offset + self.length]
    }

    fn line_col(&self, offset: usize) -> (usize, usize) {
        let source = self.source.as_ref().unwrap();
        let up_to = &source.contents[..offset.min(source.contents.len())];
        let line = up_to.matches('\n').count();
        let col = match up_to.rfind('\n') {
            Some(i) => offset - i - 1,
            None => offset,
        };
        (line, col)
    }
}

impl Display for Span {
    /// Renders a single-line gutter with a caret underline, e.g.
    /// ```plain
    /// Line 1:5
    ///   |
    /// 1 | ln(exp(x) - 2)
    ///   |     ^^^
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<no location>");
        }
        let source = self.source.as_ref().unwrap();
        let (line, col) = self.line_col(self.offset);
        let text = source.contents.lines().nth(line).unwrap_or("");
        let line_no = (line + 1).to_string();
        let padding = " ".repeat(line_no.len());

        writeln!(f, "Line {}:{}", line + 1, col + 1)?;
        writeln!(f, "{} |", padding)?;
        writeln!(f, "{} | {}", line_no, text)?;
        write!(
            f,
            "{} | {}{}",
            padding,
            " ".repeat(col),
            "^".repeat(self.length.max(1))
        )
    }
}

/// Pairs a value with the span of source it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(item: T, span: Span) -> Spanned<T> {
        Spanned { item, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned { item: f(self.item), span: self.span }
    }
}
