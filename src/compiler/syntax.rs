use std::fmt::{self, Display, Formatter};

use crate::common::span::Span;

/// A note attached to a `Syntax` error: a location plus an optional hint
/// about what was expected there.
#[derive(Debug, PartialEq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note {
        Note { span, hint: None }
    }

    pub fn new_with_hint(hint: &str, span: &Span) -> Note {
        Note { span: span.clone(), hint: Some(hint.to_string()) }
    }
}

/// A fatal error raised anywhere in the pipeline: lexing, reading,
/// simplification, differentiation, or approximation (spec §7). Every
/// fallible operation returns `Result<T, Syntax>`; there is no partial
/// recovery once one is raised.
#[derive(Debug, PartialEq)]
pub struct Syntax {
    pub reason: String,
    pub notes: Vec<Note>,
}

impl Syntax {
    pub fn error(reason: &str, span: &Span) -> Syntax {
        Syntax::error_with_note(reason, Note::new(span.clone()))
    }

    pub fn error_with_note(reason: &str, note: Note) -> Syntax {
        Syntax { reason: reason.to_string(), notes: vec![note] }
    }

    pub fn error_no_note(reason: &str) -> Syntax {
        Syntax { reason: reason.to_string(), notes: vec![] }
    }

    pub fn add_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }
}

impl Display for Syntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            writeln!(f, "{}", note.span)?;
            if let Some(hint) = &note.hint {
                writeln!(f, "note: {}", hint)?;
            }
        }
        write!(f, "Error: {}", self.reason)
    }
}

impl std::error::Error for Syntax {}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::common::source::Source;

    #[test]
    fn error_display() {
        let source = Source::source("ln(exp(x) - 2)");
        let error = Syntax::error("unbalanced parentheses", &Span::new(&source, 2, 1));
        let rendered = format!("{}", error);
        assert!(rendered.contains("Line 1:3"));
        assert!(rendered.contains("unbalanced parentheses"));
        let _: Rc<Source> = source;
    }
}
