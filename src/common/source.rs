use std::{fs, io, path::PathBuf, rc::Rc};

/// Some source text being compiled, plus a name for it (a file path, or
/// `<input>` for text handed in directly, e.g. through the CLI `-f` flag).
///
/// A `Source` is reference-counted because `Span`s need to outlive the
/// parsing pass that produced them without forcing the whole pipeline to
/// carry a lifetime parameter.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub name: PathBuf,
}

impl Source {
    pub fn new(contents: &str, name: &str) -> Rc<Source> {
        Rc::new(Source {
            contents: contents.to_string(),
            name: PathBuf::from(name),
        })
    }

    /// Builds a `Source` from a string with no backing file.
    pub fn source(contents: &str) -> Rc<Source> {
        Source::new(contents, "<input>")
    }

    /// Builds a `Source` by reading a file from disk.
    pub fn path(path: &PathBuf) -> io::Result<Rc<Source>> {
        let contents = fs::read_to_string(path)?;
        Ok(Rc::new(Source {
            contents,
            name: path.clone(),
        }))
    }
}
