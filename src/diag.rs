use crate::source::SourceRange;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Syntax,
  DuplicateDefinition,
  UndefinedSymbol,
  UnreachableSymbol,
  RecursiveTokenRule,
  IllegalCharacter,
  TokenReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
  pub message: String,
  pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct Error {
  pub kind: ErrorKind,
  pub message: String,
  pub range: SourceRange,
  pub notes: Vec<Note>,
}

impl Error {
  pub fn new(kind: ErrorKind, message: impl Into<String>, range: SourceRange) -> Self {
    Self {
      kind,
      message: message.into(),
      range,
      notes: vec![],
    }
  }

  pub fn with_note(mut self, message: impl Into<String>, range: SourceRange) -> Self {
    self.notes.push(Note {
      message: message.into(),
      range,
    });
    self
  }
}

// messages and ranges only; the kind follows from the message
impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    self.message == other.message && self.range == other.range && self.notes == other.notes
  }
}

impl Eq for Error {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
  errors: Vec<Error>,
}

impl ErrorLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, error: Error) {
    if !self.errors.contains(&error) {
      self.errors.push(error);
    }
  }

  pub fn errors(&self) -> &[Error] {
    &self.errors
  }

  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn len(&self) -> usize {
    self.errors.len()
  }

  pub fn sorted(&self) -> Vec<&Error> {
    let mut errors = self.errors.iter().collect::<Vec<_>>();
    errors.sort_by_key(|err| (err.range.file.url().to_owned(), err.range.start));
    errors
  }

  pub fn report(&self) -> String {
    let mut buf = String::new();

    for err in self.sorted() {
      if !buf.is_empty() {
        buf.push('\n');
      }
      buf.push_str(&format!("{}: error: {}", err.range, err.message));

      for (i, note) in err.notes.iter().enumerate() {
        let (line, col) = note.range.file.line_col(note.range.start);
        buf.push_str(&format!(
          "\n{}:{}.{}: note({}): {}",
          note.range.file.url(),
          line,
          col,
          i + 1,
          note.message
        ));
      }
    }

    buf
  }
}

impl fmt::Display for ErrorLog {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.report())
  }
}
