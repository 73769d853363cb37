use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug)]
pub struct SourceFile {
  url: String,
  text: String,
  first_line: u32,
  line_starts: Vec<usize>,
}

static NONE_FILE: Lazy<Arc<SourceFile>> = Lazy::new(|| {
  Arc::new(SourceFile {
    url: "none".to_owned(),
    text: String::new(),
    first_line: 1,
    line_starts: vec![0],
  })
});

impl SourceFile {
  pub fn new(url: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
    Self::with_first_line(url, text, 1)
  }

  pub fn with_first_line(
    url: impl Into<String>,
    text: impl Into<String>,
    first_line: u32,
  ) -> Arc<Self> {
    let text = text.into();
    let mut line_starts = vec![0];
    for (i, c) in text.char_indices() {
      if c == '\n' {
        line_starts.push(i + 1);
      }
    }

    Arc::new(Self {
      url: url.into(),
      text,
      first_line,
      line_starts,
    })
  }

  pub fn none() -> Arc<Self> {
    NONE_FILE.clone()
  }

  pub fn is_none(&self) -> bool {
    self.url == "none" && self.text.is_empty()
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn line_col(&self, index: usize) -> (u32, u32) {
    let line = self.line_starts.partition_point(|&start| start <= index) - 1;
    let col = self.text[self.line_starts[line]..index].chars().count() + 1;
    (self.first_line + line as u32, col as u32)
  }

  pub fn index_of(&self, line: u32, col: u32) -> usize {
    let line = (line - self.first_line) as usize;
    let start = self.line_starts[line];
    self.text[start..]
      .char_indices()
      .nth(col as usize - 1)
      .map(|(i, _)| start + i)
      .unwrap_or_else(|| {
        self
          .line_starts
          .get(line + 1)
          .copied()
          .unwrap_or(self.text.len())
      })
  }
}

impl PartialEq for SourceFile {
  fn eq(&self, other: &Self) -> bool {
    self.url == other.url
  }
}

impl Eq for SourceFile {}

impl Hash for SourceFile {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.url.hash(state);
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
  pub file: Arc<SourceFile>,
  pub index: usize,
}

impl SourcePosition {
  pub fn new(file: Arc<SourceFile>, index: usize) -> Self {
    Self { file, index }
  }

  pub fn line_col(&self) -> (u32, u32) {
    self.file.line_col(self.index)
  }
}

impl PartialOrd for SourcePosition {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for SourcePosition {
  fn cmp(&self, other: &Self) -> Ordering {
    debug_assert_eq!(self.file, other.file, "positions in different files");
    self.index.cmp(&other.index)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRange {
  pub file: Arc<SourceFile>,
  pub start: usize,
  pub end: usize,
}

impl SourceRange {
  pub fn new(file: Arc<SourceFile>, start: usize, end: usize) -> Self {
    debug_assert!(start <= end);
    Self { file, start, end }
  }

  pub fn none() -> Self {
    Self {
      file: SourceFile::none(),
      start: 0,
      end: 0,
    }
  }

  pub fn is_none(&self) -> bool {
    self.file.is_none()
  }

  pub fn start_pos(&self) -> SourcePosition {
    SourcePosition::new(self.file.clone(), self.start)
  }

  pub fn end_pos(&self) -> SourcePosition {
    SourcePosition::new(self.file.clone(), self.end)
  }

  pub fn same_file(&self, other: &SourceRange) -> bool {
    self.file == other.file
  }

  pub fn text(&self) -> &str {
    &self.file.text()[self.start..self.end]
  }

  pub fn contains(&self, pos: &SourcePosition) -> bool {
    self.file == pos.file && self.start <= pos.index && pos.index < self.end
  }

  pub fn contains_range(&self, other: &SourceRange) -> bool {
    self.file == other.file && self.start <= other.start && other.end <= self.end
  }

  pub fn extend(&self, other: &SourceRange) -> SourceRange {
    if self.is_none() {
      return other.clone();
    }
    if other.is_none() {
      return self.clone();
    }

    debug_assert!(self.same_file(other), "ranges in different files");
    SourceRange {
      file: self.file.clone(),
      start: self.start.min(other.start),
      end: self.end.max(other.end),
    }
  }
}

impl fmt::Display for SourceRange {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.is_none() {
      return write!(f, "none");
    }

    let (line, col) = self.file.line_col(self.start);
    let (end_line, end_col) = self.file.line_col(self.end);
    write!(f, "{}:{}.{}", self.file.url(), line, col)?;
    if self.end > self.start {
      if end_line == line {
        write!(f, "-{}", end_col)?;
      } else {
        write!(f, "-{}.{}", end_line, end_col)?;
      }
    }
    Ok(())
  }
}
