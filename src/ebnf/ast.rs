use crate::source::SourceRange;
use itertools::Itertools;
use std::fmt;
use std::hash::{Hash, Hasher};

// equal by construction, so terms compare and hash by structure alone
#[derive(Debug, Clone)]
pub struct Origin(pub SourceRange);

impl Origin {
  pub fn none() -> Self {
    Origin(SourceRange::none())
  }

  pub fn range(&self) -> &SourceRange {
    &self.0
  }
}

impl From<SourceRange> for Origin {
  fn from(range: SourceRange) -> Self {
    Origin(range)
  }
}

impl PartialEq for Origin {
  fn eq(&self, _: &Self) -> bool {
    true
  }
}

impl Eq for Origin {}

impl Hash for Origin {
  fn hash<H: Hasher>(&self, _: &mut H) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
  pub origin: Origin,
}

impl Symbol {
  pub fn new(name: impl Into<String>, range: SourceRange) -> Self {
    Self {
      name: name.into(),
      origin: Origin(range),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
  Star,
  Plus,
  Question,
}

impl Quantifier {
  pub fn as_char(self) -> char {
    match self {
      Self::Star => '*',
      Self::Plus => '+',
      Self::Question => '?',
    }
  }

  pub fn allows_empty(self) -> bool {
    matches!(self, Self::Star | Self::Question)
  }

  pub fn allows_one(self) -> bool {
    matches!(self, Self::Plus | Self::Question)
  }

  pub fn allows_many(self) -> bool {
    matches!(self, Self::Star | Self::Plus)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
  Group(AlternativeList),
  Sym(Symbol),
  Literal { text: String, origin: Origin },
  Regexp { pattern: String, origin: Origin },
  Quantified {
    term: Box<Term>,
    quantifier: Quantifier,
    origin: Origin,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alternative {
  pub terms: Vec<Term>,
  pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlternativeList {
  pub alts: Vec<Alternative>,
  pub origin: Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
  Plain,
  Token,
  OneOf,
  Regexp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
  pub kind: RuleKind,
  pub lhs: Symbol,
  pub alts: AlternativeList,
  pub origin: Origin,
}

pub trait Node {
  fn range(&self) -> SourceRange;

  fn dump(&self) -> String;

  // bare symbol names stay bare, compound fragments get back-ticks
  fn bnf_symbol_name(&self) -> String {
    format!("`{}`", self.dump())
  }
}

impl Node for Symbol {
  fn range(&self) -> SourceRange {
    self.origin.0.clone()
  }

  fn dump(&self) -> String {
    self.name.clone()
  }

  fn bnf_symbol_name(&self) -> String {
    self.name.clone()
  }
}

impl Node for Term {
  fn range(&self) -> SourceRange {
    match self {
      Self::Group(alts) => alts.range(),
      Self::Sym(sym) => sym.range(),
      Self::Literal { origin, .. }
      | Self::Regexp { origin, .. }
      | Self::Quantified { origin, .. } => origin.0.clone(),
    }
  }

  fn dump(&self) -> String {
    match self {
      Self::Group(alts) => format!("({})", alts.dump()),
      Self::Sym(sym) => sym.dump(),
      Self::Literal { text, .. } => quote_literal(text),
      Self::Regexp { pattern, .. } => pattern.clone(),
      Self::Quantified { term, quantifier, .. } => {
        format!("{}{}", term.dump(), quantifier.as_char())
      }
    }
  }

  fn bnf_symbol_name(&self) -> String {
    match self {
      Self::Sym(sym) => sym.bnf_symbol_name(),
      _ => format!("`{}`", self.dump()),
    }
  }
}

impl Node for Alternative {
  fn range(&self) -> SourceRange {
    self.origin.0.clone()
  }

  fn dump(&self) -> String {
    self.terms.iter().map(Node::dump).join(" ")
  }
}

impl Node for AlternativeList {
  fn range(&self) -> SourceRange {
    self.origin.0.clone()
  }

  fn dump(&self) -> String {
    self.alts.iter().map(Node::dump).join(" | ")
  }
}

impl Node for Definition {
  fn range(&self) -> SourceRange {
    self.origin.0.clone()
  }

  fn dump(&self) -> String {
    format!("{} ::= {}", self.lhs.name, self.alts.dump())
  }
}

impl<T: Node> Node for Vec<T> {
  fn range(&self) -> SourceRange {
    self
      .iter()
      .fold(SourceRange::none(), |acc, node| acc.extend(&node.range()))
  }

  fn dump(&self) -> String {
    self.iter().map(Node::dump).join(" ")
  }
}

impl fmt::Display for Definition {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.dump())
  }
}

fn quote_literal(text: &str) -> String {
  let mut buf = String::from("'");
  for c in text.chars() {
    if c == '\'' || c == '\\' {
      buf.push('\\');
    }
    buf.push(c);
  }
  buf.push('\'');
  buf
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::SourceFile;
  use pretty_assertions::assert_eq;
  use std::collections::hash_map::DefaultHasher;

  fn hash_of(term: &Term) -> u64 {
    let mut hasher = DefaultHasher::new();
    term.hash(&mut hasher);
    hasher.finish()
  }

  fn literal(text: &str, start: usize, end: usize) -> Term {
    let file = SourceFile::new("g.ebnf", "'a' 'a' 'b'");
    Term::Literal {
      text: text.to_owned(),
      origin: Origin(SourceRange::new(file, start, end)),
    }
  }

  #[test]
  fn term_equality_ignores_ranges() {
    let a1 = literal("a", 0, 3);
    let a2 = literal("a", 4, 7);
    let b = literal("b", 8, 11);

    assert_eq!(a1, a2);
    assert_eq!(hash_of(&a1), hash_of(&a2));
    assert_ne!(a1, b);

    let q1 = Term::Quantified {
      term: Box::new(a1),
      quantifier: Quantifier::Star,
      origin: Origin::none(),
    };
    let q2 = Term::Quantified {
      term: Box::new(a2),
      quantifier: Quantifier::Star,
      origin: Origin::none(),
    };
    assert_eq!(q1, q2);
    assert_eq!(hash_of(&q1), hash_of(&q2));
  }

  #[test]
  fn dumps() {
    let a = literal("a", 0, 3);
    let sym = Term::Sym(Symbol::new("expr", SourceRange::none()));
    let quantified = Term::Quantified {
      term: Box::new(a.clone()),
      quantifier: Quantifier::Plus,
      origin: Origin::none(),
    };
    let group = Term::Group(AlternativeList {
      alts: vec![
        Alternative {
          terms: vec![a.clone(), sym.clone()],
          origin: Origin::none(),
        },
        Alternative {
          terms: vec![quantified.clone()],
          origin: Origin::none(),
        },
      ],
      origin: Origin::none(),
    });

    assert_eq!(a.dump(), "'a'");
    assert_eq!(literal("don't", 0, 0).dump(), r"'don\'t'");
    assert_eq!(sym.dump(), "expr");
    assert_eq!(quantified.dump(), "'a'+");
    assert_eq!(group.dump(), "('a' expr | 'a'+)");

    assert_eq!(sym.bnf_symbol_name(), "expr");
    assert_eq!(quantified.bnf_symbol_name(), "`'a'+`");
    assert_eq!(group.bnf_symbol_name(), "`('a' expr | 'a'+)`");
  }
}
