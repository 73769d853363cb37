use crate::ebnf::ast::Origin;
use crate::source::{SourceFile, SourceRange};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Lhs,
  IsDefinedAs,
  Eol,
  Or,
  Star,
  Plus,
  Question,
  LParen,
  RParen,
  SymbolName,
  QuotedLiteral,
  Literal,
  Regexp,
  OneOfAnnot,
  TokenAnnot,
  RegexpAnnot,
  IllegalCharacter,
}

impl TokenKind {
  pub fn describe(self) -> &'static str {
    match self {
      Self::Lhs => "rule name",
      Self::IsDefinedAs => "'::='",
      Self::Eol => "end of line",
      Self::Or => "'|'",
      Self::Star => "'*'",
      Self::Plus => "'+'",
      Self::Question => "'?'",
      Self::LParen => "'('",
      Self::RParen => "')'",
      Self::SymbolName => "symbol name",
      Self::QuotedLiteral => "quoted literal",
      Self::Literal => "literal",
      Self::Regexp => "regular expression",
      Self::OneOfAnnot => "'(one of)'",
      Self::TokenAnnot => "'(token)'",
      Self::RegexpAnnot => "'(regexp)'",
      Self::IllegalCharacter => "illegal character",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str,
  pub origin: Origin,
}

impl<'a> Token<'a> {
  pub fn range(&self) -> &SourceRange {
    self.origin.range()
  }
}

#[derive(Debug, Clone, Copy)]
enum BodyMode {
  Plain,
  Token,
  OneOf,
  Regexp,
}

enum LineStart {
  Eof,
  Blank,
  Header,
  Body,
}

const ANNOTATIONS: [(&str, TokenKind, BodyMode); 3] = [
  ("(one of)", TokenKind::OneOfAnnot, BodyMode::OneOf),
  ("(token)", TokenKind::TokenAnnot, BodyMode::Token),
  ("(regexp)", TokenKind::RegexpAnnot, BodyMode::Regexp),
];

pub struct Lexer<'a> {
  file: &'a Arc<SourceFile>,
  text: &'a str,
  pos: usize,
  tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
  pub fn new(file: &'a Arc<SourceFile>) -> Self {
    Self {
      file,
      text: file.text(),
      pos: 0,
      tokens: vec![],
    }
  }

  pub fn tokenize(mut self) -> Vec<Token<'a>> {
    loop {
      while let Some(c) = self.peek() {
        if !c.is_whitespace() {
          break;
        }
        self.bump();
      }

      let Some(c) = self.peek() else { break };

      if c.is_alphabetic() {
        match self.lex_header() {
          BodyMode::OneOf => self.lex_one_of_body(),
          BodyMode::Regexp => self.lex_regexp_body(),
          BodyMode::Plain | BodyMode::Token => self.lex_plain_body(),
        }
      } else {
        let start = self.pos;
        self.bump();
        self.emit(TokenKind::IllegalCharacter, start, self.pos);
      }
    }

    self.tokens
  }

  fn lex_header(&mut self) -> BodyMode {
    self.lex_symbol_name(TokenKind::Lhs);

    let mut mode = BodyMode::Plain;
    let mut seen_assign = false;
    let mut seen_annotation = false;

    loop {
      self.skip_hws();
      match self.peek() {
        None => return mode,
        Some('\n') => {
          self.bump();
          return mode;
        }
        Some(_) => {}
      }

      if !seen_assign && self.rest().starts_with("::=") {
        let start = self.pos;
        self.pos += 3;
        self.emit(TokenKind::IsDefinedAs, start, self.pos);
        seen_assign = true;
        continue;
      }

      if seen_assign && !seen_annotation {
        if let Some((text, kind, annot_mode)) = ANNOTATIONS
          .iter()
          .copied()
          .find(|(text, _, _)| self.rest().starts_with(*text))
        {
          let start = self.pos;
          self.pos += text.len();
          self.emit(kind, start, self.pos);
          seen_annotation = true;
          mode = annot_mode;
          continue;
        }
      }

      let start = self.pos;
      self.bump();
      self.emit(TokenKind::IllegalCharacter, start, self.pos);
    }
  }

  fn lex_plain_body(&mut self) {
    loop {
      match self.classify_line() {
        LineStart::Eof | LineStart::Header => return,
        LineStart::Blank => self.consume_blank_line(),
        LineStart::Body => self.lex_body_line(),
      }
    }
  }

  fn lex_body_line(&mut self) {
    loop {
      self.skip_hws();
      match self.peek() {
        None => {
          self.emit(TokenKind::Eol, self.text.len(), self.text.len());
          return;
        }
        Some('\n') => {
          let start = self.pos;
          self.bump();
          self.emit(TokenKind::Eol, start, self.pos);
          return;
        }
        Some('\'') => self.lex_quoted_literal(),
        Some(c) if c.is_alphabetic() => self.lex_symbol_name(TokenKind::SymbolName),
        Some(c) => {
          let kind = match c {
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '|' => TokenKind::Or,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '?' => TokenKind::Question,
            _ => TokenKind::IllegalCharacter,
          };
          let start = self.pos;
          self.bump();
          self.emit(kind, start, self.pos);
        }
      }
    }
  }

  // a one-of body ends at the first blank line, not only at a header
  fn lex_one_of_body(&mut self) {
    loop {
      match self.classify_line() {
        LineStart::Eof | LineStart::Header => return,
        LineStart::Blank => {
          self.consume_blank_line();
          return;
        }
        LineStart::Body => loop {
          self.skip_hws();
          match self.peek() {
            None => break,
            Some('\n') => {
              self.bump();
              break;
            }
            Some(_) => {
              let start = self.pos;
              while let Some(c) = self.peek() {
                if c.is_whitespace() {
                  break;
                }
                self.bump();
              }
              self.emit(TokenKind::Literal, start, self.pos);
            }
          }
        },
      }
    }
  }

  fn lex_regexp_body(&mut self) {
    loop {
      match self.classify_line() {
        LineStart::Eof | LineStart::Header => return,
        LineStart::Blank => self.consume_blank_line(),
        LineStart::Body => {
          self.skip_hws();
          let start = self.pos;
          while let Some(c) = self.peek() {
            if c == '\n' {
              break;
            }
            self.bump();
          }
          let end = start + self.text[start..self.pos].trim_end().len();
          self.emit(TokenKind::Regexp, start, end);
          if self.peek() == Some('\n') {
            self.bump();
          }
        }
      }
    }
  }

  fn lex_quoted_literal(&mut self) {
    let start = self.pos;
    self.bump();

    loop {
      match self.peek() {
        None | Some('\n') => {
          // unclosed: re-lex from just after the opening quote
          self.pos = start;
          self.bump();
          self.emit(TokenKind::IllegalCharacter, start, self.pos);
          return;
        }
        Some('\'') => {
          self.bump();
          self.emit(TokenKind::QuotedLiteral, start, self.pos);
          return;
        }
        Some('\\') => {
          self.bump();
          if !matches!(self.peek(), None | Some('\n')) {
            self.bump();
          }
        }
        Some(_) => {
          self.bump();
        }
      }
    }
  }

  fn lex_symbol_name(&mut self, kind: TokenKind) {
    let start = self.pos;
    self.bump();
    while let Some(c) = self.peek() {
      if c.is_alphanumeric() || c == '-' || c == '_' {
        self.bump();
      } else {
        break;
      }
    }
    self.emit(kind, start, self.pos);
  }

  fn classify_line(&self) -> LineStart {
    let mut chars = self.rest().chars();
    match chars.next() {
      None => LineStart::Eof,
      Some('\n') => LineStart::Blank,
      Some(' ') | Some('\t') | Some('\r') => {
        for c in chars {
          match c {
            ' ' | '\t' | '\r' => {}
            '\n' => return LineStart::Blank,
            _ => return LineStart::Body,
          }
        }
        LineStart::Blank
      }
      Some(_) => LineStart::Header,
    }
  }

  fn consume_blank_line(&mut self) {
    self.skip_hws();
    if self.peek() == Some('\n') {
      self.bump();
    }
  }

  fn skip_hws(&mut self) {
    while let Some(' ' | '\t' | '\r') = self.peek() {
      self.bump();
    }
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn bump(&mut self) {
    if let Some(c) = self.peek() {
      self.pos += c.len_utf8();
    }
  }

  fn rest(&self) -> &'a str {
    &self.text[self.pos..]
  }

  fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
    self.tokens.push(Token {
      kind,
      text: &self.text[start..end],
      origin: Origin(SourceRange::new(self.file.clone(), start, end)),
    });
  }
}
