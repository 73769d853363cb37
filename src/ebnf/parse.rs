use crate::diag::{Error, ErrorKind};
use crate::ebnf::ast::{
  Alternative, AlternativeList, Definition, Node, Origin, Quantifier, RuleKind, Symbol, Term,
};
use crate::ebnf::lex::{Token, TokenKind};
use crate::source::SourceRange;

type Result<T> = std::result::Result<T, Error>;

pub fn parse(tokens: &[Token]) -> Result<Vec<Definition>> {
  Parser { tokens, pos: 0 }.parse_document()
}

struct Parser<'a, 'b> {
  tokens: &'b [Token<'a>],
  pos: usize,
}

impl<'a, 'b> Parser<'a, 'b> {
  fn parse_document(mut self) -> Result<Vec<Definition>> {
    let mut defs = vec![];
    while self.pos < self.tokens.len() {
      defs.push(self.parse_rule()?);
    }
    Ok(defs)
  }

  fn parse_rule(&mut self) -> Result<Definition> {
    let lhs_tok = self.expect(TokenKind::Lhs, &["rule name"])?;
    let lhs = Symbol::new(lhs_tok.text, lhs_tok.range().clone());
    self.expect(TokenKind::IsDefinedAs, &["'::='"])?;

    let kind = match self.peek_kind() {
      Some(TokenKind::OneOfAnnot) => {
        self.bump();
        return self.parse_one_of_rule(lhs);
      }
      Some(TokenKind::TokenAnnot) => {
        self.bump();
        RuleKind::Token
      }
      Some(TokenKind::RegexpAnnot) => {
        self.bump();
        RuleKind::Regexp
      }
      _ => RuleKind::Plain,
    };

    let mut alts = vec![];
    loop {
      if self.peek_kind() == Some(TokenKind::Regexp) {
        let tok = self.bump();
        alts.push(Alternative {
          terms: vec![Term::Regexp {
            pattern: tok.text.to_owned(),
            origin: tok.origin.clone(),
          }],
          origin: tok.origin.clone(),
        });
      } else {
        alts.push(self.parse_rhs_line()?);
      }

      match self.peek_kind() {
        None | Some(TokenKind::Lhs) => break,
        _ => {}
      }
    }

    Ok(self.make_definition(kind, lhs, alts))
  }

  fn parse_one_of_rule(&mut self, lhs: Symbol) -> Result<Definition> {
    let mut alts = vec![];

    let first = self.expect(TokenKind::Literal, &["literal"])?;
    alts.push(one_of_alternative(first));
    while self.peek_kind() == Some(TokenKind::Literal) {
      let tok = self.bump();
      alts.push(one_of_alternative(tok));
    }

    Ok(self.make_definition(RuleKind::OneOf, lhs, alts))
  }

  fn make_definition(
    &self,
    kind: RuleKind,
    lhs: Symbol,
    alts: Vec<Alternative>,
  ) -> Definition {
    let alts_range = alts
      .iter()
      .fold(SourceRange::none(), |acc, alt| acc.extend(&alt.range()));
    let origin = Origin(lhs.range().extend(&alts_range));

    Definition {
      kind,
      lhs,
      alts: AlternativeList {
        alts,
        origin: Origin(alts_range),
      },
      origin,
    }
  }

  // several alternatives on one line collapse into a single group
  fn parse_rhs_line(&mut self) -> Result<Alternative> {
    let alt_list = self.parse_alt_list()?;
    self.expect(
      TokenKind::Eol,
      &["symbol name", "quoted literal", "'('", "'|'", "end of line"],
    )?;

    let mut alts = alt_list.alts;
    if alts.len() == 1 {
      Ok(alts.pop().unwrap())
    } else {
      Ok(Alternative {
        origin: alt_list.origin.clone(),
        terms: vec![Term::Group(AlternativeList {
          alts,
          origin: alt_list.origin,
        })],
      })
    }
  }

  fn parse_alt_list(&mut self) -> Result<AlternativeList> {
    let mut alts = vec![self.parse_alt()?];
    while self.peek_kind() == Some(TokenKind::Or) {
      self.bump();
      alts.push(self.parse_alt()?);
    }

    let range = alts
      .iter()
      .fold(SourceRange::none(), |acc, alt| acc.extend(&alt.range()));
    Ok(AlternativeList {
      alts,
      origin: Origin(range),
    })
  }

  fn parse_alt(&mut self) -> Result<Alternative> {
    let mut terms = vec![];
    while self.at_term_start() {
      terms.push(self.parse_term()?);
    }

    let origin = if terms.is_empty() {
      Origin(self.point_range())
    } else {
      Origin(
        terms
          .iter()
          .fold(SourceRange::none(), |acc, term| acc.extend(&term.range())),
      )
    };

    Ok(Alternative { terms, origin })
  }

  fn parse_term(&mut self) -> Result<Term> {
    let mut term = match self.peek_kind() {
      Some(TokenKind::SymbolName) => {
        let tok = self.bump();
        Term::Sym(Symbol::new(tok.text, tok.range().clone()))
      }
      Some(TokenKind::QuotedLiteral) => {
        let tok = self.bump();
        Term::Literal {
          text: unescape(tok.text),
          origin: tok.origin.clone(),
        }
      }
      Some(TokenKind::LParen) => {
        let open = self.bump().range().clone();
        let alt_list = self.parse_alt_list()?;
        let close = self
          .expect(
            TokenKind::RParen,
            &["symbol name", "quoted literal", "'('", "'|'", "')'"],
          )?
          .range()
          .clone();
        Term::Group(AlternativeList {
          alts: alt_list.alts,
          origin: Origin(open.extend(&close)),
        })
      }
      _ => {
        return Err(self.err_expected(&["symbol name", "quoted literal", "'('"]));
      }
    };

    loop {
      let quantifier = match self.peek_kind() {
        Some(TokenKind::Star) => Quantifier::Star,
        Some(TokenKind::Plus) => Quantifier::Plus,
        Some(TokenKind::Question) => Quantifier::Question,
        _ => break,
      };
      let tok = self.bump();
      let origin = Origin(term.range().extend(tok.range()));
      term = Term::Quantified {
        term: Box::new(term),
        quantifier,
        origin,
      };
    }

    Ok(term)
  }

  fn at_term_start(&self) -> bool {
    matches!(
      self.peek_kind(),
      Some(TokenKind::SymbolName | TokenKind::QuotedLiteral | TokenKind::LParen)
    )
  }

  fn peek(&self) -> Option<&'b Token<'a>> {
    self.tokens.get(self.pos)
  }

  fn peek_kind(&self) -> Option<TokenKind> {
    self.peek().map(|tok| tok.kind)
  }

  fn bump(&mut self) -> &'b Token<'a> {
    let tok = &self.tokens[self.pos];
    self.pos += 1;
    tok
  }

  fn expect(&mut self, kind: TokenKind, expected: &[&str]) -> Result<&'b Token<'a>> {
    if self.peek_kind() == Some(kind) {
      Ok(self.bump())
    } else {
      Err(self.err_expected(expected))
    }
  }

  fn err_expected(&self, expected: &[&str]) -> Error {
    let note = format!("expected {}", expected.join(" or "));

    match self.peek() {
      Some(tok) if tok.kind == TokenKind::IllegalCharacter => {
        let range = tok.range().clone();
        Error::new(
          ErrorKind::IllegalCharacter,
          format!("illegal character `{}`", tok.text),
          range.clone(),
        )
        .with_note(note, range)
      }
      Some(tok) => {
        let range = tok.range().clone();
        Error::new(
          ErrorKind::Syntax,
          format!("syntax error: unexpected {}", tok.kind.describe()),
          range.clone(),
        )
        .with_note(note, range)
      }
      None => {
        let range = self.end_range();
        Error::new(
          ErrorKind::Syntax,
          "syntax error: unexpected end of input",
          range.clone(),
        )
        .with_note(note, range)
      }
    }
  }

  fn point_range(&self) -> SourceRange {
    match self.peek() {
      Some(tok) => {
        let range = tok.range();
        SourceRange::new(range.file.clone(), range.start, range.start)
      }
      None => self.end_range(),
    }
  }

  fn end_range(&self) -> SourceRange {
    match self.tokens.last() {
      Some(tok) => {
        let range = tok.range();
        SourceRange::new(range.file.clone(), range.end, range.end)
      }
      None => SourceRange::none(),
    }
  }
}

fn one_of_alternative(tok: &Token) -> Alternative {
  Alternative {
    terms: vec![Term::Literal {
      text: tok.text.to_owned(),
      origin: tok.origin.clone(),
    }],
    origin: tok.origin.clone(),
  }
}

fn unescape(lexeme: &str) -> String {
  let inner = &lexeme[1..lexeme.len() - 1];
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(c) = chars.next() {
        out.push(c);
      }
    } else {
      out.push(c);
    }
  }
  out
}
