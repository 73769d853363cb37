use crate::ebnf::ast::{Alternative, RuleKind, Term};
use crate::grammar::Grammar;
use crate::{Map, Set};
use itertools::Itertools;

pub const UNRECOGNIZED_TERMINAL: &str = "<unrecognized>";

// longest match wins; literals beat patterns on equal length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerDescription {
  pub literals: Set<String>,
  pub patterns: Vec<(String, String)>,
  pub unrecognized: &'static str,
}

impl Grammar {
  pub fn regexps(&self) -> Map<String, String> {
    let mut patterns = Map::new();
    for def in self.defs() {
      if def.kind == RuleKind::Plain {
        continue;
      }
      patterns.insert(def.lhs.name.clone(), self.encode_def(&def.lhs.name));
    }
    patterns
  }

  pub fn scanner_description(&self) -> ScannerDescription {
    ScannerDescription {
      literals: self.literals(),
      patterns: self.regexps().into_iter().collect(),
      unrecognized: UNRECOGNIZED_TERMINAL,
    }
  }

  fn encode_def(&self, name: &str) -> String {
    let def = match self.get(name) {
      Some(def) => def,
      None => unreachable!("encoding an undefined symbol"),
    };

    match def.kind {
      RuleKind::Regexp => {
        let patterns = def
          .alts
          .alts
          .iter()
          .flat_map(|alt| &alt.terms)
          .filter_map(|term| match term {
            Term::Regexp { pattern, .. } => Some(pattern.as_str()),
            _ => None,
          })
          .collect::<Vec<_>>();
        if patterns.len() == 1 {
          patterns[0].to_owned()
        } else {
          format!("(?:{})", patterns.iter().join("|"))
        }
      }
      RuleKind::OneOf => {
        let lits = def
          .alts
          .alts
          .iter()
          .flat_map(|alt| &alt.terms)
          .filter_map(|term| match term {
            Term::Literal { text, .. } => Some(regex_quote(text)),
            _ => None,
          })
          .join("|");
        format!("(?:{})", lits)
      }
      RuleKind::Token => {
        let alts = def
          .alts
          .alts
          .iter()
          .map(|alt| self.encode_alt(alt))
          .collect::<Vec<_>>();
        if alts.len() == 1 {
          alts.into_iter().next().unwrap()
        } else {
          format!("(?:{})", alts.join("|"))
        }
      }
      RuleKind::Plain => unreachable!("encoding a plain rule"),
    }
  }

  fn encode_alt(&self, alt: &Alternative) -> String {
    alt.terms.iter().map(|term| self.encode_term(term)).join("")
  }

  fn encode_term(&self, term: &Term) -> String {
    match term {
      Term::Literal { text, .. } => regex_quote(text),
      Term::Regexp { pattern, .. } => pattern.clone(),
      Term::Sym(sym) => {
        let encoded = self.encode_def(&sym.name);
        match self.get(&sym.name).map(|def| def.kind) {
          // a raw pattern may carry top-level alternation
          Some(RuleKind::Regexp) if !is_atomic(&encoded) => format!("(?:{})", encoded),
          _ => encoded,
        }
      }
      Term::Group(alts) => {
        format!(
          "(?:{})",
          alts.alts.iter().map(|alt| self.encode_alt(alt)).join("|")
        )
      }
      Term::Quantified {
        term, quantifier, ..
      } => {
        let inner = self.encode_term(term);
        if is_atomic(&inner) {
          format!("{}{}", inner, quantifier.as_char())
        } else {
          format!("(?:{}){}", inner, quantifier.as_char())
        }
      }
    }
  }
}

pub fn regex_quote(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(
      c,
      '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    ) {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

// must never say yes to a pattern a quantifier would split
fn is_atomic(pattern: &str) -> bool {
  let count = pattern.chars().count();
  if count == 1 {
    return true;
  }
  if count == 2 && pattern.starts_with('\\') {
    return true;
  }
  if !pattern.starts_with("(?:") || !pattern.ends_with(')') {
    return false;
  }

  let mut depth = 0usize;
  let mut escaped = false;
  for (i, c) in pattern.char_indices() {
    if escaped {
      escaped = false;
      continue;
    }
    match c {
      '\\' => escaped = true,
      '(' => depth += 1,
      ')' => {
        depth -= 1;
        if depth == 0 {
          return i == pattern.len() - 1;
        }
      }
      _ => {}
    }
  }

  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ebnf;
  use crate::source::SourceFile;
  use pretty_assertions::assert_eq;

  fn grammar_of(input: &str) -> Grammar {
    let file = SourceFile::new("g.ebnf", input);
    let defs = ebnf::parse_source(&file).unwrap();
    Grammar::new(defs, "start").unwrap()
  }

  #[test]
  fn literal_only_grammar_has_no_patterns() {
    let desc = grammar_of("start ::=\n  'a'\n").scanner_description();

    assert_eq!(desc.literals.into_iter().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(desc.patterns, vec![]);
    assert_eq!(desc.unrecognized, UNRECOGNIZED_TERMINAL);
  }

  #[test]
  fn token_rule_expands_one_of_references_inline() {
    let desc = grammar_of(
      "start ::=\n  a\n  b\na ::= (token)\n  'x' b\nb ::= (one of)\n  y z\n",
    )
    .scanner_description();

    assert_eq!(
      desc.literals.into_iter().collect::<Vec<_>>(),
      vec!["x", "y", "z"]
    );
    assert_eq!(
      desc.patterns,
      vec![
        ("a".to_owned(), "x(?:y|z)".to_owned()),
        ("b".to_owned(), "(?:y|z)".to_owned()),
      ]
    );
  }

  #[test]
  fn one_of_literals_are_regex_quoted() {
    let desc = grammar_of("start ::=\n  op\nop ::= (one of)\n  + * ( ?\n").scanner_description();

    assert_eq!(
      desc.patterns,
      vec![("op".to_owned(), r"(?:\+|\*|\(|\?)".to_owned())]
    );
  }

  #[test]
  fn quantifiers_apply_outside_their_operand() {
    let grammar = grammar_of(
      "start ::=\n  num\nnum ::= (token)\n  digit+ ('.' digit+)?\ndigit ::= (one of)\n  0 1\n",
    );

    assert_eq!(
      grammar.regexps().get("num").unwrap(),
      r"(?:0|1)+(?:\.(?:0|1)+)?"
    );
  }

  #[test]
  fn multi_character_literal_is_grouped_before_a_quantifier() {
    let grammar = grammar_of("start ::=\n  t\nt ::= (token)\n  'ab'*\n");

    assert_eq!(grammar.regexps().get("t").unwrap(), "(?:ab)*");
  }

  #[test]
  fn token_alternatives_join_in_one_group() {
    let grammar = grammar_of("start ::=\n  t\nt ::= (token)\n  'a' 'b'\n  'c'\n");

    assert_eq!(grammar.regexps().get("t").unwrap(), "(?:ab|c)");
  }

  #[test]
  fn regexp_rule_passes_through_and_joins_lines() {
    let grammar = grammar_of(
      "start ::=\n  id num\nid ::= (regexp)\n  [a-z]+\nnum ::= (regexp)\n  0\n  [1-9][0-9]*\n",
    );

    let patterns = grammar.regexps();
    assert_eq!(patterns.get("id").unwrap(), "[a-z]+");
    assert_eq!(patterns.get("num").unwrap(), "(?:0|[1-9][0-9]*)");
  }

  #[test]
  fn every_pattern_and_quoted_literal_compiles() {
    let grammar = grammar_of(
      "start ::=\n  num str '.' '++'\nnum ::= (token)\n  digit+ ('.' digit+)?\ndigit ::= (one of)\n  0 1 2 3 4 5 6 7 8 9\nstr ::= (regexp)\n  \"[^\"]*\"\n",
    );
    let desc = grammar.scanner_description();

    for (_, pattern) in &desc.patterns {
      regex::Regex::new(pattern).unwrap();
    }
    for lit in &desc.literals {
      regex::Regex::new(&regex_quote(lit)).unwrap();
    }
  }

  #[test]
  fn deterministic_description() {
    let input = "start ::=\n  a b\na ::= (token)\n  'x'+\nb ::= (one of)\n  p q\n";
    assert_eq!(
      grammar_of(input).scanner_description(),
      grammar_of(input).scanner_description()
    );
  }
}
