pub mod diag;
pub mod ebnf;
pub mod grammar;
pub mod report;
pub mod source;

use std::sync::Arc;

pub use crate::diag::{Error, ErrorKind, ErrorLog, Note};
pub use crate::ebnf::ast::{
  Alternative, AlternativeList, Definition, Node, Origin, Quantifier, RuleKind, Symbol, Term,
};
pub use crate::grammar::lower::{lower, BnfBuilder, BnfGrammar, BnfRule, BnfSymbol, BnfSymbolInfo};
pub use crate::grammar::scanner::{regex_quote, ScannerDescription, UNRECOGNIZED_TERMINAL};
pub use crate::grammar::Grammar;
pub use crate::source::{SourceFile, SourcePosition, SourceRange};

// iteration order reaches the output, so no hashed maps in any profile
pub type Map<K, V> = indexmap::IndexMap<K, V>;
pub type Set<T> = indexmap::IndexSet<T>;

pub fn build(file: &Arc<SourceFile>, start: &str) -> Result<Grammar, ErrorLog> {
  let defs = ebnf::parse_source(file).map_err(|err| {
    let mut log = ErrorLog::new();
    log.add(err);
    log
  })?;

  Grammar::new(defs, start)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn build_runs_the_whole_front_end() {
    let file = SourceFile::new(
      "calc.ebnf",
      "start ::=\n  num ('+' num)*\nnum ::= (token)\n  digit+\ndigit ::= (one of)\n  0 1 2\n",
    );
    let grammar = build(&file, "start").unwrap();

    assert_eq!(grammar.start().name, "start");
    assert_eq!(grammar.defs().len(), 3);
  }

  #[test]
  fn build_surfaces_parse_errors_as_a_log() {
    let file = SourceFile::new("bad.ebnf", "start ::=\n  ((a)\n");
    let log = build(&file, "start").unwrap_err();

    assert_eq!(log.len(), 1);
    assert_eq!(log.errors()[0].kind, ErrorKind::Syntax);
  }
}
