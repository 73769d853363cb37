pub mod ast;
pub mod lex;
mod parse;

pub use parse::parse;

use crate::diag::Error;
use crate::source::SourceFile;
use std::sync::Arc;

pub fn parse_source(file: &Arc<SourceFile>) -> Result<Vec<ast::Definition>, Error> {
  let tokens = lex::Lexer::new(file).tokenize();
  parse(&tokens)
}
