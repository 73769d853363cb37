use crate::ebnf::ast::{Node, RuleKind, Term};
use crate::grammar::Grammar;
use crate::source::SourceRange;
use crate::Map;
use std::fmt;
use std::hash::Hash;

pub trait BnfBuilder {
  type Symbol: Copy + Eq + Hash;

  fn make_terminal(&mut self, node: &dyn Node) -> Self::Symbol;

  fn make_nonterminal(&mut self, node: &dyn Node) -> Self::Symbol;

  fn set_start_symbol(&mut self, sym: Self::Symbol);

  fn add_rule(&mut self, lhs: Self::Symbol, rhs: Vec<Self::Symbol>, node: &dyn Node);
}

pub fn lower<B: BnfBuilder>(grammar: &Grammar, builder: &mut B) {
  let mut lowering = Lowering {
    grammar,
    builder,
    memo: Map::new(),
  };

  for def in grammar.defs() {
    if def.kind != RuleKind::Plain {
      continue;
    }
    let lhs = lowering.lower_term(&Term::Sym(def.lhs.clone()));
    for alt in &def.alts.alts {
      let rhs = alt
        .terms
        .iter()
        .map(|term| lowering.lower_term(term))
        .collect();
      lowering.builder.add_rule(lhs, rhs, alt);
    }
  }

  let start = lowering.lower_term(&Term::Sym(grammar.start().clone()));
  lowering.builder.set_start_symbol(start);
}

struct Lowering<'g, B: BnfBuilder> {
  grammar: &'g Grammar,
  builder: &'g mut B,
  memo: Map<Term, B::Symbol>,
}

impl<'g, B: BnfBuilder> Lowering<'g, B> {
  fn lower_term(&mut self, term: &Term) -> B::Symbol {
    if let Some(&sym) = self.memo.get(term) {
      return sym;
    }

    match term {
      Term::Sym(s) => {
        let sym = if self.grammar.is_nonterminal(&s.name) {
          self.builder.make_nonterminal(s)
        } else {
          self.builder.make_terminal(s)
        };
        self.memo.insert(term.clone(), sym);
        sym
      }
      Term::Literal { .. } | Term::Regexp { .. } => {
        let sym = self.builder.make_terminal(term);
        self.memo.insert(term.clone(), sym);
        sym
      }
      Term::Group(alts) => {
        let sym = self.builder.make_nonterminal(term);
        // registered before lowering the alternatives
        self.memo.insert(term.clone(), sym);
        for alt in &alts.alts {
          let rhs = alt
            .terms
            .iter()
            .map(|inner| self.lower_term(inner))
            .collect();
          self.builder.add_rule(sym, rhs, alt);
        }
        sym
      }
      Term::Quantified {
        term: inner,
        quantifier,
        ..
      } => {
        let sym = self.builder.make_nonterminal(term);
        self.memo.insert(term.clone(), sym);

        if quantifier.allows_empty() {
          self.builder.add_rule(sym, vec![], term);
        }
        let inner_sym = self.lower_term(inner);
        if quantifier.allows_one() {
          self.builder.add_rule(sym, vec![inner_sym], term);
        }
        if quantifier.allows_many() {
          self.builder.add_rule(sym, vec![sym, inner_sym], term);
        }
        sym
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BnfSymbol(u32);

impl BnfSymbol {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone)]
pub struct BnfSymbolInfo {
  pub name: String,
  pub terminal: bool,
  pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct BnfRule {
  pub lhs: BnfSymbol,
  pub rhs: Vec<BnfSymbol>,
  pub range: SourceRange,
}

impl BnfRule {
  pub fn fmt(&self, grammar: &BnfGrammar, f: &mut impl fmt::Write) -> fmt::Result {
    write!(f, "{} ->", grammar.name(self.lhs))?;
    for &sym in &self.rhs {
      write!(f, " {}", grammar.name(sym))?;
    }
    Ok(())
  }

  pub fn to_string(&self, grammar: &BnfGrammar) -> String {
    let mut buf = String::new();
    self.fmt(grammar, &mut buf).unwrap();
    buf
  }
}

#[derive(Debug, Clone, Default)]
pub struct BnfGrammar {
  symbols: Vec<BnfSymbolInfo>,
  rules: Vec<BnfRule>,
  start: Option<BnfSymbol>,
}

impl BnfGrammar {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn symbols(&self) -> &[BnfSymbolInfo] {
    &self.symbols
  }

  pub fn rules(&self) -> &[BnfRule] {
    &self.rules
  }

  pub fn start(&self) -> Option<BnfSymbol> {
    self.start
  }

  pub fn name(&self, sym: BnfSymbol) -> &str {
    &self.symbols[sym.index()].name
  }

  pub fn is_terminal(&self, sym: BnfSymbol) -> bool {
    self.symbols[sym.index()].terminal
  }

  pub fn symbol_range(&self, sym: BnfSymbol) -> &SourceRange {
    &self.symbols[sym.index()].range
  }

  pub fn rule_range(&self, rule: usize) -> &SourceRange {
    &self.rules[rule].range
  }

  fn make(&mut self, node: &dyn Node, terminal: bool) -> BnfSymbol {
    self.symbols.push(BnfSymbolInfo {
      name: node.bnf_symbol_name(),
      terminal,
      range: node.range(),
    });
    BnfSymbol(self.symbols.len() as u32 - 1)
  }
}

impl BnfBuilder for BnfGrammar {
  type Symbol = BnfSymbol;

  fn make_terminal(&mut self, node: &dyn Node) -> BnfSymbol {
    self.make(node, true)
  }

  fn make_nonterminal(&mut self, node: &dyn Node) -> BnfSymbol {
    self.make(node, false)
  }

  fn set_start_symbol(&mut self, sym: BnfSymbol) {
    self.start = Some(sym);
  }

  fn add_rule(&mut self, lhs: BnfSymbol, rhs: Vec<BnfSymbol>, node: &dyn Node) {
    self.rules.push(BnfRule {
      lhs,
      rhs,
      range: node.range(),
    });
  }
}

impl fmt::Display for BnfGrammar {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for rule in &self.rules {
      rule.fmt(self, f)?;
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Grammar {
  pub fn lower(&self) -> BnfGrammar {
    let mut bnf = BnfGrammar::new();
    lower(self, &mut bnf);
    bnf
  }
}
