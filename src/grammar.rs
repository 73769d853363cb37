pub mod lower;
pub mod scanner;

use crate::diag::{Error, ErrorKind, ErrorLog};
use crate::ebnf::ast::{Definition, Node, RuleKind, Symbol, Term};
use crate::source::SourceRange;
use crate::{Map, Set};
use bit_set::BitSet;

#[derive(Debug)]
pub struct Grammar {
  defs: Vec<Definition>,
  by_lhs: Map<String, usize>,
  start: Symbol,
}

impl Grammar {
  pub fn new(defs: Vec<Definition>, start: &str) -> Result<Grammar, ErrorLog> {
    let mut log = ErrorLog::new();

    let mut by_lhs: Map<String, usize> = Map::new();
    for (i, def) in defs.iter().enumerate() {
      if let Some(&first) = by_lhs.get(&def.lhs.name) {
        log.add(
          Error::new(
            ErrorKind::DuplicateDefinition,
            format!("duplicate definition of `{}`", def.lhs.name),
            def.lhs.range(),
          )
          .with_note("first defined here", defs[first].lhs.range()),
        );
      } else {
        by_lhs.insert(def.lhs.name.clone(), i);
      }
    }

    let Some(&start_ix) = by_lhs.get(start) else {
      log.add(Error::new(
        ErrorKind::UndefinedSymbol,
        format!("start symbol `{}` is not defined", start),
        SourceRange::none(),
      ));
      return Err(log);
    };

    for def in &defs {
      if def.kind == RuleKind::Regexp {
        continue;
      }
      each_symbol(def, &mut |sym| {
        if !by_lhs.contains_key(&sym.name) {
          log.add(Error::new(
            ErrorKind::UndefinedSymbol,
            format!("undefined symbol `{}`", sym.name),
            sym.range(),
          ));
        }
      });
    }

    let reachable = reachable_defs(&defs, &by_lhs, start_ix);
    for (i, def) in defs.iter().enumerate() {
      if by_lhs.get(&def.lhs.name) != Some(&i) {
        continue; // shadowed duplicate, already reported
      }
      if !reachable.contains(i) {
        log.add(Error::new(
          ErrorKind::UnreachableSymbol,
          format!("symbol `{}` is not reachable from `{}`", def.lhs.name, start),
          def.lhs.range(),
        ));
      }
    }

    for (i, def) in defs.iter().enumerate() {
      if !is_token_kind(def.kind) || by_lhs.get(&def.lhs.name) != Some(&i) {
        continue;
      }
      if token_graph_reaches_self(&defs, &by_lhs, i) {
        log.add(Error::new(
          ErrorKind::RecursiveTokenRule,
          format!("recursive token rule `{}`", def.lhs.name),
          def.lhs.range(),
        ));
      }
    }

    for (i, def) in defs.iter().enumerate() {
      if def.kind != RuleKind::Token || by_lhs.get(&def.lhs.name) != Some(&i) {
        continue;
      }
      each_symbol(def, &mut |sym| {
        if let Some(&j) = by_lhs.get(&sym.name) {
          if defs[j].kind == RuleKind::Plain {
            log.add(Error::new(
              ErrorKind::TokenReference,
              format!(
                "token rule `{}` references non-token rule `{}`",
                def.lhs.name, sym.name
              ),
              sym.range(),
            ));
          }
        }
      });
    }

    if !log.is_empty() {
      return Err(log);
    }

    let start = defs[start_ix].lhs.clone();
    Ok(Grammar {
      defs,
      by_lhs,
      start,
    })
  }

  pub fn defs(&self) -> &[Definition] {
    &self.defs
  }

  pub fn get(&self, name: &str) -> Option<&Definition> {
    self.by_lhs.get(name).map(|&i| &self.defs[i])
  }

  pub fn start(&self) -> &Symbol {
    &self.start
  }

  pub fn is_nonterminal(&self, name: &str) -> bool {
    matches!(self.get(name), Some(def) if def.kind == RuleKind::Plain)
  }

  pub fn nonterminals(&self) -> Set<&str> {
    self
      .defs
      .iter()
      .filter(|def| def.kind == RuleKind::Plain)
      .map(|def| def.lhs.name.as_str())
      .collect()
  }

  pub fn literals(&self) -> Set<String> {
    let mut literals = Set::new();
    for def in &self.defs {
      each_term(def, &mut |term| {
        if let Term::Literal { text, .. } = term {
          literals.insert(text.clone());
        }
      });
    }
    literals
  }
}

pub(crate) fn is_token_kind(kind: RuleKind) -> bool {
  matches!(kind, RuleKind::Token | RuleKind::OneOf)
}

pub(crate) fn each_term<'d>(def: &'d Definition, f: &mut impl FnMut(&'d Term)) {
  for alt in &def.alts.alts {
    each_term_in(&alt.terms, f);
  }
}

fn each_term_in<'d>(terms: &'d [Term], f: &mut impl FnMut(&'d Term)) {
  for term in terms {
    f(term);
    match term {
      Term::Group(alts) => {
        for alt in &alts.alts {
          each_term_in(&alt.terms, f);
        }
      }
      Term::Quantified { term, .. } => each_term_in(std::slice::from_ref(term), f),
      Term::Sym(_) | Term::Literal { .. } | Term::Regexp { .. } => {}
    }
  }
}

pub(crate) fn each_symbol<'d>(def: &'d Definition, f: &mut impl FnMut(&'d Symbol)) {
  each_term(def, &mut |term| {
    if let Term::Sym(sym) = term {
      f(sym);
    }
  });
}

fn reachable_defs(defs: &[Definition], by_lhs: &Map<String, usize>, start_ix: usize) -> BitSet {
  let mut reachable = BitSet::with_capacity(defs.len());
  let mut stack = vec![start_ix];

  while let Some(i) = stack.pop() {
    if !reachable.insert(i) {
      continue;
    }
    each_symbol(&defs[i], &mut |sym| {
      if let Some(&j) = by_lhs.get(&sym.name) {
        stack.push(j);
      }
    });
  }

  reachable
}

fn token_graph_reaches_self(
  defs: &[Definition],
  by_lhs: &Map<String, usize>,
  start_ix: usize,
) -> bool {
  let successors = |i: usize, out: &mut Vec<usize>| {
    each_symbol(&defs[i], &mut |sym| {
      if let Some(&j) = by_lhs.get(&sym.name) {
        if is_token_kind(defs[j].kind) {
          out.push(j);
        }
      }
    });
  };

  let mut visited = BitSet::with_capacity(defs.len());
  let mut stack = vec![];
  successors(start_ix, &mut stack);

  while let Some(i) = stack.pop() {
    if i == start_ix {
      return true;
    }
    if visited.insert(i) {
      successors(i, &mut stack);
    }
  }

  false
}
