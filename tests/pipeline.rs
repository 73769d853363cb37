use ebnfc::{build, BnfBuilder, Node, SourceFile, UNRECOGNIZED_TERMINAL};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

const CALC: &str = "\
start ::=
  expr
expr ::=
  term ('+' term | '-' term)*
term ::=
  num
  '(' expr ')'
num ::= (token)
  digit+
digit ::= (one of)
  0 1 2 3 4 5 6 7 8 9
";

#[test]
fn single_literal_grammar() {
  let file = SourceFile::new("g.ebnf", "start ::=\n  'a'\n");
  let grammar = build(&file, "start").unwrap();

  assert_eq!(grammar.lower().to_string(), "start -> `'a'`\n");
  assert_eq!(
    grammar.literals().into_iter().collect::<Vec<_>>(),
    vec!["a"]
  );
  assert!(grammar.regexps().is_empty());
}

#[test]
fn calculator_end_to_end() {
  let file = SourceFile::new("calc.ebnf", CALC);
  let grammar = build(&file, "start").unwrap();
  let bnf = grammar.lower();

  assert_snapshot!(bnf.to_string(), @r###"
  start -> expr
  `('+' term | '-' term)*` ->
  `('+' term | '-' term)` -> `'+'` term
  `('+' term | '-' term)` -> `'-'` term
  `('+' term | '-' term)*` -> `('+' term | '-' term)*` `('+' term | '-' term)`
  expr -> term `('+' term | '-' term)*`
  term -> num
  term -> `'('` expr `')'`
  "###);

  assert_eq!(bnf.name(bnf.start().unwrap()), "start");

  let desc = grammar.scanner_description();
  assert_eq!(
    desc.literals.into_iter().collect::<Vec<_>>(),
    vec!["+", "-", "(", ")", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]
  );
  assert_eq!(
    desc.patterns,
    vec![
      (
        "num".to_owned(),
        "(?:0|1|2|3|4|5|6|7|8|9)+".to_owned()
      ),
      (
        "digit".to_owned(),
        "(?:0|1|2|3|4|5|6|7|8|9)".to_owned()
      ),
    ]
  );
  assert_eq!(desc.unrecognized, UNRECOGNIZED_TERMINAL);
}

#[test]
fn provenance_survives_the_whole_pipeline() {
  let file = SourceFile::new("calc.ebnf", CALC);
  let bnf = build(&file, "start").unwrap().lower();

  for info in bnf.symbols() {
    assert!(!info.range.is_none());
  }
  for i in 0..bnf.rules().len() {
    assert!(!bnf.rule_range(i).is_none());
  }

  let group = bnf
    .symbols()
    .iter()
    .find(|info| info.name == "`('+' term | '-' term)*`")
    .unwrap();
  assert_eq!(group.range.text(), "('+' term | '-' term)*");
}

#[test]
fn validation_errors_render_in_source_order() {
  let file = SourceFile::new(
    "g.ebnf",
    "start ::=\n  a\n  dup\ndup ::=\n  'x'\ndup ::=\n  'y'\nlost ::=\n  'z'\n",
  );
  let log = build(&file, "start").unwrap_err();

  assert_snapshot!(log.report(), @r###"
  g.ebnf:2.3-4: error: undefined symbol `a`
  g.ebnf:6.1-4: error: duplicate definition of `dup`
  g.ebnf:4.1: note(1): first defined here
  g.ebnf:8.1-5: error: symbol `lost` is not reachable from `start`
  "###);
}

#[test]
fn independent_runs_are_byte_identical() {
  let run = || {
    let file = SourceFile::new("calc.ebnf", CALC);
    let grammar = build(&file, "start").unwrap();
    let bnf = grammar.lower();
    let desc = grammar.scanner_description();
    format!("{}{:?}{:?}", bnf, desc.literals, desc.patterns)
  };

  assert_eq!(run(), run());
}

#[derive(Default)]
struct Recorder {
  terminals: Vec<String>,
  nonterminals: Vec<String>,
  rules: Vec<(u32, Vec<u32>)>,
  start: Option<u32>,
  next: u32,
}

impl Recorder {
  fn fresh(&mut self) -> u32 {
    let id = self.next;
    self.next += 1;
    id
  }
}

impl BnfBuilder for Recorder {
  type Symbol = u32;

  fn make_terminal(&mut self, node: &dyn Node) -> u32 {
    self.terminals.push(node.bnf_symbol_name());
    self.fresh()
  }

  fn make_nonterminal(&mut self, node: &dyn Node) -> u32 {
    self.nonterminals.push(node.bnf_symbol_name());
    self.fresh()
  }

  fn set_start_symbol(&mut self, sym: u32) {
    self.start = Some(sym);
  }

  fn add_rule(&mut self, lhs: u32, rhs: Vec<u32>, _node: &dyn Node) {
    self.rules.push((lhs, rhs));
  }
}

#[test]
fn alternative_builders_plug_into_the_lowering() {
  let file = SourceFile::new("calc.ebnf", CALC);
  let grammar = build(&file, "start").unwrap();

  let mut recorder = Recorder::default();
  ebnfc::lower(&grammar, &mut recorder);

  let bnf = grammar.lower();
  assert_eq!(
    recorder.terminals.len() + recorder.nonterminals.len(),
    bnf.symbols().len()
  );
  assert_eq!(recorder.rules.len(), bnf.rules().len());
  assert_eq!(recorder.start, bnf.start().map(|sym| sym.index() as u32));
  assert_eq!(recorder.nonterminals[0], "start");
}
