use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::diag::ErrorLog;

pub fn emit(
  log: &ErrorLog,
  writer: &mut impl WriteColor,
) -> Result<(), codespan_reporting::files::Error> {
  let config = term::Config::default();

  for err in log.sorted() {
    let file = SimpleFile::new(err.range.file.url().to_owned(), err.range.file.text().to_owned());

    let mut labels = vec![Label::primary((), err.range.start..err.range.end)
      .with_message(&err.message)];
    for note in &err.notes {
      if note.range.file == err.range.file && !note.range.is_none() {
        labels.push(Label::secondary((), note.range.start..note.range.end)
          .with_message(&note.message));
      }
    }

    let diagnostic = Diagnostic::error()
      .with_message(&err.message)
      .with_labels(labels);

    term::emit(writer, &config, &file, &diagnostic)?;
  }

  Ok(())
}

pub fn eprint(log: &ErrorLog) {
  let writer = StandardStream::stderr(ColorChoice::Auto);
  emit(log, &mut writer.lock()).unwrap();
}
