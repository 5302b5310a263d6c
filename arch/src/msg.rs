use crate::error::{Error, Loc};
use color_print::ceprintln;

#[derive(Debug)]
pub enum Msg {
    Error(String),
    Warn(String),
    Note(String),
}

impl Msg {
    pub fn print(&self) {
        match self {
            Msg::Error(msg) => ceprintln!("<red,bold>error</>: {}", msg),
            Msg::Warn(msg) => ceprintln!("<yellow,bold>warn</>: {}", msg),
            Msg::Note(msg) => ceprintln!("<green,bold>note</>: {}", msg),
        }
    }

    /// Print with the offending source line underneath.
    pub fn diag(&self, file: &str, line: usize, raw: &str) {
        self.print();
        ceprintln!("     <blue>--></> <underline>{}:{}</>", file, line);
        ceprintln!("      <blue>|</>");
        ceprintln!(" <blue>{:>4} |</> {}", line, raw);
        ceprintln!("      <blue>|</>");
    }
}

impl From<&Error> for Msg {
    fn from(err: &Error) -> Self {
        let mut text = format!("[{}] {}", err.kind(), err);
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            text.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        if err.is_warning() {
            Msg::Warn(text)
        } else {
            Msg::Error(text)
        }
    }
}

/// Report an error that has no source text to point at.
pub fn report(err: &Error) {
    Msg::from(err).print();
}

/// Report an error found while reading `source` from `file`.
pub fn report_in(err: &Error, file: &str, source: &str) {
    match err.loc() {
        Some(Loc::Line(line)) => {
            let raw = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
            Msg::from(err).diag(file, line, raw);
        }
        _ => {
            Msg::from(err).print();
            Msg::Note(format!("in {}", file)).print();
        }
    }
}
