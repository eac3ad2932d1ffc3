use std::io::{self, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Interrupt, Signal};
use crate::interpreter::Interpreter;

pub const PROMPT: &str = "$ ";
pub const OUTPUT_PREFIX: &str = ">> ";
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub const HELP_TEXT: &str = "\
HELP
Assign variable:    $ 'name' = 'expression'
End program:        $ quit | $ close | $ end | $ exit
Clear screen:       $ clear | $ cls
Last result:        $ ans
Create vector:      vec('x' 'y' 'z' ...) | ['x' 'y' 'z' ...] | vec('x';'y';'z';...) | ['x';'y';'z';...]

Operator:
\tAdd:        '+'
\tSubtract:   '-'
\tMultiply:   '*'
\tDivide:     '/' | ':'
\tPower:      '^'
\tRoot:       '\\'
\tAbsolute:   '?' | '|x|'";

pub fn banner() -> String {
    format!("VECTOR {}", env!("CARGO_PKG_VERSION"))
}

/// What happened to one line of input.
#[derive(Debug)]
pub enum LineOutcome {
    /// A value was printed, or the line was an assignment.
    Done,
    Failed(Interrupt),
    Signal(Signal),
}

/// Execute one trimmed, non-empty line and print its value.
/// Errors and signals are handed back to the host for presentation;
/// nothing is written for them here.
pub fn eval_line(
    interpreter: &mut Interpreter,
    line: &str,
    out: &mut impl Write,
) -> io::Result<LineOutcome> {
    match interpreter.interpret_line(line) {
        Ok(Some(value)) => {
            writeln!(out, "{OUTPUT_PREFIX}{value}")?;
            Ok(LineOutcome::Done)
        }
        Ok(None) => Ok(LineOutcome::Done),
        Err(Interrupt::Signal(signal)) => {
            tracing::debug!(%signal, "session signal");
            Ok(LineOutcome::Signal(signal))
        }
        Err(e) => Ok(LineOutcome::Failed(e)),
    }
}

/// Run the interactive REPL. Bindings persist across lines.
pub fn run_repl(show_banner: bool) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();
    let mut stdout = io::stdout();

    if show_banner {
        println!("{}", banner());
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => return Err(e),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        editor.add_history_entry(trimmed)?;

        match eval_line(&mut interpreter, trimmed, &mut stdout)? {
            LineOutcome::Done => {}
            LineOutcome::Failed(Interrupt::Compile(e)) => {
                eprintln!("{:?}", miette::Report::new(e));
            }
            LineOutcome::Failed(e) => println!("{OUTPUT_PREFIX}{e}"),
            LineOutcome::Signal(Signal::Exit) => {
                println!();
                break;
            }
            LineOutcome::Signal(Signal::Help) => println!("{HELP_TEXT}"),
            LineOutcome::Signal(Signal::Clear) => {
                print!("{CLEAR_SCREEN}");
                stdout.flush()?;
            }
        }
    }

    Ok(())
}

/// Evaluate a script line by line in one session and return how many lines
/// failed. `#` starts a comment line. `quit` stops the script, `help` prints
/// the help text and `clear` does nothing.
pub fn run_script(
    interpreter: &mut Interpreter,
    source: &str,
    out: &mut impl Write,
) -> io::Result<usize> {
    let mut failures = 0;

    for (number, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match eval_line(interpreter, trimmed, out)? {
            LineOutcome::Done => {}
            LineOutcome::Failed(e) => {
                failures += 1;
                writeln!(out, "{OUTPUT_PREFIX}{e}")?;
                let detail = match &e {
                    Interrupt::Runtime(e) => e.display_with_column(trimmed),
                    other => other.to_string(),
                };
                tracing::debug!(line = number + 1, "{detail}");
            }
            LineOutcome::Signal(Signal::Exit) => break,
            LineOutcome::Signal(Signal::Help) => writeln!(out, "{HELP_TEXT}")?,
            LineOutcome::Signal(Signal::Clear) => {}
        }
    }

    Ok(failures)
}
