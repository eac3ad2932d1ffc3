use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vecalc::ast::printer;
use vecalc::error::{Interrupt, Signal};
use vecalc::interpreter::Interpreter;
use vecalc::{parser, repl, scanner};

#[derive(Parser, Debug)]
#[command(name = "vecalc", version, about = "An interactive calculator for scalars and vectors")]
struct Cli {
    /// Script to run line by line (omit for REPL)
    file: Option<PathBuf>,

    /// Evaluate a single line and exit
    #[arg(long, short, value_name = "EXPR", conflicts_with = "file")]
    eval: Option<String>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Do not print the banner when starting the REPL
    #[arg(long)]
    no_banner: bool,

    /// Log evaluation details to stderr
    #[arg(long, short)]
    verbose: bool,
}

/// The input lines named on the command line: the `--eval` text, or every
/// non-blank, non-comment line of FILE.
fn read_lines(cli: &Cli) -> Result<Vec<String>> {
    if let Some(ref text) = cli.eval {
        return Ok(vec![text.trim().to_string()]);
    }
    match &cli.file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read script '{}'", path.display()))?;
            Ok(source
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from)
                .collect())
        }
        None => bail!("a script file or --eval is required for this operation"),
    }
}

fn report_error(err: Interrupt) -> anyhow::Error {
    match err {
        Interrupt::Compile(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            anyhow::anyhow!("compilation failed")
        }
        other => anyhow::anyhow!("{other}"),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.dump_tokens {
        for line in read_lines(&cli)? {
            let tokens = scanner::scan(&line).map_err(|e| {
                report_error(e.with_source_code("input", line.as_str()).into())
            })?;
            for token in &tokens {
                println!("{token}");
            }
        }
        return Ok(());
    }

    if cli.dump_ast {
        for line in read_lines(&cli)? {
            let expr = parser::parse_source(&line).map_err(report_error)?;
            match cli.ast_format.as_str() {
                "json" => println!("{}", printer::to_json(&expr)),
                _ => println!("{}", printer::to_sexp(&expr)),
            }
        }
        return Ok(());
    }

    if let Some(ref text) = cli.eval {
        let mut interpreter = Interpreter::new();
        return match interpreter.interpret_line(text.trim()) {
            Ok(Some(value)) => {
                println!("{value}");
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => match e.signal() {
                Some(Signal::Help) => {
                    println!("{}", repl::HELP_TEXT);
                    Ok(())
                }
                Some(Signal::Exit | Signal::Clear) => Ok(()),
                None => Err(report_error(e)),
            },
        };
    }

    match cli.file {
        Some(ref path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read script '{}'", path.display()))?;
            let mut interpreter = Interpreter::new();
            let failures = repl::run_script(&mut interpreter, &source, &mut std::io::stdout())
                .context("write script output")?;
            if failures > 0 {
                bail!("{failures} line(s) failed");
            }
            Ok(())
        }
        None => repl::run_repl(!cli.no_banner).context("line editor failed"),
    }
}
