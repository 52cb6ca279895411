//! Ether interpreter command-line.
//!
//! When called without file arguments it drops into an interactive read-evaluate-print loop.
//!
//! When called with files, it interprets them in a single interpreter session, so later files
//! see the globals of earlier ones.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{self, Context};
use clap::Parser;
use tracing::debug;

use ether::{EtherError, Interpreter, Value, DEFAULT_MAX_CALL_DEPTH};

#[derive(Parser, Debug)]
#[command(name = "ether", version, about = "Run Ether programs")]
struct Args {
    /// Source files, run in order in one session
    files: Vec<PathBuf>,

    /// Run SOURCE after the files instead of starting the REPL
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Nesting limit for function calls
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Log interpreter activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            let code = e.downcast_ref::<EtherError>().map_or(1, EtherError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// Log to stderr when RUST_LOG is set, or at debug level with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("ether=debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn run(args: &Args) -> Result<(), anyhow::Error> {
    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout).with_max_call_depth(args.max_call_depth);

    for p in &args.files {
        let source =
            fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))?;
        debug!(path = %p.display(), "running file");
        interp
            .eval(&source)
            .with_context(|| format!("in {}", p.display()))?;
    }

    if let Some(source) = &args.eval {
        let val = interp.eval(source)?;
        if val != Value::Null {
            println!("{}", val);
        }
    } else if args.files.is_empty() {
        run_prompt(&mut interp)?;
    }

    Ok(())
}

fn run_prompt<W: Write>(interp: &mut Interpreter<'_, W>) -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"~> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        repl_line(interp, &input, &mut repl_stdout)?;
    }

    Ok(())
}

/// Evaluate one REPL line, echoing its value unless null, or the error.  Errors in the line
/// do not end the session.
fn repl_line<W: Write, O: Write>(
    interp: &mut Interpreter<'_, W>,
    line: &str,
    out: &mut O,
) -> Result<(), io::Error> {
    match interp.eval(line) {
        Ok(Value::Null) => Ok(()),
        Ok(val) => writeln!(out, "{}", val),
        Err(e) => writeln!(out, "{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(lines: &[&str]) -> Result<(String, String), io::Error> {
        let mut program_out: Vec<u8> = Vec::new();
        let mut repl_out: Vec<u8> = Vec::new();
        {
            let mut interp = Interpreter::new(&mut program_out);
            for line in lines {
                repl_line(&mut interp, line, &mut repl_out)?;
            }
        }
        Ok((
            String::from_utf8(repl_out).expect("utf8"),
            String::from_utf8(program_out).expect("utf8"),
        ))
    }

    #[test]
    fn null_results_print_nothing() -> Result<(), io::Error> {
        let (repl, program) = session(&["var a = 1;", "if (false) { 1; }", "puts(a);"])?;
        assert_eq!(repl, "");
        assert_eq!(program, "1\n");
        Ok(())
    }

    #[test]
    fn values_are_echoed() -> Result<(), io::Error> {
        let (repl, _) = session(&["1 + 2", "[1, 2] -> map(|x| { x * 10 })"])?;
        assert_eq!(repl, "3\n[10, 20]\n");
        Ok(())
    }

    #[test]
    fn errors_are_printed_and_session_continues() -> Result<(), io::Error> {
        let (repl, _) = session(&["var a = 2;", "a / 0;", "var = 1;", "a * 21"])?;
        assert_eq!(
            repl,
            "runtime error: line 1: division by zero\n\
             parse error: line 1: expected identifier, found '='\n\
             42\n"
        );
        Ok(())
    }
}
