use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use yoshi::config;
use yoshi::Interpreter;

/// A small tail-call-preserving Scheme interpreter.
#[derive(Parser, Debug)]
#[command(name = "yoshi")]
#[command(version = config::VERSION)]
#[command(about = "A small tail-call-preserving Scheme interpreter")]
struct CliArgs {
    /// Script files to evaluate, in order, before any interactive input.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Enter the REPL even when script files were given.
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Print every expression entering the evaluator.
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Suppress printing of top-level results (errors still print).
    #[arg(short = 's', long = "silent")]
    silent: bool,

    /// Skip loading the startup library.
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn main() {
    let args = CliArgs::parse();
    let mut interp = Interpreter::new(args.debug);

    if !args.no_stdlib {
        if let Err(e) = interp.load_stdlib() {
            eprintln!("error loading {}: {}", config::STDLIB_PATH, e);
            std::process::exit(1);
        }
    }

    for path in &args.files {
        match std::fs::read_to_string(path) {
            Ok(source) => run_source(&mut interp, &source, args.silent),
            Err(e) => eprintln!("error: cannot read {}: {}", path.display(), e),
        }
    }

    let should_repl = args.interactive || args.files.is_empty();
    if should_repl {
        run_repl(&mut interp, args.silent);
    }
}

/// Evaluate every top-level form in `source`, printing `error: <message>`
/// and moving on to the next form on failure — a bad form in a file does
/// not abort the rest of the file.
fn run_source(interp: &mut Interpreter, source: &str, silent: bool) {
    if let Err(e) = yoshi::reader::check_fatal_bytes(source) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    let mut reader = yoshi::reader::Reader::new(source);
    loop {
        let form = match reader.read(&mut interp.gc) {
            Ok(Some(form)) => form,
            Ok(None) => break,
            Err(e) => {
                println!("error: {e}");
                break;
            }
        };
        let outcome = yoshi::expander::expand(&mut interp.gc, form)
            .and_then(|expanded| interp.evaluator.eval(&mut interp.gc, expanded, interp.top_level));
        match outcome {
            Ok(value) => {
                if !silent {
                    println!("{}", value.stringify(&interp.gc));
                }
            }
            Err(e) => println!("error: {e}"),
        }
        interp.gc.collect();
    }
}

fn run_repl(interp: &mut Interpreter, silent: bool) {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match DefaultEditor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("error: failed to initialize REPL: {e}");
            std::process::exit(1);
        }
    };
    let history_file = ".yoshi_history";
    let _ = rl.load_history(history_file);

    println!("{}", config::WELCOME_MESSAGE);

    loop {
        match rl.readline("yoshi> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(quit)" || trimmed == "(exit)" {
                    break;
                }
                run_source(interp, &line, silent);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}
