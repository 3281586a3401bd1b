mod ast;
mod ast_printer;
mod callable;
mod config;
mod environment;
mod error;
mod highlighter;
mod interpreter;
mod lexer;
mod parser;
mod resolver;
mod token;
mod value;

use clap::Parser as ClapParser;
use config::{HISTORY_FILE, PROMPT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use highlighter::LoxHelper;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;
use resolver::Resolver;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// A tree-walking interpreter for Lox
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for Lox")]
struct CliArgs {
    /// Script file to execute (optional -- if not provided, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    if let Some(script_path) = args.script {
        match run_script(&script_path) {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(65);
            }
        }
    } else {
        run_repl()
    }
}

/// Runs a Lox source string through the lex/parse/resolve/evaluate pipeline
/// against a persistent interpreter, printing any diagnostics to stderr.
fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), String> {
    let tokens = Lexer::new(source)
        .scan_tokens()
        .map_err(|errs| join_errors(&errs))?;

    let statements = Parser::new(tokens)
        .parse()
        .map_err(|errs| join_errors(&errs))?;

    let locals = Resolver::new()
        .resolve(&statements)
        .map_err(|errs| join_errors(&errs))?;

    interpreter.set_locals(locals);
    interpreter.interpret(&statements).map_err(|e| e.to_string())
}

fn join_errors<E: std::fmt::Display>(errs: &[E]) -> String {
    errs.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_script(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read script file {}: {}", path.display(), e))?;

    let mut interpreter = Interpreter::new();
    run(&source, &mut interpreter).map_err(|e| e.into())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(rl_config)
        .map_err(|e| format!("Failed to initialize REPL: {e}"))?;
    rl.set_helper(Some(LoxHelper::new()));

    let _ = rl.load_history(HISTORY_FILE);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut interpreter = Interpreter::new();

    loop {
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match trimmed {
                    "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "cls" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    "help" => {
                        println!("{}", config::HELP_TEXT);
                        continue;
                    }
                    "time" => {
                        println!("{:?}", std::time::SystemTime::now());
                        continue;
                    }
                    _ => {}
                }

                if let Err(e) = run(&line, &mut interpreter) {
                    eprintln!("{e}");
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
