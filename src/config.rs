// ABOUTME: Version, banner, and prompt constants for the CLI and REPL

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Lox Interpreter v1.0";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for Lox";
pub const PROMPT: &str = "lox> ";
pub const HISTORY_FILE: &str = ".lox_history";

pub const HELP_TEXT: &str = r#"
Available commands:
  exit                 - Exit the REPL
  help                 - Show this help message
  cls                  - Clear the screen
  time                 - Print the current date and time

Type any Lox statement to evaluate it. Use Ctrl-D or 'exit' to quit.
"#;
