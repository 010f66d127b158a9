//! Kisumu CLI - command-line interface for the Kisumu scripting language.
//!
//! Prints the parsed program (or its tokens) for a file, an inline snippet,
//! or each entry typed into the REPL.

use std::env;
use std::fs;
use std::path::Path;

use kisumu::{Parser, ParserError, tokenize};
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "kisumu $ ";
const CONTINUATION_PROMPT: &str = "...      ";
const HISTORY_ENV: &str = "KISUMU_HISTORY";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// What to print for each piece of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ast,
    Tokens,
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut eval_code: Option<String> = None;
    let mut interactive = false;
    let mut mode = Mode::Ast;
    let mut file: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-v" | "--version" => {
                print_version();
                return Ok(());
            }
            "-e" | "--eval" => {
                i += 1;
                if i >= args.len() {
                    return Err("-e requires an argument".to_string());
                }
                eval_code = Some(args[i].clone());
            }
            "-t" | "--tokens" => {
                mode = Mode::Tokens;
            }
            "-i" | "--interactive" => {
                interactive = true;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                file = Some(arg.clone());
                break;
            }
        }
        i += 1;
    }

    if let Some(code) = eval_code {
        check(&code, mode)?;
        if interactive {
            start_repl(mode)?;
        }
    } else if let Some(filepath) = file {
        run_file(&filepath, mode)?;
        if interactive {
            start_repl(mode)?;
        }
    } else {
        start_repl(mode)?;
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"
Kisumu v{} - Kisumu lexer and parser

Usage:
  kisumu [options] [file]

Options:
  -h, --help         Show this help message
  -v, --version      Show version
  -e, --eval         Parse code from command line
  -t, --tokens       Print tokens instead of the parsed program
  -i, --interactive  Start REPL after parsing file

Environment:
  KISUMU_HISTORY     File used to persist REPL history
  RUST_LOG           Log filter, e.g. kisumu_parser=trace

Examples:
  kisumu                      Start interactive REPL
  kisumu script.ks            Parse a script file
  kisumu -e "let x = 1 + 2"   Parse code
  kisumu -t -e "a <= b"       Show tokens
"#,
        VERSION
    );
}

fn print_version() {
    println!("Kisumu {}", VERSION);
}

fn run_file(filepath: &str, mode: Mode) -> Result<(), String> {
    let path = Path::new(filepath);

    if !path.exists() {
        return Err(format!("File not found: {}", filepath));
    }

    let code = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    check(&code, mode).map_err(|e| format!("{}: {}", filepath, e))
}

/// Print the result for one piece of source. Fails when the parser
/// reported diagnostics.
fn check(source: &str, mode: Mode) -> Result<(), String> {
    match report(source, mode) {
        0 => Ok(()),
        1 => Err("1 parse error".to_string()),
        n => Err(format!("{} parse errors", n)),
    }
}

/// Print tokens, the rendered program, or diagnostics. Returns the number
/// of diagnostics.
fn report(source: &str, mode: Mode) -> usize {
    if mode == Mode::Tokens {
        for token in tokenize(source) {
            println!("{:>8}  {}", token.start, token);
        }
        return 0;
    }

    let mut parser = Parser::new(tokenize(source));
    let program = parser.parse_program();
    let errors = parser.errors();
    if errors.is_empty() {
        if !program.is_empty() {
            println!("{}", program);
        }
        return 0;
    }

    eprintln!("parser errors:");
    for err in errors {
        let line = parser.lexer().source_line(&err.position);
        eprintln!("{}", format_diagnostic(err, &line));
    }
    errors.len()
}

/// Tab-indented diagnostic followed by its source line and a caret under
/// the offending column.
fn format_diagnostic(err: &ParserError, line: &str) -> String {
    let pad: String = line
        .chars()
        .take(err.position.column)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    format!("\t{}\n\t  | {}\n\t  | {}^", err, line, pad)
}

fn start_repl(mut mode: Mode) -> Result<(), String> {
    println!("Kisumu v{} - Type 'exit' or Ctrl+D to quit", VERSION);
    println!();

    let mut rl = DefaultEditor::new().map_err(|e| format!("Failed to create editor: {}", e))?;

    let history = env::var(HISTORY_ENV).ok().filter(|p| !p.is_empty());
    if let Some(path) = &history {
        if let Err(e) = rl.load_history(path) {
            debug!("no history loaded from {}: {}", path, e);
        }
    }

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }

                if buffer.is_empty() && trimmed.starts_with('/') {
                    if handle_command(trimmed, &mut mode) {
                        break;
                    }
                    continue;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        if let Err(e) = rl.add_history_entry(buffer.trim()) {
                            debug!("history entry not added: {}", e);
                        }
                        report(&buffer, mode);
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                return Err(format!("Readline error: {}", e));
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            warn!("failed to save history to {}: {}", path, e);
        }
    }

    Ok(())
}

/// Check whether the input has no open brackets or strings, so it can be
/// parsed as one entry.
fn is_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut string_char = '\0';
    let mut escaped = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == string_char {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = true;
                string_char = c;
            }
            '/' if chars.peek() == Some(&'/') => {
                // Skip the rest of a line comment.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            _ => {}
        }
    }

    // Stray closers are complete; the parser reports them.
    depth <= 0 && !in_string
}

/// Run a REPL slash command. Returns true when the REPL should exit.
fn handle_command(cmd: &str, mode: &mut Mode) -> bool {
    let parts: Vec<&str> = cmd[1..].split_whitespace().collect();
    let command = parts.first().map(|s| s.to_lowercase()).unwrap_or_default();

    match command.as_str() {
        "help" => {
            println!(
                r#"
REPL Commands:
  /help     Show this help
  /tokens   Print tokens for each entry
  /ast      Print the parsed program for each entry
  /clear    Clear the screen
  /exit     Exit the REPL
"#
            );
        }
        "tokens" => *mode = Mode::Tokens,
        "ast" => *mode = Mode::Ast,
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
        }
        "exit" | "quit" => return true,
        _ => {
            println!(
                "Unknown command: /{}. Type /help for available commands.",
                command
            );
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        assert!(is_complete("let x = 1;"));
        assert!(is_complete(""));
        assert!(is_complete("fn(x) { x }"));
        assert!(!is_complete("fn(x) {"));
        assert!(!is_complete("add(1,"));
        assert!(!is_complete("[1, 2"));
        assert!(!is_complete("\"open string"));
    }

    #[test]
    fn test_is_complete_ignores_brackets_in_strings_and_comments() {
        assert!(is_complete(r#"let s = "{[(";"#));
        assert!(is_complete(r#"let s = 'it\'s';"#));
        assert!(is_complete("let a = 1; // {"));
        assert!(!is_complete("let f = fn() { // }"));
    }

    #[test]
    fn test_is_complete_stray_closer() {
        assert!(is_complete(")"));
        assert!(is_complete("}"));
    }

    #[test]
    fn test_check_counts_errors() {
        assert!(check("let x = 1;", Mode::Ast).is_ok());
        assert_eq!(check("let x 1;", Mode::Ast), Err("1 parse error".to_string()));
        assert_eq!(
            check("let = 1; let y 2;", Mode::Ast),
            Err("3 parse errors".to_string())
        );
        assert!(check("@@@", Mode::Tokens).is_ok());
    }

    fn first_error(source: &str) -> (ParserError, String) {
        let mut parser = Parser::new(tokenize(source));
        parser.parse_program();
        let err = parser.errors()[0].clone();
        let line = parser.lexer().source_line(&err.position);
        (err, line)
    }

    #[test]
    fn test_format_diagnostic_points_at_column() {
        let (err, line) = first_error("let a = 1;\nlet b 2;\nlet c = 3;");
        assert_eq!(line, "let b 2;");
        assert_eq!(
            format_diagnostic(&err, &line),
            "\texpected next token to be =, got INT instead at line 2, column 7\n\
             \t  | let b 2;\n\
             \t  |       ^"
        );
    }

    #[test]
    fn test_format_diagnostic_keeps_tabs_aligned() {
        let (err, line) = first_error("\tlet = 1;");
        assert_eq!(line, "\tlet = 1;");
        assert!(format_diagnostic(&err, &line).ends_with("\t  | \t    ^"));
    }

    #[test]
    fn test_token_positions_are_right_aligned() {
        let token = tokenize("x").next_token();
        assert_eq!(format!("{:>8}|", token.start), "     1:1|");
    }

    #[test]
    fn test_handle_command() {
        let mut mode = Mode::Ast;
        assert!(!handle_command("/tokens", &mut mode));
        assert_eq!(mode, Mode::Tokens);
        assert!(!handle_command("/AST", &mut mode));
        assert_eq!(mode, Mode::Ast);
        assert!(handle_command("/exit", &mut mode));
        assert!(!handle_command("/", &mut mode));
    }
}
