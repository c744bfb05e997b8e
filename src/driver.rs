use crate::{
    environment::Environment, error::Result, extensions::ResultExtensions,
    interpreter::execute, tokenizer::tokenize,
};
use log::info;
use std::io::{self, Write};

/// Tokenizes `source` and executes it against a fresh root scope.
pub fn interpret<W: Write>(source: &str, out: W) -> Result<()> {
    let tokens = tokenize(source)?;
    info!("executing {} tokens", tokens.len());

    let mut env = Environment::new();
    execute(&tokens, &mut env, out)
}

/// Runs `source`, reporting any failure to `err` as a single `Error: ` line.
/// Never fails itself.
pub fn run_with<W: Write, E: Write>(source: &str, out: W, err: E) {
    interpret(source, out).report_to(err);
}

pub fn run(source: &str) {
    run_with(source, io::stdout().lock(), io::stderr().lock());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_captured(source: &str) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_with(source, &mut out, &mut err);
        (
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&err).into_owned(),
        )
    }

    #[test]
    fn test_successful_run() {
        let (out, err) = run_captured("vaippu x = 5\nkaattu x");
        assert_eq!(out, "5\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_lex_error_reports_without_output() {
        let (out, err) = run_captured("kaattu 1\nkaattu \"abc");
        assert_eq!(out, "");
        assert_eq!(
            err,
            "Error: line 2, column 8: unterminated string literal\n"
        );
    }

    #[test]
    fn test_aggregate_error_is_a_single_line() {
        let (out, err) = run_captured("kaattu y\nvaippu z = 10 / 0\nkaattu 3");
        assert_eq!(out, "3\n");
        assert_eq!(
            err,
            "Error: line 1, column 1 near keyword 'kaattu': undefined variable: y; \
             line 2, column 1 near keyword 'vaippu': division by zero\n"
        );
    }

    #[test]
    fn test_runs_are_independent() {
        let (out, _) = run_captured("vaippu shared = 1 kaattu shared");
        assert_eq!(out, "1\n");

        let (out, err) = run_captured("kaattu shared");
        assert_eq!(out, "");
        assert!(err.contains("undefined variable: shared"));
    }

    #[test]
    fn test_interpret_returns_errors() {
        assert!(interpret("kaattu @", io::sink()).is_err());
        assert!(interpret("kaattu 1", io::sink()).is_ok());
    }
}
