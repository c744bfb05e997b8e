use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::runtime::{evaluate_binary, negate, Value};
use crate::tokenizer::{Keyword, Operator, Token, TokenType};
use log::{debug, trace};
use std::{
    fmt::{self, Display, Formatter},
    io::Write,
};

/// A failure caught at a statement boundary, tagged with the token the
/// statement started at.
#[derive(Debug)]
pub struct StatementError {
    pub token: Token,
    pub error: Error,
}

impl Display for StatementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} near {}: {}",
            self.token.line, self.token.column, self.token, self.error
        )
    }
}

/// Executes `tokens` against `env`, writing printed values to `out`.
pub fn execute<W: Write>(tokens: &[Token], env: &mut Environment<'_>, out: W) -> Result<()> {
    Interpreter::new(tokens, out).run(env)
}

/// Parses and evaluates in a single pass over the token slice. The cursor is
/// the only parsing state, so loops re-read their condition by rewinding it.
pub struct Interpreter<'t, W> {
    tokens: &'t [Token],
    cursor: usize,
    out: W,
    errors: Vec<StatementError>,
}

impl<'t, W: Write> Interpreter<'t, W> {
    pub fn new(tokens: &'t [Token], out: W) -> Self {
        assert!(
            tokens
                .last()
                .map_or(false, |t| t.token_type == TokenType::EOF),
            "Token slice must be terminated by EOF"
        );

        Self {
            tokens,
            cursor: 0,
            out,
            errors: Vec::new(),
        }
    }

    pub fn run(mut self, env: &mut Environment<'_>) -> Result<()> {
        self.statements(env, false)?;

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate {
                messages: self.errors.iter().map(ToString::to_string).collect(),
            })
        }
    }

    fn current(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[self.cursor]
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current().token_type == TokenType::Keyword(keyword)
    }

    fn missing(&self, expected: &'static str) -> Error {
        Error::MissingToken {
            expected,
            found: self.current().to_string(),
        }
    }

    fn expect(&mut self, expected: TokenType, description: &'static str) -> Result<()> {
        if self.current().token_type == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.missing(description))
        }
    }

    /// Runs statements until the end of input, or until the closing brace of
    /// the enclosing block when `in_block` is set. Statement failures are
    /// recorded and execution resumes after them; only output failures abort.
    fn statements(&mut self, env: &mut Environment<'_>, in_block: bool) -> Result<()> {
        loop {
            match self.current().token_type {
                TokenType::EOF => return Ok(()),
                TokenType::RightBrace if in_block => return Ok(()),
                _ => {}
            }

            let start = self.cursor;
            match self.statement(env) {
                Ok(()) => {}
                Err(err @ Error::IO(_)) => return Err(err),
                Err(error) => {
                    let recorded = StatementError {
                        token: self.tokens[start].clone(),
                        error,
                    };
                    debug!("recorded statement error: {}", recorded);
                    self.errors.push(recorded);

                    if self.cursor == start {
                        self.advance();
                    }
                }
            }
        }
    }

    fn statement(&mut self, env: &mut Environment<'_>) -> Result<()> {
        let token = self.current();

        match &token.token_type {
            TokenType::Keyword(Keyword::Comment) => {
                self.advance();
                Ok(())
            }
            TokenType::Keyword(Keyword::Assign) => self.assignment(env),
            TokenType::Keyword(Keyword::Print) => self.print(env),
            TokenType::Keyword(Keyword::If) => self.conditional(env),
            TokenType::Keyword(Keyword::While) => self.while_loop(env),
            TokenType::Keyword(Keyword::Else) => Err(Error::UnexpectedToken {
                found: token.to_string(),
            }),
            TokenType::Keyword(Keyword::Reserved(keyword)) => {
                self.advance();
                Err(Error::NotImplemented { keyword: *keyword })
            }
            _ => {
                self.expression_statement(env);
                Ok(())
            }
        }
    }

    fn assignment(&mut self, env: &mut Environment<'_>) -> Result<()> {
        self.advance();

        let name = match &self.current().token_type {
            TokenType::Identifier(name) => name,
            _ => return Err(self.missing("variable name")),
        };
        self.advance();
        self.expect(TokenType::Assign, "'='")?;

        let value = self.expression(env)?;
        trace!("{} = {:?}", name, value);
        env.set(name.as_str(), value);

        Ok(())
    }

    fn print(&mut self, env: &Environment<'_>) -> Result<()> {
        self.advance();

        let value = self.expression(env)?;
        writeln!(self.out, "{}", value)?;

        Ok(())
    }

    fn conditional(&mut self, env: &Environment<'_>) -> Result<()> {
        self.advance();

        let condition = match self.expression(env) {
            Ok(condition) => condition,
            Err(error) => return Err(self.abandon_construct(error, true)),
        };
        self.expect(TokenType::LeftBrace, "'{'")?;

        if condition.is_truthy() {
            self.block(env)?;
            if self.at_keyword(Keyword::Else) {
                self.advance();
                self.skip_else_branch()?;
            }
        } else {
            self.skip_block()?;
            if self.at_keyword(Keyword::Else) {
                self.advance();
                self.else_branch(env)?;
            }
        }

        Ok(())
    }

    fn else_branch(&mut self, env: &Environment<'_>) -> Result<()> {
        if self.at_keyword(Keyword::If) {
            return self.conditional(env);
        }

        self.expect(TokenType::LeftBrace, "'{'")?;
        self.block(env)
    }

    /// Skips an else branch, including any chained `illai endraal` arms,
    /// without evaluating their conditions.
    fn skip_else_branch(&mut self) -> Result<()> {
        loop {
            if self.at_keyword(Keyword::If) {
                self.advance();
                self.skip_to_block();
            }

            self.expect(TokenType::LeftBrace, "'{'")?;
            self.skip_block()?;

            if !self.at_keyword(Keyword::Else) {
                return Ok(());
            }
            self.advance();
        }
    }

    /// Moves forward to the `{` that opens the current construct's block.
    /// Conditions never contain braces.
    fn skip_to_block(&mut self) {
        while !matches!(
            self.current().token_type,
            TokenType::LeftBrace | TokenType::RightBrace | TokenType::EOF
        ) {
            self.advance();
        }
    }

    /// Called when a condition fails part-way through: moves past the
    /// construct's block, and its else arms when `has_else` is set, so that
    /// none of them runs. Returns the condition's error for recording.
    fn abandon_construct(&mut self, error: Error, has_else: bool) -> Error {
        self.skip_to_block();

        let skipped = self
            .expect(TokenType::LeftBrace, "'{'")
            .and_then(|_| self.skip_block())
            .and_then(|_| {
                if has_else && self.at_keyword(Keyword::Else) {
                    self.advance();
                    self.skip_else_branch()
                } else {
                    Ok(())
                }
            });

        if let Err(skip_error) = skipped {
            trace!("could not skip construct after failed condition: {}", skip_error);
        }
        error
    }

    /// The condition is re-read from `condition_start` on every iteration.
    /// Condition and body share one scope that lives as long as the loop.
    fn while_loop(&mut self, env: &Environment<'_>) -> Result<()> {
        self.advance();

        let condition_start = self.cursor;
        let mut scope = env.child_scope();
        let mut iterations = 0usize;

        loop {
            self.cursor = condition_start;

            let condition = match self.expression(&scope) {
                Ok(condition) => condition,
                Err(error) => return Err(self.abandon_construct(error, false)),
            };
            self.expect(TokenType::LeftBrace, "'{'")?;

            if !condition.is_truthy() {
                trace!("loop finished after {} iterations", iterations);
                return self.skip_block();
            }

            self.statements(&mut scope, true)?;
            self.expect(TokenType::RightBrace, "'}'")?;
            iterations += 1;
        }
    }

    /// Runs a block whose `{` was already consumed, in a fresh child scope,
    /// and consumes its `}`.
    fn block(&mut self, env: &Environment<'_>) -> Result<()> {
        let mut scope = env.child_scope();
        trace!("entering block at depth {}", scope.depth());

        self.statements(&mut scope, true)?;
        self.expect(TokenType::RightBrace, "'}'")
    }

    /// Moves past a block whose `{` was already consumed, counting nested
    /// braces, and consumes its `}`.
    fn skip_block(&mut self) -> Result<()> {
        let mut depth = 1usize;

        loop {
            match self.current().token_type {
                TokenType::LeftBrace => depth += 1,
                TokenType::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                TokenType::EOF => return Err(self.missing("'}'")),
                _ => {}
            }
            self.advance();
        }
    }

    fn expression_statement(&mut self, env: &Environment<'_>) {
        let start = self.cursor;

        if let Err(err) = self.expression(env) {
            trace!("skipping {}: {}", self.tokens[start], err);
            self.cursor = start;
            self.advance();
        }
    }

    fn operator_in(&self, accepts: fn(&Operator) -> bool) -> Option<Operator> {
        match &self.current().token_type {
            TokenType::Operator(operator) if accepts(operator) => Some(*operator),
            _ => None,
        }
    }

    fn expression(&mut self, env: &Environment<'_>) -> Result<Value> {
        self.comparison(env)
    }

    fn comparison(&mut self, env: &Environment<'_>) -> Result<Value> {
        let mut left = self.additive(env)?;

        while let Some(operator) = self.operator_in(Operator::is_comparison) {
            self.advance();
            let right = self.additive(env)?;
            left = evaluate_binary(operator, left, right)?;
        }

        Ok(left)
    }

    fn additive(&mut self, env: &Environment<'_>) -> Result<Value> {
        let mut left = self.multiplicative(env)?;

        while let Some(operator) =
            self.operator_in(|op| matches!(op, Operator::Plus | Operator::Minus))
        {
            self.advance();
            let right = self.multiplicative(env)?;
            left = evaluate_binary(operator, left, right)?;
        }

        Ok(left)
    }

    fn multiplicative(&mut self, env: &Environment<'_>) -> Result<Value> {
        let mut left = self.unary(env)?;

        while let Some(operator) =
            self.operator_in(|op| matches!(op, Operator::Star | Operator::Slash))
        {
            self.advance();
            let right = self.unary(env)?;
            left = evaluate_binary(operator, left, right)?;
        }

        Ok(left)
    }

    fn unary(&mut self, env: &Environment<'_>) -> Result<Value> {
        if self.operator_in(|op| *op == Operator::Minus).is_some() {
            self.advance();
            return negate(self.unary(env)?);
        }

        self.primary(env)
    }

    fn primary(&mut self, env: &Environment<'_>) -> Result<Value> {
        let token = self.current();

        let value = match &token.token_type {
            TokenType::LeftParen => {
                self.advance();
                let value = self.expression(env)?;

                if self.current().token_type != TokenType::RightParen {
                    return Err(Error::UnbalancedParen {
                        found: self.current().to_string(),
                    });
                }
                value
            }
            TokenType::Number(number) => Value::from(*number),
            TokenType::String(s) => Value::String(s.clone()),
            TokenType::Boolean(b) => Value::Boolean(*b),
            TokenType::Identifier(name) => {
                self.advance();
                return env.get(name);
            }
            _ => {
                return Err(Error::UnexpectedToken {
                    found: token.to_string(),
                })
            }
        };

        self.advance();
        Ok(value)
    }
}
