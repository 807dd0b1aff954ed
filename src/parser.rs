//! Line-oriented parser for the analysed language.
//!
//! ```text
//! x = input()
//! y = 2 * x
//! if y > 10 then
//!     z = y - 10
//! end
//! assert z >= 0
//! ```
//!
//! One command per line, tokens separated by whitespace. `if` blocks may not
//! nest, and the single `assert` must be the last command.

use log::debug;
use thiserror::Error;

use crate::ast::{Assignment, BinOp, CmpOp, Command, Comparison, If, Program, Rhs, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected end of line")]
    UnexpectedEndOfLine { line: usize },

    #[error("line {line}: unexpected token `{token}`")]
    UnexpectedToken { line: usize, token: String },

    #[error("line {line}: unsupported operation `{op}`")]
    UnsupportedOperation { line: usize, op: String },

    #[error("line {line}: unsupported comparison `{op}`")]
    UnsupportedComparison { line: usize, op: String },

    #[error("line {line}: invalid value `{token}`")]
    InvalidValue { line: usize, token: String },

    #[error("line {line}: only one assertion can be defined")]
    DuplicateAssertion { line: usize },

    #[error("line {line}: assertion inside an if block")]
    AssertionInBlock { line: usize },

    #[error("line {line}: nested if-then blocks are not allowed")]
    NestedIf { line: usize },

    #[error("line {line}: no further commands are allowed after a postcondition")]
    CommandAfterAssertion { line: usize },

    #[error("line {line}: `end` without a matching `if`")]
    UnmatchedEnd { line: usize },

    #[error("line {line}: if block is never closed")]
    UnterminatedBlock { line: usize },

    #[error("program has no assertion")]
    MissingAssertion,
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parses a whole program.
pub fn parse_program(source: &str) -> Result<Program> {
    let mut parser = Parser::new(source);
    let commands = parser.parse_block(None)?;
    let post_condition = parser.post_condition.ok_or(ParseError::MissingAssertion)?;
    let program = Program::new(commands, post_condition);
    debug!(
        "parsed {} commands over {} variables",
        program.commands.len(),
        program.variables.len()
    );
    Ok(program)
}

enum Line {
    Command(Command),
    Assert(Comparison),
    BeginIf(Comparison),
    End,
    Blank,
}

struct Parser<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    post_condition: Option<Comparison>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            post_condition: None,
        }
    }

    /// Parses commands until `end` (inside a block opened at `opened_at`) or end of input.
    fn parse_block(&mut self, opened_at: Option<usize>) -> Result<Vec<Command>> {
        let mut commands = Vec::new();

        while let Some((index, text)) = self.lines.next() {
            let line = index + 1;
            let command = match parse_line(text, line)? {
                Line::Blank => continue,
                Line::End => {
                    return match opened_at {
                        Some(_) => Ok(commands),
                        None => Err(ParseError::UnmatchedEnd { line }),
                    };
                }
                Line::Assert(condition) => {
                    if opened_at.is_some() {
                        return Err(ParseError::AssertionInBlock { line });
                    }
                    if self.post_condition.is_some() {
                        return Err(ParseError::DuplicateAssertion { line });
                    }
                    self.post_condition = Some(condition);
                    continue;
                }
                Line::BeginIf(condition) => {
                    if opened_at.is_some() {
                        return Err(ParseError::NestedIf { line });
                    }
                    let body = self.parse_block(Some(line))?;
                    Command::If(If::new(condition, body))
                }
                Line::Command(command) => command,
            };

            if self.post_condition.is_some() {
                return Err(ParseError::CommandAfterAssertion { line });
            }
            commands.push(command);
        }

        match opened_at {
            Some(line) => Err(ParseError::UnterminatedBlock { line }),
            None => Ok(commands),
        }
    }
}

fn parse_line(text: &str, line: usize) -> Result<Line> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(Line::Blank),
        ["end"] => Ok(Line::End),
        ["end", extra, ..] => Err(unexpected(extra, line)),
        ["assert", rest @ ..] => parse_condition(rest, line).map(Line::Assert),
        ["if", rest @ ..] => match rest {
            [l, op, r, "then"] => parse_condition(&[*l, *op, *r], line).map(Line::BeginIf),
            [_, _, _, other] => Err(unexpected(other, line)),
            [_, _, _, _, extra, ..] => Err(unexpected(extra, line)),
            _ => Err(ParseError::UnexpectedEndOfLine { line }),
        },
        [target, "=", rest @ ..] => {
            let target = match parse_value(target, line)? {
                Value::Var(name) => name,
                _ => return Err(ParseError::InvalidValue { line, token: target.to_string() }),
            };
            let rhs = parse_rhs(rest, line)?;
            Ok(Line::Command(Assignment::new(target, rhs).into()))
        }
        [_, second, ..] => Err(unexpected(second, line)),
        [only] => Err(unexpected(only, line)),
    }
}

fn parse_rhs(tokens: &[&str], line: usize) -> Result<Rhs> {
    match tokens {
        [value] => Ok(Rhs::Value(parse_value(value, line)?)),
        [l, op, r] => {
            let op = BinOp::from_symbol(op).ok_or_else(|| ParseError::UnsupportedOperation {
                line,
                op: op.to_string(),
            })?;
            Ok(Rhs::binary(op, parse_value(l, line)?, parse_value(r, line)?))
        }
        [] | [_, _] => Err(ParseError::UnexpectedEndOfLine { line }),
        [_, _, _, extra, ..] => Err(unexpected(extra, line)),
    }
}

fn parse_condition(tokens: &[&str], line: usize) -> Result<Comparison> {
    match tokens {
        [l, op, r] => {
            let op = CmpOp::from_symbol(op).ok_or_else(|| ParseError::UnsupportedComparison {
                line,
                op: op.to_string(),
            })?;
            Ok(Comparison::new(op, parse_value(l, line)?, parse_value(r, line)?))
        }
        [_, _, _, extra, ..] => Err(unexpected(extra, line)),
        _ => Err(ParseError::UnexpectedEndOfLine { line }),
    }
}

fn parse_value(token: &str, line: usize) -> Result<Value> {
    if token == "input()" {
        return Ok(Value::Input);
    }
    if let Ok(constant) = token.parse() {
        return Ok(Value::Constant(constant));
    }
    let mut chars = token.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid && !is_keyword(token) {
        Ok(Value::Var(token.to_string()))
    } else {
        Err(ParseError::InvalidValue {
            line,
            token: token.to_string(),
        })
    }
}

fn is_keyword(token: &str) -> bool {
    matches!(token, "if" | "then" | "end" | "assert")
}

fn unexpected(token: &str, line: usize) -> ParseError {
    ParseError::UnexpectedToken {
        line,
        token: token.to_string(),
    }
}
