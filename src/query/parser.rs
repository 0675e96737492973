//! Query text parser
//!
//! Hand-written recursive descent over the conjunction-only grammar:
//!
//! ```text
//! query   := clause (" and " clause)*
//! clause  := field " " op " " literal
//! op      := "eq" | "ne" | "gt" | "ge" | "lt" | "le"
//! literal := double-quoted string (escapes: \n \t \\ \")
//!          | integer  -?[0-9]+
//!          | decimal  -?[0-9]+.[0-9]+
//!          | "true" | "false" | "null"
//!          | bare reference token
//! ```
//!
//! Keywords are case-sensitive. Parsing either yields the full ordered term
//! list or a `ParseError` — never a partial result.

use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::ast::{Literal, QueryOperator, QueryTerm, ValueHolder};
use super::errors::{ParseError, ParseResult};

/// Parses a query string into its ordered term list.
pub fn parse_query(input: &str) -> ParseResult<Vec<QueryTerm>> {
    let mut scanner = Scanner::new(input);
    let mut terms = vec![scanner.parse_clause()?];

    while !scanner.at_end() {
        scanner.expect_spaces()?;
        let at = scanner.pos;
        let word = scanner.take_word();
        if word != "and" {
            return Err(ParseError::ExpectedAnd {
                word: word.to_string(),
                at,
            });
        }
        scanner.expect_spaces()?;
        terms.push(scanner.parse_clause()?);
    }

    tracing::trace!(target: "query", terms = terms.len(), "query parsed");
    Ok(terms)
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume one or more spaces
    fn expect_spaces(&mut self) -> ParseResult<()> {
        if self.peek() != Some(' ') {
            return Err(ParseError::ExpectedSpace { at: self.pos });
        }
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
        Ok(())
    }

    /// Consume up to the next space (or end); may be empty
    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ' ' {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn parse_clause(&mut self) -> ParseResult<QueryTerm> {
        let field_at = self.pos;
        let field = self.take_word();
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(ParseError::ExpectedField { at: field_at });
        }

        self.expect_spaces()?;

        let op_at = self.pos;
        let op_word = self.take_word();
        if op_word.is_empty() {
            return Err(ParseError::UnexpectedEnd { at: op_at });
        }
        let operator = QueryOperator::from_keyword(op_word).ok_or_else(|| {
            ParseError::UnknownOperator {
                word: op_word.to_string(),
                at: op_at,
            }
        })?;

        self.expect_spaces()?;

        let holder = self.parse_literal()?;
        Ok(QueryTerm::new(field, operator, holder))
    }

    fn parse_literal(&mut self) -> ParseResult<ValueHolder> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd { at: self.pos }),
            Some('"') => self.parse_string(),
            Some(_) => self.parse_word_literal(),
        }
    }

    /// Double-quoted string with `\n \t \\ \"` escapes
    fn parse_string(&mut self) -> ParseResult<ValueHolder> {
        let start = self.pos;
        self.bump(); // opening quote
        let mut unescaped = String::new();

        loop {
            let Some(c) = self.bump() else {
                return Err(ParseError::UnterminatedString { at: start });
            };
            match c {
                '"' => break,
                '\\' => {
                    let escape_at = self.pos;
                    let Some(escape) = self.bump() else {
                        return Err(ParseError::UnterminatedString { at: start });
                    };
                    match escape {
                        'n' => unescaped.push('\n'),
                        't' => unescaped.push('\t'),
                        '\\' => unescaped.push('\\'),
                        '"' => unescaped.push('"'),
                        other => {
                            return Err(ParseError::InvalidEscape {
                                escape: other,
                                at: escape_at,
                            })
                        }
                    }
                }
                other => unescaped.push(other),
            }
        }

        let text = &self.input[start..self.pos];
        Ok(ValueHolder::new(text, Literal::String(unescaped)))
    }

    /// Non-string literal: number, boolean, null, or bare reference
    fn parse_word_literal(&mut self) -> ParseResult<ValueHolder> {
        let at = self.pos;
        let word = self.take_word();
        if word.is_empty() {
            return Err(ParseError::ExpectedLiteral { at });
        }

        let literal = if word == "true" {
            Literal::Boolean(true)
        } else if word == "false" {
            Literal::Boolean(false)
        } else if word == "null" {
            Literal::Null
        } else if is_integer_shape(word) {
            let value = BigInt::from_str(word).map_err(|_| ParseError::InvalidNumber {
                text: word.to_string(),
                at,
            })?;
            Literal::Integer(value)
        } else if is_decimal_shape(word) {
            let value = Decimal::from_str(word).map_err(|_| ParseError::InvalidNumber {
                text: word.to_string(),
                at,
            })?;
            Literal::Decimal(value)
        } else if word.starts_with('-') || word.starts_with(|c: char| c.is_ascii_digit()) {
            // Looks numeric but matches neither shape ("4.", "--1", "1a")
            return Err(ParseError::InvalidNumber {
                text: word.to_string(),
                at,
            });
        } else {
            Literal::Reference(word.to_string())
        };

        Ok(ValueHolder::new(word, literal))
    }
}

/// `-?[0-9]+`
fn is_integer_shape(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `-?[0-9]+.[0-9]+` — the fractional part is mandatory
fn is_decimal_shape(word: &str) -> bool {
    let body = word.strip_prefix('-').unwrap_or(word);
    match body.split_once('.') {
        Some((int_part, frac_part)) => {
            !int_part.is_empty()
                && !frac_part.is_empty()
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac_part.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
