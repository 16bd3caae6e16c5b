//! Recursive descent parser for Ember.
//!
//! Produces an [`ember_ir::Program`]. Statements need no terminator: a `;`
//! is consumed when present, and `return` without a value ends at a line
//! break.

mod cursor;
mod error;
mod grammar;


use ember_ir::Program;
use tracing::debug;

use cursor::Cursor;
pub use error::{ErrorContext, ParseError};

/// Parser state.
pub struct Parser {
    cursor: Cursor,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = ember_lexer::lex(source)?;
        Ok(Parser {
            cursor: Cursor::new(tokens),
        })
    }

    /// Parse the whole token stream as a program.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.cursor.at_eof() {
            if let Some(stmt) = self.parse_stmt()? {
                body.push(stmt);
            }
        }
        debug!(statements = body.len(), "parsed program");
        Ok(Program { body })
    }
}

/// Parse `source` into a program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}
