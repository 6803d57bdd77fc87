//! Token cursor for navigating the token stream.

use gullian_diagnostic::{Diagnostic, Result};
use gullian_ir::Token;

/// Cursor over the lexed token stream.
///
/// The parser owns the tokens; the cursor only tracks the position and the
/// line of the most recently consumed token, which anchors end-of-input
/// diagnostics.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume and return the next token, or fail with a syntax error
    /// naming the construct that needed it.
    pub fn next_or(&mut self, module: &str, context: &str) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            None => Err(Diagnostic::syntax(
                format!("unexpected end of input in {context}"),
                self.last_line(),
                module,
            )),
        }
    }

    /// Line of the last token in the stream, for end-of-input errors.
    pub fn last_line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |token| token.line)
    }
}
