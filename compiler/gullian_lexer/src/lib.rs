//! Lexer: character stream to token stream.
//!
//! Comments survive as tokens because the checker harvests `#include `
//! lines from them. Every token records the line it started on; that line
//! is the only position information the rest of the pipeline sees.

use gullian_diagnostic::{Diagnostic, Result};
use gullian_ir::{Keyword, Literal, Name, Punct, Token, TokenKind};

/// Tokenize a whole source file.
pub fn lex(source: &str, module: &str) -> Result<Vec<Token>> {
    Lexer::new(source, module).run()
}

struct Lexer<'src> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    module: &'src str,
}

impl<'src> Lexer<'src> {
    fn new(source: &str, module: &'src str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            module,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::syntax(message, self.line, self.module)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' || ch == ' ' || ch == '\t' || ch == '\r' {
                self.bump();
                continue;
            }

            let line = self.line;
            let kind = if ch == '#' {
                self.bump();
                TokenKind::Comment(self.scan_comment())
            } else if ch.is_ascii_alphabetic() || ch == '_' {
                self.scan_word()
            } else if ch.is_ascii_digit() {
                self.scan_number()?
            } else if ch == '"' || ch == '\'' {
                self.bump();
                TokenKind::Literal(Literal::Str(self.scan_text(ch)?))
            } else {
                TokenKind::Punct(self.scan_punct()?)
            };

            tokens.push(Token { kind, line });
        }

        Ok(tokens)
    }

    fn scan_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.pos += 1;
        }
        text.trim().to_string()
    }

    fn scan_word(&mut self) -> TokenKind {
        let line = self.line;
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '_' || ch.is_ascii_alphanumeric() {
                text.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }

        match text.as_str() {
            "true" => TokenKind::Literal(Literal::Bool(true)),
            "false" => TokenKind::Literal(Literal::Bool(false)),
            _ => match Keyword::from_str(&text) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Name(Name::new(text, line)),
            },
        }
    }

    fn scan_number(&mut self) -> Result<TokenKind> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }

        // A dot makes this a float literal only when a digit follows, so
        // `1.abs()` still reads as an int and an attribute.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|ch| ch.is_ascii_digit()) {
            text.push('.');
            self.pos += 1;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid float literal '{text}'")))?;
            return Ok(TokenKind::Literal(Literal::Float(value)));
        }

        let value: i64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid int literal '{text}'")))?;
        Ok(TokenKind::Literal(Literal::Int(value)))
    }

    fn scan_text(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(self.error("unterminated text literal"));
            };
            if ch == quote {
                break;
            }
            if ch == '\\' {
                let Some(escaped) = self.bump() else {
                    return Err(self.error("unterminated escape in text literal"));
                };
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                continue;
            }
            value.push(ch);
        }
        Ok(value)
    }

    fn scan_punct(&mut self) -> Result<Punct> {
        for &punct in Punct::ALL {
            let lexeme = punct.lexeme();
            if self.matches(lexeme) {
                self.pos += lexeme.chars().count();
                return Ok(punct);
            }
        }

        let found = self.peek().map(String::from).unwrap_or_default();
        Err(self.error(format!("invalid token '{found}'")))
    }

    fn matches(&self, lexeme: &str) -> bool {
        lexeme
            .chars()
            .enumerate()
            .all(|(i, ch)| self.peek_at(i) == Some(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source, "test")
            .expect("lexes")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_hello_world() {
        let tokens = lex(
            "extern fun puts(s: str): int\nfun main(): int { puts(\"hi\") return 0 }",
            "test",
        )
        .expect("lexes");

        assert!(tokens[0].is_keyword(Keyword::Extern));
        assert!(tokens[1].is_keyword(Keyword::Fun));
        assert_eq!(tokens[2].kind, TokenKind::Name(Name::new("puts", 1)));
        assert_eq!(tokens[2].line, 1);
        // `main` sits on line 2.
        let main = tokens
            .iter()
            .find(|t| matches!(&t.kind, TokenKind::Name(n) if *n == "main"))
            .expect("main token");
        assert_eq!(main.line, 2);
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            kinds("a >>= b >> c > d"),
            vec![
                TokenKind::Name(Name::new("a", 1)),
                TokenKind::Punct(Punct::ShrEqual),
                TokenKind::Name(Name::new("b", 1)),
                TokenKind::Punct(Punct::Shr),
                TokenKind::Name(Name::new("c", 1)),
                TokenKind::Punct(Punct::GreaterThan),
                TokenKind::Name(Name::new("d", 1)),
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            kinds("42 3.25"),
            vec![
                TokenKind::Literal(Literal::Int(42)),
                TokenKind::Literal(Literal::Float(3.25)),
            ]
        );
    }

    #[test]
    fn bool_words_are_literals() {
        assert_eq!(
            kinds("true false"),
            vec![
                TokenKind::Literal(Literal::Bool(true)),
                TokenKind::Literal(Literal::Bool(false)),
            ]
        );
    }

    #[test]
    fn text_literals_with_escapes() {
        assert_eq!(
            kinds(r#""a\nb" 'c'"#),
            vec![
                TokenKind::Literal(Literal::Str("a\nb".to_string())),
                TokenKind::Literal(Literal::Str("c".to_string())),
            ]
        );
    }

    #[test]
    fn comments_are_tokens() {
        assert_eq!(
            kinds("#include <math.h>\nlet x = 1"),
            vec![
                TokenKind::Comment("include <math.h>".to_string()),
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Name(Name::new("x", 2)),
                TokenKind::Punct(Punct::Equal),
                TokenKind::Literal(Literal::Int(1)),
            ]
        );
    }

    #[test]
    fn invalid_token_is_a_syntax_error() {
        let err = lex("let x = @", "main").expect_err("rejects");
        assert_eq!(err.kind, gullian_diagnostic::ErrorKind::Syntax);
        assert_eq!(err.module, "main");
    }
}
