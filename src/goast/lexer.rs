//! A brace-, string- and comment-aware tokenizer for the Go subset.
//!
//! This lexer is deliberately shared between two callers: the `goast`
//! parser tokenizes with it to build the AST, and the preprocessor chain
//! (§4.2) uses the same scanning primitives (`Lexer::new(..).tokenize()`,
//! plus the brace-depth helpers) to find `?`, `|...|`, `match` and `enum`
//! occurrences without being fooled by a `?` inside a string literal or a
//! `{` inside a comment.

use crate::sourcemap::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    /// Raw text, quotes included, exactly as written in the source.
    String(String),
    Char(String),
    /// `//...` or `/*...*/`, including the delimiters, excluding any
    /// trailing newline.
    Comment(String),
    /// Punctuation/operators, e.g. `"("`, `"=="`, `":="`.
    Sym(&'static str),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    /// Char-index span `[start, end)` into the source, used by preprocessor
    /// passes that need to slice out or splice around a token verbatim.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub pos: Position,
}

// `?` is not Go syntax, but the lexer runs over SL text before the
// error-propagation processor has rewritten postfix `?` away, so it must
// tokenize as an ordinary symbol rather than raising a lex error.
const SYMBOLS: &[&str] = &[
    ":=", "==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "...", "->", "=>", "(", ")", "{", "}",
    "[", "]", ",", ".", ";", ":", "=", "+", "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "?",
];

pub struct Lexer<'a> {
    chars: Vec<char>,
    input: &'a str,
    idx: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().collect(),
            input,
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.col)
    }

    /// Tokenize the whole input, comments included.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let pos = self.pos();
            let start = self.idx;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    pos,
                    start,
                    end: start,
                });
                break;
            };

            let kind = if c == '/' && matches!(self.peek_at(1), Some('/') | Some('*')) {
                self.lex_comment()?
            } else if c.is_alphabetic() || c == '_' {
                self.lex_ident()
            } else if c.is_ascii_digit() {
                self.lex_number()
            } else if c == '"' || c == '`' {
                self.lex_string(c)?
            } else if c == '\'' {
                self.lex_char()?
            } else {
                self.lex_symbol()?
            };

            tokens.push(Token {
                kind,
                pos,
                start,
                end: self.idx,
            });
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn lex_comment(&mut self) -> Result<TokenKind, LexError> {
        let start = self.idx;
        if self.peek_at(1) == Some('/') {
            while matches!(self.peek(), Some(c) if c != '\n') {
                self.advance();
            }
        } else {
            self.advance();
            self.advance();
            loop {
                match (self.peek(), self.peek_at(1)) {
                    (Some('*'), Some('/')) => {
                        self.advance();
                        self.advance();
                        break;
                    }
                    (Some(_), _) => {
                        self.advance();
                    }
                    (None, _) => {
                        return Err(LexError {
                            message: "unterminated block comment".into(),
                            pos: self.pos(),
                        })
                    }
                }
            }
        }
        Ok(TokenKind::Comment(self.chars[start..self.idx].iter().collect()))
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.idx;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        TokenKind::Ident(self.chars[start..self.idx].iter().collect())
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.idx;
        let mut is_float = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = self.chars[start..self.idx].iter().collect();
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<TokenKind, LexError> {
        let start = self.idx;
        self.advance();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') if quote == '"' => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".into(),
                        pos: self.pos(),
                    })
                }
            }
        }
        Ok(TokenKind::String(self.chars[start..self.idx].iter().collect()))
    }

    fn lex_char(&mut self) -> Result<TokenKind, LexError> {
        let start = self.idx;
        self.advance();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    return Err(LexError {
                        message: "unterminated character literal".into(),
                        pos: self.pos(),
                    })
                }
            }
        }
        Ok(TokenKind::Char(self.chars[start..self.idx].iter().collect()))
    }

    fn lex_symbol(&mut self) -> Result<TokenKind, LexError> {
        for sym in SYMBOLS {
            let len = sym.chars().count();
            if self.matches_ahead(sym, len) {
                for _ in 0..len {
                    self.advance();
                }
                return Ok(TokenKind::Sym(sym));
            }
        }
        Err(LexError {
            message: format!("unexpected character '{}'", self.peek().unwrap_or(' ')),
            pos: self.pos(),
        })
    }

    fn matches_ahead(&self, sym: &str, len: usize) -> bool {
        sym.chars()
            .enumerate()
            .all(|(i, expected)| self.peek_at(i) == Some(expected))
            && len > 0
    }

    /// Byte offset of the current scan position, used by preprocessor
    /// passes that need to slice `self.input` directly.
    pub fn byte_offset(&self) -> usize {
        self.chars[..self.idx].iter().collect::<String>().len().min(self.input.len())
    }
}

/// Tokenize `input` and return both the token list and the char vector it
/// indexes into, so a preprocessor pass can slice `chars[tok.start..tok.end]`
/// without re-splitting the source itself.
pub fn tokenize_with_chars(input: &str) -> Result<(Vec<Token>, Vec<char>), LexError> {
    let chars: Vec<char> = input.chars().collect();
    let tokens = Lexer::new(input).tokenize()?;
    Ok((tokens, chars))
}

pub fn slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_question_mark_as_a_symbol() {
        assert_eq!(kinds("x?"), vec![TokenKind::Ident("x".into()), TokenKind::Sym("?"), TokenKind::Eof]);
    }

    #[test]
    fn skips_comments_but_keeps_them_as_tokens() {
        let ks = kinds("x // hi\ny");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Comment("// hi".into()),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_do_not_leak_braces_to_the_scanner() {
        let ks = kinds(r#""{ not a brace }""#);
        assert_eq!(
            ks,
            vec![
                TokenKind::String("\"{ not a brace }\"".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_define_and_arrow_operators() {
        let ks = kinds("x := 1; f() => g()");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Sym(":="),
                TokenKind::Int("1".into()),
                TokenKind::Sym(";"),
                TokenKind::Ident("f".into()),
                TokenKind::Sym("("),
                TokenKind::Sym(")"),
                TokenKind::Sym("=>"),
                TokenKind::Ident("g".into()),
                TokenKind::Sym("("),
                TokenKind::Sym(")"),
                TokenKind::Eof,
            ]
        );
    }
}
