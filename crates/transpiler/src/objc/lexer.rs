//! # Objective-C Token Scanner
//!
//! Hand-written scanner producing spanned tokens. Preprocessor lines are
//! captured whole (they are echoed into the output as comments, never
//! interpreted). `<` and `>` are always lexed singly so the parser can
//! read lightweight-generic clauses; the expression parser fuses adjacent
//! pairs back into shift operators.

use objswift_ast::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset}")]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    CharLit(char),
    /// A full `#…` line, verbatim.
    Preprocessor(String),

    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Arrow,
    Star,
    Caret,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Bang,
    Tilde,
    Plus,
    Minus,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Question,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(i, _)| i)
            .unwrap_or(self.source.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn run(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.offset();
            let Some(c) = self.peek() else {
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    span: Span::empty(start),
                });
                return Ok(tokens);
            };

            let token = match c {
                '#' => self.lex_preprocessor_line(),
                '"' => self.lex_string(start)?,
                '\'' => self.lex_char(start)?,
                c if c.is_ascii_digit() => self.lex_number(start)?,
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.lex_number(start)?
                }
                c if c.is_alphabetic() || c == '_' => self.lex_identifier(),
                _ => self.lex_punctuation(start)?,
            };
            let end = self.offset();
            tokens.push(SpannedToken {
                token,
                span: Span::new(start, end),
            });
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    while self.peek().is_some() {
                        if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn lex_preprocessor_line(&mut self) -> Token {
        let start = self.offset();
        loop {
            match self.peek() {
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.pos += 2;
                }
                Some('\n') | None => break,
                _ => {
                    self.pos += 1;
                }
            }
        }
        let end = self.offset();
        Token::Preprocessor(self.source[start..end].trim_end().to_string())
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.offset();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        Token::Ident(self.source[start..self.offset()].to_string())
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, LexError> {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) {
            self.pos += 2;
            let digits_start = self.offset();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits = &self.source[digits_start..self.offset()];
            let value = i64::from_str_radix(digits, 16)
                .map_err(|_| LexError {
                    message: format!("invalid hexadecimal literal '0x{}'", digits),
                    offset: start,
                })?;
            self.skip_int_suffix();
            return Ok(Token::IntLit(value));
        }

        let mut is_float = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        } else if self.peek() == Some('.') && !matches!(self.peek_at(1), Some('.')) {
            // `1.` style
            is_float = true;
            self.pos += 1;
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += lookahead;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.source[start..self.offset()];
        let token = if is_float || matches!(self.peek(), Some('f') | Some('F')) {
            let value = text.parse::<f64>().map_err(|_| LexError {
                message: format!("invalid float literal '{}'", text),
                offset: start,
            })?;
            Token::FloatLit(value)
        } else {
            let value = text.parse::<i64>().map_err(|_| LexError {
                message: format!("invalid integer literal '{}'", text),
                offset: start,
            })?;
            Token::IntLit(value)
        };
        self.skip_float_suffix();
        self.skip_int_suffix();
        Ok(token)
    }

    fn skip_int_suffix(&mut self) {
        while matches!(self.peek(), Some('u') | Some('U') | Some('l') | Some('L')) {
            self.pos += 1;
        }
    }

    fn skip_float_suffix(&mut self) {
        while matches!(self.peek(), Some('f') | Some('F')) {
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::StringLit(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some(c) => value.push(c),
                    None => {
                        return Err(LexError {
                            message: "unterminated string literal".into(),
                            offset: start,
                        })
                    }
                },
                Some('\n') | None => {
                    return Err(LexError {
                        message: "unterminated string literal".into(),
                        offset: start,
                    })
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn lex_char(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 1; // opening quote
        let c = match self.bump() {
            Some('\\') => match self.bump() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('0') => '\0',
                Some(c) => c,
                None => {
                    return Err(LexError {
                        message: "unterminated character literal".into(),
                        offset: start,
                    })
                }
            },
            Some(c) if c != '\'' => c,
            _ => {
                return Err(LexError {
                    message: "empty character literal".into(),
                    offset: start,
                })
            }
        };
        if self.bump() != Some('\'') {
            return Err(LexError {
                message: "unterminated character literal".into(),
                offset: start,
            });
        }
        Ok(Token::CharLit(c))
    }

    fn lex_punctuation(&mut self, start: usize) -> Result<Token, LexError> {
        let c = self.bump().unwrap();
        let two = |lexer: &mut Self, next: char, matched: Token, single: Token| {
            if lexer.peek() == Some(next) {
                lexer.pos += 1;
                matched
            } else {
                single
            }
        };

        let token = match c {
            '@' => Token::At,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ';' => Token::Semi,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '.' => {
                if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                    self.pos += 2;
                    Token::Ellipsis
                } else {
                    Token::Dot
                }
            }
            '?' => Token::Question,
            '^' => Token::Caret,
            '~' => Token::Tilde,
            '%' => Token::Percent,
            '*' => two(self, '=', Token::StarAssign, Token::Star),
            '/' => two(self, '=', Token::SlashAssign, Token::Slash),
            '&' => two(self, '&', Token::AmpAmp, Token::Amp),
            '|' => two(self, '|', Token::PipePipe, Token::Pipe),
            '!' => two(self, '=', Token::NotEq, Token::Bang),
            '=' => two(self, '=', Token::Eq, Token::Assign),
            '<' => two(self, '=', Token::Le, Token::Lt),
            '>' => two(self, '=', Token::Ge, Token::Gt),
            '+' => match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    Token::PlusPlus
                }
                Some('=') => {
                    self.pos += 1;
                    Token::PlusAssign
                }
                _ => Token::Plus,
            },
            '-' => match self.peek() {
                Some('-') => {
                    self.pos += 1;
                    Token::MinusMinus
                }
                Some('=') => {
                    self.pos += 1;
                    Token::MinusAssign
                }
                Some('>') => {
                    self.pos += 1;
                    Token::Arrow
                }
                _ => Token::Minus,
            },
            other => {
                return Err(LexError {
                    message: format!("unexpected character '{}'", other),
                    offset: start,
                })
            }
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn scans_interface_header() {
        let tokens = kinds("@interface MyView : UIView <NSCopying>");
        assert_eq!(
            tokens,
            vec![
                Token::At,
                Token::Ident("interface".into()),
                Token::Ident("MyView".into()),
                Token::Colon,
                Token::Ident("UIView".into()),
                Token::Lt,
                Token::Ident("NSCopying".into()),
                Token::Gt,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn scans_numbers() {
        assert_eq!(
            kinds("42 2.5 0x1F 1e3 10UL 1.5f"),
            vec![
                Token::IntLit(42),
                Token::FloatLit(2.5),
                Token::IntLit(31),
                Token::FloatLit(1000.0),
                Token::IntLit(10),
                Token::FloatLit(1.5),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn captures_preprocessor_lines() {
        let tokens = kinds("#import <UIKit/UIKit.h>\nint x;");
        assert_eq!(tokens[0], Token::Preprocessor("#import <UIKit/UIKit.h>".into()));
        assert_eq!(tokens[1], Token::Ident("int".into()));
    }

    #[test]
    fn skips_comments() {
        let tokens = kinds("a // trailing\n/* block\nspanning */ b");
        assert_eq!(
            tokens,
            vec![Token::Ident("a".into()), Token::Ident("b".into()), Token::Eof]
        );
    }

    #[test]
    fn strings_unescape() {
        assert_eq!(
            kinds(r#""hi\nthere""#),
            vec![Token::StringLit("hi\nthere".into()), Token::Eof]
        );
    }

    #[test]
    fn spans_point_into_source() {
        let source = "foo bar";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[1].span.slice(source), "bar");
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = tokenize("\"oops").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.offset, 0);
    }
}
