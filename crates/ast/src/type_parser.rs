//! # Swift Type Grammar Parser
//!
//! A pure function from source text to [`SwiftType`]:
//!
//! ```text
//! type          := primary ('?' | '!' | '.Type' | '.Protocol')*
//! primary       := nominal | tupleOrBlock | array | dictionary
//! nominal       := IDENT genericClause? ('.' nominal)?
//! genericClause := '<' type (',' type)* '>'
//! tupleOrBlock  := '(' [elem (',' elem)* ['...']] ')' ['->' type]
//! elem          := [IDENT [IDENT] ':'] attr* ['inout'] type
//! attr          := '@' IDENT ['(' … ')']
//! array         := '[' type ']'
//! dictionary    := '[' type ':' type ']'
//! protoComp     := nominal ('&' nominal)+
//! ```
//!
//! A parenthesized single element is not a tuple; labels and attributes in a
//! block parameter list do not affect the parameter type; `...` on the last
//! parameter produces `[T]` and demands a following `->`; bare `Void` is the
//! empty tuple.

use crate::swift_type::{CompositionMember, NominalSwiftType, SwiftType, TupleSwiftType};
use thiserror::Error;

/// Failure to parse a Swift type string. The column is a 0-based character
/// index into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at column {column}")]
pub struct TypeParseError {
    pub message: String,
    pub column: usize,
}

impl TypeParseError {
    fn new(message: impl Into<String>, column: usize) -> Self {
        Self {
            message: message.into(),
            column,
        }
    }
}

/// Parse a Swift type from its textual description.
pub fn parse_swift_type(source: &str) -> Result<SwiftType, TypeParseError> {
    let mut parser = TypeParser::new(source);
    parser.skip_whitespace();
    let ty = parser.parse_type()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(TypeParseError::new(
            format!("unexpected character '{}'", c),
            parser.pos,
        ));
    }
    Ok(ty)
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeParseError> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(TypeParseError::new(format!("expected '{}'", expected), self.pos))
        }
    }

    fn at_arrow(&mut self) -> bool {
        self.skip_whitespace();
        self.peek() == Some('-') && self.peek_at(1) == Some('>')
    }

    fn eat_arrow(&mut self) -> bool {
        if self.at_arrow() {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn at_ellipsis(&mut self) -> bool {
        self.skip_whitespace();
        self.peek() == Some('.') && self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.')
    }

    fn at_identifier(&mut self) -> bool {
        self.skip_whitespace();
        matches!(self.peek(), Some(c) if c.is_alphabetic() || c == '_')
    }

    fn lex_identifier(&mut self) -> Result<String, TypeParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(TypeParseError::new("expected identifier", start));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    // type := suffixed ('&' member)*
    fn parse_type(&mut self) -> Result<SwiftType, TypeParseError> {
        let column = self.pos;
        let first = self.parse_suffixed()?;

        self.skip_whitespace();
        if self.peek() != Some('&') {
            return Ok(first);
        }

        let mut members = vec![Self::composition_member(first, column)?];
        while self.eat('&') {
            let column = self.pos;
            let next = self.parse_suffixed()?;
            members.push(Self::composition_member(next, column)?);
        }
        Ok(SwiftType::ProtocolComposition(members))
    }

    fn composition_member(
        ty: SwiftType,
        column: usize,
    ) -> Result<CompositionMember, TypeParseError> {
        match ty {
            SwiftType::Nominal(n) => Ok(CompositionMember::Nominal(n)),
            SwiftType::Nested(path) => Ok(CompositionMember::Nested(path)),
            _ => Err(TypeParseError::new(
                "expected nominal type in protocol composition",
                column,
            )),
        }
    }

    // suffixed := primary ('?' | '!' | '.Type' | '.Protocol')*
    fn parse_suffixed(&mut self) -> Result<SwiftType, TypeParseError> {
        let mut ty = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('?') => {
                    self.pos += 1;
                    ty = SwiftType::Optional(Box::new(ty));
                }
                Some('!') => {
                    self.pos += 1;
                    ty = SwiftType::ImplicitUnwrappedOptional(Box::new(ty));
                }
                Some('.') => {
                    if self.at_ellipsis() {
                        break;
                    }
                    let saved = self.pos;
                    self.pos += 1;
                    match self.lex_identifier() {
                        Ok(word) if word == "Type" || word == "Protocol" => {
                            ty = SwiftType::Metatype(Box::new(ty));
                        }
                        _ => {
                            self.pos = saved;
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(ty)
    }

    fn parse_primary(&mut self) -> Result<SwiftType, TypeParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => self.parse_tuple_or_block(),
            Some('[') => self.parse_collection(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_nominal_path(),
            Some(c) => Err(TypeParseError::new(
                format!("expected type, found '{}'", c),
                self.pos,
            )),
            None => Err(TypeParseError::new("expected type, found end of input", self.pos)),
        }
    }

    // nominal := IDENT genericClause? ('.' nominal)?
    fn parse_nominal_path(&mut self) -> Result<SwiftType, TypeParseError> {
        let mut path = Vec::new();
        loop {
            let name = self.lex_identifier()?;
            self.skip_whitespace();
            let nominal = if self.peek() == Some('<') {
                self.pos += 1;
                let mut args = vec![self.parse_type()?];
                while self.eat(',') {
                    args.push(self.parse_type()?);
                }
                self.expect('>')?;
                NominalSwiftType::Generic(name.as_str().into(), args)
            } else {
                NominalSwiftType::TypeName(name.as_str().into())
            };
            path.push(nominal);

            // A following '.' continues the path unless it introduces a
            // metatype suffix or an ellipsis.
            self.skip_whitespace();
            if self.peek() != Some('.') || self.at_ellipsis() {
                break;
            }
            let saved = self.pos;
            self.pos += 1;
            match self.lex_identifier() {
                Ok(word) if word == "Type" || word == "Protocol" => {
                    self.pos = saved;
                    break;
                }
                Ok(_) => {
                    // Re-enter the loop just past the dot.
                    self.pos = saved + 1;
                    continue;
                }
                Err(_) => {
                    self.pos = saved;
                    break;
                }
            }
        }

        if path.len() == 1 {
            let only = path.into_iter().next().unwrap();
            if let NominalSwiftType::TypeName(name) = &only {
                if *name == "Void" {
                    return Ok(SwiftType::Tuple(TupleSwiftType::Empty));
                }
            }
            Ok(SwiftType::Nominal(only))
        } else {
            Ok(SwiftType::Nested(path))
        }
    }

    // array := '[' type ']' ; dictionary := '[' type ':' type ']'
    fn parse_collection(&mut self) -> Result<SwiftType, TypeParseError> {
        self.expect('[')?;
        let first = self.parse_type()?;
        if self.eat(':') {
            let value = self.parse_type()?;
            self.expect(']')?;
            Ok(SwiftType::dictionary_of(first, value))
        } else {
            self.expect(']')?;
            Ok(SwiftType::array_of(first))
        }
    }

    // tupleOrBlock := '(' [elem (',' elem)* ['...']] ')' ['->' type]
    fn parse_tuple_or_block(&mut self) -> Result<SwiftType, TypeParseError> {
        self.expect('(')?;
        let mut elements = Vec::new();
        let mut variadic = false;

        self.skip_whitespace();
        if self.peek() != Some(')') {
            loop {
                elements.push(self.parse_element()?);
                if self.at_ellipsis() {
                    self.pos += 3;
                    variadic = true;
                    break;
                }
                if !self.eat(',') {
                    break;
                }
            }
        }
        self.expect(')')?;

        if self.eat_arrow() {
            if variadic {
                if let Some(last) = elements.pop() {
                    elements.push(SwiftType::array_of(last));
                }
            }
            let return_type = self.parse_type()?;
            return Ok(SwiftType::block(return_type, elements));
        }

        if variadic {
            return Err(TypeParseError::new("expected block type", self.pos));
        }

        match elements.len() {
            0 => Ok(SwiftType::Tuple(TupleSwiftType::Empty)),
            // A parenthesized single element is the element itself.
            1 => Ok(elements.into_iter().next().unwrap()),
            _ => Ok(SwiftType::Tuple(TupleSwiftType::Types(elements))),
        }
    }

    // elem := [IDENT [IDENT] ':'] attr* ['inout'] type
    fn parse_element(&mut self) -> Result<SwiftType, TypeParseError> {
        self.skip_label();

        // Attributes such as `@escaping` or `@autoclosure(escaping)`.
        loop {
            self.skip_whitespace();
            if self.peek() != Some('@') {
                break;
            }
            self.pos += 1;
            self.lex_identifier()?;
            self.skip_whitespace();
            if self.peek() == Some('(') {
                self.skip_balanced_parens()?;
            }
        }

        // `inout` does not change the stored parameter type.
        if self.at_identifier() {
            let saved = self.pos;
            let word = self.lex_identifier()?;
            if word != "inout" {
                self.pos = saved;
            }
        }

        self.parse_type()
    }

    /// Skip `label:` or `outer inner:` prefixes; restores position when the
    /// identifiers turn out to begin a type instead.
    fn skip_label(&mut self) {
        if !self.at_identifier() {
            return;
        }
        let saved = self.pos;
        if self.lex_identifier().is_err() {
            self.pos = saved;
            return;
        }
        if self.at_identifier() && self.lex_identifier().is_err() {
            self.pos = saved;
            return;
        }
        self.skip_whitespace();
        if self.peek() == Some(':') {
            self.pos += 1;
        } else {
            self.pos = saved;
        }
    }

    fn skip_balanced_parens(&mut self) -> Result<(), TypeParseError> {
        let open_column = self.pos;
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Some('(') => depth += 1,
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(TypeParseError::new("unbalanced '('", open_column));
                }
            }
        }
    }
}
