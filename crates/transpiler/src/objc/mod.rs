//! Objective-C frontend: scanner, declaration parser, and the raw parse
//! tree handed to intention collection.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod type_mapper;

pub use ast::*;
pub use lexer::{tokenize, LexError, Token};
pub use parser::{parse_objc_file, ParseError};
pub use type_mapper::{NullabilityContext, ObjcTypeMapper};
