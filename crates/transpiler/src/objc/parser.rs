//! # Objective-C Declaration Parser
//!
//! Recursive descent over the token stream, producing the per-file parse
//! tree consumed by intention collection. The grammar is the practical
//! header/implementation subset: interfaces, categories, protocols,
//! properties, methods with bodies, NS_ENUM/NS_OPTIONS, typedefs, globals,
//! and C statement/expression syntax including message sends.
//!
//! `NS_ASSUME_NONNULL_BEGIN`/`_END` pairs are tracked as a region counter;
//! every produced declaration records whether it was inside a region.

use super::ast::*;
use super::lexer::{tokenize, SpannedToken, Token};
use objswift_ast::{Location, Name, ObjcType, Operator, SourceFile, SourceRef};
use thiserror::Error;

/// Surface-syntax failure. Fatal for the offending file only.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{file}:{}:{}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub file: String,
    pub location: Location,
    pub message: String,
}

impl ParseError {
    pub fn source_ref(&self) -> SourceRef {
        SourceRef::new(self.file.clone(), self.location)
    }
}

/// Parse one Objective-C source file.
pub fn parse_objc_file(file: &SourceFile) -> Result<ObjcFile, ParseError> {
    let tokens = tokenize(&file.content).map_err(|e| ParseError {
        file: file.name.clone(),
        location: file.location_of(e.offset),
        message: e.message,
    })?;
    Parser::new(file, tokens).parse_file()
}

struct Parser<'a> {
    file: &'a SourceFile,
    tokens: Vec<SpannedToken>,
    pos: usize,
    nonnull_depth: usize,
    preprocessor: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(file: &'a SourceFile, tokens: Vec<SpannedToken>) -> Self {
        Self {
            file,
            tokens,
            pos: 0,
            nonnull_depth: 0,
            preprocessor: Vec::new(),
        }
    }

    // Token plumbing

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    fn location(&self) -> Location {
        let span = self.tokens[self.pos.min(self.tokens.len() - 1)].span;
        self.file.location_of(span.start)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if !matches!(token, Token::Eof) {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.name.clone(),
            location: self.location(),
            message: message.into(),
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.peek() == &token {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", token, self.peek())))
        }
    }

    fn ident_text(&self) -> Option<&str> {
        match self.peek() {
            Token::Ident(text) => Some(text),
            _ => None,
        }
    }

    fn check_ident(&self, expected: &str) -> bool {
        self.ident_text() == Some(expected)
    }

    fn eat_ident(&mut self, expected: &str) -> bool {
        if self.check_ident(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Token::Ident(text) => Ok(text),
            other => Err(ParseError {
                file: self.file.name.clone(),
                location: self.file.location_of(self.tokens[self.pos.saturating_sub(1)].span.start),
                message: format!("expected identifier, found {:?}", other),
            }),
        }
    }

    fn in_nonnull(&self) -> bool {
        self.nonnull_depth > 0
    }

    /// Consume preprocessor lines and nonnull-region markers; returns true
    /// when anything was consumed.
    fn eat_trivia_decls(&mut self) -> bool {
        let mut any = false;
        loop {
            match self.peek() {
                Token::Preprocessor(line) => {
                    let line = line.clone();
                    self.preprocessor.push(line);
                    self.pos += 1;
                    any = true;
                }
                Token::Ident(id) if id == "NS_ASSUME_NONNULL_BEGIN" => {
                    self.nonnull_depth += 1;
                    self.pos += 1;
                    any = true;
                }
                Token::Ident(id) if id == "NS_ASSUME_NONNULL_END" => {
                    self.nonnull_depth = self.nonnull_depth.saturating_sub(1);
                    self.pos += 1;
                    any = true;
                }
                Token::Semi => {
                    self.pos += 1;
                    any = true;
                }
                _ => return any,
            }
        }
    }

    // File structure

    fn parse_file(mut self) -> Result<ObjcFile, ParseError> {
        let mut declarations = Vec::new();

        while !self.at_eof() {
            if self.eat_trivia_decls() {
                continue;
            }
            let location = self.location();
            let in_nonnull_region = self.in_nonnull();

            let kind = match self.peek() {
                Token::At => match self.parse_at_declaration()? {
                    Some(kind) => kind,
                    None => continue, // @class forward declarations
                },
                Token::Ident(id) if id == "typedef" => self.parse_typedef()?,
                Token::Ident(id) if id == "NS_ENUM" || id == "NS_OPTIONS" => {
                    let is_options = id == "NS_OPTIONS";
                    self.pos += 1;
                    ObjcDeclKind::Enum(self.parse_enum_body(is_options)?)
                }
                Token::Ident(_) => self.parse_global_or_function()?,
                other => {
                    return Err(self.error(format!("unexpected token {:?} at file scope", other)))
                }
            };

            declarations.push(ObjcDecl {
                kind,
                location,
                in_nonnull_region,
            });
        }

        Ok(ObjcFile {
            name: self.file.name.clone(),
            preprocessor_directives: self.preprocessor,
            declarations,
        })
    }

    fn parse_at_declaration(&mut self) -> Result<Option<ObjcDeclKind>, ParseError> {
        self.expect(Token::At)?;
        let keyword = self.expect_ident()?;
        match keyword.as_str() {
            "interface" => self.parse_interface().map(Some),
            "implementation" => self.parse_implementation().map(Some),
            "protocol" => self.parse_protocol().map(Some),
            "class" => {
                // `@class A, B;` forward declaration
                while !matches!(self.peek(), Token::Semi | Token::Eof) {
                    self.pos += 1;
                }
                self.eat(&Token::Semi);
                Ok(None)
            }
            other => Err(self.error(format!("unexpected @{} at file scope", other))),
        }
    }

    fn parse_protocol_list(&mut self) -> Result<Vec<Name>, ParseError> {
        let mut protocols = Vec::new();
        if self.eat(&Token::Lt) {
            loop {
                protocols.push(Name::new(self.expect_ident()?));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Gt)?;
        }
        Ok(protocols)
    }

    fn parse_interface(&mut self) -> Result<ObjcDeclKind, ParseError> {
        let name = Name::new(self.expect_ident()?);

        if self.eat(&Token::LParen) {
            // Class extension `()` or named category `(Name)`.
            let category_name = match self.ident_text() {
                Some(_) => Some(Name::new(self.expect_ident()?)),
                None => None,
            };
            self.expect(Token::RParen)?;
            let protocols = self.parse_protocol_list()?;
            let ivars = if self.peek() == &Token::LBrace {
                self.parse_ivar_block()?
            } else {
                Vec::new()
            };
            let members = self.parse_members()?;
            return Ok(ObjcDeclKind::Category(ObjcCategoryDecl {
                class_name: name,
                category_name,
                protocols,
                ivars,
                properties: members.properties,
                methods: members.methods,
            }));
        }

        let superclass = if self.eat(&Token::Colon) {
            Some(Name::new(self.expect_ident()?))
        } else {
            None
        };
        let protocols = self.parse_protocol_list()?;
        let ivars = if self.peek() == &Token::LBrace {
            self.parse_ivar_block()?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;

        Ok(ObjcDeclKind::ClassInterface(ObjcClassDecl {
            name,
            superclass,
            protocols,
            category_name: None,
            ivars,
            properties: members.properties,
            methods: members.methods,
            statics: members.statics,
        }))
    }

    fn parse_implementation(&mut self) -> Result<ObjcDeclKind, ParseError> {
        let name = Name::new(self.expect_ident()?);
        let category_name = if self.eat(&Token::LParen) {
            let category = Name::new(self.expect_ident()?);
            self.expect(Token::RParen)?;
            Some(category)
        } else {
            None
        };
        let ivars = if self.peek() == &Token::LBrace {
            self.parse_ivar_block()?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;

        Ok(ObjcDeclKind::ClassImplementation(ObjcClassDecl {
            name,
            superclass: None,
            protocols: Vec::new(),
            category_name,
            ivars,
            properties: members.properties,
            methods: members.methods,
            statics: members.statics,
        }))
    }

    fn parse_protocol(&mut self) -> Result<ObjcDeclKind, ParseError> {
        let name = Name::new(self.expect_ident()?);

        // `@protocol P;` forward declaration parses to an empty protocol.
        if self.eat(&Token::Semi) {
            return Ok(ObjcDeclKind::Protocol(ObjcProtocolDecl {
                name,
                protocols: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
            }));
        }

        let protocols = self.parse_protocol_list()?;
        let members = self.parse_members()?;

        Ok(ObjcDeclKind::Protocol(ObjcProtocolDecl {
            name,
            protocols,
            properties: members.properties,
            methods: members.methods,
        }))
    }

    fn parse_ivar_block(&mut self) -> Result<Vec<ObjcIvarDecl>, ParseError> {
        self.expect(Token::LBrace)?;
        let mut visibility = ObjcVisibility::Private;
        let mut ivars = Vec::new();

        while !self.eat(&Token::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated instance variable block"));
            }
            if self.eat(&Token::At) {
                visibility = match self.expect_ident()?.as_str() {
                    "private" => ObjcVisibility::Private,
                    "protected" => ObjcVisibility::Protected,
                    "package" => ObjcVisibility::Package,
                    "public" => ObjcVisibility::Public,
                    other => {
                        return Err(self.error(format!("unknown visibility section @{}", other)))
                    }
                };
                continue;
            }

            let location = self.location();
            let (ty, first_name) = self.parse_declarator()?;
            let mut names = vec![match first_name {
                Some(name) => name,
                None => Name::new(self.expect_ident()?),
            }];
            while self.eat(&Token::Comma) {
                names.push(Name::new(self.expect_ident()?));
            }
            self.expect(Token::Semi)?;

            for name in names {
                ivars.push(ObjcIvarDecl {
                    name,
                    ty: ty.clone(),
                    visibility,
                    location,
                });
            }
        }
        Ok(ivars)
    }

    // Members between an @interface-like header and @end

    fn parse_members(&mut self) -> Result<MemberList, ParseError> {
        let mut members = MemberList::default();
        let mut optional_section = false;

        loop {
            self.eat_trivia_decls();
            match self.peek() {
                Token::Eof => return Err(self.error("expected @end")),
                Token::At => match self.peek_at(1) {
                    Token::Ident(id) if id == "end" => {
                        self.pos += 2;
                        return Ok(members);
                    }
                    Token::Ident(id) if id == "property" => {
                        self.pos += 2;
                        let mut property = self.parse_property()?;
                        property.is_optional = optional_section;
                        members.properties.push(property);
                    }
                    Token::Ident(id) if id == "optional" => {
                        self.pos += 2;
                        optional_section = true;
                    }
                    Token::Ident(id) if id == "required" => {
                        self.pos += 2;
                        optional_section = false;
                    }
                    Token::Ident(id) if id == "synthesize" || id == "dynamic" => {
                        self.pos += 2;
                        while !matches!(self.peek(), Token::Semi | Token::Eof) {
                            self.pos += 1;
                        }
                        self.eat(&Token::Semi);
                    }
                    other => {
                        return Err(self.error(format!("unexpected @{:?} in declaration", other)))
                    }
                },
                Token::Plus | Token::Minus => {
                    let mut method = self.parse_method()?;
                    method.is_optional = optional_section;
                    members.methods.push(method);
                }
                Token::Ident(id) if id == "static" => {
                    let location = self.location();
                    let in_nonnull_region = self.in_nonnull();
                    self.pos += 1;
                    let (ty, name) = self.parse_declarator()?;
                    let name = match name {
                        Some(name) => name,
                        None => Name::new(self.expect_ident()?),
                    };
                    let initializer = if self.eat(&Token::Assign) {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    self.expect(Token::Semi)?;
                    members.statics.push(ObjcVarDecl {
                        name,
                        ty,
                        is_static: true,
                        initializer,
                        location,
                        in_nonnull_region,
                    });
                }
                other => return Err(self.error(format!("unexpected token {:?} in declaration", other))),
            }
        }
    }

    fn parse_property(&mut self) -> Result<ObjcPropertyDecl, ParseError> {
        let location = self.location();
        let in_nonnull_region = self.in_nonnull();
        let mut attributes = Vec::new();

        if self.eat(&Token::LParen) {
            loop {
                let attr = self.expect_ident()?;
                let attribute = match attr.as_str() {
                    "weak" => ObjcPropertyAttribute::Weak,
                    "assign" => ObjcPropertyAttribute::Assign,
                    "strong" => ObjcPropertyAttribute::Strong,
                    "retain" => ObjcPropertyAttribute::Retain,
                    "copy" => ObjcPropertyAttribute::Copy,
                    "readonly" => ObjcPropertyAttribute::Readonly,
                    "readwrite" => ObjcPropertyAttribute::Readwrite,
                    "nonatomic" => ObjcPropertyAttribute::Nonatomic,
                    "atomic" => ObjcPropertyAttribute::Atomic,
                    "nullable" => ObjcPropertyAttribute::Nullable,
                    "nonnull" => ObjcPropertyAttribute::Nonnull,
                    "class" => ObjcPropertyAttribute::Class,
                    "getter" => {
                        self.expect(Token::Assign)?;
                        ObjcPropertyAttribute::Getter(Name::new(self.expect_ident()?))
                    }
                    "setter" => {
                        self.expect(Token::Assign)?;
                        let name = self.expect_ident()?;
                        self.eat(&Token::Colon);
                        ObjcPropertyAttribute::Setter(Name::new(name))
                    }
                    other => ObjcPropertyAttribute::Other(Name::new(other)),
                };
                attributes.push(attribute);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }

        let (ty, name) = self.parse_declarator()?;
        let name = match name {
            Some(name) => name,
            None => Name::new(self.expect_ident()?),
        };
        self.expect(Token::Semi)?;

        Ok(ObjcPropertyDecl {
            name,
            ty,
            attributes,
            is_optional: false,
            location,
            in_nonnull_region,
        })
    }

    fn parse_method(&mut self) -> Result<ObjcMethodDecl, ParseError> {
        let location = self.location();
        let in_nonnull_region = self.in_nonnull();
        let is_class_method = matches!(self.bump(), Token::Plus);

        self.expect(Token::LParen)?;
        let (return_type, _) = self.parse_declarator()?;
        self.expect(Token::RParen)?;

        let mut pieces = Vec::new();
        let first_keyword = Name::new(self.expect_ident()?);
        if self.eat(&Token::Colon) {
            pieces.push(ObjcSelectorPiece {
                keyword: first_keyword,
                argument: Some(self.parse_method_parameter()?),
            });
            while let Token::Ident(_) = self.peek() {
                if self.peek_at(1) != &Token::Colon {
                    break;
                }
                let keyword = Name::new(self.expect_ident()?);
                self.expect(Token::Colon)?;
                pieces.push(ObjcSelectorPiece {
                    keyword,
                    argument: Some(self.parse_method_parameter()?),
                });
            }
        } else {
            pieces.push(ObjcSelectorPiece {
                keyword: first_keyword,
                argument: None,
            });
        }

        // Trailing annotation macros such as NS_DESIGNATED_INITIALIZER.
        while let Token::Ident(_) = self.peek() {
            self.pos += 1;
        }

        let body = if self.peek() == &Token::LBrace {
            Some(self.parse_compound()?)
        } else {
            self.expect(Token::Semi)?;
            None
        };

        Ok(ObjcMethodDecl {
            is_class_method,
            return_type,
            pieces,
            body,
            is_optional: false,
            location,
            in_nonnull_region,
        })
    }

    fn parse_method_parameter(&mut self) -> Result<ObjcMethodParam, ParseError> {
        self.expect(Token::LParen)?;
        let (ty, _) = self.parse_declarator()?;
        self.expect(Token::RParen)?;
        let name = Name::new(self.expect_ident()?);
        Ok(ObjcMethodParam { ty, name })
    }

    // Typedefs, enums, structs

    fn parse_typedef(&mut self) -> Result<ObjcDeclKind, ParseError> {
        self.expect(Token::Ident("typedef".into()))?;

        if self.check_ident("NS_ENUM") || self.check_ident("NS_OPTIONS") {
            let is_options = self.check_ident("NS_OPTIONS");
            self.pos += 1;
            return Ok(ObjcDeclKind::Enum(self.parse_enum_body(is_options)?));
        }

        if self.check_ident("struct") {
            // `typedef struct [Tag] { fields } Name;`
            let saved = self.pos;
            self.pos += 1;
            if let Token::Ident(_) = self.peek() {
                self.pos += 1;
            }
            if self.peek() == &Token::LBrace {
                let fields = self.parse_struct_fields()?;
                let name = Name::new(self.expect_ident()?);
                self.expect(Token::Semi)?;
                return Ok(ObjcDeclKind::Struct(ObjcStructDecl { name, fields }));
            }
            self.pos = saved;
        }

        // Block, function-pointer, or plain alias.
        let (ty, declared_name) = self.parse_declarator()?;
        let name = match declared_name {
            Some(name) => name,
            None => Name::new(self.expect_ident()?),
        };
        self.expect(Token::Semi)?;
        Ok(ObjcDeclKind::Typedef(ObjcTypedefDecl { name, ty }))
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<(Name, ObjcType)>, ParseError> {
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated struct body"));
            }
            let (ty, first_name) = self.parse_declarator()?;
            let mut names = vec![match first_name {
                Some(name) => name,
                None => Name::new(self.expect_ident()?),
            }];
            while self.eat(&Token::Comma) {
                names.push(Name::new(self.expect_ident()?));
            }
            self.expect(Token::Semi)?;
            for name in names {
                fields.push((name, ty.clone()));
            }
        }
        Ok(fields)
    }

    fn parse_enum_body(&mut self, is_options: bool) -> Result<ObjcEnumDecl, ParseError> {
        self.expect(Token::LParen)?;
        let (raw_type, _) = self.parse_declarator()?;
        self.expect(Token::Comma)?;
        let name = Name::new(self.expect_ident()?);
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;

        let mut cases = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated enum body"));
            }
            let case_name = Name::new(self.expect_ident()?);
            let value = if self.eat(&Token::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            cases.push(ObjcEnumCase {
                name: case_name,
                value,
            });
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace)?;
                break;
            }
        }
        self.eat(&Token::Semi);

        Ok(ObjcEnumDecl {
            name,
            raw_type,
            is_options,
            cases,
        })
    }

    // Globals and free functions

    fn parse_global_or_function(&mut self) -> Result<ObjcDeclKind, ParseError> {
        let location = self.location();
        let in_nonnull_region = self.in_nonnull();
        let is_static = self.eat_ident("static");
        self.eat_ident("extern");
        self.eat_ident("FOUNDATION_EXPORT");

        let (ty, declared_name) = self.parse_declarator()?;
        let name = match declared_name {
            Some(name) => name,
            None => Name::new(self.expect_ident()?),
        };

        if self.peek() == &Token::LParen {
            // C free function.
            self.pos += 1;
            let mut parameters = Vec::new();
            if self.peek() != &Token::RParen {
                loop {
                    if self.eat(&Token::Ellipsis) {
                        break;
                    }
                    let (param_ty, param_name) = self.parse_declarator()?;
                    if param_ty == ObjcType::Void && param_name.is_none() {
                        break;
                    }
                    let param_name = match param_name {
                        Some(name) => name,
                        None => match self.ident_text() {
                            Some(_) => Name::new(self.expect_ident()?),
                            None => Name::new(format!("arg{}", parameters.len())),
                        },
                    };
                    parameters.push(ObjcMethodParam {
                        ty: param_ty,
                        name: param_name,
                    });
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::RParen)?;

            let body = if self.peek() == &Token::LBrace {
                Some(self.parse_compound()?)
            } else {
                self.expect(Token::Semi)?;
                None
            };

            return Ok(ObjcDeclKind::Function(ObjcFunctionDecl {
                name,
                return_type: ty,
                parameters,
                body,
                location,
                in_nonnull_region,
            }));
        }

        let ty = if self.peek() == &Token::LBracket {
            self.pos += 1;
            let len = match self.bump() {
                Token::IntLit(len) if len >= 0 => len as usize,
                other => return Err(self.error(format!("expected array length, found {:?}", other))),
            };
            self.expect(Token::RBracket)?;
            ObjcType::FixedArray(Box::new(ty), len)
        } else {
            ty
        };

        let initializer = if self.eat(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(Token::Semi)?;

        Ok(ObjcDeclKind::GlobalVariable(ObjcVarDecl {
            name,
            ty,
            is_static,
            initializer,
            location,
            in_nonnull_region,
        }))
    }

    // Types

    const TYPE_WORDS: &'static [&'static str] = &[
        "unsigned", "signed", "long", "short", "int", "char", "float", "double",
    ];

    const SPECIFIERS: &'static [&'static str] =
        &["__weak", "__block", "__strong", "__unsafe_unretained"];

    const QUALIFIERS: &'static [&'static str] = &[
        "const", "volatile", "_Nonnull", "_Nullable", "_Null_unspecified", "__nonnull",
        "__nullable",
    ];

    /// Parse a type plus the declared name when the declarator carries one
    /// (block and function-pointer forms do).
    fn parse_declarator(&mut self) -> Result<(ObjcType, Option<Name>), ParseError> {
        let mut specifiers: Vec<Name> = Vec::new();
        let mut qualifiers: Vec<Name> = Vec::new();
        loop {
            match self.ident_text() {
                Some(id) if Self::SPECIFIERS.contains(&id) => {
                    specifiers.push(Name::new(id));
                    self.pos += 1;
                }
                Some(id) if Self::QUALIFIERS.contains(&id) => {
                    qualifiers.push(Name::new(id));
                    self.pos += 1;
                }
                _ => break,
            }
        }

        let mut base = self.parse_base_type()?;

        // Pointer and postfix-qualifier layers.
        loop {
            match self.peek() {
                Token::Star => {
                    self.pos += 1;
                    base = ObjcType::pointer_to(base);
                }
                Token::Ident(id) if Self::QUALIFIERS.contains(&id.as_str()) => {
                    let qualifier = Name::new(id.clone());
                    self.pos += 1;
                    base = ObjcType::qualified(base, vec![qualifier]);
                }
                Token::Ident(id) if Self::SPECIFIERS.contains(&id.as_str()) => {
                    let specifier = Name::new(id.clone());
                    self.pos += 1;
                    base = ObjcType::specified(vec![specifier], base);
                }
                _ => break,
            }
        }

        // Block / function-pointer declarator: `R (^name)(P…)` / `R (*name)(P…)`.
        let mut declared_name = None;
        if self.peek() == &Token::LParen
            && matches!(self.peek_at(1), Token::Caret | Token::Star)
        {
            let is_block = self.peek_at(1) == &Token::Caret;
            self.pos += 2;
            if let Token::Ident(_) = self.peek() {
                declared_name = Some(Name::new(self.expect_ident()?));
            }
            self.expect(Token::RParen)?;
            self.expect(Token::LParen)?;
            let mut parameters = Vec::new();
            if self.peek() != &Token::RParen {
                loop {
                    let (param_ty, _) = self.parse_declarator()?;
                    if param_ty == ObjcType::Void && parameters.is_empty() {
                        break;
                    }
                    // Parameter names are irrelevant to the type.
                    if let Token::Ident(_) = self.peek() {
                        self.pos += 1;
                    }
                    parameters.push(param_ty);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::RParen)?;
            let ctor = if is_block {
                ObjcType::Block {
                    name: declared_name,
                    return_type: Box::new(base),
                    parameters,
                }
            } else {
                ObjcType::FunctionPointer {
                    name: declared_name,
                    return_type: Box::new(base),
                    parameters,
                }
            };
            base = ctor;
        }

        let ty = ObjcType::specified(specifiers, ObjcType::qualified(base, qualifiers)).normalized();
        Ok((ty, declared_name))
    }

    fn parse_base_type(&mut self) -> Result<ObjcType, ParseError> {
        let first = self.expect_ident()?;
        match first.as_str() {
            "void" => Ok(ObjcType::Void),
            "instancetype" => Ok(ObjcType::InstanceType),
            "id" => {
                let protocols = self.parse_protocol_list()?;
                Ok(ObjcType::Id { protocols })
            }
            "struct" | "enum" | "union" => {
                let name = self.expect_ident()?;
                Ok(ObjcType::struct_named(name))
            }
            word if Self::TYPE_WORDS.contains(&word) => {
                let mut words = vec![word.to_string()];
                while let Some(next) = self.ident_text() {
                    if Self::TYPE_WORDS.contains(&next) {
                        words.push(next.to_string());
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Ok(ObjcType::struct_named(words.join(" ")))
            }
            name => {
                // Lightweight generics: `NSArray<NSString *>`
                if self.peek() == &Token::Lt {
                    let saved = self.pos;
                    self.pos += 1;
                    let mut args = Vec::new();
                    let mut ok = true;
                    loop {
                        match self.parse_declarator() {
                            Ok((ty, _)) => args.push(ty),
                            Err(_) => {
                                ok = false;
                                break;
                            }
                        }
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    if ok && self.eat(&Token::Gt) {
                        return Ok(ObjcType::Generic(Name::new(name), args));
                    }
                    self.pos = saved;
                }
                Ok(ObjcType::struct_named(name))
            }
        }
    }

    // Statements

    fn parse_compound(&mut self) -> Result<Vec<ObjcStmt>, ParseError> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated block"));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_body(&mut self) -> Result<Vec<ObjcStmt>, ParseError> {
        if self.peek() == &Token::LBrace {
            self.parse_compound()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    fn parse_statement(&mut self) -> Result<ObjcStmt, ParseError> {
        match self.peek() {
            Token::LBrace => Ok(ObjcStmt::Compound(self.parse_compound()?)),
            Token::Semi => {
                self.pos += 1;
                Ok(ObjcStmt::Compound(vec![]))
            }
            Token::Ident(id) => match id.as_str() {
                "if" => {
                    self.pos += 1;
                    self.expect(Token::LParen)?;
                    let condition = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    let then_body = self.parse_body()?;
                    let else_body = if self.eat_ident("else") {
                        Some(self.parse_body()?)
                    } else {
                        None
                    };
                    Ok(ObjcStmt::If {
                        condition,
                        then_body,
                        else_body,
                    })
                }
                "while" => {
                    self.pos += 1;
                    self.expect(Token::LParen)?;
                    let condition = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    let body = self.parse_body()?;
                    Ok(ObjcStmt::While { condition, body })
                }
                "do" => {
                    self.pos += 1;
                    let body = self.parse_body()?;
                    if !self.eat_ident("while") {
                        return Err(self.error("expected `while` after do body"));
                    }
                    self.expect(Token::LParen)?;
                    let condition = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    self.expect(Token::Semi)?;
                    Ok(ObjcStmt::DoWhile { body, condition })
                }
                "for" => self.parse_for(),
                "switch" => self.parse_switch(),
                "return" => {
                    self.pos += 1;
                    let value = if self.peek() == &Token::Semi {
                        None
                    } else {
                        Some(self.parse_expression()?)
                    };
                    self.expect(Token::Semi)?;
                    Ok(ObjcStmt::Return(value))
                }
                "break" => {
                    self.pos += 1;
                    self.expect(Token::Semi)?;
                    Ok(ObjcStmt::Break)
                }
                "continue" => {
                    self.pos += 1;
                    self.expect(Token::Semi)?;
                    Ok(ObjcStmt::Continue)
                }
                _ => self.parse_declaration_or_expression(),
            },
            _ => {
                let stmt = ObjcStmt::Expression(self.parse_expression()?);
                self.expect(Token::Semi)?;
                Ok(stmt)
            }
        }
    }

    fn parse_for(&mut self) -> Result<ObjcStmt, ParseError> {
        self.pos += 1;
        self.expect(Token::LParen)?;

        // Fast-enumeration form: `for (T x in xs)` / `for (x in xs)`.
        let saved = self.pos;
        if self.looks_like_declaration() {
            if let Ok((ty, _)) = self.parse_declarator() {
                if self.ident_text().is_some() {
                    let name = Name::new(self.expect_ident()?);
                    if self.eat_ident("in") {
                        let collection = self.parse_expression()?;
                        self.expect(Token::RParen)?;
                        let body = self.parse_body()?;
                        return Ok(ObjcStmt::ForIn {
                            ty: Some(ty),
                            name,
                            collection,
                            body,
                        });
                    }
                }
            }
            self.pos = saved;
        }
        if let Token::Ident(name) = self.peek().clone() {
            if self.peek_at(1) == &Token::Ident("in".into()) {
                self.pos += 2;
                let collection = self.parse_expression()?;
                self.expect(Token::RParen)?;
                let body = self.parse_body()?;
                return Ok(ObjcStmt::ForIn {
                    ty: None,
                    name: Name::new(name),
                    collection,
                    body,
                });
            }
        }

        // Classic three-clause form.
        let init = if self.eat(&Token::Semi) {
            None
        } else {
            Some(Box::new(self.parse_declaration_or_expression()?))
        };
        let condition = if self.peek() == &Token::Semi {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semi)?;
        let step = if self.peek() == &Token::RParen {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::RParen)?;
        let body = self.parse_body()?;

        Ok(ObjcStmt::For {
            init,
            condition,
            step,
            body,
        })
    }

    fn parse_switch(&mut self) -> Result<ObjcStmt, ParseError> {
        self.pos += 1;
        self.expect(Token::LParen)?;
        let exp = self.parse_expression()?;
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;

        let mut cases: Vec<ObjcSwitchCase> = Vec::new();
        let mut default: Option<Vec<ObjcStmt>> = None;

        while !self.eat(&Token::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated switch body"));
            }
            if self.eat_ident("case") {
                let mut values = vec![self.parse_expression()?];
                self.expect(Token::Colon)?;
                // Fallthrough labels stack onto one case.
                while self.eat_ident("case") {
                    values.push(self.parse_expression()?);
                    self.expect(Token::Colon)?;
                }
                let body = self.parse_case_body()?;
                cases.push(ObjcSwitchCase { values, body });
            } else if self.eat_ident("default") {
                self.expect(Token::Colon)?;
                default = Some(self.parse_case_body()?);
            } else {
                return Err(self.error(format!(
                    "expected `case` or `default`, found {:?}",
                    self.peek()
                )));
            }
        }

        Ok(ObjcStmt::Switch {
            exp,
            cases,
            default,
        })
    }

    fn parse_case_body(&mut self) -> Result<Vec<ObjcStmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Ident(id) if id == "case" || id == "default" => break,
                _ => body.push(self.parse_statement()?),
            }
        }
        Ok(body)
    }

    /// Declaration-vs-expression disambiguation: a statement that starts with
    /// a storage/type keyword, a nullability specifier, or a capitalized
    /// identifier followed by declarator tokens reads as a declaration.
    fn looks_like_declaration(&self) -> bool {
        let Some(first) = self.ident_text() else {
            return false;
        };
        if Self::TYPE_WORDS.contains(&first)
            || Self::SPECIFIERS.contains(&first)
            || first == "const"
            || first == "id"
            || first == "instancetype"
            || first == "void"
            || first == "BOOL"
        {
            return true;
        }
        if !first.chars().next().is_some_and(|c| c.is_uppercase()) {
            return false;
        }
        // `Type ident …` / `Type *ident …` / `Type<…> …`
        matches!(
            self.peek_at(1),
            Token::Ident(_) | Token::Star | Token::Lt
        )
    }

    fn parse_declaration_or_expression(&mut self) -> Result<ObjcStmt, ParseError> {
        if self.looks_like_declaration() {
            let saved = self.pos;
            if let Ok((ty, block_name)) = self.parse_declarator() {
                if let Some(name) = block_name {
                    // Block-typed local: `void (^cb)(int) = …`
                    let init = if self.eat(&Token::Assign) {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    self.expect(Token::Semi)?;
                    return Ok(ObjcStmt::VarDecl {
                        ty,
                        declarators: vec![(name, init)],
                    });
                }
                if self.ident_text().is_some() {
                    let mut declarators = Vec::new();
                    loop {
                        let name = Name::new(self.expect_ident()?);
                        let init = if self.eat(&Token::Assign) {
                            Some(self.parse_expression()?)
                        } else {
                            None
                        };
                        declarators.push((name, init));
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(Token::Semi)?;
                    return Ok(ObjcStmt::VarDecl { ty, declarators });
                }
            }
            self.pos = saved;
        }

        let stmt = ObjcStmt::Expression(self.parse_expression()?);
        self.expect(Token::Semi)?;
        Ok(stmt)
    }

    // Expressions, precedence climbing

    fn parse_expression(&mut self) -> Result<ObjcExpr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<ObjcExpr, ParseError> {
        let lhs = self.parse_ternary()?;
        let op = match self.peek() {
            Token::Assign => Operator::Assign,
            Token::PlusAssign => Operator::AddAssign,
            Token::MinusAssign => Operator::SubtractAssign,
            Token::StarAssign => Operator::MultiplyAssign,
            Token::SlashAssign => Operator::DivideAssign,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_assignment()?;
        Ok(ObjcExpr::Assign {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    fn parse_ternary(&mut self) -> Result<ObjcExpr, ParseError> {
        let condition = self.parse_binary(0)?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        let if_true = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let if_false = self.parse_ternary()?;
        Ok(ObjcExpr::Ternary {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    /// Binary operator at the current position, with its precedence level.
    fn peek_binary_op(&self) -> Option<(Operator, u8, usize)> {
        let (op, precedence, width) = match self.peek() {
            Token::PipePipe => (Operator::LogicalOr, 1, 1),
            Token::AmpAmp => (Operator::LogicalAnd, 2, 1),
            Token::Pipe => (Operator::BitwiseOr, 3, 1),
            Token::Caret => (Operator::BitwiseXor, 4, 1),
            Token::Amp => (Operator::BitwiseAnd, 5, 1),
            Token::Eq => (Operator::Equals, 6, 1),
            Token::NotEq => (Operator::NotEquals, 6, 1),
            Token::Le => (Operator::LessThanOrEqual, 7, 1),
            Token::Ge => (Operator::GreaterThanOrEqual, 7, 1),
            Token::Lt if self.lt_is_shift() => (Operator::ShiftLeft, 8, 2),
            Token::Gt if self.gt_is_shift() => (Operator::ShiftRight, 8, 2),
            Token::Lt => (Operator::LessThan, 7, 1),
            Token::Gt => (Operator::GreaterThan, 7, 1),
            Token::Plus => (Operator::Add, 9, 1),
            Token::Minus => (Operator::Subtract, 9, 1),
            Token::Star => (Operator::Multiply, 10, 1),
            Token::Slash => (Operator::Divide, 10, 1),
            Token::Percent => (Operator::Modulo, 10, 1),
            _ => return None,
        };
        Some((op, precedence, width))
    }

    fn lt_is_shift(&self) -> bool {
        self.peek_at(1) == &Token::Lt
            && self.tokens[self.pos].span.end == self.tokens[self.pos + 1].span.start
    }

    fn gt_is_shift(&self) -> bool {
        self.peek_at(1) == &Token::Gt
            && self.tokens[self.pos].span.end == self.tokens[self.pos + 1].span.start
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<ObjcExpr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, precedence, width)) = self.peek_binary_op() {
            if precedence < min_precedence {
                break;
            }
            self.pos += width;
            let rhs = self.parse_binary(precedence + 1)?;
            lhs = ObjcExpr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ObjcExpr, ParseError> {
        let op = match self.peek() {
            Token::Bang => Some(Operator::Negate),
            Token::Minus => Some(Operator::Subtract),
            Token::Plus => Some(Operator::Add),
            Token::Tilde => Some(Operator::BitwiseNot),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let exp = self.parse_unary()?;
            return Ok(ObjcExpr::Unary {
                op,
                exp: Box::new(exp),
            });
        }

        // Cast: `(Type)expr`, distinguished from parenthesized expressions
        // by requiring the parenthesized run to parse as a type and the
        // following token to begin an expression.
        if self.peek() == &Token::LParen {
            let saved = self.pos;
            self.pos += 1;
            if let Ok((ty, None)) = self.parse_declarator() {
                if self.peek() == &Token::RParen && self.cast_worthy(&ty) {
                    self.pos += 1;
                    if self.at_expression_start() {
                        let exp = self.parse_unary()?;
                        return Ok(ObjcExpr::Cast {
                            ty,
                            exp: Box::new(exp),
                        });
                    }
                }
            }
            self.pos = saved;
        }

        self.parse_postfix()
    }

    /// Only pointer-shaped or keyword-typed parenthesized runs are treated
    /// as casts; a lone lowercase identifier stays an expression.
    fn cast_worthy(&self, ty: &ObjcType) -> bool {
        match ty.unqualified() {
            ObjcType::Pointer(_)
            | ObjcType::Id { .. }
            | ObjcType::InstanceType
            | ObjcType::Void
            | ObjcType::Generic(..)
            | ObjcType::Block { .. }
            | ObjcType::FunctionPointer { .. } => true,
            ObjcType::Struct(name) => name.with_str(|s| {
                s.contains(' ')
                    || s.chars().next().is_some_and(|c| c.is_uppercase())
                    || matches!(
                        s,
                        "int" | "char" | "float" | "double" | "long" | "short" | "BOOL"
                    )
            }),
            _ => false,
        }
    }

    fn at_expression_start(&self) -> bool {
        matches!(
            self.peek(),
            Token::Ident(_)
                | Token::IntLit(_)
                | Token::FloatLit(_)
                | Token::StringLit(_)
                | Token::CharLit(_)
                | Token::At
                | Token::LParen
                | Token::LBracket
                | Token::Bang
                | Token::Tilde
                | Token::Minus
                | Token::Amp
                | Token::Star
        )
    }

    fn parse_postfix(&mut self) -> Result<ObjcExpr, ParseError> {
        let mut exp = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.pos += 1;
                    let mut arguments = Vec::new();
                    if self.peek() != &Token::RParen {
                        loop {
                            arguments.push(self.parse_assignment()?);
                            if !self.eat(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RParen)?;
                    exp = ObjcExpr::Call {
                        callee: Box::new(exp),
                        arguments,
                    };
                }
                Token::Dot | Token::Arrow => {
                    self.pos += 1;
                    let name = Name::new(self.expect_ident()?);
                    exp = ObjcExpr::Member {
                        base: Box::new(exp),
                        name,
                    };
                }
                Token::LBracket => {
                    self.pos += 1;
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    exp = ObjcExpr::Subscript {
                        base: Box::new(exp),
                        index: Box::new(index),
                    };
                }
                Token::PlusPlus => {
                    self.pos += 1;
                    exp = ObjcExpr::PostfixIncDec {
                        exp: Box::new(exp),
                        increment: true,
                    };
                }
                Token::MinusMinus => {
                    self.pos += 1;
                    exp = ObjcExpr::PostfixIncDec {
                        exp: Box::new(exp),
                        increment: false,
                    };
                }
                _ => return Ok(exp),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ObjcExpr, ParseError> {
        match self.bump() {
            Token::IntLit(value) => Ok(ObjcExpr::IntLiteral(value)),
            Token::FloatLit(value) => Ok(ObjcExpr::FloatLiteral(value)),
            Token::CharLit(value) => Ok(ObjcExpr::IntLiteral(value as i64)),
            Token::StringLit(value) => Ok(ObjcExpr::StringLiteral {
                value,
                boxed: false,
            }),
            Token::Ident(id) => match id.as_str() {
                "YES" | "TRUE" | "true" => Ok(ObjcExpr::BoolLiteral(true)),
                "NO" | "FALSE" | "false" => Ok(ObjcExpr::BoolLiteral(false)),
                "nil" | "Nil" | "NULL" => Ok(ObjcExpr::NilLiteral),
                "sizeof" => {
                    self.expect(Token::LParen)?;
                    let saved = self.pos;
                    if let Ok((ty, None)) = self.parse_declarator() {
                        if self.eat(&Token::RParen) {
                            return Ok(ObjcExpr::SizeOfType(ty));
                        }
                    }
                    self.pos = saved;
                    let exp = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    Ok(ObjcExpr::SizeOfExpr(Box::new(exp)))
                }
                _ => Ok(ObjcExpr::Identifier(Name::new(id))),
            },
            Token::At => match self.bump() {
                Token::StringLit(value) => Ok(ObjcExpr::StringLiteral { value, boxed: true }),
                Token::IntLit(value) => Ok(ObjcExpr::IntLiteral(value)),
                Token::FloatLit(value) => Ok(ObjcExpr::FloatLiteral(value)),
                Token::Ident(id) if id == "YES" => Ok(ObjcExpr::BoolLiteral(true)),
                Token::Ident(id) if id == "NO" => Ok(ObjcExpr::BoolLiteral(false)),
                Token::LParen => {
                    let exp = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    Ok(ObjcExpr::Paren(Box::new(exp)))
                }
                Token::LBracket => {
                    let mut items = Vec::new();
                    if self.peek() != &Token::RBracket {
                        loop {
                            items.push(self.parse_assignment()?);
                            if !self.eat(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RBracket)?;
                    Ok(ObjcExpr::ArrayLiteral(items))
                }
                Token::LBrace => {
                    let mut pairs = Vec::new();
                    if self.peek() != &Token::RBrace {
                        loop {
                            let key = self.parse_assignment()?;
                            self.expect(Token::Colon)?;
                            let value = self.parse_assignment()?;
                            pairs.push((key, value));
                            if !self.eat(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RBrace)?;
                    Ok(ObjcExpr::DictionaryLiteral(pairs))
                }
                other => Err(self.error(format!("unexpected token after '@': {:?}", other))),
            },
            Token::LParen => {
                let exp = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(ObjcExpr::Paren(Box::new(exp)))
            }
            Token::LBracket => self.parse_message_send(),
            Token::Amp => {
                // Address-of reads through to the value in the Swift model.
                let exp = self.parse_unary()?;
                Ok(exp)
            }
            Token::Star => {
                let exp = self.parse_unary()?;
                Ok(exp)
            }
            other => Err(self.error(format!("unexpected token {:?} in expression", other))),
        }
    }

    fn parse_message_send(&mut self) -> Result<ObjcExpr, ParseError> {
        let receiver = self.parse_postfix()?;

        let mut pieces = Vec::new();
        let first_keyword = Name::new(self.expect_ident()?);
        if self.eat(&Token::Colon) {
            pieces.push((first_keyword, Some(self.parse_assignment()?)));
            loop {
                match self.peek() {
                    Token::Ident(_) if self.peek_at(1) == &Token::Colon => {
                        let keyword = Name::new(self.expect_ident()?);
                        self.expect(Token::Colon)?;
                        pieces.push((keyword, Some(self.parse_assignment()?)));
                    }
                    _ => break,
                }
            }
        } else {
            pieces.push((first_keyword, None));
        }
        self.expect(Token::RBracket)?;

        Ok(ObjcExpr::MessageSend {
            receiver: Box::new(receiver),
            pieces,
        })
    }
}

#[derive(Default)]
struct MemberList {
    properties: Vec<ObjcPropertyDecl>,
    methods: Vec<ObjcMethodDecl>,
    statics: Vec<ObjcVarDecl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ObjcFile {
        let file = SourceFile::new("test.m", source);
        parse_objc_file(&file).unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    fn single_class(file: &ObjcFile) -> &ObjcClassDecl {
        for decl in &file.declarations {
            if let ObjcDeclKind::ClassInterface(class) = &decl.kind {
                return class;
            }
        }
        panic!("no class interface in {:?}", file.declarations);
    }

    #[test]
    fn parses_interface_header() {
        let file = parse(
            "@interface MyView : UIView <NSCopying, NSCoding>\n\
             @property (nonatomic, weak) UIView *container;\n\
             - (void)layout;\n\
             @end",
        );
        let class = single_class(&file);
        assert_eq!(class.name, "MyView");
        assert_eq!(class.superclass, Some(Name::new("UIView")));
        assert_eq!(class.protocols.len(), 2);
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].selector_string(), "layout");
        assert!(class.properties[0].has_attribute(&ObjcPropertyAttribute::Weak));
    }

    #[test]
    fn parses_category_and_extension() {
        let file = parse(
            "@interface Thing ()\n- (void)hidden;\n@end\n\
             @interface Thing (Extras)\n- (void)extra;\n@end",
        );
        let categories: Vec<_> = file
            .declarations
            .iter()
            .filter_map(|d| match &d.kind {
                ObjcDeclKind::Category(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category_name, None);
        assert_eq!(categories[1].category_name, Some(Name::new("Extras")));
    }

    #[test]
    fn parses_method_with_arguments_and_body() {
        let file = parse(
            "@implementation Painter\n\
             - (void)moveTo:(CGFloat)x andY:(CGFloat)y {\n\
                 CGPoint p = CGPointMake(x, y);\n\
                 [self setPoint:p];\n\
             }\n\
             @end",
        );
        let class = match &file.declarations[0].kind {
            ObjcDeclKind::ClassImplementation(c) => c,
            other => panic!("expected implementation, got {:?}", other),
        };
        let method = &class.methods[0];
        assert_eq!(method.selector_string(), "moveTo:andY:");
        assert_eq!(method.argument_count(), 2);
        let body = method.body.as_ref().unwrap();
        assert_eq!(body.len(), 2);
        match &body[1] {
            ObjcStmt::Expression(ObjcExpr::MessageSend { pieces, .. }) => {
                assert_eq!(ObjcExpr::selector_of(pieces), "setPoint:");
            }
            other => panic!("expected message send, got {:?}", other),
        }
    }

    #[test]
    fn tracks_nonnull_regions() {
        let file = parse(
            "NS_ASSUME_NONNULL_BEGIN\n\
             @interface A\n@end\n\
             NS_ASSUME_NONNULL_END\n\
             @interface B\n@end",
        );
        assert!(file.declarations[0].in_nonnull_region);
        assert!(!file.declarations[1].in_nonnull_region);
    }

    #[test]
    fn collects_preprocessor_directives() {
        let file = parse("#import <UIKit/UIKit.h>\n#define LIMIT 10\nint x = 1;");
        assert_eq!(
            file.preprocessor_directives,
            vec!["#import <UIKit/UIKit.h>", "#define LIMIT 10"]
        );
    }

    #[test]
    fn parses_ns_enum_and_options() {
        let file = parse(
            "typedef NS_ENUM(NSInteger, Direction) { DirectionUp, DirectionDown = 2 };\n\
             typedef NS_OPTIONS(NSUInteger, Edges) { EdgeTop = 1 << 0, EdgeBottom = 1 << 1 };",
        );
        let enums: Vec<_> = file
            .declarations
            .iter()
            .filter_map(|d| match &d.kind {
                ObjcDeclKind::Enum(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(enums.len(), 2);
        assert!(!enums[0].is_options);
        assert_eq!(enums[0].cases.len(), 2);
        assert!(enums[1].is_options);
        match enums[1].cases[1].value.as_ref().unwrap() {
            ObjcExpr::Binary { op, .. } => assert_eq!(*op, Operator::ShiftLeft),
            other => panic!("expected shift, got {:?}", other),
        }
    }

    #[test]
    fn parses_typedef_block_and_struct() {
        let file = parse(
            "typedef void (^Completion)(BOOL, NSError *);\n\
             typedef struct { CGFloat x; CGFloat y; } Vec2;",
        );
        match &file.declarations[0].kind {
            ObjcDeclKind::Typedef(t) => {
                assert_eq!(t.name, "Completion");
                assert!(matches!(t.ty, ObjcType::Block { .. }));
            }
            other => panic!("expected typedef, got {:?}", other),
        }
        match &file.declarations[1].kind {
            ObjcDeclKind::Struct(s) => {
                assert_eq!(s.name, "Vec2");
                assert_eq!(s.fields.len(), 2);
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn parses_globals_and_functions() {
        let file = parse(
            "static NSInteger kLimit = 64;\n\
             CGFloat scaled(CGFloat value) { return value * 2; }",
        );
        match &file.declarations[0].kind {
            ObjcDeclKind::GlobalVariable(v) => {
                assert!(v.is_static);
                assert_eq!(v.name, "kLimit");
            }
            other => panic!("expected global, got {:?}", other),
        }
        match &file.declarations[1].kind {
            ObjcDeclKind::Function(f) => {
                assert_eq!(f.name, "scaled");
                assert_eq!(f.parameters.len(), 1);
                assert!(f.body.is_some());
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn parses_ivar_visibility_sections() {
        let file = parse(
            "@interface Holder : NSObject {\n\
                 NSInteger _count;\n\
             @public\n\
                 __weak id _delegate;\n\
             }\n\
             @end",
        );
        let class = single_class(&file);
        assert_eq!(class.ivars.len(), 2);
        assert_eq!(class.ivars[0].visibility, ObjcVisibility::Private);
        assert_eq!(class.ivars[1].visibility, ObjcVisibility::Public);
        assert_eq!(
            class.ivars[1].ty.specifiers(),
            &[Name::new("__weak")]
        );
    }

    #[test]
    fn parses_protocol_optional_sections() {
        let file = parse(
            "@protocol Watching <NSObject>\n\
             - (void)required1;\n\
             @optional\n\
             - (void)maybe;\n\
             @required\n\
             - (void)required2;\n\
             @end",
        );
        match &file.declarations[0].kind {
            ObjcDeclKind::Protocol(p) => {
                assert!(!p.methods[0].is_optional);
                assert!(p.methods[1].is_optional);
                assert!(!p.methods[2].is_optional);
            }
            other => panic!("expected protocol, got {:?}", other),
        }
    }

    #[test]
    fn parse_errors_carry_location() {
        let file = SourceFile::new("bad.m", "@interface A\n&&");
        let err = parse_objc_file(&file).unwrap_err();
        assert_eq!(err.file, "bad.m");
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn parses_nullability_qualifiers() {
        let file = parse("@interface A\n@property NSString * _Nullable title;\n@end");
        let class = single_class(&file);
        let ty = &class.properties[0].ty;
        assert_eq!(ty.qualifiers(), &[Name::new("_Nullable")]);
        assert!(ty.is_pointer());
    }
}
