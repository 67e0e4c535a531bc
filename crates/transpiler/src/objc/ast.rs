//! # Objective-C Parse Tree
//!
//! The raw per-file tree the frontend hands to intention collection. Shapes
//! stay close to the input surface; Swift-side meaning is assigned later.

use objswift_ast::{Location, Name, ObjcType, Operator};
use serde::{Deserialize, Serialize};

/// One parsed translation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcFile {
    pub name: String,
    /// `#import`, `#define`, … lines, verbatim, in order of appearance.
    pub preprocessor_directives: Vec<String>,
    pub declarations: Vec<ObjcDecl>,
}

/// A top-level declaration plus its source position and nullability region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcDecl {
    pub kind: ObjcDeclKind,
    pub location: Location,
    /// Whether the declaration sits between `NS_ASSUME_NONNULL_BEGIN`/`_END`.
    pub in_nonnull_region: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjcDeclKind {
    /// `@interface C : Base <P1, P2>`
    ClassInterface(ObjcClassDecl),
    /// `@interface C ()` (extension) or `@interface C (Name)` (category)
    Category(ObjcCategoryDecl),
    /// `@implementation C` (the optional category name rides along)
    ClassImplementation(ObjcClassDecl),
    /// `@protocol P <Q>`
    Protocol(ObjcProtocolDecl),
    /// `NS_ENUM(U, N)` / `NS_OPTIONS(U, N)`
    Enum(ObjcEnumDecl),
    /// `typedef struct { … } Name;`
    Struct(ObjcStructDecl),
    /// `typedef R (^Name)(P…);`, `typedef R (*Name)(P…);`, plain aliases
    Typedef(ObjcTypedefDecl),
    /// File-scope variable, `static` or extern-visible
    GlobalVariable(ObjcVarDecl),
    /// C free function
    Function(ObjcFunctionDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcClassDecl {
    pub name: Name,
    pub superclass: Option<Name>,
    pub protocols: Vec<Name>,
    /// Category name when this is `@implementation C (Name)`.
    pub category_name: Option<Name>,
    pub ivars: Vec<ObjcIvarDecl>,
    pub properties: Vec<ObjcPropertyDecl>,
    pub methods: Vec<ObjcMethodDecl>,
    /// `static` variables declared inside the implementation block.
    pub statics: Vec<ObjcVarDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcCategoryDecl {
    pub class_name: Name,
    /// `None` for a class extension `()`, `Some` for a named category.
    pub category_name: Option<Name>,
    pub protocols: Vec<Name>,
    pub ivars: Vec<ObjcIvarDecl>,
    pub properties: Vec<ObjcPropertyDecl>,
    pub methods: Vec<ObjcMethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcProtocolDecl {
    pub name: Name,
    pub protocols: Vec<Name>,
    pub properties: Vec<ObjcPropertyDecl>,
    pub methods: Vec<ObjcMethodDecl>,
}

/// `@private` and friends, controlling subsequent ivar declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjcVisibility {
    Private,
    Protected,
    Package,
    Public,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcIvarDecl {
    pub name: Name,
    pub ty: ObjcType,
    pub visibility: ObjcVisibility,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjcPropertyAttribute {
    Weak,
    Assign,
    Strong,
    Retain,
    Copy,
    Readonly,
    Readwrite,
    Nonatomic,
    Atomic,
    Nullable,
    Nonnull,
    Class,
    Getter(Name),
    Setter(Name),
    Other(Name),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcPropertyDecl {
    pub name: Name,
    pub ty: ObjcType,
    pub attributes: Vec<ObjcPropertyAttribute>,
    pub is_optional: bool,
    pub location: Location,
    pub in_nonnull_region: bool,
}

impl ObjcPropertyDecl {
    pub fn has_attribute(&self, attribute: &ObjcPropertyAttribute) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn getter_name(&self) -> Option<Name> {
        self.attributes.iter().find_map(|a| match a {
            ObjcPropertyAttribute::Getter(name) => Some(*name),
            _ => None,
        })
    }

    pub fn setter_name(&self) -> Option<Name> {
        self.attributes.iter().find_map(|a| match a {
            ObjcPropertyAttribute::Setter(name) => Some(*name),
            _ => None,
        })
    }
}

/// One keyword piece of a selector. The first piece's keyword is the method
/// base name; `argument` is `None` only for a bare (zero-argument) selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcSelectorPiece {
    pub keyword: Name,
    pub argument: Option<ObjcMethodParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcMethodParam {
    pub ty: ObjcType,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcMethodDecl {
    /// `+` methods are class methods.
    pub is_class_method: bool,
    pub return_type: ObjcType,
    pub pieces: Vec<ObjcSelectorPiece>,
    pub body: Option<Vec<ObjcStmt>>,
    /// Marked by a protocol `@optional` section.
    pub is_optional: bool,
    pub location: Location,
    pub in_nonnull_region: bool,
}

impl ObjcMethodDecl {
    /// `setX:y:`-style selector string.
    pub fn selector_string(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            piece.keyword.with_str(|s| out.push_str(s));
            if piece.argument.is_some() {
                out.push(':');
            }
        }
        out
    }

    pub fn base_name(&self) -> Name {
        self.pieces
            .first()
            .map(|p| p.keyword)
            .unwrap_or_else(|| Name::new(""))
    }

    pub fn argument_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.argument.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcEnumDecl {
    pub name: Name,
    pub raw_type: ObjcType,
    /// `NS_OPTIONS` rather than `NS_ENUM`.
    pub is_options: bool,
    pub cases: Vec<ObjcEnumCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcEnumCase {
    pub name: Name,
    pub value: Option<ObjcExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcStructDecl {
    pub name: Name,
    pub fields: Vec<(Name, ObjcType)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcTypedefDecl {
    pub name: Name,
    pub ty: ObjcType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcVarDecl {
    pub name: Name,
    pub ty: ObjcType,
    pub is_static: bool,
    pub initializer: Option<ObjcExpr>,
    pub location: Location,
    pub in_nonnull_region: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcFunctionDecl {
    pub name: Name,
    pub return_type: ObjcType,
    pub parameters: Vec<ObjcMethodParam>,
    pub body: Option<Vec<ObjcStmt>>,
    pub location: Location,
    pub in_nonnull_region: bool,
}

/// C / Objective-C expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjcExpr {
    Identifier(Name),
    IntLiteral(i64),
    FloatLiteral(f64),
    /// `"…"` and `@"…"`; the boxed form is noted for faithful mapping.
    StringLiteral { value: String, boxed: bool },
    BoolLiteral(bool),
    NilLiteral,
    /// `@[ … ]`
    ArrayLiteral(Vec<ObjcExpr>),
    /// `@{ k: v, … }`
    DictionaryLiteral(Vec<(ObjcExpr, ObjcExpr)>),
    Binary {
        lhs: Box<ObjcExpr>,
        op: Operator,
        rhs: Box<ObjcExpr>,
    },
    Unary {
        op: Operator,
        exp: Box<ObjcExpr>,
    },
    /// `x++` / `x--`
    PostfixIncDec {
        exp: Box<ObjcExpr>,
        increment: bool,
    },
    Ternary {
        condition: Box<ObjcExpr>,
        if_true: Box<ObjcExpr>,
        if_false: Box<ObjcExpr>,
    },
    Assign {
        lhs: Box<ObjcExpr>,
        op: Operator,
        rhs: Box<ObjcExpr>,
    },
    Call {
        callee: Box<ObjcExpr>,
        arguments: Vec<ObjcExpr>,
    },
    /// `base.name` or `base->name`
    Member {
        base: Box<ObjcExpr>,
        name: Name,
    },
    Subscript {
        base: Box<ObjcExpr>,
        index: Box<ObjcExpr>,
    },
    /// `[receiver sel:a with:b]`
    MessageSend {
        receiver: Box<ObjcExpr>,
        pieces: Vec<(Name, Option<ObjcExpr>)>,
    },
    Cast {
        ty: ObjcType,
        exp: Box<ObjcExpr>,
    },
    SizeOfType(ObjcType),
    SizeOfExpr(Box<ObjcExpr>),
    Paren(Box<ObjcExpr>),
}

impl ObjcExpr {
    /// `sel:with:`-style selector string for a message send.
    pub fn selector_of(pieces: &[(Name, Option<ObjcExpr>)]) -> String {
        let mut out = String::new();
        for (keyword, argument) in pieces {
            keyword.with_str(|s| out.push_str(s));
            if argument.is_some() {
                out.push(':');
            }
        }
        out
    }
}

/// C / Objective-C statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjcStmt {
    Expression(ObjcExpr),
    VarDecl {
        ty: ObjcType,
        declarators: Vec<(Name, Option<ObjcExpr>)>,
    },
    If {
        condition: ObjcExpr,
        then_body: Vec<ObjcStmt>,
        else_body: Option<Vec<ObjcStmt>>,
    },
    While {
        condition: ObjcExpr,
        body: Vec<ObjcStmt>,
    },
    DoWhile {
        body: Vec<ObjcStmt>,
        condition: ObjcExpr,
    },
    For {
        init: Option<Box<ObjcStmt>>,
        condition: Option<ObjcExpr>,
        step: Option<ObjcExpr>,
        body: Vec<ObjcStmt>,
    },
    /// `for (T x in collection)`
    ForIn {
        ty: Option<ObjcType>,
        name: Name,
        collection: ObjcExpr,
        body: Vec<ObjcStmt>,
    },
    Switch {
        exp: ObjcExpr,
        cases: Vec<ObjcSwitchCase>,
        default: Option<Vec<ObjcStmt>>,
    },
    Return(Option<ObjcExpr>),
    Break,
    Continue,
    Compound(Vec<ObjcStmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjcSwitchCase {
    pub values: Vec<ObjcExpr>,
    pub body: Vec<ObjcStmt>,
}
