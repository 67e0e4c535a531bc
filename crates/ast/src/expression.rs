//! # Swift Expression AST
//!
//! The output-language expression tree. Every expression optionally carries
//! a resolved [`SwiftType`] filled in by the type-resolution pass; equality
//! is structural and ignores resolved types, so a freshly-built tree compares
//! equal to the same tree after annotation.
//!
//! Ownership is the parent relation: each node has exactly one owner, so the
//! tree is acyclic by construction and `clone()` yields a fully disjoint
//! copy.

use crate::arena::Name;
use crate::statement::CompoundStatement;
use crate::swift_type::SwiftType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a literal, as overload resolution sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
    Nil,
    Array,
    Dictionary,
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Nil,
}

impl Constant {
    pub fn literal_kind(&self) -> LiteralKind {
        match self {
            Constant::Integer(_) => LiteralKind::Integer,
            Constant::Float(_) => LiteralKind::Float,
            Constant::Boolean(_) => LiteralKind::Boolean,
            Constant::String(_) => LiteralKind::String,
            Constant::Nil => LiteralKind::Nil,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Integer(value) => write!(f, "{}", value),
            Constant::Float(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Constant::Boolean(value) => write!(f, "{}", value),
            Constant::String(value) => write!(f, "\"{}\"", value.escape_default()),
            Constant::Nil => write!(f, "nil"),
        }
    }
}

/// Operators shared by binary, unary, and assignment expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LogicalAnd,
    LogicalOr,
    Negate,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    ShiftLeft,
    ShiftRight,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    NullCoalesce,
}

impl Operator {
    pub fn lexeme(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LogicalAnd => "&&",
            Operator::LogicalOr => "||",
            Operator::Negate => "!",
            Operator::BitwiseAnd => "&",
            Operator::BitwiseOr => "|",
            Operator::BitwiseXor => "^",
            Operator::BitwiseNot => "~",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::Assign => "=",
            Operator::AddAssign => "+=",
            Operator::SubtractAssign => "-=",
            Operator::MultiplyAssign => "*=",
            Operator::DivideAssign => "/=",
            Operator::NullCoalesce => "??",
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::AddAssign
                | Operator::SubtractAssign
                | Operator::MultiplyAssign
                | Operator::DivideAssign
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

/// A labeled argument at a call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArgument {
    pub label: Option<Name>,
    pub expression: Expression,
}

impl FunctionArgument {
    pub fn unlabeled(expression: Expression) -> Self {
        Self {
            label: None,
            expression,
        }
    }

    pub fn labeled(label: impl Into<Name>, expression: Expression) -> Self {
        Self {
            label: Some(label.into()),
            expression,
        }
    }
}

/// One trailing operation in a postfix chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostfixOperation {
    Member {
        name: Name,
        optional_access: bool,
    },
    Subscript {
        index: Box<Expression>,
        optional_access: bool,
    },
    Call {
        arguments: Vec<FunctionArgument>,
        optional_access: bool,
    },
}

impl PostfixOperation {
    pub fn member(name: impl Into<Name>) -> Self {
        PostfixOperation::Member {
            name: name.into(),
            optional_access: false,
        }
    }

    pub fn call(arguments: Vec<FunctionArgument>) -> Self {
        PostfixOperation::Call {
            arguments,
            optional_access: false,
        }
    }

    pub fn optional_access(&self) -> bool {
        match self {
            PostfixOperation::Member { optional_access, .. }
            | PostfixOperation::Subscript { optional_access, .. }
            | PostfixOperation::Call { optional_access, .. } => *optional_access,
        }
    }

    pub fn set_optional_access(&mut self, value: bool) {
        match self {
            PostfixOperation::Member { optional_access, .. }
            | PostfixOperation::Subscript { optional_access, .. }
            | PostfixOperation::Call { optional_access, .. } => *optional_access = value,
        }
    }
}

/// Argument to a `MemoryLayout`/`sizeof`-style query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SizeOfTarget {
    Type(SwiftType),
    Expression(Box<Expression>),
}

/// A closure-literal parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockParameter {
    pub name: Name,
    pub ty: SwiftType,
}

/// The shape of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Identifier(Name),
    Constant(Constant),
    ArrayLiteral(Vec<Expression>),
    DictionaryLiteral(Vec<(Expression, Expression)>),
    Binary {
        lhs: Box<Expression>,
        op: Operator,
        rhs: Box<Expression>,
    },
    Unary {
        op: Operator,
        exp: Box<Expression>,
    },
    Ternary {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    /// `exp as Target` / `exp as? Target`
    Cast {
        exp: Box<Expression>,
        target: SwiftType,
        optional: bool,
    },
    /// `exp is Target`
    TypeCheck {
        exp: Box<Expression>,
        target: SwiftType,
    },
    Assignment {
        lhs: Box<Expression>,
        op: Operator,
        rhs: Box<Expression>,
    },
    Parens(Box<Expression>),
    /// Closure literal `{ (a: Int) -> Void in … }`
    Closure {
        parameters: Vec<BlockParameter>,
        return_type: SwiftType,
        body: CompoundStatement,
    },
    SizeOf(SizeOfTarget),
    Postfix {
        base: Box<Expression>,
        operation: PostfixOperation,
    },
}

/// An expression with its (optionally) resolved type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExprKind,
    pub resolved_type: Option<SwiftType>,
}

// Structural equality only; resolved types are working state, not shape.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            resolved_type: None,
        }
    }

    // Leaf constructors

    pub fn identifier(name: impl Into<Name>) -> Self {
        Self::new(ExprKind::Identifier(name.into()))
    }

    pub fn constant(constant: Constant) -> Self {
        Self::new(ExprKind::Constant(constant))
    }

    pub fn integer(value: i64) -> Self {
        Self::constant(Constant::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::constant(Constant::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::constant(Constant::Boolean(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::constant(Constant::String(value.into()))
    }

    pub fn nil_literal() -> Self {
        Self::constant(Constant::Nil)
    }

    pub fn array_literal(items: Vec<Expression>) -> Self {
        Self::new(ExprKind::ArrayLiteral(items))
    }

    pub fn dictionary_literal(pairs: Vec<(Expression, Expression)>) -> Self {
        Self::new(ExprKind::DictionaryLiteral(pairs))
    }

    // Compound constructors

    pub fn binary(self, op: Operator, rhs: Expression) -> Self {
        Self::new(ExprKind::Binary {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub fn unary(op: Operator, exp: Expression) -> Self {
        Self::new(ExprKind::Unary {
            op,
            exp: Box::new(exp),
        })
    }

    pub fn ternary(condition: Expression, if_true: Expression, if_false: Expression) -> Self {
        Self::new(ExprKind::Ternary {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    pub fn assignment(lhs: Expression, op: Operator, rhs: Expression) -> Self {
        Self::new(ExprKind::Assignment {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub fn parens(exp: Expression) -> Self {
        Self::new(ExprKind::Parens(Box::new(exp)))
    }

    pub fn size_of_type(ty: SwiftType) -> Self {
        Self::new(ExprKind::SizeOf(SizeOfTarget::Type(ty)))
    }

    pub fn size_of_expression(exp: Expression) -> Self {
        Self::new(ExprKind::SizeOf(SizeOfTarget::Expression(Box::new(exp))))
    }

    pub fn closure(
        parameters: Vec<BlockParameter>,
        return_type: SwiftType,
        body: CompoundStatement,
    ) -> Self {
        Self::new(ExprKind::Closure {
            parameters,
            return_type,
            body,
        })
    }

    /// `self.member`
    pub fn dot(self, name: impl Into<Name>) -> Self {
        Self::new(ExprKind::Postfix {
            base: Box::new(self),
            operation: PostfixOperation::member(name),
        })
    }

    /// `self?.member`
    pub fn optional_dot(self, name: impl Into<Name>) -> Self {
        Self::new(ExprKind::Postfix {
            base: Box::new(self),
            operation: PostfixOperation::Member {
                name: name.into(),
                optional_access: true,
            },
        })
    }

    /// `self(arguments…)`
    pub fn call(self, arguments: Vec<FunctionArgument>) -> Self {
        Self::new(ExprKind::Postfix {
            base: Box::new(self),
            operation: PostfixOperation::call(arguments),
        })
    }

    /// `self[index]`
    pub fn sub(self, index: Expression) -> Self {
        Self::new(ExprKind::Postfix {
            base: Box::new(self),
            operation: PostfixOperation::Subscript {
                index: Box::new(index),
                optional_access: false,
            },
        })
    }

    /// `self as Target`
    pub fn cast_to(self, target: SwiftType) -> Self {
        Self::new(ExprKind::Cast {
            exp: Box::new(self),
            target,
            optional: false,
        })
    }

    /// `self as? Target`
    pub fn optional_cast_to(self, target: SwiftType) -> Self {
        Self::new(ExprKind::Cast {
            exp: Box::new(self),
            target,
            optional: true,
        })
    }

    /// `self is Target`
    pub fn type_check(self, target: SwiftType) -> Self {
        Self::new(ExprKind::TypeCheck {
            exp: Box::new(self),
            target,
        })
    }

    /// Builder: attach a resolved type.
    pub fn typed(mut self, ty: SwiftType) -> Self {
        self.resolved_type = Some(ty);
        self
    }

    // Accessors

    pub fn ty(&self) -> Option<&SwiftType> {
        self.resolved_type.as_ref()
    }

    pub fn as_identifier(&self) -> Option<Name> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(*name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn as_postfix(&self) -> Option<(&Expression, &PostfixOperation)> {
        match &self.kind {
            ExprKind::Postfix { base, operation } => Some((base, operation)),
            _ => None,
        }
    }

    /// `base(arguments…)` decomposition, when this is a call postfix.
    pub fn as_call(&self) -> Option<(&Expression, &[FunctionArgument])> {
        match &self.kind {
            ExprKind::Postfix {
                base,
                operation: PostfixOperation::Call { arguments, .. },
            } => Some((base, arguments)),
            _ => None,
        }
    }

    /// The literal kind of this expression, if it is literal-shaped.
    pub fn literal_kind(&self) -> Option<LiteralKind> {
        match &self.kind {
            ExprKind::Constant(constant) => Some(constant.literal_kind()),
            ExprKind::ArrayLiteral(_) => Some(LiteralKind::Array),
            ExprKind::DictionaryLiteral(_) => Some(LiteralKind::Dictionary),
            _ => None,
        }
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        match self.as_identifier() {
            Some(ident) => ident == name,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_resolved_types() {
        let plain = Expression::identifier("x").binary(Operator::Add, Expression::integer(1));
        let typed = Expression::identifier("x")
            .typed(SwiftType::int())
            .binary(Operator::Add, Expression::integer(1).typed(SwiftType::int()))
            .typed(SwiftType::int());

        assert_eq!(plain, typed);
    }

    #[test]
    fn copy_is_disjoint() {
        let original = Expression::identifier("view").dot("frame");
        let mut copy = original.clone();
        assert_eq!(original, copy);

        copy.resolved_type = Some(SwiftType::type_name("CGRect"));
        if let ExprKind::Postfix { base, .. } = &mut copy.kind {
            base.resolved_type = Some(SwiftType::type_name("UIView"));
        }

        // Structure unchanged, and the original's annotations untouched.
        assert_eq!(original, copy);
        assert!(original.resolved_type.is_none());
        let (base, _) = original.as_postfix().unwrap();
        assert!(base.resolved_type.is_none());
    }

    #[test]
    fn call_decomposition() {
        let call = Expression::identifier("CGPointMake").call(vec![
            FunctionArgument::unlabeled(Expression::integer(1)),
            FunctionArgument::unlabeled(Expression::integer(2)),
        ]);

        let (base, args) = call.as_call().unwrap();
        assert_eq!(base.as_identifier(), Some("CGPointMake".into()));
        assert_eq!(args.len(), 2);
        assert!(call.as_identifier().is_none());
    }

    #[test]
    fn literal_kinds() {
        assert_eq!(Expression::integer(3).literal_kind(), Some(LiteralKind::Integer));
        assert_eq!(Expression::float(1.5).literal_kind(), Some(LiteralKind::Float));
        assert_eq!(Expression::nil_literal().literal_kind(), Some(LiteralKind::Nil));
        assert_eq!(
            Expression::array_literal(vec![]).literal_kind(),
            Some(LiteralKind::Array)
        );
        assert_eq!(Expression::identifier("x").literal_kind(), None);
    }

    #[test]
    fn constant_display() {
        assert_eq!(Constant::Integer(42).to_string(), "42");
        assert_eq!(Constant::Float(2.0).to_string(), "2.0");
        assert_eq!(Constant::Float(2.5).to_string(), "2.5");
        assert_eq!(Constant::String("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Constant::Nil.to_string(), "nil");
    }
}
