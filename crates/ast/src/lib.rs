//! # ObjSwift Language Model
//!
//! The shared data model for the ObjSwift translator: Swift and Objective-C
//! type signatures, the Swift output AST, function/selector signatures, and
//! the Swift type grammar parser.
//!
//! ## Overview
//!
//! Translation flows through these types leaves-first:
//!
//! 1. The frontend parses Objective-C declarations into [`ObjcType`]s and a
//!    raw parse tree.
//! 2. Intention collection maps declarations onto Swift signatures built
//!    from [`SwiftType`], [`FunctionSignature`], and [`SelectorSignature`].
//! 3. Expression passes rewrite [`Expression`]/[`Statement`] trees, filling
//!    in `resolved_type` annotations as they go.
//!
//! Equality on AST nodes is structural: resolved types and source positions
//! never participate, so a pass can annotate a tree without perturbing
//! fixpoint detection.

pub mod arena;
pub mod source;
pub mod diagnostics;

pub mod swift_type;
pub mod objc_type;
pub mod expression;
pub mod statement;
pub mod signature;
pub mod type_parser;

// Re-exports for convenience
pub use arena::Name;

pub use source::{Location, SourceFile, SourceRef, Span};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};

pub use swift_type::{CompositionMember, NominalSwiftType, SwiftType, TupleSwiftType};
pub use objc_type::ObjcType;

pub use expression::{
    BlockParameter, Constant, ExprKind, Expression, FunctionArgument, LiteralKind, Operator,
    PostfixOperation, SizeOfTarget,
};
pub use statement::{
    CompoundStatement, Pattern, Statement, StmtKind, SwitchCase, UnknownContext,
    VariableDeclaration,
};
pub use signature::{FunctionSignature, ParameterSignature, SelectorSignature};
pub use type_parser::{parse_swift_type, TypeParseError};
