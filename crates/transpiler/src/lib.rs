//! # ObjSwift Transpiler
//!
//! The rewrite pipeline from Objective-C source to Swift source:
//!
//! 1. **Frontend** (`objc`): scanner and recursive-descent parser producing
//!    a per-file parse tree, with `NS_ASSUME_NONNULL` region tracking and
//!    verbatim preprocessor capture.
//! 2. **Intention collection** (`collection` → `intentions`): one walk per
//!    file emits the cross-unit symbol table of classes, protocols,
//!    extensions, enums, structs, globals, and typedefs, then a link pass
//!    merges interface/implementation pairs and marks overrides.
//! 3. **Rewrite** (`passes`): type annotation, overload selection, the
//!    declarative invocation-transformer engine, and idiom cleanups, run to
//!    fixpoint per translation unit.
//! 4. **Emission** (`emit`): Swift source per unit.
//!
//! The [`Transpiler`] driver wires the phases together; translation units
//! run on scoped worker threads over a frozen intention graph and a shared
//! overload-resolver cache.

pub mod objc;
pub mod intentions;
pub mod collection;
pub mod stmt_convert;
pub mod type_system;
pub mod overload;
pub mod visit;
pub mod passes;
pub mod emit;
pub mod driver;

// Re-export key types
pub use collection::IntentionCollector;
pub use driver::{TranspileOutput, TranspiledFile, Transpiler};
pub use emit::{emit_expression, emit_file};
pub use intentions::{
    AccessLevel, ClassIntention, EnumIntention, ExtensionIntention, FileIntention,
    GlobalFuncIntention, GlobalVarIntention, IVarIntention, InitIntention, IntentionGraph,
    MethodIntention, Ownership, PropertyIntention, ProtocolIntention, StructIntention,
    TypedefIntention,
};
pub use objc::{parse_objc_file, NullabilityContext, ObjcTypeMapper, ParseError};
pub use overload::{Argument, OverloadResolver, OverloadResolverCache};
pub use passes::{
    default_transformers, ArgumentStrategy, ExpressionPass, ExpressionPassPipeline,
    FunctionInvocationTransformer, InvocationTransformPass, PassContext, TransformTarget,
    MAX_FIXPOINT_ITERATIONS,
};
pub use stmt_convert::StatementConverter;
pub use type_system::{IntentionTypeSystem, TypeSystem};

use thiserror::Error;

/// Terminal failure of a whole run, after per-file containment.
#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("translation produced {errors} error diagnostic(s)")]
    DiagnosticsEmitted { errors: usize },
}

pub type TranspileResult<T> = Result<T, TranspileError>;

impl TranspileOutput {
    /// Collapse into a result: any error diagnostic fails the run, while
    /// the per-file outputs that did succeed are kept in `Ok`'s absence.
    pub fn into_result(self) -> TranspileResult<Vec<TranspiledFile>> {
        let errors = self.diagnostics.errors().count();
        if errors > 0 {
            Err(TranspileError::DiagnosticsEmitted { errors })
        } else {
            Ok(self.files)
        }
    }
}
