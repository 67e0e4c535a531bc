//! # Expression Pass Pipeline
//!
//! Passes are composable visitors over intention bodies. The pipeline runs
//! the registered passes in order, re-running the whole list until a full
//! round reports no change. The round count is capped: exceeding the cap is
//! a configuration bug surfaced as a fatal diagnostic naming the offending
//! translation unit.

pub mod type_resolution;
pub mod invocation;
pub mod idioms;

pub use invocation::{
    default_transformers, ArgumentStrategy, FunctionInvocationTransformer, InvocationTransformPass,
    TransformTarget,
};
pub use idioms::IdiomCleanupPass;
pub use type_resolution::TypeResolutionPass;

use crate::overload::OverloadResolver;
use crate::type_system::TypeSystem;
use objswift_ast::{CompoundStatement, Diagnostics, Name, SourceRef, SwiftType};

/// Fixpoint budget per body. Exceeding it means a pass keeps reporting
/// changes it does not make, or two passes oscillate.
pub const MAX_FIXPOINT_ITERATIONS: usize = 10;

/// Everything a pass may consult while rewriting one body.
pub struct PassContext<'a> {
    pub type_system: &'a dyn TypeSystem,
    pub resolver: &'a OverloadResolver,
    pub diagnostics: &'a mut Diagnostics,
    /// Source of the intention whose body is being rewritten.
    pub source: SourceRef,
    /// The enclosing type, for `self`/`super` resolution.
    pub self_type: Option<SwiftType>,
    pub superclass_type: Option<SwiftType>,
    /// Function parameters in scope, outermost first.
    pub parameters: Vec<(Name, SwiftType)>,
}

/// One rewrite over a body. Returns whether anything structural or type
/// annotation changed, which drives the fixpoint.
pub trait ExpressionPass {
    fn name(&self) -> &'static str;

    fn apply(&mut self, context: &mut PassContext<'_>, body: &mut CompoundStatement) -> bool;
}

/// The registered pass list, applied to fixpoint.
pub struct ExpressionPassPipeline {
    passes: Vec<Box<dyn ExpressionPass>>,
}

impl ExpressionPassPipeline {
    pub fn new(passes: Vec<Box<dyn ExpressionPass>>) -> Self {
        Self { passes }
    }

    /// The standard pipeline: type annotation, then invocation transforms,
    /// then idiom cleanups.
    pub fn with_default_passes() -> Self {
        Self::new(vec![
            Box::new(TypeResolutionPass::new()),
            Box::new(InvocationTransformPass::with_default_transformers()),
            Box::new(IdiomCleanupPass::new()),
        ])
    }

    /// Run to fixpoint. Returns `false` when the iteration cap was hit, in
    /// which case a fatal diagnostic has been recorded.
    pub fn run(&mut self, context: &mut PassContext<'_>, body: &mut CompoundStatement) -> bool {
        for _ in 0..MAX_FIXPOINT_ITERATIONS {
            let mut changed = false;
            for pass in &mut self.passes {
                let pass_changed = pass.apply(context, body);
                if pass_changed {
                    log::debug!("pass {} changed {}", pass.name(), context.source);
                }
                changed |= pass_changed;
            }
            if !changed {
                return true;
            }
        }

        context.diagnostics.error(
            format!(
                "expression passes failed to reach a fixpoint after {} iterations",
                MAX_FIXPOINT_ITERATIONS
            ),
            Some(context.source.clone()),
        );
        false
    }
}
