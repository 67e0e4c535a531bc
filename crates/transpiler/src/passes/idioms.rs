//! # Idiom Cleanup Pass
//!
//! Post-transform touch-ups that turn C-shaped leftovers into Swift idiom:
//!
//! - numeric casts become converting initializers: `(NSInteger)x` → `Int(x)`
//! - unprovable object downcasts become conditional: `x as T` → `x as? T`
//! - postfix access through a conditional cast chains optionally:
//!   `(x as? T).f()` → `(x as? T)?.f()`

use crate::passes::{ExpressionPass, PassContext};
use crate::type_system::TypeSystem;
use crate::visit::{visit_compound, walk_expression_children, ExpressionVisitor};
use objswift_ast::{
    CompoundStatement, ExprKind, Expression, FunctionArgument, SwiftType,
};

pub struct IdiomCleanupPass;

impl IdiomCleanupPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdiomCleanupPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionPass for IdiomCleanupPass {
    fn name(&self) -> &'static str {
        "idiom-cleanup"
    }

    fn apply(&mut self, context: &mut PassContext<'_>, body: &mut CompoundStatement) -> bool {
        let mut cleaner = Cleaner {
            type_system: context.type_system,
            changed: false,
        };
        visit_compound(&mut cleaner, body);
        cleaner.changed
    }
}

struct Cleaner<'a> {
    type_system: &'a dyn TypeSystem,
    changed: bool,
}

impl Cleaner<'_> {
    /// `(T)x` on a numeric target is a conversion, not a cast.
    fn rewrite_numeric_cast(&mut self, exp: &mut Expression) -> bool {
        let ExprKind::Cast {
            exp: inner,
            target,
            optional: false,
        } = &exp.kind
        else {
            return false;
        };
        if !self.type_system.is_numeric(target) {
            return false;
        }
        let Some(name) = target.nominal_name() else {
            return false;
        };
        let rewritten = Expression::identifier(name)
            .call(vec![FunctionArgument::unlabeled((**inner).clone())])
            .typed(target.clone());
        *exp = rewritten;
        self.changed = true;
        true
    }

    /// A cast the type system cannot prove is a downcast; make it
    /// conditional.
    fn rewrite_object_cast(&mut self, exp: &mut Expression) {
        let ExprKind::Cast {
            exp: inner,
            target,
            optional: optional @ false,
        } = &mut exp.kind
        else {
            return;
        };
        if !matches!(
            target,
            SwiftType::Nominal(_) | SwiftType::Nested(_) | SwiftType::ProtocolComposition(_)
        ) {
            return;
        }
        // A provable upcast keeps the unconditional form.
        if let Some(source_ty) = inner.resolved_type.as_ref() {
            if !source_ty.is_error() && self.type_system.is_assignable(source_ty, target) {
                return;
            }
            if source_ty.is_error() {
                return;
            }
            *optional = true;
            exp.resolved_type = Some(SwiftType::optional_of(target.clone()).normalized());
            self.changed = true;
        }
    }

    /// Member/call/subscript through an `as?` base chains with `?.`.
    fn chain_through_optional_cast(&mut self, exp: &mut Expression) {
        let ExprKind::Postfix { base, operation } = &mut exp.kind else {
            return;
        };
        if !matches!(&base.kind, ExprKind::Cast { optional: true, .. }) {
            return;
        }
        if !operation.optional_access() {
            operation.set_optional_access(true);
            self.changed = true;
        }
    }
}

impl ExpressionVisitor for Cleaner<'_> {
    type ExprResult = ();

    fn visit_default(&mut self, exp: &mut Expression) {
        walk_expression_children(self, exp);
    }

    // Pre-order: the outer node's shape decides the rewrite before any
    // child mutation invalidates the pattern.
    fn visit_cast(&mut self, exp: &mut Expression) {
        if !self.rewrite_numeric_cast(exp) {
            self.rewrite_object_cast(exp);
        }
        walk_expression_children(self, exp);
    }

    fn visit_postfix(&mut self, exp: &mut Expression) {
        self.chain_through_optional_cast(exp);
        walk_expression_children(self, exp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IntentionCollector;
    use crate::intentions::IntentionGraph;
    use crate::objc::parse_objc_file;
    use crate::overload::OverloadResolver;
    use crate::type_system::IntentionTypeSystem;
    use objswift_ast::{Diagnostics, SourceFile, SourceRef, Statement, StmtKind};

    fn run(graph: &IntentionGraph, body: &mut CompoundStatement) {
        let ts = IntentionTypeSystem::new(graph);
        let resolver = OverloadResolver::new();
        let mut diagnostics = Diagnostics::new();
        let mut context = PassContext {
            type_system: &ts,
            resolver: &resolver,
            diagnostics: &mut diagnostics,
            source: SourceRef::synthesized(),
            self_type: None,
            superclass_type: None,
            parameters: vec![],
        };
        IdiomCleanupPass::new().apply(&mut context, body);
    }

    fn first_expression(body: &CompoundStatement) -> &Expression {
        match &body.statements[0].kind {
            StmtKind::Expressions(exps) => &exps[0],
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn numeric_casts_become_initializers() {
        let graph = IntentionGraph::new();
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("x")
                .typed(SwiftType::double())
                .cast_to(SwiftType::int()),
        )]
        .into();
        run(&graph, &mut body);

        let expected = Expression::identifier("Int").call(vec![FunctionArgument::unlabeled(
            Expression::identifier("x"),
        )]);
        assert_eq!(first_expression(&body), &expected);
    }

    #[test]
    fn unprovable_downcasts_become_conditional() {
        let file = parse_objc_file(&SourceFile::new(
            "h.h",
            "@interface Base\n@end\n@interface Sub : Base\n@end",
        ))
        .unwrap();
        let graph = IntentionCollector::new().collect(&[file]);

        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("value")
                .typed(SwiftType::type_name("Base"))
                .cast_to(SwiftType::type_name("Sub")),
        )]
        .into();
        run(&graph, &mut body);

        match &first_expression(&body).kind {
            ExprKind::Cast { optional, .. } => assert!(*optional),
            other => panic!("expected cast, got {:?}", other),
        }

        // The reverse direction is a provable upcast and stays plain.
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("value")
                .typed(SwiftType::type_name("Sub"))
                .cast_to(SwiftType::type_name("Base")),
        )]
        .into();
        run(&graph, &mut body);
        match &first_expression(&body).kind {
            ExprKind::Cast { optional, .. } => assert!(!*optional),
            other => panic!("expected cast, got {:?}", other),
        }
    }

    #[test]
    fn postfix_through_conditional_cast_chains() {
        let graph = IntentionGraph::new();
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("value")
                .optional_cast_to(SwiftType::type_name("Sub"))
                .dot("run")
                .call(vec![]),
        )]
        .into();
        run(&graph, &mut body);

        // The member access straight after the cast gains optional access;
        // the call after it continues the chain unchanged.
        let outer = first_expression(&body);
        let ExprKind::Postfix { base, operation } = &outer.kind else {
            panic!("expected call postfix");
        };
        assert!(!operation.optional_access());
        let ExprKind::Postfix { operation, .. } = &base.kind else {
            panic!("expected member postfix");
        };
        assert!(operation.optional_access());
    }
}
