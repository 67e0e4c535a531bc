//! # AST Visitors
//!
//! Classical visitor over the Swift expression AST: one method per node
//! variant with an associated result type, plus walker functions that fix
//! the traversal order the pipeline relies on. Sibling expressions are
//! always visited left-to-right; a visitor chooses post-order by walking
//! children before its own work (type annotation) and pre-order by doing
//! its work first (rewrites whose applicability depends on outer context).

use objswift_ast::{
    CompoundStatement, ExprKind, Expression, PostfixOperation, SizeOfTarget, Statement, StmtKind,
};

/// Visitor with one method per expression variant. Every method defaults to
/// [`ExpressionVisitor::visit_default`]; override the variants the pass
/// cares about and call [`walk_expression_children`] to descend.
pub trait ExpressionVisitor: Sized {
    type ExprResult;

    /// Fallback for variants the visitor does not handle specially.
    fn visit_default(&mut self, exp: &mut Expression) -> Self::ExprResult;

    fn visit_expression(&mut self, exp: &mut Expression) -> Self::ExprResult {
        match &exp.kind {
            ExprKind::Identifier(_) => self.visit_identifier(exp),
            ExprKind::Constant(_) => self.visit_constant(exp),
            ExprKind::ArrayLiteral(_) => self.visit_array_literal(exp),
            ExprKind::DictionaryLiteral(_) => self.visit_dictionary_literal(exp),
            ExprKind::Binary { .. } => self.visit_binary(exp),
            ExprKind::Unary { .. } => self.visit_unary(exp),
            ExprKind::Ternary { .. } => self.visit_ternary(exp),
            ExprKind::Cast { .. } => self.visit_cast(exp),
            ExprKind::TypeCheck { .. } => self.visit_type_check(exp),
            ExprKind::Assignment { .. } => self.visit_assignment(exp),
            ExprKind::Parens(_) => self.visit_parens(exp),
            ExprKind::Closure { .. } => self.visit_closure(exp),
            ExprKind::SizeOf(_) => self.visit_size_of(exp),
            ExprKind::Postfix { .. } => self.visit_postfix(exp),
        }
    }

    fn visit_identifier(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_constant(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_array_literal(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_dictionary_literal(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_binary(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_unary(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_ternary(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_cast(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_type_check(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_assignment(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_parens(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_closure(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_size_of(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }

    fn visit_postfix(&mut self, exp: &mut Expression) -> Self::ExprResult {
        self.visit_default(exp)
    }
}

/// Visit every direct child expression, left-to-right. Closure bodies count
/// as children so nested statements are reached.
pub fn walk_expression_children<V: ExpressionVisitor>(visitor: &mut V, exp: &mut Expression) {
    match &mut exp.kind {
        ExprKind::Identifier(_) | ExprKind::Constant(_) => {}
        ExprKind::ArrayLiteral(items) => {
            for item in items {
                visitor.visit_expression(item);
            }
        }
        ExprKind::DictionaryLiteral(pairs) => {
            for (key, value) in pairs {
                visitor.visit_expression(key);
                visitor.visit_expression(value);
            }
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expression(lhs);
            visitor.visit_expression(rhs);
        }
        ExprKind::Unary { exp: inner, .. } => {
            visitor.visit_expression(inner);
        }
        ExprKind::Ternary {
            condition,
            if_true,
            if_false,
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(if_true);
            visitor.visit_expression(if_false);
        }
        ExprKind::Cast { exp: inner, .. } | ExprKind::TypeCheck { exp: inner, .. } => {
            visitor.visit_expression(inner);
        }
        ExprKind::Assignment { lhs, rhs, .. } => {
            visitor.visit_expression(lhs);
            visitor.visit_expression(rhs);
        }
        ExprKind::Parens(inner) => {
            visitor.visit_expression(inner);
        }
        ExprKind::Closure { body, .. } => {
            visit_compound(visitor, body);
        }
        ExprKind::SizeOf(target) => {
            if let SizeOfTarget::Expression(inner) = target {
                visitor.visit_expression(inner);
            }
        }
        ExprKind::Postfix { base, operation } => {
            visitor.visit_expression(base);
            match operation {
                PostfixOperation::Member { .. } => {}
                PostfixOperation::Subscript { index, .. } => {
                    visitor.visit_expression(index);
                }
                PostfixOperation::Call { arguments, .. } => {
                    for argument in arguments {
                        visitor.visit_expression(&mut argument.expression);
                    }
                }
            }
        }
    }
}

/// Apply the visitor to every expression in a statement, recursing into
/// nested bodies.
pub fn visit_statement<V: ExpressionVisitor>(visitor: &mut V, statement: &mut Statement) {
    match &mut statement.kind {
        StmtKind::Compound(body) | StmtKind::Do(body) | StmtKind::Defer(body) => {
            visit_compound(visitor, body);
        }
        StmtKind::If {
            condition,
            body,
            else_body,
            ..
        } => {
            visitor.visit_expression(condition);
            visit_compound(visitor, body);
            if let Some(else_body) = else_body {
                visit_compound(visitor, else_body);
            }
        }
        StmtKind::While { condition, body } | StmtKind::RepeatWhile { condition, body } => {
            visitor.visit_expression(condition);
            visit_compound(visitor, body);
        }
        StmtKind::For { exp, body, .. } => {
            visitor.visit_expression(exp);
            visit_compound(visitor, body);
        }
        StmtKind::Switch {
            exp,
            cases,
            default,
        } => {
            visitor.visit_expression(exp);
            for case in cases {
                for stmt in &mut case.statements {
                    visit_statement(visitor, stmt);
                }
            }
            if let Some(default) = default {
                for stmt in default {
                    visit_statement(visitor, stmt);
                }
            }
        }
        StmtKind::Return(Some(exp)) => {
            visitor.visit_expression(exp);
        }
        StmtKind::Return(None)
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Unknown(_) => {}
        StmtKind::Expressions(exps) => {
            for exp in exps {
                visitor.visit_expression(exp);
            }
        }
        StmtKind::VariableDeclarations(declarations) => {
            for declaration in declarations {
                if let Some(init) = &mut declaration.initialization {
                    visitor.visit_expression(init);
                }
            }
        }
    }
}

pub fn visit_compound<V: ExpressionVisitor>(visitor: &mut V, body: &mut CompoundStatement) {
    for statement in body.iter_mut() {
        visit_statement(visitor, statement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objswift_ast::Operator;

    /// Records identifier names in visitation order.
    struct NameCollector {
        seen: Vec<String>,
    }

    impl ExpressionVisitor for NameCollector {
        type ExprResult = ();

        fn visit_default(&mut self, exp: &mut Expression) {
            if let Some(name) = exp.as_identifier() {
                self.seen.push(name.resolve());
            }
            walk_expression_children(self, exp);
        }
    }

    #[test]
    fn siblings_visit_left_to_right() {
        let mut exp = Expression::identifier("a")
            .binary(Operator::Add, Expression::identifier("b"))
            .binary(Operator::Add, Expression::identifier("c"));
        let mut collector = NameCollector { seen: vec![] };
        collector.visit_expression(&mut exp);
        assert_eq!(collector.seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn statements_reach_nested_expressions() {
        let mut stmt = Statement::if_stmt(
            Expression::identifier("cond"),
            vec![Statement::expression(
                Expression::identifier("callee").call(vec![
                    objswift_ast::FunctionArgument::unlabeled(Expression::identifier("arg")),
                ]),
            )],
            None,
        );
        let mut collector = NameCollector { seen: vec![] };
        visit_statement(&mut collector, &mut stmt);
        assert_eq!(collector.seen, vec!["cond", "callee", "arg"]);
    }
}
