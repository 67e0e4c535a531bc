//! # Type Resolution Pass
//!
//! Annotates expressions with resolved [`SwiftType`]s, leaves first:
//! literals, then identifiers through the local scope and intention graph,
//! then member accesses and call sites through the type system and overload
//! resolver. Failures are contained: the expression is annotated with the
//! error sentinel, a warning is recorded once, and every downstream query
//! that would need the type skips silently.

use crate::overload::{Argument, OverloadResolver};
use crate::passes::{ExpressionPass, PassContext};
use crate::type_system::TypeSystem;
use crate::visit::{walk_expression_children, ExpressionVisitor};
use objswift_ast::{
    CompoundStatement, Constant, Diagnostics, ExprKind, Expression, Name, Operator, Pattern,
    PostfixOperation, SourceRef, Statement, StmtKind, SwiftType,
};
use std::collections::HashMap;

pub struct TypeResolutionPass;

impl TypeResolutionPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeResolutionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionPass for TypeResolutionPass {
    fn name(&self) -> &'static str {
        "type-resolution"
    }

    fn apply(&mut self, context: &mut PassContext<'_>, body: &mut CompoundStatement) -> bool {
        let mut scope = HashMap::new();
        for (name, ty) in &context.parameters {
            scope.insert(*name, ty.clone());
        }

        let mut resolver = Resolver {
            type_system: context.type_system,
            overloads: context.resolver,
            diagnostics: context.diagnostics,
            source: context.source.clone(),
            self_type: context.self_type.clone(),
            superclass_type: context.superclass_type.clone(),
            scopes: vec![scope],
            changed: false,
        };
        resolver.resolve_block_statements(body);
        resolver.changed
    }
}

struct Resolver<'a, 'd> {
    type_system: &'a dyn TypeSystem,
    overloads: &'a OverloadResolver,
    diagnostics: &'d mut Diagnostics,
    source: SourceRef,
    self_type: Option<SwiftType>,
    superclass_type: Option<SwiftType>,
    scopes: Vec<HashMap<Name, SwiftType>>,
    changed: bool,
}

impl Resolver<'_, '_> {
    fn lookup_local(&self, name: Name) -> Option<&SwiftType> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    fn bind(&mut self, name: Name, ty: SwiftType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    fn set_type(&mut self, exp: &mut Expression, ty: SwiftType) {
        if exp.resolved_type.as_ref() != Some(&ty) {
            exp.resolved_type = Some(ty);
            self.changed = true;
        }
    }

    /// Mark unresolved, warning only on the first visit.
    fn set_error(&mut self, exp: &mut Expression, message: String) {
        if exp.resolved_type.is_none() {
            self.diagnostics
                .warning(message, Some(self.source.clone()));
        }
        self.set_type(exp, SwiftType::Error);
    }

    // Statement traversal with scope management.

    fn resolve_block(&mut self, body: &mut CompoundStatement) {
        self.scopes.push(HashMap::new());
        self.resolve_block_statements(body);
        self.scopes.pop();
    }

    fn resolve_block_statements(&mut self, body: &mut CompoundStatement) {
        for statement in body.iter_mut() {
            self.resolve_statement(statement);
        }
    }

    fn resolve_block_with(&mut self, binding: Option<(Name, SwiftType)>, body: &mut CompoundStatement) {
        self.scopes.push(HashMap::new());
        if let Some((name, ty)) = binding {
            self.bind(name, ty);
        }
        self.resolve_block_statements(body);
        self.scopes.pop();
    }

    fn resolve_statement(&mut self, statement: &mut Statement) {
        match &mut statement.kind {
            StmtKind::Compound(body) | StmtKind::Do(body) | StmtKind::Defer(body) => {
                self.resolve_block(body)
            }
            StmtKind::If {
                pattern,
                condition,
                body,
                else_body,
            } => {
                self.visit_expression(condition);
                let binding = match pattern {
                    Some(Pattern::Identifier(name)) => {
                        let unwrapped = condition
                            .resolved_type
                            .as_ref()
                            .map(|t| t.deep_unwrapped().clone())
                            .unwrap_or(SwiftType::Error);
                        Some((*name, unwrapped))
                    }
                    _ => None,
                };
                self.resolve_block_with(binding, body);
                if let Some(else_body) = else_body {
                    self.resolve_block(else_body);
                }
            }
            StmtKind::While { condition, body } | StmtKind::RepeatWhile { condition, body } => {
                self.visit_expression(condition);
                self.resolve_block(body);
            }
            StmtKind::For { pattern, exp, body } => {
                self.visit_expression(exp);
                let element = match exp.resolved_type.as_ref().map(SwiftType::deep_unwrapped) {
                    Some(SwiftType::Array(element)) => (**element).clone(),
                    _ => SwiftType::Error,
                };
                let binding = match pattern {
                    Pattern::Identifier(name) => Some((*name, element)),
                    _ => None,
                };
                self.resolve_block_with(binding, body);
            }
            StmtKind::Switch {
                exp,
                cases,
                default,
            } => {
                self.visit_expression(exp);
                for case in cases {
                    for pattern in &mut case.patterns {
                        if let Pattern::Expression(value) = pattern {
                            self.visit_expression(value);
                        }
                    }
                    self.scopes.push(HashMap::new());
                    for stmt in &mut case.statements {
                        self.resolve_statement(stmt);
                    }
                    self.scopes.pop();
                }
                if let Some(default) = default {
                    self.scopes.push(HashMap::new());
                    for stmt in default {
                        self.resolve_statement(stmt);
                    }
                    self.scopes.pop();
                }
            }
            StmtKind::Return(Some(exp)) => {
                self.visit_expression(exp);
            }
            StmtKind::Expressions(exps) => {
                for exp in exps {
                    self.visit_expression(exp);
                }
            }
            StmtKind::VariableDeclarations(declarations) => {
                for declaration in declarations {
                    if let Some(init) = &mut declaration.initialization {
                        self.visit_expression(init);
                    }
                    // Unknown declared types adopt the initializer's type.
                    if declaration.ty.is_error() {
                        if let Some(ty) = declaration
                            .initialization
                            .as_ref()
                            .and_then(|i| i.resolved_type.clone())
                        {
                            if !ty.is_error() {
                                declaration.ty = ty;
                                self.changed = true;
                            }
                        }
                    }
                    self.bind(declaration.name, declaration.ty.clone());
                }
            }
            StmtKind::Return(None)
            | StmtKind::Break(_)
            | StmtKind::Continue(_)
            | StmtKind::Unknown(_) => {}
        }
    }

    // Expression typing, post-order.

    fn annotate(&mut self, exp: &mut Expression) {
        match &exp.kind {
            ExprKind::Constant(constant) => {
                let ty = match constant {
                    Constant::Integer(_) => SwiftType::int(),
                    Constant::Float(_) => SwiftType::double(),
                    Constant::Boolean(_) => SwiftType::bool(),
                    Constant::String(_) => SwiftType::string(),
                    Constant::Nil => SwiftType::optional_of(SwiftType::type_name("Any")),
                };
                self.set_type(exp, ty);
            }
            ExprKind::Identifier(name) => {
                let name = *name;
                if let Some(ty) = self.identifier_type(name) {
                    self.set_type(exp, ty);
                } else {
                    self.set_error(exp, format!("unable to resolve identifier `{}`", name));
                }
            }
            ExprKind::ArrayLiteral(_) | ExprKind::DictionaryLiteral(_) => {
                let ty = self.literal_collection_type(exp);
                self.set_type(exp, ty);
            }
            ExprKind::Binary { .. } => {
                let ty = self.binary_type(exp);
                if let Some(ty) = ty {
                    self.set_type(exp, ty);
                }
            }
            ExprKind::Unary { .. } => {
                if let ExprKind::Unary { op, exp: operand } = &exp.kind {
                    let ty = match op {
                        Operator::Negate => Some(SwiftType::bool()),
                        _ => operand.resolved_type.clone(),
                    };
                    if let Some(ty) = ty {
                        self.set_type(exp, ty);
                    }
                }
            }
            ExprKind::Ternary { if_true, .. } => {
                if let Some(ty) = if_true.resolved_type.clone() {
                    self.set_type(exp, ty);
                }
            }
            ExprKind::Cast {
                target, optional, ..
            } => {
                let ty = if *optional {
                    SwiftType::optional_of(target.clone())
                } else {
                    target.clone()
                };
                self.set_type(exp, ty.normalized());
            }
            ExprKind::TypeCheck { .. } => self.set_type(exp, SwiftType::bool()),
            ExprKind::Assignment { .. } => self.set_type(exp, SwiftType::void()),
            ExprKind::Parens(inner) => {
                if let Some(ty) = inner.resolved_type.clone() {
                    self.set_type(exp, ty);
                }
            }
            ExprKind::Closure {
                parameters,
                return_type,
                ..
            } => {
                let ty = SwiftType::block(
                    return_type.clone(),
                    parameters.iter().map(|p| p.ty.clone()).collect(),
                );
                self.set_type(exp, ty);
            }
            ExprKind::SizeOf(_) => self.set_type(exp, SwiftType::int()),
            ExprKind::Postfix { .. } => self.annotate_postfix(exp),
        }
    }

    fn identifier_type(&mut self, name: Name) -> Option<SwiftType> {
        if name == "self" {
            return self.self_type.clone();
        }
        if name == "super" {
            return self.superclass_type.clone();
        }
        if let Some(ty) = self.lookup_local(name) {
            return Some(ty.clone());
        }
        if let Some(ty) = self.type_system.identifier_type(name) {
            return Some(ty);
        }
        if is_builtin_initializer(name) {
            return Some(SwiftType::metatype_of(SwiftType::type_name(name)));
        }
        None
    }

    fn literal_collection_type(&mut self, exp: &Expression) -> SwiftType {
        match &exp.kind {
            ExprKind::ArrayLiteral(items) => {
                let mut element: Option<SwiftType> = None;
                for item in items {
                    match (&element, &item.resolved_type) {
                        (None, Some(ty)) if !ty.is_error() => element = Some(ty.clone()),
                        (Some(current), Some(ty)) if current != ty => {
                            element = Some(SwiftType::type_name("Any"));
                            break;
                        }
                        _ => {}
                    }
                }
                SwiftType::array_of(element.unwrap_or_else(|| SwiftType::type_name("Any")))
            }
            ExprKind::DictionaryLiteral(pairs) => {
                let key = pairs
                    .first()
                    .and_then(|(k, _)| k.resolved_type.clone())
                    .filter(|t| !t.is_error())
                    .unwrap_or_else(|| SwiftType::type_name("AnyHashable"));
                let value = pairs
                    .first()
                    .and_then(|(_, v)| v.resolved_type.clone())
                    .filter(|t| !t.is_error())
                    .unwrap_or_else(|| SwiftType::type_name("Any"));
                SwiftType::dictionary_of(key, value)
            }
            _ => SwiftType::Error,
        }
    }

    fn binary_type(&mut self, exp: &Expression) -> Option<SwiftType> {
        let ExprKind::Binary { lhs, op, rhs } = &exp.kind else {
            return None;
        };
        if op.is_comparison() || matches!(op, Operator::LogicalAnd | Operator::LogicalOr) {
            return Some(SwiftType::bool());
        }
        if matches!(op, Operator::NullCoalesce) {
            return rhs.resolved_type.clone();
        }

        let lhs_ty = lhs.resolved_type.as_ref()?;
        let rhs_ty = rhs.resolved_type.as_ref()?;
        if lhs_ty.is_error() || rhs_ty.is_error() {
            return Some(SwiftType::Error);
        }
        if lhs_ty == rhs_ty {
            return Some(lhs_ty.clone());
        }
        // Mixed numeric arithmetic widens toward the floating side.
        if self.type_system.is_numeric(lhs_ty) && self.type_system.is_numeric(rhs_ty) {
            if self.type_system.is_float(lhs_ty) {
                return Some(lhs_ty.clone());
            }
            if self.type_system.is_float(rhs_ty) {
                return Some(rhs_ty.clone());
            }
            return Some(lhs_ty.clone());
        }
        Some(lhs_ty.clone())
    }

    fn annotate_postfix(&mut self, exp: &mut Expression) {
        let ExprKind::Postfix { base, operation } = &exp.kind else {
            return;
        };

        match operation {
            PostfixOperation::Member { name, .. } => {
                let name = *name;
                let Some(base_ty) = base.resolved_type.clone() else {
                    return;
                };
                if base_ty.is_error() {
                    // Contained failure: skip silently downstream.
                    self.set_type(exp, SwiftType::Error);
                    return;
                }
                let receiver = match &base_ty {
                    SwiftType::Metatype(inner) => (**inner).clone(),
                    other => other.clone(),
                };
                match self.type_system.member_type(&receiver, name) {
                    Some(ty) => self.set_type(exp, ty),
                    None => {
                        let message = format!(
                            "unable to resolve member `{}` on `{}`",
                            name, receiver
                        );
                        self.set_error(exp, message);
                    }
                }
            }
            PostfixOperation::Subscript { .. } => {
                let Some(base_ty) = base.resolved_type.as_ref() else {
                    return;
                };
                let ty = match base_ty.deep_unwrapped() {
                    SwiftType::Array(element) => (**element).clone(),
                    SwiftType::Dictionary { value, .. } => {
                        SwiftType::optional_of((**value).clone())
                    }
                    _ => SwiftType::Error,
                };
                self.set_type(exp, ty);
            }
            PostfixOperation::Call { arguments, .. } => {
                let arguments: Vec<Argument> = arguments
                    .iter()
                    .map(|a| Argument::from_expression(&a.expression))
                    .collect();
                self.annotate_call(exp, &arguments);
            }
        }
    }

    fn annotate_call(&mut self, exp: &mut Expression, arguments: &[Argument]) {
        let ExprKind::Postfix { base, .. } = &exp.kind else {
            return;
        };

        // Initializer call: `TypeName(...)`.
        if let Some(name) = base.as_identifier() {
            if let Some(SwiftType::Metatype(inner)) = base.resolved_type.as_ref() {
                let ty = (**inner).clone();
                self.set_type(exp, ty);
                return;
            }
            if is_builtin_initializer(name) {
                self.set_type(exp, SwiftType::type_name(name));
                return;
            }
            // Free-function call: pick the overload by arguments.
            let signatures = self.type_system.function_signatures(name);
            if !signatures.is_empty() {
                match self
                    .overloads
                    .resolve(self.type_system, &signatures, arguments)
                {
                    Some(index) => {
                        let ty = signatures[index].return_type.clone();
                        self.set_type(exp, ty);
                    }
                    None => {
                        let message =
                            format!("no overload of `{}` matches the call", name);
                        self.set_error(exp, message);
                    }
                }
                return;
            }
        }

        // Method call through a member access.
        if let ExprKind::Postfix {
            base: receiver,
            operation: PostfixOperation::Member { name, .. },
        } = &base.kind
        {
            let name = *name;
            let Some(receiver_ty) = receiver.resolved_type.clone() else {
                return;
            };
            if receiver_ty.is_error() {
                self.set_type(exp, SwiftType::Error);
                return;
            }
            let receiver_ty = match &receiver_ty {
                SwiftType::Metatype(inner) => (**inner).clone(),
                other => other.clone(),
            };
            let signatures = self.type_system.method_signatures(&receiver_ty, name);
            if !signatures.is_empty() {
                match self
                    .overloads
                    .resolve(self.type_system, &signatures, arguments)
                {
                    Some(index) => {
                        let ty = signatures[index].return_type.clone();
                        self.set_type(exp, ty);
                    }
                    None => {
                        let message = format!(
                            "no overload of `{}` on `{}` matches the call",
                            name, receiver_ty
                        );
                        self.set_error(exp, message);
                    }
                }
                return;
            }
            // A block-typed property being invoked.
            if let Some(SwiftType::Block { return_type, .. }) =
                base.resolved_type.as_ref().map(|t| t.deep_unwrapped())
            {
                let ty = (**return_type).clone();
                self.set_type(exp, ty);
            }
            return;
        }

        // Calling a block-typed value.
        if let Some(SwiftType::Block { return_type, .. }) =
            base.resolved_type.as_ref().map(|t| t.deep_unwrapped())
        {
            let ty = (**return_type).clone();
            self.set_type(exp, ty);
        }
    }
}

/// Value types whose initializer calls are recognized without intentions.
fn is_builtin_initializer(name: Name) -> bool {
    name.with_str(|s| {
        matches!(
            s,
            "CGPoint" | "CGSize" | "CGRect" | "CGVector" | "NSRange" | "Int" | "UInt" | "Double"
                | "Float" | "CGFloat" | "Bool" | "String"
        )
    })
}

impl ExpressionVisitor for Resolver<'_, '_> {
    type ExprResult = ();

    // Children first: every rule above reads child annotations.
    fn visit_default(&mut self, exp: &mut Expression) {
        walk_expression_children(self, exp);
        self.annotate(exp);
    }

    fn visit_closure(&mut self, exp: &mut Expression) {
        if let ExprKind::Closure {
            parameters, body, ..
        } = &mut exp.kind
        {
            self.scopes.push(HashMap::new());
            for parameter in parameters.iter() {
                self.bind(parameter.name, parameter.ty.clone());
            }
            for statement in body.iter_mut() {
                self.resolve_statement(statement);
            }
            self.scopes.pop();
        }
        self.annotate(exp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IntentionCollector;
    use crate::intentions::IntentionGraph;
    use crate::objc::parse_objc_file;
    use crate::type_system::IntentionTypeSystem;
    use objswift_ast::SourceFile;

    fn graph_from(source: &str) -> IntentionGraph {
        let file = parse_objc_file(&SourceFile::new("t.h", source)).unwrap();
        IntentionCollector::new().collect(&[file])
    }

    fn run_pass(
        graph: &IntentionGraph,
        self_type: Option<SwiftType>,
        parameters: Vec<(Name, SwiftType)>,
        body: &mut CompoundStatement,
    ) -> Diagnostics {
        let ts = IntentionTypeSystem::new(graph);
        let resolver = OverloadResolver::new();
        let mut diagnostics = Diagnostics::new();
        let mut context = PassContext {
            type_system: &ts,
            resolver: &resolver,
            diagnostics: &mut diagnostics,
            source: SourceRef::synthesized(),
            self_type,
            superclass_type: None,
            parameters,
        };
        let mut pass = TypeResolutionPass::new();
        // Two rounds, mirroring the fixpoint loop.
        pass.apply(&mut context, body);
        pass.apply(&mut context, body);
        diagnostics
    }

    #[test]
    fn literals_and_parameters_annotate() {
        let graph = IntentionGraph::new();
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("x").binary(Operator::Add, Expression::integer(2)),
        )]
        .into();

        run_pass(
            &graph,
            None,
            vec![(Name::new("x"), SwiftType::int())],
            &mut body,
        );

        let StmtKind::Expressions(exps) = &body.statements[0].kind else {
            panic!("expected expression statement");
        };
        assert_eq!(exps[0].resolved_type, Some(SwiftType::int()));
        let ExprKind::Binary { lhs, rhs, .. } = &exps[0].kind else {
            panic!("expected binary");
        };
        assert_eq!(lhs.resolved_type, Some(SwiftType::int()));
        assert_eq!(rhs.resolved_type, Some(SwiftType::int()));
    }

    #[test]
    fn member_access_resolves_through_self() {
        let graph = graph_from(
            "NS_ASSUME_NONNULL_BEGIN\n@interface V\n@property NSString *title;\n@end\nNS_ASSUME_NONNULL_END",
        );
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("self").dot("title"),
        )]
        .into();

        run_pass(&graph, Some(SwiftType::type_name("V")), vec![], &mut body);

        let StmtKind::Expressions(exps) = &body.statements[0].kind else {
            panic!()
        };
        assert_eq!(exps[0].resolved_type, Some(SwiftType::string()));
    }

    #[test]
    fn unresolved_member_is_contained_with_one_warning() {
        let graph = graph_from("@interface V\n@end");
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("self").dot("missing").dot("deeper"),
        )]
        .into();

        let diagnostics = run_pass(&graph, Some(SwiftType::type_name("V")), vec![], &mut body);

        let StmtKind::Expressions(exps) = &body.statements[0].kind else {
            panic!()
        };
        // Both levels end up as the error sentinel…
        assert_eq!(exps[0].resolved_type, Some(SwiftType::Error));
        // …but only the root failure warns, and only once across rounds.
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn local_declarations_flow_into_later_statements() {
        let graph = IntentionGraph::new();
        let mut body: CompoundStatement = vec![
            Statement::variable_declarations(vec![objswift_ast::VariableDeclaration::variable(
                "total",
                SwiftType::double(),
                Some(Expression::float(0.0)),
            )]),
            Statement::expression(
                Expression::identifier("total").binary(Operator::Add, Expression::float(1.0)),
            ),
        ]
        .into();

        run_pass(&graph, None, vec![], &mut body);

        let StmtKind::Expressions(exps) = &body.statements[1].kind else {
            panic!()
        };
        assert_eq!(exps[0].resolved_type, Some(SwiftType::double()));
    }

    #[test]
    fn overloaded_method_calls_pick_by_arguments() {
        let graph = graph_from(
            "NS_ASSUME_NONNULL_BEGIN\n\
             @interface W\n\
             - (NSInteger)pick:(NSInteger)value;\n\
             - (NSString *)pick:(NSString *)value;\n\
             @end\n\
             NS_ASSUME_NONNULL_END",
        );
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("self").dot("pick").call(vec![
                objswift_ast::FunctionArgument::unlabeled(Expression::string("hello")),
            ]),
        )]
        .into();

        run_pass(&graph, Some(SwiftType::type_name("W")), vec![], &mut body);

        let StmtKind::Expressions(exps) = &body.statements[0].kind else {
            panic!()
        };
        assert_eq!(exps[0].resolved_type, Some(SwiftType::string()));
    }

    #[test]
    fn builtin_initializer_calls_take_the_type() {
        let graph = IntentionGraph::new();
        let mut body: CompoundStatement = vec![Statement::expression(
            Expression::identifier("CGPoint").call(vec![
                objswift_ast::FunctionArgument::labeled("x", Expression::integer(1)),
                objswift_ast::FunctionArgument::labeled("y", Expression::integer(2)),
            ]),
        )]
        .into();

        run_pass(&graph, None, vec![], &mut body);

        let StmtKind::Expressions(exps) = &body.statements[0].kind else {
            panic!()
        };
        assert_eq!(exps[0].resolved_type, Some(SwiftType::type_name("CGPoint")));
    }
}
