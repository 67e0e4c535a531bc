//! # Body Conversion
//!
//! Lowers Objective-C statements and expressions onto the Swift AST:
//! message sends become member calls or initializers, `setX:` sends become
//! property assignments, C loops become their Swift counterparts. The
//! produced trees carry no resolved types; the expression passes fill those
//! in afterwards.

use crate::objc::{NullabilityContext, ObjcExpr, ObjcStmt, ObjcSwitchCase, ObjcTypeMapper};
use objswift_ast::{
    CompoundStatement, Expression, FunctionArgument, Name, ObjcType, Operator, Pattern, Statement,
    SwitchCase, SwiftType, VariableDeclaration,
};

pub struct StatementConverter<'a> {
    mapper: &'a ObjcTypeMapper,
    context: NullabilityContext,
    instance_type: Option<Name>,
}

impl<'a> StatementConverter<'a> {
    pub fn new(
        mapper: &'a ObjcTypeMapper,
        context: NullabilityContext,
        instance_type: Option<Name>,
    ) -> Self {
        Self {
            mapper,
            context,
            instance_type,
        }
    }

    pub fn convert_body(&self, statements: &[ObjcStmt]) -> CompoundStatement {
        statements
            .iter()
            .map(|s| self.convert_statement(s))
            .collect::<Vec<_>>()
            .into()
    }

    fn swift_type(&self, ty: &ObjcType) -> SwiftType {
        self.mapper.swift_type(ty, self.context, self.instance_type)
    }

    pub fn convert_statement(&self, statement: &ObjcStmt) -> Statement {
        match statement {
            ObjcStmt::Expression(exp) => Statement::expression(self.convert_statement_expr(exp)),
            ObjcStmt::VarDecl { ty, declarators } => {
                let swift_ty = self.swift_type(ty);
                Statement::variable_declarations(
                    declarators
                        .iter()
                        .map(|(name, init)| {
                            VariableDeclaration::variable(
                                *name,
                                swift_ty.clone(),
                                init.as_ref().map(|e| self.convert_expression(e)),
                            )
                        })
                        .collect(),
                )
            }
            ObjcStmt::If {
                condition,
                then_body,
                else_body,
            } => Statement::if_stmt(
                self.convert_expression(condition),
                self.convert_body(then_body),
                else_body.as_ref().map(|b| self.convert_body(b)),
            ),
            ObjcStmt::While { condition, body } => Statement::while_stmt(
                self.convert_expression(condition),
                self.convert_body(body),
            ),
            ObjcStmt::DoWhile { body, condition } => Statement::repeat_while(
                self.convert_expression(condition),
                self.convert_body(body),
            ),
            ObjcStmt::For {
                init,
                condition,
                step,
                body,
            } => self.convert_c_for(init.as_deref(), condition.as_ref(), step.as_ref(), body),
            ObjcStmt::ForIn {
                name,
                collection,
                body,
                ..
            } => Statement::for_in(
                Pattern::Identifier(*name),
                self.convert_expression(collection),
                self.convert_body(body),
            ),
            ObjcStmt::Switch {
                exp,
                cases,
                default,
            } => self.convert_switch(exp, cases, default.as_deref()),
            ObjcStmt::Return(value) => {
                Statement::return_stmt(value.as_ref().map(|e| self.convert_expression(e)))
            }
            ObjcStmt::Break => Statement::break_stmt(),
            ObjcStmt::Continue => Statement::continue_stmt(),
            ObjcStmt::Compound(statements) => Statement::compound(self.convert_body(statements)),
        }
    }

    /// `for (init; cond; step)` has no direct Swift form; lower to a scoped
    /// `while` with the step appended to the body.
    fn convert_c_for(
        &self,
        init: Option<&ObjcStmt>,
        condition: Option<&ObjcExpr>,
        step: Option<&ObjcExpr>,
        body: &[ObjcStmt],
    ) -> Statement {
        let condition = condition
            .map(|c| self.convert_expression(c))
            .unwrap_or_else(|| Expression::boolean(true));

        let mut loop_body = self.convert_body(body);
        if let Some(step) = step {
            loop_body.push(Statement::expression(self.convert_statement_expr(step)));
        }

        let while_stmt = Statement::while_stmt(condition, loop_body);
        match init {
            Some(init) => {
                Statement::compound(vec![self.convert_statement(init), while_stmt])
            }
            None => while_stmt,
        }
    }

    fn convert_switch(
        &self,
        exp: &ObjcExpr,
        cases: &[ObjcSwitchCase],
        default: Option<&[ObjcStmt]>,
    ) -> Statement {
        let strip_trailing_break = |mut statements: Vec<Statement>| {
            if statements.last() == Some(&Statement::break_stmt()) {
                statements.pop();
            }
            statements
        };

        let swift_cases = cases
            .iter()
            .map(|case| SwitchCase {
                patterns: case
                    .values
                    .iter()
                    .map(|v| Pattern::Expression(Box::new(self.convert_expression(v))))
                    .collect(),
                statements: strip_trailing_break(
                    self.convert_body(&case.body).statements,
                ),
            })
            .collect();

        // Swift switches must be exhaustive; a missing default becomes an
        // explicit empty one.
        let default = Some(match default {
            Some(statements) => strip_trailing_break(self.convert_body(statements).statements),
            None => vec![Statement::break_stmt()],
        });

        Statement::new(objswift_ast::StmtKind::Switch {
            exp: self.convert_expression(exp),
            cases: swift_cases,
            default,
        })
    }

    /// Expressions in statement position: `x++` becomes `x += 1` here, where
    /// the assignment form is legal.
    fn convert_statement_expr(&self, exp: &ObjcExpr) -> Expression {
        match exp {
            ObjcExpr::PostfixIncDec { exp, increment } => Expression::assignment(
                self.convert_expression(exp),
                if *increment {
                    Operator::AddAssign
                } else {
                    Operator::SubtractAssign
                },
                Expression::integer(1),
            ),
            other => self.convert_expression(other),
        }
    }

    pub fn convert_expression(&self, exp: &ObjcExpr) -> Expression {
        match exp {
            ObjcExpr::Identifier(name) => Expression::identifier(*name),
            ObjcExpr::IntLiteral(value) => Expression::integer(*value),
            ObjcExpr::FloatLiteral(value) => Expression::float(*value),
            ObjcExpr::StringLiteral { value, .. } => Expression::string(value.clone()),
            ObjcExpr::BoolLiteral(value) => Expression::boolean(*value),
            ObjcExpr::NilLiteral => Expression::nil_literal(),
            ObjcExpr::ArrayLiteral(items) => Expression::array_literal(
                items.iter().map(|i| self.convert_expression(i)).collect(),
            ),
            ObjcExpr::DictionaryLiteral(pairs) => Expression::dictionary_literal(
                pairs
                    .iter()
                    .map(|(k, v)| (self.convert_expression(k), self.convert_expression(v)))
                    .collect(),
            ),
            ObjcExpr::Binary { lhs, op, rhs } => self
                .convert_expression(lhs)
                .binary(*op, self.convert_expression(rhs)),
            ObjcExpr::Unary { op, exp } => Expression::unary(*op, self.convert_expression(exp)),
            ObjcExpr::PostfixIncDec { exp, increment } => Expression::assignment(
                self.convert_expression(exp),
                if *increment {
                    Operator::AddAssign
                } else {
                    Operator::SubtractAssign
                },
                Expression::integer(1),
            ),
            ObjcExpr::Ternary {
                condition,
                if_true,
                if_false,
            } => Expression::ternary(
                self.convert_expression(condition),
                self.convert_expression(if_true),
                self.convert_expression(if_false),
            ),
            ObjcExpr::Assign { lhs, op, rhs } => Expression::assignment(
                self.convert_expression(lhs),
                *op,
                self.convert_expression(rhs),
            ),
            ObjcExpr::Call { callee, arguments } => self.convert_expression(callee).call(
                arguments
                    .iter()
                    .map(|a| FunctionArgument::unlabeled(self.convert_expression(a)))
                    .collect(),
            ),
            ObjcExpr::Member { base, name } => self.convert_expression(base).dot(*name),
            ObjcExpr::Subscript { base, index } => self
                .convert_expression(base)
                .sub(self.convert_expression(index)),
            ObjcExpr::MessageSend { receiver, pieces } => {
                self.convert_message_send(receiver, pieces)
            }
            ObjcExpr::Cast { ty, exp } => {
                let target = match self.swift_type(ty) {
                    SwiftType::ImplicitUnwrappedOptional(inner) => *inner,
                    other => other,
                };
                self.convert_expression(exp).cast_to(target)
            }
            ObjcExpr::SizeOfType(ty) => Expression::size_of_type(self.swift_type(ty)),
            ObjcExpr::SizeOfExpr(exp) => {
                Expression::size_of_expression(self.convert_expression(exp))
            }
            ObjcExpr::Paren(exp) => Expression::parens(self.convert_expression(exp)),
        }
    }

    fn convert_message_send(
        &self,
        receiver: &ObjcExpr,
        pieces: &[(Name, Option<ObjcExpr>)],
    ) -> Expression {
        // `[C alloc]` erases to the receiver so `[[C alloc] init…]` becomes
        // a plain initializer call.
        if pieces.len() == 1 && pieces[0].1.is_none() {
            let keyword = pieces[0].0;
            if keyword == "alloc" {
                return self.convert_expression(receiver);
            }
            if keyword == "new" {
                return self.convert_expression(receiver).call(vec![]);
            }
            if keyword == "init" {
                let converted = self.convert_expression(receiver);
                if converted.is_identifier("super") {
                    return converted.dot("init").call(vec![]);
                }
                return converted.call(vec![]);
            }
            // Zero-argument send: `recv.sel()`.
            return self.convert_expression(receiver).dot(keyword).call(vec![]);
        }

        let first_keyword = pieces[0].0;

        // `initWithFrame:… y:…` → `C(frame:…, y:…)`
        let init_rest = first_keyword.with_str(|s| {
            s.strip_prefix("initWith").map(str::to_owned)
        });
        if let Some(rest) = init_rest {
            let mut arguments = Vec::new();
            for (index, (keyword, argument)) in pieces.iter().enumerate() {
                let Some(argument) = argument else { continue };
                let label = if index == 0 {
                    Name::new(lowercased_first(&rest))
                } else {
                    *keyword
                };
                arguments.push(FunctionArgument::labeled(label, self.convert_expression(argument)));
            }
            let converted = self.convert_expression(receiver);
            if converted.is_identifier("super") {
                return converted.dot("init").call(arguments);
            }
            return converted.call(arguments);
        }

        // `setFoo:` with a single argument → property assignment.
        if pieces.len() == 1 {
            let setter_property = first_keyword.with_str(|s| {
                s.strip_prefix("set")
                    .filter(|rest| rest.chars().next().is_some_and(|c| c.is_uppercase()))
                    .map(lowercased_first)
            });
            if let (Some(property), Some(argument)) = (setter_property, pieces[0].1.as_ref()) {
                return Expression::assignment(
                    self.convert_expression(receiver).dot(Name::new(property)),
                    Operator::Assign,
                    self.convert_expression(argument),
                );
            }
        }

        // General member call: first argument unlabeled, the rest labeled by
        // their keywords.
        let mut arguments = Vec::new();
        for (index, (keyword, argument)) in pieces.iter().enumerate() {
            let Some(argument) = argument else { continue };
            let converted = self.convert_expression(argument);
            if index == 0 {
                arguments.push(FunctionArgument::unlabeled(converted));
            } else {
                arguments.push(FunctionArgument::labeled(*keyword, converted));
            }
        }
        self.convert_expression(receiver)
            .dot(first_keyword)
            .call(arguments)
    }
}

fn lowercased_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objc::{parse_objc_file, ObjcDeclKind};
    use objswift_ast::{ExprKind, SourceFile, StmtKind};

    fn convert_method_body(source: &str) -> CompoundStatement {
        let wrapped = format!("@implementation T\n- (void)run {{\n{}\n}}\n@end", source);
        let file = SourceFile::new("test.m", wrapped);
        let parsed = parse_objc_file(&file).unwrap();
        let class = match &parsed.declarations[0].kind {
            ObjcDeclKind::ClassImplementation(c) => c,
            other => panic!("expected implementation, got {:?}", other),
        };
        let mapper = ObjcTypeMapper::new();
        let converter = StatementConverter::new(
            &mapper,
            NullabilityContext::unspecified(),
            Some("T".into()),
        );
        converter.convert_body(class.methods[0].body.as_ref().unwrap())
    }

    #[test]
    fn message_send_becomes_member_call() {
        let body = convert_method_body("[self.view addSubview:button atIndex:0];");
        let expected = Expression::identifier("self")
            .dot("view")
            .dot("addSubview")
            .call(vec![
                FunctionArgument::unlabeled(Expression::identifier("button")),
                FunctionArgument::labeled("atIndex", Expression::integer(0)),
            ]);
        assert_eq!(body.statements[0], Statement::expression(expected));
    }

    #[test]
    fn alloc_init_becomes_initializer() {
        let body = convert_method_body("id v = [[UIView alloc] initWithFrame:frame];");
        match &body.statements[0].kind {
            StmtKind::VariableDeclarations(decls) => {
                let init = decls[0].initialization.as_ref().unwrap();
                let expected = Expression::identifier("UIView").call(vec![
                    FunctionArgument::labeled("frame", Expression::identifier("frame")),
                ]);
                assert_eq!(init, &expected);
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn setter_send_becomes_assignment() {
        let body = convert_method_body("[self setHidden:YES];");
        let expected = Expression::assignment(
            Expression::identifier("self").dot("hidden"),
            Operator::Assign,
            Expression::boolean(true),
        );
        assert_eq!(body.statements[0], Statement::expression(expected));
    }

    #[test]
    fn c_for_lowers_to_while() {
        let body = convert_method_body("for (NSInteger i = 0; i < 10; i++) { total += i; }");
        match &body.statements[0].kind {
            StmtKind::Compound(block) => {
                assert!(matches!(block.statements[0].kind, StmtKind::VariableDeclarations(_)));
                match &block.statements[1].kind {
                    StmtKind::While { body, .. } => {
                        // Step lands at the end of the loop body.
                        assert_eq!(body.len(), 2);
                    }
                    other => panic!("expected while, got {:?}", other),
                }
            }
            other => panic!("expected compound, got {:?}", other),
        }
    }

    #[test]
    fn switch_gains_default_and_loses_breaks() {
        let body = convert_method_body(
            "switch (x) { case 1: doThing(); break; case 2: other(); break; }",
        );
        match &body.statements[0].kind {
            StmtKind::Switch { cases, default, .. } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[0].statements.len(), 1);
                assert_eq!(default, &Some(vec![Statement::break_stmt()]));
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }

    #[test]
    fn nil_and_boxed_literals() {
        let body = convert_method_body("name = @\"hi\"; flag = nil;");
        match &body.statements[0].kind {
            StmtKind::Expressions(exps) => match &exps[0].kind {
                ExprKind::Assignment { rhs, .. } => {
                    assert_eq!(rhs.as_ref(), &Expression::string("hi"));
                }
                other => panic!("expected assignment, got {:?}", other),
            },
            other => panic!("expected expression, got {:?}", other),
        }
    }
}
