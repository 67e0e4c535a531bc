//! # Swift Statement AST
//!
//! Output-language statements. Statements carry optional labels and leading
//! comments as metadata; a deep copy (`clone`) preserves both.

use crate::arena::Name;
use crate::expression::Expression;
use crate::swift_type::SwiftType;
use serde::{Deserialize, Serialize};

/// A brace-delimited list of statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompoundStatement {
    pub statements: Vec<Statement>,
}

impl CompoundStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Statement> {
        self.statements.iter_mut()
    }
}

impl From<Vec<Statement>> for CompoundStatement {
    fn from(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A pattern in `if let`, `for`, or `switch` positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Identifier(Name),
    Wildcard,
    Tuple(Vec<Pattern>),
    Expression(Box<Expression>),
}

/// One `case` arm of a `switch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub patterns: Vec<Pattern>,
    pub statements: Vec<Statement>,
}

/// A single declaration inside a variable-declaration statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: Name,
    pub ty: SwiftType,
    pub is_constant: bool,
    pub initialization: Option<Expression>,
}

impl VariableDeclaration {
    pub fn variable(name: impl Into<Name>, ty: SwiftType, init: Option<Expression>) -> Self {
        Self {
            name: name.into(),
            ty,
            is_constant: false,
            initialization: init,
        }
    }

    pub fn constant(name: impl Into<Name>, ty: SwiftType, init: Expression) -> Self {
        Self {
            name: name.into(),
            ty,
            is_constant: true,
            initialization: Some(init),
        }
    }
}

/// Context preserved for constructs outside the modeled subset; emitted as a
/// comment so no input is silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownContext {
    pub context: String,
}

/// The shape of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Compound(CompoundStatement),
    If {
        /// `if let pattern = condition` when present.
        pattern: Option<Pattern>,
        condition: Expression,
        body: CompoundStatement,
        else_body: Option<CompoundStatement>,
    },
    While {
        condition: Expression,
        body: CompoundStatement,
    },
    RepeatWhile {
        condition: Expression,
        body: CompoundStatement,
    },
    For {
        pattern: Pattern,
        exp: Expression,
        body: CompoundStatement,
    },
    Switch {
        exp: Expression,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
    },
    Do(CompoundStatement),
    Defer(CompoundStatement),
    Return(Option<Expression>),
    Break(Option<Name>),
    Continue(Option<Name>),
    Expressions(Vec<Expression>),
    VariableDeclarations(Vec<VariableDeclaration>),
    Unknown(UnknownContext),
}

/// A statement plus its metadata (label, leading comments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StmtKind,
    pub label: Option<Name>,
    pub leading_comments: Vec<String>,
}

impl Statement {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            label: None,
            leading_comments: Vec::new(),
        }
    }

    pub fn compound(statements: impl Into<CompoundStatement>) -> Self {
        Self::new(StmtKind::Compound(statements.into()))
    }

    pub fn expression(exp: Expression) -> Self {
        Self::new(StmtKind::Expressions(vec![exp]))
    }

    pub fn expressions(exps: Vec<Expression>) -> Self {
        Self::new(StmtKind::Expressions(exps))
    }

    pub fn if_stmt(
        condition: Expression,
        body: impl Into<CompoundStatement>,
        else_body: Option<CompoundStatement>,
    ) -> Self {
        Self::new(StmtKind::If {
            pattern: None,
            condition,
            body: body.into(),
            else_body,
        })
    }

    pub fn if_let(
        pattern: Pattern,
        condition: Expression,
        body: impl Into<CompoundStatement>,
        else_body: Option<CompoundStatement>,
    ) -> Self {
        Self::new(StmtKind::If {
            pattern: Some(pattern),
            condition,
            body: body.into(),
            else_body,
        })
    }

    pub fn while_stmt(condition: Expression, body: impl Into<CompoundStatement>) -> Self {
        Self::new(StmtKind::While {
            condition,
            body: body.into(),
        })
    }

    pub fn repeat_while(condition: Expression, body: impl Into<CompoundStatement>) -> Self {
        Self::new(StmtKind::RepeatWhile {
            condition,
            body: body.into(),
        })
    }

    pub fn for_in(
        pattern: Pattern,
        exp: Expression,
        body: impl Into<CompoundStatement>,
    ) -> Self {
        Self::new(StmtKind::For {
            pattern,
            exp,
            body: body.into(),
        })
    }

    pub fn return_stmt(exp: Option<Expression>) -> Self {
        Self::new(StmtKind::Return(exp))
    }

    pub fn break_stmt() -> Self {
        Self::new(StmtKind::Break(None))
    }

    pub fn continue_stmt() -> Self {
        Self::new(StmtKind::Continue(None))
    }

    pub fn defer(body: impl Into<CompoundStatement>) -> Self {
        Self::new(StmtKind::Defer(body.into()))
    }

    pub fn variable_declarations(declarations: Vec<VariableDeclaration>) -> Self {
        Self::new(StmtKind::VariableDeclarations(declarations))
    }

    pub fn unknown(context: impl Into<String>) -> Self {
        Self::new(StmtKind::Unknown(UnknownContext {
            context: context.into(),
        }))
    }

    pub fn with_label(mut self, label: impl Into<Name>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.leading_comments.push(comment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Operator;

    #[test]
    fn statement_equals_itself_and_its_copy() {
        let stmt = Statement::if_stmt(
            Expression::identifier("ready"),
            vec![Statement::return_stmt(Some(Expression::integer(1)))],
            Some(vec![Statement::return_stmt(Some(Expression::integer(0)))].into()),
        )
        .with_comment("early exit");

        assert_eq!(stmt, stmt);
        assert_eq!(stmt, stmt.clone());
    }

    #[test]
    fn copy_preserves_metadata_but_not_sharing() {
        let original = Statement::expression(
            Expression::identifier("x").binary(Operator::Add, Expression::integer(2)),
        )
        .with_label("outer")
        .with_comment("keep");

        let mut copy = original.clone();
        assert_eq!(copy.label, Some("outer".into()));
        assert_eq!(copy.leading_comments, vec!["keep".to_string()]);

        // Mutating the copy leaves the original alone.
        if let StmtKind::Expressions(exps) = &mut copy.kind {
            exps.push(Expression::identifier("y"));
        }
        assert_ne!(original, copy);
    }

    #[test]
    fn if_let_carries_pattern() {
        let stmt = Statement::if_let(
            Pattern::Identifier("value".into()),
            Expression::identifier("maybe"),
            vec![],
            None,
        );
        match &stmt.kind {
            StmtKind::If { pattern, .. } => {
                assert_eq!(pattern, &Some(Pattern::Identifier("value".into())))
            }
            _ => panic!("expected if statement"),
        }
    }
}
