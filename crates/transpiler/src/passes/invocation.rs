//! # Function Invocation Transformer
//!
//! Declarative rewriting of free-function calls into idiomatic Swift
//! member access: `CGPointMake(1, 2)` → `CGPoint(x: 1, y: 2)`,
//! `CGRectGetWidth(rect)` → `rect.width`,
//! `CGPathMoveToPoint(path, t, x, y)` → `path.move(to: CGPoint(x: x, y: y))`.
//!
//! A transformer names the Objective-C function, a target shape (method,
//! property getter, property setter), and per-argument strategies that
//! describe how each produced argument consumes the source arguments. The
//! required source-argument count is derived from the strategies, so
//! `can_apply` is a cheap arity-and-name check.

use crate::passes::{ExpressionPass, PassContext};
use crate::visit::{walk_expression_children, visit_compound, ExpressionVisitor};
use objswift_ast::{
    CompoundStatement, ExprKind, Expression, FunctionArgument, Name, Operator, PostfixOperation,
};

/// How one produced argument is built from the source argument list.
#[derive(Debug, Clone)]
pub enum ArgumentStrategy {
    /// Consume the next source argument, unlabeled.
    AsIs,
    /// Reference the source argument at a fixed index without consuming.
    FromArgIndex(usize),
    /// Synthesize an expression; consumes nothing.
    Fixed(fn() -> Expression),
    /// Consume two positional slots but build from the source arguments at
    /// the given indices.
    MergingArguments(usize, usize, fn(Expression, Expression) -> Expression),
    /// Map the inner strategy's production.
    Transformed(fn(Expression) -> Expression, Box<ArgumentStrategy>),
    /// Drop the produced argument entirely when it equals the given
    /// expression. Consumption still happens.
    OmitIf(Expression, Box<ArgumentStrategy>),
    /// Label the produced argument.
    Labeled(Name, Box<ArgumentStrategy>),
}

impl ArgumentStrategy {
    pub fn labeled(label: impl Into<Name>, inner: ArgumentStrategy) -> Self {
        ArgumentStrategy::Labeled(label.into(), Box::new(inner))
    }

    pub fn omit_if(value: Expression, inner: ArgumentStrategy) -> Self {
        ArgumentStrategy::OmitIf(value, Box::new(inner))
    }

    pub fn transformed(map: fn(Expression) -> Expression, inner: ArgumentStrategy) -> Self {
        ArgumentStrategy::Transformed(map, Box::new(inner))
    }

    /// Positional source slots this strategy consumes.
    fn consume_count(&self) -> usize {
        match self {
            ArgumentStrategy::AsIs => 1,
            ArgumentStrategy::FromArgIndex(_) | ArgumentStrategy::Fixed(_) => 0,
            ArgumentStrategy::MergingArguments(..) => 2,
            ArgumentStrategy::Transformed(_, inner)
            | ArgumentStrategy::OmitIf(_, inner)
            | ArgumentStrategy::Labeled(_, inner) => inner.consume_count(),
        }
    }

    /// Highest source index referenced directly, when any.
    fn max_argument_referenced(&self) -> Option<usize> {
        match self {
            ArgumentStrategy::AsIs | ArgumentStrategy::Fixed(_) => None,
            ArgumentStrategy::FromArgIndex(index) => Some(*index),
            ArgumentStrategy::MergingArguments(i, j, _) => Some((*i).max(*j)),
            ArgumentStrategy::Transformed(_, inner)
            | ArgumentStrategy::OmitIf(_, inner)
            | ArgumentStrategy::Labeled(_, inner) => inner.max_argument_referenced(),
        }
    }

    /// Produce the argument, advancing `cursor` by the consumed slots.
    /// `None` means the argument was elided by `OmitIf`.
    fn produce(
        &self,
        source: &[FunctionArgument],
        cursor: &mut usize,
    ) -> Option<FunctionArgument> {
        match self {
            ArgumentStrategy::AsIs => {
                // A mismatched cursor is an invariant violation; release
                // builds degrade to skipping the argument.
                debug_assert!(*cursor < source.len(), "argument cursor out of range");
                let expression = source.get(*cursor)?.expression.clone();
                *cursor += 1;
                Some(FunctionArgument::unlabeled(expression))
            }
            ArgumentStrategy::FromArgIndex(index) => Some(FunctionArgument::unlabeled(
                source.get(*index)?.expression.clone(),
            )),
            ArgumentStrategy::Fixed(make) => Some(FunctionArgument::unlabeled(make())),
            ArgumentStrategy::MergingArguments(i, j, merge) => {
                debug_assert!(
                    *i < source.len() && *j < source.len(),
                    "merge indices out of range"
                );
                let lhs = source.get(*i)?.expression.clone();
                let rhs = source.get(*j)?.expression.clone();
                *cursor += 2;
                Some(FunctionArgument::unlabeled(merge(lhs, rhs)))
            }
            ArgumentStrategy::Transformed(map, inner) => {
                let produced = inner.produce(source, cursor)?;
                Some(FunctionArgument {
                    label: produced.label,
                    expression: map(produced.expression),
                })
            }
            ArgumentStrategy::OmitIf(value, inner) => {
                // Consumption happens regardless of the omission outcome.
                let produced = inner.produce(source, cursor)?;
                if &produced.expression == value {
                    None
                } else {
                    Some(produced)
                }
            }
            ArgumentStrategy::Labeled(label, inner) => {
                let produced = inner.produce(source, cursor)?;
                Some(FunctionArgument {
                    label: Some(*label),
                    expression: produced.expression,
                })
            }
        }
    }
}

/// What the call rewrites into.
#[derive(Debug, Clone)]
pub enum TransformTarget {
    Method {
        name: Name,
        /// When set, the first source argument becomes the `.` base.
        first_arg_becomes_receiver: bool,
        args: Vec<ArgumentStrategy>,
    },
    PropertyGetter(Name),
    PropertySetter(Name),
}

/// A declarative call-site rewrite.
#[derive(Debug, Clone)]
pub struct FunctionInvocationTransformer {
    pub objc_function_name: Name,
    pub target: TransformTarget,
    required_argument_count: usize,
}

impl FunctionInvocationTransformer {
    pub fn method(
        objc_function_name: impl Into<Name>,
        name: impl Into<Name>,
        first_arg_becomes_receiver: bool,
        args: Vec<ArgumentStrategy>,
    ) -> Self {
        let consumed: usize = args.iter().map(ArgumentStrategy::consume_count).sum();
        let referenced = args
            .iter()
            .filter_map(ArgumentStrategy::max_argument_referenced)
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        let mut required = consumed.max(referenced);
        if first_arg_becomes_receiver {
            required += 1;
        }

        Self {
            objc_function_name: objc_function_name.into(),
            target: TransformTarget::Method {
                name: name.into(),
                first_arg_becomes_receiver,
                args,
            },
            required_argument_count: required,
        }
    }

    pub fn getter(objc_function_name: impl Into<Name>, property: impl Into<Name>) -> Self {
        Self {
            objc_function_name: objc_function_name.into(),
            target: TransformTarget::PropertyGetter(property.into()),
            required_argument_count: 1,
        }
    }

    pub fn setter(objc_function_name: impl Into<Name>, property: impl Into<Name>) -> Self {
        Self {
            objc_function_name: objc_function_name.into(),
            target: TransformTarget::PropertySetter(property.into()),
            required_argument_count: 2,
        }
    }

    pub fn required_argument_count(&self) -> usize {
        self.required_argument_count
    }

    /// Matches `objcFunctionName(a₁, …, aₙ)` with the derived arity.
    pub fn can_apply(&self, exp: &Expression) -> bool {
        let Some((base, arguments)) = exp.as_call() else {
            return false;
        };
        base.as_identifier() == Some(self.objc_function_name)
            && arguments.len() == self.required_argument_count
    }

    /// Build the rewritten expression. The result carries the original
    /// postfix's resolved type.
    pub fn attempt_apply(&self, exp: &Expression) -> Option<Expression> {
        if !self.can_apply(exp) {
            return None;
        }
        let (_, arguments) = exp.as_call()?;

        let mut result = match &self.target {
            TransformTarget::PropertyGetter(property) => {
                arguments[0].expression.clone().dot(*property)
            }
            TransformTarget::PropertySetter(property) => Expression::assignment(
                arguments[0].expression.clone().dot(*property),
                Operator::Assign,
                arguments[1].expression.clone(),
            ),
            TransformTarget::Method {
                name,
                first_arg_becomes_receiver,
                args,
            } => {
                let (callee, source) = if *first_arg_becomes_receiver {
                    (
                        arguments[0].expression.clone().dot(*name),
                        &arguments[1..],
                    )
                } else {
                    (Expression::identifier(*name), arguments)
                };

                let mut produced = Vec::with_capacity(args.len());
                let mut cursor = 0usize;
                for strategy in args {
                    if let Some(argument) = strategy.produce(source, &mut cursor) {
                        produced.push(argument);
                    }
                }
                callee.call(produced)
            }
        };

        result.resolved_type = exp.resolved_type.clone();
        Some(result)
    }
}

/// The stock CoreGraphics transformer set.
pub fn default_transformers() -> Vec<FunctionInvocationTransformer> {
    use ArgumentStrategy as S;

    fn make_point(x: Expression, y: Expression) -> Expression {
        Expression::identifier("CGPoint").call(vec![
            FunctionArgument::labeled("x", x),
            FunctionArgument::labeled("y", y),
        ])
    }

    vec![
        FunctionInvocationTransformer::method(
            "CGPointMake",
            "CGPoint",
            false,
            vec![S::labeled("x", S::AsIs), S::labeled("y", S::AsIs)],
        ),
        FunctionInvocationTransformer::method(
            "CGSizeMake",
            "CGSize",
            false,
            vec![S::labeled("width", S::AsIs), S::labeled("height", S::AsIs)],
        ),
        FunctionInvocationTransformer::method(
            "CGRectMake",
            "CGRect",
            false,
            vec![
                S::labeled("x", S::AsIs),
                S::labeled("y", S::AsIs),
                S::labeled("width", S::AsIs),
                S::labeled("height", S::AsIs),
            ],
        ),
        FunctionInvocationTransformer::getter("CGRectGetWidth", "width"),
        FunctionInvocationTransformer::getter("CGRectGetHeight", "height"),
        FunctionInvocationTransformer::getter("CGRectGetMinX", "minX"),
        FunctionInvocationTransformer::getter("CGRectGetMinY", "minY"),
        FunctionInvocationTransformer::getter("CGRectGetMaxX", "maxX"),
        FunctionInvocationTransformer::getter("CGRectGetMaxY", "maxY"),
        FunctionInvocationTransformer::method(
            "CGPointEqualToPoint",
            "equalTo",
            true,
            vec![S::AsIs],
        ),
        // The transform argument at source index 0 is discarded; the point
        // components at indices 1 and 2 merge into one CGPoint.
        FunctionInvocationTransformer::method(
            "CGPathMoveToPoint",
            "move",
            true,
            vec![S::labeled("to", S::MergingArguments(1, 2, make_point))],
        ),
        FunctionInvocationTransformer::method(
            "CGPathAddLineToPoint",
            "addLine",
            true,
            vec![S::labeled("to", S::MergingArguments(1, 2, make_point))],
        ),
        FunctionInvocationTransformer::method(
            "CGPathCloseSubpath",
            "closeSubpath",
            true,
            vec![],
        ),
    ]
}

/// Applies registered transformers over bodies, first match wins, at most
/// one rewrite per call site per pipeline iteration.
pub struct InvocationTransformPass {
    transformers: Vec<FunctionInvocationTransformer>,
}

impl InvocationTransformPass {
    pub fn new(transformers: Vec<FunctionInvocationTransformer>) -> Self {
        Self { transformers }
    }

    pub fn with_default_transformers() -> Self {
        Self::new(default_transformers())
    }
}

impl ExpressionPass for InvocationTransformPass {
    fn name(&self) -> &'static str {
        "invocation-transform"
    }

    fn apply(&mut self, _context: &mut PassContext<'_>, body: &mut CompoundStatement) -> bool {
        let mut applier = Applier {
            transformers: &self.transformers,
            changed: false,
        };
        visit_compound(&mut applier, body);
        applier.changed
    }
}

struct Applier<'a> {
    transformers: &'a [FunctionInvocationTransformer],
    changed: bool,
}

impl ExpressionVisitor for Applier<'_> {
    type ExprResult = ();

    fn visit_default(&mut self, exp: &mut Expression) {
        walk_expression_children(self, exp);
    }

    // Rewrites run pre-order: the outer call decides before its arguments
    // move, and the rewritten node's children are still visited this
    // iteration.
    fn visit_postfix(&mut self, exp: &mut Expression) {
        if matches!(
            &exp.kind,
            ExprKind::Postfix {
                operation: PostfixOperation::Call { .. },
                ..
            }
        ) {
            for transformer in self.transformers {
                if transformer.can_apply(exp) {
                    if let Some(rewritten) = transformer.attempt_apply(exp) {
                        *exp = rewritten;
                        self.changed = true;
                    }
                    break;
                }
            }
        }
        walk_expression_children(self, exp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objswift_ast::SwiftType;

    fn call(name: &str, args: Vec<Expression>) -> Expression {
        Expression::identifier(name)
            .call(args.into_iter().map(FunctionArgument::unlabeled).collect())
    }

    #[test]
    fn point_make_becomes_initializer() {
        let transformer = &default_transformers()[0];
        let exp = call(
            "CGPointMake",
            vec![Expression::integer(1), Expression::integer(2)],
        )
        .typed(SwiftType::type_name("CGPoint"));

        assert!(transformer.can_apply(&exp));
        let result = transformer.attempt_apply(&exp).unwrap();

        let expected = Expression::identifier("CGPoint").call(vec![
            FunctionArgument::labeled("x", Expression::integer(1)),
            FunctionArgument::labeled("y", Expression::integer(2)),
        ]);
        assert_eq!(result, expected);
        // The rewrite preserves the original resolved type.
        assert_eq!(result.resolved_type, Some(SwiftType::type_name("CGPoint")));
    }

    #[test]
    fn can_apply_implies_attempt_apply_succeeds() {
        for transformer in default_transformers() {
            let args: Vec<_> = (0..transformer.required_argument_count())
                .map(|i| Expression::identifier(format!("a{}", i)))
                .collect();
            let exp = call(&transformer.objc_function_name.resolve(), args);
            assert!(transformer.can_apply(&exp));
            assert!(
                transformer.attempt_apply(&exp).is_some(),
                "{} failed to apply",
                transformer.objc_function_name
            );
        }
    }

    #[test]
    fn arity_mismatch_does_not_apply() {
        let transformer = &default_transformers()[0];
        let exp = call("CGPointMake", vec![Expression::integer(1)]);
        assert!(!transformer.can_apply(&exp));
        assert!(transformer.attempt_apply(&exp).is_none());
    }

    #[test]
    fn receiver_promotion_with_merging_discards_extra_argument() {
        let transformer = FunctionInvocationTransformer::method(
            "CGPathMoveToPoint",
            "move",
            true,
            vec![ArgumentStrategy::labeled(
                "to",
                ArgumentStrategy::MergingArguments(1, 2, |x, y| {
                    Expression::identifier("CGPoint").call(vec![
                        FunctionArgument::labeled("x", x),
                        FunctionArgument::labeled("y", y),
                    ])
                }),
            )],
        );
        // 2 consumed, max reference 2 → 3, plus the receiver → 4.
        assert_eq!(transformer.required_argument_count(), 4);

        let exp = call(
            "CGPathMoveToPoint",
            vec![
                Expression::identifier("path"),
                Expression::identifier("transform"),
                Expression::identifier("x"),
                Expression::identifier("y"),
            ],
        );
        let result = transformer.attempt_apply(&exp).unwrap();

        let expected = Expression::identifier("path").dot("move").call(vec![
            FunctionArgument::labeled(
                "to",
                Expression::identifier("CGPoint").call(vec![
                    FunctionArgument::labeled("x", Expression::identifier("x")),
                    FunctionArgument::labeled("y", Expression::identifier("y")),
                ]),
            ),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn getter_and_setter_targets() {
        let getter = FunctionInvocationTransformer::getter("CGRectGetWidth", "width");
        let exp = call("CGRectGetWidth", vec![Expression::identifier("rect")]);
        assert_eq!(
            getter.attempt_apply(&exp).unwrap(),
            Expression::identifier("rect").dot("width")
        );

        let setter = FunctionInvocationTransformer::setter("SetRectWidth", "width");
        let exp = call(
            "SetRectWidth",
            vec![Expression::identifier("rect"), Expression::float(10.0)],
        );
        assert_eq!(
            setter.attempt_apply(&exp).unwrap(),
            Expression::assignment(
                Expression::identifier("rect").dot("width"),
                Operator::Assign,
                Expression::float(10.0),
            )
        );
    }

    #[test]
    fn omit_if_drops_argument_but_still_consumes() {
        let transformer = FunctionInvocationTransformer::method(
            "WithOptions",
            "run",
            true,
            vec![
                ArgumentStrategy::omit_if(Expression::nil_literal(), ArgumentStrategy::AsIs),
                ArgumentStrategy::labeled("flag", ArgumentStrategy::AsIs),
            ],
        );
        assert_eq!(transformer.required_argument_count(), 3);

        // The nil argument is elided from the output, yet its positional
        // slot is consumed: the flag still comes from source index 1.
        let exp = call(
            "WithOptions",
            vec![
                Expression::identifier("recv"),
                Expression::nil_literal(),
                Expression::boolean(true),
            ],
        );
        let result = transformer.attempt_apply(&exp).unwrap();
        let expected = Expression::identifier("recv").dot("run").call(vec![
            FunctionArgument::labeled("flag", Expression::boolean(true)),
        ]);
        assert_eq!(result, expected);

        // A non-matching value is kept.
        let exp = call(
            "WithOptions",
            vec![
                Expression::identifier("recv"),
                Expression::identifier("options"),
                Expression::boolean(true),
            ],
        );
        let result = transformer.attempt_apply(&exp).unwrap();
        let expected = Expression::identifier("recv").dot("run").call(vec![
            FunctionArgument::unlabeled(Expression::identifier("options")),
            FunctionArgument::labeled("flag", Expression::boolean(true)),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn omit_if_around_merging_still_consumes_both_slots() {
        fn merge(a: Expression, b: Expression) -> Expression {
            Expression::identifier("CGPoint").call(vec![
                FunctionArgument::labeled("x", a),
                FunctionArgument::labeled("y", b),
            ])
        }
        let zero_point = Expression::identifier("CGPoint").call(vec![
            FunctionArgument::labeled("x", Expression::integer(0)),
            FunctionArgument::labeled("y", Expression::integer(0)),
        ]);
        let transformer = FunctionInvocationTransformer::method(
            "MoveMaybe",
            "move",
            true,
            vec![
                ArgumentStrategy::omit_if(
                    zero_point,
                    ArgumentStrategy::MergingArguments(0, 1, merge),
                ),
                ArgumentStrategy::labeled("animated", ArgumentStrategy::AsIs),
            ],
        );
        // 3 consumed slots plus receiver.
        assert_eq!(transformer.required_argument_count(), 4);

        let exp = call(
            "MoveMaybe",
            vec![
                Expression::identifier("view"),
                Expression::integer(0),
                Expression::integer(0),
                Expression::boolean(true),
            ],
        );
        let result = transformer.attempt_apply(&exp).unwrap();
        // The merged point equalled the omit sentinel and was dropped, but
        // both of its slots were consumed, so `animated` reads slot 2.
        let expected = Expression::identifier("view").dot("move").call(vec![
            FunctionArgument::labeled("animated", Expression::boolean(true)),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn first_registered_transformer_wins() {
        let first = FunctionInvocationTransformer::getter("Dup", "first");
        let second = FunctionInvocationTransformer::getter("Dup", "second");
        let mut pass = InvocationTransformPass::new(vec![first, second]);

        let mut body: CompoundStatement = vec![objswift_ast::Statement::expression(call(
            "Dup",
            vec![Expression::identifier("x")],
        ))]
        .into();

        let graph = crate::intentions::IntentionGraph::new();
        let ts = crate::type_system::IntentionTypeSystem::new(&graph);
        let resolver = crate::overload::OverloadResolver::new();
        let mut diagnostics = objswift_ast::Diagnostics::new();
        let mut ctx = PassContext {
            type_system: &ts,
            resolver: &resolver,
            diagnostics: &mut diagnostics,
            source: objswift_ast::SourceRef::synthesized(),
            self_type: None,
            superclass_type: None,
            parameters: vec![],
        };
        assert!(pass.apply(&mut ctx, &mut body));

        let expected = objswift_ast::Statement::expression(
            Expression::identifier("x").dot("first"),
        );
        assert_eq!(body.statements[0], expected);
    }
}
