//! Pipeline-level properties: repeated runs are deterministic, the shared
//! overload cache never changes observable results, and realistic inputs
//! reach a fixpoint without tripping the iteration cap.

use objswift_ast::{LiteralKind, ParameterSignature, SourceFile, SwiftType};
use objswift_transpiler::{
    Argument, IntentionGraph, IntentionTypeSystem, OverloadResolver, Transpiler,
};

const FIXTURE: &[(&str, &str)] = &[
    (
        "Shape.h",
        "NS_ASSUME_NONNULL_BEGIN\n\
         @interface Shape : NSObject\n\
         @property CGFloat area;\n\
         - (void)moveBy:(CGFloat)dx dy:(CGFloat)dy;\n\
         @end\n\
         NS_ASSUME_NONNULL_END",
    ),
    (
        "Shape.m",
        "#import \"Shape.h\"\n\
         @implementation Shape\n\
         - (void)moveBy:(CGFloat)dx dy:(CGFloat)dy {\n\
             CGPoint origin = CGPointMake(dx, dy);\n\
             CGPathMoveToPoint(path, t, dx, dy);\n\
             if (dx > 0) {\n\
                 [self setArea:dx * dy];\n\
             }\n\
         }\n\
         @end",
    ),
];

fn sources() -> Vec<SourceFile> {
    FIXTURE
        .iter()
        .map(|(name, content)| SourceFile::new(*name, *content))
        .collect()
}

#[test]
fn repeated_runs_are_deterministic() {
    let first = Transpiler::new().transpile(&sources());
    let second = Transpiler::new().transpile(&sources());

    assert_eq!(first.files, second.files);
    assert_eq!(
        first.diagnostics.errors().count(),
        second.diagnostics.errors().count()
    );
}

#[test]
fn realistic_bodies_reach_fixpoint() {
    let output = Transpiler::new().transpile(&sources());
    assert!(
        !output
            .diagnostics
            .iter()
            .any(|d| d.message.contains("fixpoint")),
        "fixpoint cap tripped: {:?}",
        output.diagnostics
    );

    let swift = &output.files[0].swift_source;
    assert!(swift.contains("CGPoint(x: dx, y: dy)"));
    assert!(swift.contains("path.move(to: CGPoint(x: dx, y: dy))"));
    assert!(swift.contains("self.area = dx * dy"));
}

#[test]
fn cache_does_not_change_observable_results() {
    fn signatures() -> Vec<objswift_ast::FunctionSignature> {
        vec![
            objswift_ast::FunctionSignature::new(
                "f",
                vec![ParameterSignature::anonymous("a", SwiftType::int())],
                SwiftType::void(),
            ),
            objswift_ast::FunctionSignature::new(
                "f",
                vec![ParameterSignature::anonymous("a", SwiftType::double())],
                SwiftType::void(),
            ),
        ]
    }

    let argument_sets: Vec<Vec<Argument>> = vec![
        vec![Argument::literal(LiteralKind::Integer)],
        vec![Argument::literal(LiteralKind::Float)],
        vec![Argument::typed(SwiftType::int())],
        vec![Argument::typed(SwiftType::optional_of(SwiftType::double()))],
        vec![Argument::untyped()],
    ];

    let graph = IntentionGraph::new();
    let type_system = IntentionTypeSystem::new(&graph);

    let uncached = OverloadResolver::new();
    let cached = OverloadResolver::new();
    cached.cache().enable();

    for arguments in &argument_sets {
        let plain = uncached.resolve(&type_system, &signatures(), arguments);
        let first = cached.resolve(&type_system, &signatures(), arguments);
        // Second query hits the memoized entry.
        let second = cached.resolve(&type_system, &signatures(), arguments);

        assert_eq!(plain, first, "cache changed result for {:?}", arguments);
        assert_eq!(first, second, "cache hit diverged for {:?}", arguments);
    }

    cached.cache().teardown();
    for arguments in &argument_sets {
        assert_eq!(
            uncached.resolve(&type_system, &signatures(), arguments),
            cached.resolve(&type_system, &signatures(), arguments),
        );
    }
}
