//! End-to-end translation scenarios: property nullability and ownership
//! mapping, invocation transforms inside method bodies, preprocessor
//! echoing, and per-file error containment.

use objswift_ast::SourceFile;
use objswift_transpiler::{TranspileOutput, Transpiler};

fn transpile(sources: &[(&str, &str)]) -> TranspileOutput {
    let sources: Vec<_> = sources
        .iter()
        .map(|(name, content)| SourceFile::new(*name, *content))
        .collect();
    Transpiler::new().transpile(&sources)
}

fn single_output(output: &TranspileOutput) -> &str {
    assert_eq!(
        output.files.len(),
        1,
        "expected one output, got {:?}",
        output.files.iter().map(|f| &f.name).collect::<Vec<_>>()
    );
    &output.files[0].swift_source
}

#[test]
fn weak_property_outside_nonnull_region() {
    let output = transpile(&[(
        "Holder.h",
        "@interface Holder\n@property (weak) MyClass *d;\n@end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("weak var d: MyClass?"),
        "missing weak optional property in:\n{}",
        swift
    );
}

#[test]
fn assign_object_property_outside_nonnull_region() {
    let output = transpile(&[(
        "Holder.h",
        "@interface Holder\n@property (assign) MyClass *d;\n@end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("unowned(unsafe) var d: MyClass!"),
        "missing unowned(unsafe) IUO property in:\n{}",
        swift
    );
}

#[test]
fn nonnull_region_produces_plain_types() {
    let output = transpile(&[(
        "Holder.h",
        "NS_ASSUME_NONNULL_BEGIN\n\
         @interface Holder\n@property NSString *title;\n@end\n\
         NS_ASSUME_NONNULL_END",
    )]);
    let swift = single_output(&output);
    assert!(swift.contains("var title: String"), "got:\n{}", swift);
    assert!(!swift.contains("String?"), "got:\n{}", swift);
    assert!(!swift.contains("String!"), "got:\n{}", swift);
}

#[test]
fn cgpointmake_rewrites_to_initializer() {
    let output = transpile(&[(
        "Draw.m",
        "@implementation Draw\n\
         - (void)run {\n\
             CGPoint p = CGPointMake(1, 2);\n\
         }\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("var p: CGPoint = CGPoint(x: 1, y: 2)"),
        "missing rewritten initializer in:\n{}",
        swift
    );
    assert!(!swift.contains("CGPointMake"), "got:\n{}", swift);
}

#[test]
fn cgpath_move_promotes_receiver_and_merges_point() {
    let output = transpile(&[(
        "Path.m",
        "@implementation Path\n\
         - (void)trace:(CGFloat)x y:(CGFloat)y {\n\
             CGPathMoveToPoint(path, transform, x, y);\n\
         }\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("path.move(to: CGPoint(x: x, y: y))"),
        "missing receiver-promoted move in:\n{}",
        swift
    );
    // The transform argument is discarded by the merge.
    assert!(!swift.contains("transform,"), "got:\n{}", swift);
}

#[test]
fn rect_getter_rewrites_to_property_access() {
    let output = transpile(&[(
        "Rects.m",
        "@implementation Rects\n\
         - (CGFloat)width:(CGRect)frame {\n\
             return CGRectGetWidth(frame);\n\
         }\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("return frame.width"),
        "missing getter rewrite in:\n{}",
        swift
    );
}

#[test]
fn preprocessor_directives_echo_as_comments() {
    let output = transpile(&[(
        "App.m",
        "#import <UIKit/UIKit.h>\n\
         #define LIMIT 10\n\
         @interface App\n@end",
    )]);
    let swift = single_output(&output);
    assert!(swift.starts_with("// Preprocessor directives found in file:"));
    assert!(swift.contains("// #import <UIKit/UIKit.h>"));
    assert!(swift.contains("// #define LIMIT 10"));
}

#[test]
fn parse_errors_are_contained_per_file() {
    let output = transpile(&[
        ("Bad.m", "@interface ((("),
        ("Good.h", "@interface Good\n- (void)fine;\n@end"),
    ]);

    assert!(!output.succeeded());
    assert!(output.diagnostics.has_errors());
    // The healthy sibling still produced output.
    assert_eq!(output.files.len(), 1);
    assert_eq!(output.files[0].name, "Good.swift");
    assert!(output.files[0].swift_source.contains("class Good"));
    // And the failure names the offending file.
    let error = output.diagnostics.errors().next().unwrap();
    assert_eq!(error.origin.as_ref().unwrap().file, "Bad.m");
}

#[test]
fn interface_and_implementation_fold_into_one_swift_file() {
    let output = transpile(&[
        (
            "Greeter.h",
            "NS_ASSUME_NONNULL_BEGIN\n\
             @interface Greeter : NSObject\n\
             - (NSString *)greet:(NSString *)name;\n\
             @end\n\
             NS_ASSUME_NONNULL_END",
        ),
        (
            "Greeter.m",
            "@implementation Greeter\n\
             - (NSString *)greet:(NSString *)name {\n\
                 return name;\n\
             }\n\
             @end",
        ),
    ]);

    assert!(output.succeeded());
    let swift = single_output(&output);
    assert!(swift.contains("class Greeter: NSObject {"));
    // The annotated interface signature wins; the implementation provides
    // the body.
    assert!(swift.contains("func greet(_ name: String) -> String {"));
    assert!(swift.contains("return name"));
}

#[test]
fn protocols_render_with_optional_members() {
    let output = transpile(&[(
        "Delegate.h",
        "@protocol Watching <NSObject>\n\
         - (void)didStart;\n\
         @optional\n\
         - (void)didFinish;\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(swift.contains("@objc protocol Watching: NSObject {"));
    assert!(swift.contains("func didStart()"));
    assert!(swift.contains("@objc optional func didFinish()"));
}

#[test]
fn ns_options_becomes_option_set() {
    let output = transpile(&[(
        "Edges.h",
        "typedef NS_OPTIONS(NSUInteger, Edges) {\n\
             EdgeTop = 1 << 0,\n\
             EdgeBottom = 1 << 1,\n\
         };",
    )]);
    let swift = single_output(&output);
    assert!(swift.contains("struct Edges: OptionSet {"));
    assert!(swift.contains("let rawValue: UInt"));
    assert!(swift.contains("static let EdgeTop = Edges(rawValue: 1 << 0)"));
}

#[test]
fn ns_enum_becomes_raw_value_enum() {
    let output = transpile(&[(
        "Direction.h",
        "typedef NS_ENUM(NSInteger, Direction) { DirectionUp, DirectionDown = 2 };",
    )]);
    let swift = single_output(&output);
    assert!(swift.contains("enum Direction: Int {"));
    assert!(swift.contains("case DirectionUp"));
    assert!(swift.contains("case DirectionDown = 2"));
}

#[test]
fn message_sends_become_member_calls() {
    let output = transpile(&[(
        "Caller.m",
        "@implementation Caller\n\
         - (void)go {\n\
             [self.worker startWithSpeed:3 mode:1];\n\
         }\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("self.worker.startWithSpeed(3, mode: 1)"),
        "got:\n{}",
        swift
    );
}

#[test]
fn typedef_block_becomes_typealias() {
    let output = transpile(&[(
        "Types.h",
        "typedef void (^Completion)(BOOL);",
    )]);
    let swift = single_output(&output);
    assert!(
        swift.contains("typealias Completion = (Bool) -> Void"),
        "got:\n{}",
        swift
    );
}

#[test]
fn class_statics_surface_as_globals() {
    let output = transpile(&[(
        "Counter.m",
        "@implementation Counter\n\
         static NSInteger total = 0;\n\
         - (void)bump {\n\
             total++;\n\
         }\n\
         @end",
    )]);
    let swift = single_output(&output);
    assert!(swift.contains("fileprivate var total: Int = 0"), "got:\n{}", swift);
    assert!(swift.contains("total += 1"), "got:\n{}", swift);
}
