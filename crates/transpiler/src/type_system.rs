//! # Type System
//!
//! Answers assignability and member-resolution questions against the
//! intention graph. Consulted through the [`TypeSystem`] trait so passes and
//! the overload resolver can be driven by a stub in tests.

use crate::intentions::{ClassIntention, IntentionGraph};
use objswift_ast::{FunctionSignature, Name, SelectorSignature, SwiftType};

/// The queries the rewrite pipeline needs from a type model.
pub trait TypeSystem {
    /// Can a value of `from` appear where `to` is expected?
    fn is_assignable(&self, from: &SwiftType, to: &SwiftType) -> bool;

    /// Structural equality, optionally ignoring optional wrapping.
    fn types_match(&self, a: &SwiftType, b: &SwiftType, ignore_nullability: bool) -> bool {
        if ignore_nullability {
            a.deep_unwrapped().clone().normalized() == b.deep_unwrapped().clone().normalized()
        } else {
            a.clone().normalized() == b.clone().normalized()
        }
    }

    fn is_integer(&self, ty: &SwiftType) -> bool;
    fn is_float(&self, ty: &SwiftType) -> bool;

    fn is_numeric(&self, ty: &SwiftType) -> bool {
        self.is_integer(ty) || self.is_float(ty)
    }

    /// The type of a stored or computed member (field, property, enum case).
    fn member_type(&self, ty: &SwiftType, member: Name) -> Option<SwiftType>;

    /// The type of a free-standing identifier: a global variable, a known
    /// nominal (as a metatype), or an unambiguous free function.
    fn identifier_type(&self, _name: Name) -> Option<SwiftType> {
        None
    }

    /// Free-function signatures with the given name.
    fn function_signatures(&self, _name: Name) -> Vec<FunctionSignature> {
        Vec::new()
    }

    /// Every method signature with the given base name reachable from `ty`,
    /// walking class → superclasses → conformed protocols → extensions.
    fn method_signatures(&self, ty: &SwiftType, name: Name) -> Vec<FunctionSignature>;

    /// The method answering a full selector, when one exists.
    fn method_for_selector(
        &self,
        ty: &SwiftType,
        selector: &SelectorSignature,
    ) -> Option<FunctionSignature> {
        let base = selector.base_name()?;
        self.method_signatures(ty, base)
            .into_iter()
            .find(|signature| {
                signature
                    .possible_selector_signatures()
                    .iter()
                    .any(|s| s == selector)
            })
    }
}

const INTEGER_TYPE_NAMES: &[&str] = &[
    "Int", "Int8", "Int16", "Int32", "Int64", "UInt", "UInt8", "UInt16", "UInt32", "UInt64",
];

const FLOAT_TYPE_NAMES: &[&str] = &["Float", "Double", "CGFloat", "Float80", "TimeInterval"];

/// Built-in struct members for the CoreGraphics value types the transforms
/// produce, so member resolution works without Foundation headers.
fn builtin_member(type_name: &str, member: &str) -> Option<SwiftType> {
    match (type_name, member) {
        ("CGPoint", "x") | ("CGPoint", "y") => Some(SwiftType::cg_float()),
        ("CGSize", "width") | ("CGSize", "height") => Some(SwiftType::cg_float()),
        ("CGRect", "origin") => Some(SwiftType::type_name("CGPoint")),
        ("CGRect", "size") => Some(SwiftType::type_name("CGSize")),
        ("CGRect", "width")
        | ("CGRect", "height")
        | ("CGRect", "minX")
        | ("CGRect", "minY")
        | ("CGRect", "maxX")
        | ("CGRect", "maxY") => Some(SwiftType::cg_float()),
        ("String", "count") => Some(SwiftType::int()),
        ("String", "isEmpty") => Some(SwiftType::bool()),
        _ => None,
    }
}

/// Graph-backed type system.
pub struct IntentionTypeSystem<'a> {
    graph: &'a IntentionGraph,
}

impl<'a> IntentionTypeSystem<'a> {
    pub fn new(graph: &'a IntentionGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &IntentionGraph {
        self.graph
    }

    /// `from` and every class above it, in order.
    fn class_chain(&self, name: Name) -> Vec<&'a ClassIntention> {
        let mut chain = Vec::new();
        if let Some(class) = self.graph.class_named(name) {
            chain.push(class);
            chain.extend(self.graph.superclasses_of(name));
        }
        chain
    }

    /// Every protocol name conformed to by `name`'s chain, transitively.
    fn conformances(&self, name: Name) -> Vec<Name> {
        let mut result: Vec<Name> = Vec::new();
        let mut pending: Vec<Name> = self
            .class_chain(name)
            .iter()
            .flat_map(|c| c.protocols.iter().copied())
            .collect();
        pending.extend(
            self.graph
                .extensions_of(name)
                .flat_map(|e| e.protocols.iter().copied()),
        );

        while let Some(protocol_name) = pending.pop() {
            if result.contains(&protocol_name) {
                continue;
            }
            result.push(protocol_name);
            if let Some(protocol) = self.graph.protocol_named(protocol_name) {
                pending.extend(protocol.protocols.iter().copied());
            }
        }
        result
    }
}

impl TypeSystem for IntentionTypeSystem<'_> {
    fn is_assignable(&self, from: &SwiftType, to: &SwiftType) -> bool {
        let from = from.clone().normalized();
        let to = to.clone().normalized();
        if from == to {
            return true;
        }
        if from.is_error() || to.is_error() {
            return false;
        }

        // T is assignable to T? and T!.
        if to.is_optional() {
            return self.is_assignable(&from, to.unwrapped());
        }

        let Some(to_name) = to.nominal_name() else {
            return false;
        };
        if to_name == "Any" {
            return true;
        }
        // A wrapped optional needs unwrapping first, which is not
        // assignability.
        if from.is_optional() {
            return false;
        }

        let Some(from_name) = from.nominal_name() else {
            return false;
        };
        if to_name == "AnyObject" {
            // Reference types only; anything the graph knows as a class,
            // plus unknown nominals, pass.
            return self.graph.class_named(from_name).is_some()
                || !self.graph.is_known_type(from_name);
        }

        // Subclass relationship.
        if self
            .graph
            .superclasses_of(from_name)
            .iter()
            .any(|c| c.name == to_name)
        {
            return true;
        }
        // Protocol conformance.
        self.graph.protocol_named(to_name).is_some()
            && self.conformances(from_name).contains(&to_name)
    }

    fn is_integer(&self, ty: &SwiftType) -> bool {
        match ty.deep_unwrapped().nominal_name() {
            Some(name) => name.with_str(|s| INTEGER_TYPE_NAMES.contains(&s)),
            None => false,
        }
    }

    fn is_float(&self, ty: &SwiftType) -> bool {
        match ty.deep_unwrapped().nominal_name() {
            Some(name) => name.with_str(|s| FLOAT_TYPE_NAMES.contains(&s)),
            None => false,
        }
    }

    fn member_type(&self, ty: &SwiftType, member: Name) -> Option<SwiftType> {
        let ty = ty.deep_unwrapped();

        // Collections expose a minimal built-in surface.
        if matches!(ty, SwiftType::Array(_)) {
            if member == "count" {
                return Some(SwiftType::int());
            }
            if member == "isEmpty" {
                return Some(SwiftType::bool());
            }
            return None;
        }

        let name = ty.nominal_name()?;
        if let Some(found) = builtin_member(&name.resolve(), &member.resolve()) {
            return Some(found);
        }

        for class in self.class_chain(name) {
            if let Some(property) = class.property_named(member) {
                return Some(property.ty.clone());
            }
            if let Some(ivar) = class.ivar_named(member) {
                return Some(ivar.ty.clone());
            }
        }
        for extension in self.graph.extensions_of(name) {
            if let Some(property) = extension.properties.iter().find(|p| p.name == member) {
                return Some(property.ty.clone());
            }
        }
        for protocol_name in self.conformances(name) {
            if let Some(protocol) = self.graph.protocol_named(protocol_name) {
                if let Some(property) = protocol.properties.iter().find(|p| p.name == member) {
                    return Some(property.ty.clone());
                }
            }
        }
        if let Some(protocol) = self.graph.protocol_named(name) {
            if let Some(property) = protocol.properties.iter().find(|p| p.name == member) {
                return Some(property.ty.clone());
            }
        }
        if let Some(structure) = self.graph.struct_named(name) {
            if let Some(field) = structure.fields.iter().find(|f| f.name == member) {
                return Some(field.ty.clone());
            }
        }
        if let Some(enumeration) = self.graph.enum_named(name) {
            if enumeration.cases.iter().any(|c| c.name == member) {
                return Some(SwiftType::type_name(name));
            }
        }
        None
    }

    fn identifier_type(&self, name: Name) -> Option<SwiftType> {
        if let Some(var) = self.graph.global_variable_named(name) {
            return Some(var.ty.clone());
        }
        if self.graph.is_known_type(name) {
            return Some(SwiftType::metatype_of(SwiftType::type_name(name)));
        }
        let functions = self.graph.functions_named(name);
        if functions.len() == 1 {
            let signature = &functions[0].signature;
            return Some(SwiftType::block(
                signature.return_type.clone(),
                signature.parameters.iter().map(|p| p.ty.clone()).collect(),
            ));
        }
        None
    }

    fn function_signatures(&self, name: Name) -> Vec<FunctionSignature> {
        self.graph
            .functions_named(name)
            .into_iter()
            .map(|f| f.signature.clone())
            .collect()
    }

    fn method_signatures(&self, ty: &SwiftType, name: Name) -> Vec<FunctionSignature> {
        let mut signatures = Vec::new();
        let Some(type_name) = ty.deep_unwrapped().nominal_name() else {
            return signatures;
        };

        for class in self.class_chain(type_name) {
            for method in &class.methods {
                if method.signature.name == name && !signatures.contains(&method.signature) {
                    signatures.push(method.signature.clone());
                }
            }
        }
        for extension in self.graph.extensions_of(type_name) {
            for method in &extension.methods {
                if method.signature.name == name && !signatures.contains(&method.signature) {
                    signatures.push(method.signature.clone());
                }
            }
        }
        let mut protocol_names = self.conformances(type_name);
        if self.graph.protocol_named(type_name).is_some() {
            protocol_names.push(type_name);
        }
        for protocol_name in protocol_names {
            if let Some(protocol) = self.graph.protocol_named(protocol_name) {
                for method in &protocol.methods {
                    if method.signature.name == name && !signatures.contains(&method.signature) {
                        signatures.push(method.signature.clone());
                    }
                }
            }
        }
        signatures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IntentionCollector;
    use crate::objc::parse_objc_file;
    use objswift_ast::SourceFile;

    fn graph_from(sources: &[(&str, &str)]) -> IntentionGraph {
        let files: Vec<_> = sources
            .iter()
            .map(|(name, content)| {
                parse_objc_file(&SourceFile::new(*name, *content)).unwrap()
            })
            .collect();
        IntentionCollector::new().collect(&files)
    }

    #[test]
    fn numeric_predicates() {
        let graph = IntentionGraph::new();
        let ts = IntentionTypeSystem::new(&graph);

        assert!(ts.is_integer(&SwiftType::int()));
        assert!(ts.is_float(&SwiftType::cg_float()));
        assert!(ts.is_numeric(&SwiftType::double()));
        assert!(!ts.is_numeric(&SwiftType::string()));
        // Optionality does not change numeric-ness.
        assert!(ts.is_integer(&SwiftType::optional_of(SwiftType::int())));
    }

    #[test]
    fn types_match_respects_nullability_flag() {
        let graph = IntentionGraph::new();
        let ts = IntentionTypeSystem::new(&graph);
        let plain = SwiftType::string();
        let optional = SwiftType::optional_of(SwiftType::string());

        assert!(!ts.types_match(&plain, &optional, false));
        assert!(ts.types_match(&plain, &optional, true));
    }

    #[test]
    fn subclass_and_protocol_assignability() {
        let graph = graph_from(&[(
            "h.h",
            "@protocol Drawing\n@end\n\
             @interface Shape : NSObject <Drawing>\n@end\n\
             @interface Circle : Shape\n@end",
        )]);
        let ts = IntentionTypeSystem::new(&graph);
        let circle = SwiftType::type_name("Circle");
        let shape = SwiftType::type_name("Shape");
        let drawing = SwiftType::type_name("Drawing");

        assert!(ts.is_assignable(&circle, &shape));
        assert!(ts.is_assignable(&circle, &drawing));
        assert!(!ts.is_assignable(&shape, &circle));
        assert!(ts.is_assignable(&circle, &SwiftType::optional_of(shape)));
        assert!(ts.is_assignable(&circle, &SwiftType::any_object()));
    }

    #[test]
    fn member_resolution_walks_the_hierarchy() {
        let graph = graph_from(&[(
            "h.h",
            "NS_ASSUME_NONNULL_BEGIN\n\
             @interface Base\n@property NSString *title;\n@end\n\
             @interface Sub : Base\n@end\n\
             NS_ASSUME_NONNULL_END",
        )]);
        let ts = IntentionTypeSystem::new(&graph);
        let sub = SwiftType::type_name("Sub");
        assert_eq!(ts.member_type(&sub, "title".into()), Some(SwiftType::string()));
        assert_eq!(ts.member_type(&sub, "missing".into()), None);
    }

    #[test]
    fn builtin_struct_members_resolve() {
        let graph = IntentionGraph::new();
        let ts = IntentionTypeSystem::new(&graph);
        let rect = SwiftType::type_name("CGRect");
        assert_eq!(ts.member_type(&rect, "width".into()), Some(SwiftType::cg_float()));
        assert_eq!(
            ts.member_type(&rect, "origin".into()),
            Some(SwiftType::type_name("CGPoint"))
        );
    }

    #[test]
    fn method_lookup_includes_protocols_and_extensions() {
        let graph = graph_from(&[(
            "h.h",
            "@protocol Moving\n- (void)advance;\n@end\n\
             @interface Walker <Moving>\n@end\n\
             @interface Walker (Extra)\n- (void)rest;\n@end",
        )]);
        let ts = IntentionTypeSystem::new(&graph);
        let walker = SwiftType::type_name("Walker");

        assert_eq!(ts.method_signatures(&walker, "advance".into()).len(), 1);
        assert_eq!(ts.method_signatures(&walker, "rest".into()).len(), 1);

        let selector = SelectorSignature::new(false, vec![Some("advance".into())]);
        assert!(ts.method_for_selector(&walker, &selector).is_some());
    }
}
