//! # Intention Collection
//!
//! Walks each file's parse tree once, emitting intentions into the graph,
//! then runs a link pass that merges interface/implementation pairs, folds
//! class extensions into their classes, and marks overrides against the
//! superclass chain.
//!
//! Merge rules carried from the input language:
//! - `@interface C ()` merges into the existing `ClassIntention`; a named
//!   category becomes an `ExtensionIntention`.
//! - When a selector is declared in an interface with nullability
//!   annotations and redeclared in the implementation without them, the
//!   annotated signature wins; the implementation contributes the body.
//! - `static` variables declared inside a class still collect as globals.

use crate::intentions::*;
use crate::objc::{
    NullabilityContext, ObjcClassDecl, ObjcDecl, ObjcDeclKind, ObjcFile, ObjcMethodDecl,
    ObjcPropertyAttribute, ObjcPropertyDecl, ObjcTypeMapper, ObjcVarDecl, ObjcVisibility,
};
use crate::stmt_convert::StatementConverter;
use objswift_ast::{
    FunctionSignature, Name, ParameterSignature, SelectorSignature, SourceRef, SwiftType,
};

pub struct IntentionCollector {
    mapper: ObjcTypeMapper,
}

impl Default for IntentionCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentionCollector {
    pub fn new() -> Self {
        Self {
            mapper: ObjcTypeMapper::new(),
        }
    }

    /// Collect every file into one graph, then link.
    pub fn collect(&self, files: &[ObjcFile]) -> IntentionGraph {
        let mut graph = IntentionGraph::new();
        for file in files {
            self.collect_file(&mut graph, file);
        }
        self.mark_overrides(&mut graph);
        graph
    }

    fn collect_file(&self, graph: &mut IntentionGraph, file: &ObjcFile) {
        let mut record = FileIntention::new(file.name.clone());
        record.preprocessor_directives = file.preprocessor_directives.clone();
        graph.add_file(record);
        let file_index = graph.files.len() - 1;

        for decl in &file.declarations {
            self.collect_decl(graph, file_index, &file.name, decl);
        }
    }

    fn collect_decl(
        &self,
        graph: &mut IntentionGraph,
        file_index: usize,
        file_name: &str,
        decl: &ObjcDecl,
    ) {
        let source = SourceRef::new(file_name, decl.location);
        let context = if decl.in_nonnull_region {
            NullabilityContext::nonnull()
        } else {
            NullabilityContext::unspecified()
        };

        match &decl.kind {
            ObjcDeclKind::ClassInterface(class_decl) => {
                let intention = self.class_intention(class_decl, source, decl.in_nonnull_region);
                match graph.class_position(class_decl.name) {
                    Some((f, c)) => merge_class(&mut graph.files[f].classes[c], intention),
                    None => graph.files[file_index].classes.push(intention),
                }
            }
            ObjcDeclKind::ClassImplementation(class_decl) => {
                self.collect_statics(graph, file_index, file_name, class_decl);
                let intention = self.class_intention(class_decl, source, decl.in_nonnull_region);
                match graph.class_position(class_decl.name) {
                    Some((f, c)) => merge_class(&mut graph.files[f].classes[c], intention),
                    None => graph.files[file_index].classes.push(intention),
                }
            }
            ObjcDeclKind::Category(category) => {
                let in_nonnull = decl.in_nonnull_region;
                let context = nullability(in_nonnull);
                let properties: Vec<_> = category
                    .properties
                    .iter()
                    .map(|p| self.property_intention(p, category.class_name, file_name))
                    .collect();
                let methods: Vec<_> = category
                    .methods
                    .iter()
                    .map(|m| {
                        self.method_intention(m, category.class_name, file_name, context)
                    })
                    .collect();

                if category.category_name.is_none() {
                    // Class extension: merge into the class when it exists.
                    if let Some(class) = graph.class_named_mut(category.class_name) {
                        class.protocols.extend(category.protocols.iter().copied());
                        class.properties.extend(properties);
                        for method in methods {
                            merge_method_into_class(class, method);
                        }
                        for ivar in &category.ivars {
                            class.ivars.push(self.ivar_intention(
                                ivar,
                                category.class_name,
                                file_name,
                            ));
                        }
                        return;
                    }
                }

                graph.files[file_index].extensions.push(ExtensionIntention {
                    class_name: category.class_name,
                    category_name: category.category_name,
                    protocols: category.protocols.clone(),
                    properties,
                    methods,
                    access: AccessLevel::Internal,
                    source,
                    in_nonnull_context: in_nonnull,
                });
            }
            ObjcDeclKind::Protocol(protocol) => {
                let context = nullability(decl.in_nonnull_region);
                graph.files[file_index].protocols.push(ProtocolIntention {
                    name: protocol.name,
                    protocols: protocol.protocols.clone(),
                    properties: protocol
                        .properties
                        .iter()
                        .map(|p| self.property_intention(p, protocol.name, file_name))
                        .collect(),
                    methods: protocol
                        .methods
                        .iter()
                        .map(|m| self.method_intention(m, protocol.name, file_name, context))
                        .collect(),
                    access: AccessLevel::Internal,
                    source,
                    in_nonnull_context: decl.in_nonnull_region,
                });
            }
            ObjcDeclKind::Enum(enum_decl) => {
                let converter = StatementConverter::new(&self.mapper, context, None);
                graph.files[file_index].enums.push(EnumIntention {
                    name: enum_decl.name,
                    raw_type: self.mapper.swift_type(&enum_decl.raw_type, context, None),
                    is_option_set: enum_decl.is_options,
                    cases: enum_decl
                        .cases
                        .iter()
                        .map(|case| EnumCaseIntention {
                            name: case.name,
                            value: case.value.as_ref().map(|v| converter.convert_expression(v)),
                        })
                        .collect(),
                    access: AccessLevel::Internal,
                    source,
                });
            }
            ObjcDeclKind::Struct(struct_decl) => {
                graph.files[file_index].structs.push(StructIntention {
                    name: struct_decl.name,
                    fields: struct_decl
                        .fields
                        .iter()
                        .map(|(name, ty)| StructFieldIntention {
                            name: *name,
                            ty: self.mapper.swift_type(ty, context, None),
                        })
                        .collect(),
                    access: AccessLevel::Internal,
                    source,
                });
            }
            ObjcDeclKind::Typedef(typedef) => {
                // An alias names the bare type; nullability applies at the
                // use sites, not the typealias.
                let aliased = match self.mapper.swift_type(&typedef.ty, context, None) {
                    SwiftType::ImplicitUnwrappedOptional(inner) => *inner,
                    other => other,
                };
                graph.files[file_index].typedefs.push(TypedefIntention {
                    name: typedef.name,
                    aliased,
                    access: AccessLevel::Internal,
                    source,
                });
            }
            ObjcDeclKind::GlobalVariable(var) => {
                let intention = self.global_var_intention(var, file_name);
                graph.files[file_index].global_variables.push(intention);
            }
            ObjcDeclKind::Function(function) => {
                let converter =
                    StatementConverter::new(&self.mapper, context, None);
                let parameters = function
                    .parameters
                    .iter()
                    .map(|p| {
                        ParameterSignature::anonymous(
                            p.name,
                            self.mapper.swift_type(&p.ty, context, None),
                        )
                    })
                    .collect();
                graph.files[file_index]
                    .global_functions
                    .push(GlobalFuncIntention {
                        signature: FunctionSignature::new(
                            function.name,
                            parameters,
                            self.mapper.swift_type(&function.return_type, context, None),
                        ),
                        body: function.body.as_ref().map(|b| converter.convert_body(b)),
                        access: AccessLevel::Internal,
                        source,
                        in_nonnull_context: decl.in_nonnull_region,
                    });
            }
        }
    }

    /// `static` variables nested inside a class still collect as globals.
    fn collect_statics(
        &self,
        graph: &mut IntentionGraph,
        file_index: usize,
        file_name: &str,
        class_decl: &ObjcClassDecl,
    ) {
        for var in &class_decl.statics {
            let intention = self.global_var_intention(var, file_name);
            graph.files[file_index].global_variables.push(intention);
        }
    }

    fn class_intention(
        &self,
        decl: &ObjcClassDecl,
        source: SourceRef,
        in_nonnull: bool,
    ) -> ClassIntention {
        let context = nullability(in_nonnull);
        let file_name = source.file.clone();
        let mut intention = ClassIntention::new(decl.name, source);
        intention.superclass = decl.superclass;
        intention.protocols = decl.protocols.clone();
        intention.in_nonnull_context = in_nonnull;
        intention.ivars = decl
            .ivars
            .iter()
            .map(|i| self.ivar_intention(i, decl.name, &file_name))
            .collect();
        intention.properties = decl
            .properties
            .iter()
            .map(|p| self.property_intention(p, decl.name, &file_name))
            .collect();

        for method in &decl.methods {
            match self.classify_method(method, decl.name, &file_name, context) {
                ClassifiedMember::Init(init) => intention.inits.push(init),
                ClassifiedMember::Deinit(deinit) => intention.deinit = Some(deinit),
                ClassifiedMember::Method(method) => intention.methods.push(method),
            }
        }
        intention
    }

    fn ivar_intention(
        &self,
        ivar: &crate::objc::ObjcIvarDecl,
        parent: Name,
        file_name: &str,
    ) -> IVarIntention {
        let is_weak = ivar.ty.specifiers().iter().any(|s| *s == "__weak");
        let context = NullabilityContext::unspecified();
        let mut ty = self.mapper.swift_type(&ivar.ty, context, Some(parent));
        let ownership = if is_weak {
            ty = SwiftType::optional_of(ty.deep_unwrapped().clone());
            Ownership::Weak
        } else {
            Ownership::Strong
        };

        IVarIntention {
            name: ivar.name,
            ty,
            ownership,
            access: match ivar.visibility {
                ObjcVisibility::Private => AccessLevel::Private,
                ObjcVisibility::Protected => AccessLevel::FilePrivate,
                ObjcVisibility::Package => AccessLevel::Internal,
                ObjcVisibility::Public => AccessLevel::Public,
            },
            source: SourceRef::new(file_name, ivar.location),
            parent: Some(parent),
        }
    }

    fn property_intention(
        &self,
        property: &ObjcPropertyDecl,
        parent: Name,
        file_name: &str,
    ) -> PropertyIntention {
        eprintln!("DEBUG property_intention start");
        let context = nullability(property.in_nonnull_region);
        eprintln!("DEBUG before swift_type");
        let mut ty = self
            .mapper
            .swift_type(&property.ty, context, Some(parent));
        eprintln!("DEBUG after swift_type");

        let is_weak = property.has_attribute(&ObjcPropertyAttribute::Weak);
        let is_assign = property.has_attribute(&ObjcPropertyAttribute::Assign);
        eprintln!("DEBUG is_weak={} is_assign={}", is_weak, is_assign);
        let ownership = if is_weak {
            // A weak reference must be optional.
            ty = SwiftType::optional_of(ty.deep_unwrapped().clone());
            Ownership::Weak
        } else if is_assign && property.ty.is_pointer() {
            Ownership::UnownedUnsafe
        } else {
            Ownership::Strong
        };

        PropertyIntention {
            name: property.name,
            ty,
            ownership,
            is_readonly: property.has_attribute(&ObjcPropertyAttribute::Readonly),
            is_static: property.has_attribute(&ObjcPropertyAttribute::Class),
            is_optional: property.is_optional,
            getter_name: property.getter_name(),
            setter_name: property.setter_name(),
            access: AccessLevel::Internal,
            source: SourceRef::new(file_name, property.location),
            in_nonnull_context: property.in_nonnull_region,
            parent: Some(parent),
        }
    }

    fn method_intention(
        &self,
        method: &ObjcMethodDecl,
        parent: Name,
        file_name: &str,
        context: NullabilityContext,
    ) -> MethodIntention {
        match self.classify_method(method, parent, file_name, context) {
            ClassifiedMember::Method(m) => m,
            // Protocol/category init declarations keep their method shape.
            ClassifiedMember::Init(init) => MethodIntention {
                signature: FunctionSignature::new(
                    "init",
                    init.parameters,
                    SwiftType::type_name(parent),
                ),
                body: init.body,
                is_optional: false,
                is_override: false,
                access: init.access,
                source: init.source,
                in_nonnull_context: init.in_nonnull_context,
                parent: init.parent,
            },
            ClassifiedMember::Deinit(deinit) => MethodIntention {
                signature: FunctionSignature::new("deinit", vec![], SwiftType::void()),
                body: deinit.body,
                is_optional: false,
                is_override: false,
                access: AccessLevel::Internal,
                source: deinit.source,
                in_nonnull_context: false,
                parent: deinit.parent,
            },
        }
    }

    fn classify_method(
        &self,
        method: &ObjcMethodDecl,
        parent: Name,
        file_name: &str,
        file_context: NullabilityContext,
    ) -> ClassifiedMember {
        let context = if method.in_nonnull_region {
            NullabilityContext::nonnull()
        } else {
            file_context
        };
        let source = SourceRef::new(file_name, method.location);
        let converter = StatementConverter::new(&self.mapper, context, Some(parent));
        let body = method.body.as_ref().map(|b| converter.convert_body(b));

        let base_name = method.base_name();
        let selector = method.selector_string();

        if selector == "dealloc" {
            return ClassifiedMember::Deinit(DeinitIntention {
                body,
                source,
                parent: Some(parent),
            });
        }

        let init_rest = base_name.with_str(|s| {
            if s == "init" {
                Some(String::new())
            } else {
                s.strip_prefix("initWith").map(str::to_owned)
            }
        });
        if let Some(rest) = init_rest {
            if !method.is_class_method {
                let mut parameters = Vec::new();
                for (index, piece) in method.pieces.iter().enumerate() {
                    let Some(argument) = &piece.argument else { continue };
                    let label = if index == 0 {
                        Name::new(lowercased_first(&rest))
                    } else {
                        piece.keyword
                    };
                    parameters.push(ParameterSignature::new(
                        Some(label),
                        argument.name,
                        self.mapper.swift_type(&argument.ty, context, Some(parent)),
                    ));
                }
                // A nullable instancetype return marks a failable initializer.
                let return_ty =
                    self.mapper
                        .swift_type(&method.return_type, context, Some(parent));
                let is_failable = matches!(return_ty, SwiftType::Optional(_));

                return ClassifiedMember::Init(InitIntention {
                    parameters,
                    is_failable,
                    body,
                    access: AccessLevel::Internal,
                    source,
                    in_nonnull_context: method.in_nonnull_region,
                    parent: Some(parent),
                });
            }
        }

        let mut parameters = Vec::new();
        for (index, piece) in method.pieces.iter().enumerate() {
            let Some(argument) = &piece.argument else { continue };
            let label = if index == 0 { None } else { Some(piece.keyword) };
            parameters.push(ParameterSignature::new(
                label,
                argument.name,
                self.mapper.swift_type(&argument.ty, context, Some(parent)),
            ));
        }

        let mut signature = FunctionSignature::new(
            base_name,
            parameters,
            self.mapper
                .swift_type(&method.return_type, context, Some(parent)),
        );
        if method.is_class_method {
            signature = signature.with_static();
        }

        ClassifiedMember::Method(MethodIntention {
            signature,
            body,
            is_optional: method.is_optional,
            is_override: false,
            access: AccessLevel::Internal,
            source,
            in_nonnull_context: method.in_nonnull_region,
            parent: Some(parent),
        })
    }

    fn global_var_intention(&self, var: &ObjcVarDecl, file_name: &str) -> GlobalVarIntention {
        let context = nullability(var.in_nonnull_region);
        let converter = StatementConverter::new(&self.mapper, context, None);
        let is_constant = var.ty.qualifiers().iter().any(|q| *q == "const");

        GlobalVarIntention {
            name: var.name,
            ty: self.mapper.swift_type(&var.ty, context, None),
            is_constant,
            initializer: var
                .initializer
                .as_ref()
                .map(|e| converter.convert_expression(e)),
            access: if var.is_static {
                AccessLevel::FilePrivate
            } else {
                AccessLevel::Internal
            },
            source: SourceRef::new(file_name, var.location),
            in_nonnull_context: var.in_nonnull_region,
        }
    }

    /// Link pass: mark methods that redeclare a superclass selector.
    fn mark_overrides(&self, graph: &mut IntentionGraph) {
        let mut per_class: Vec<(Name, Vec<SelectorSignature>)> = Vec::new();
        for class in graph.classes() {
            let inherited: Vec<SelectorSignature> = graph
                .superclasses_of(class.name)
                .iter()
                .flat_map(|superclass| {
                    superclass
                        .methods
                        .iter()
                        .map(|m| m.signature.as_selector())
                })
                .collect();
            if !inherited.is_empty() {
                per_class.push((class.name, inherited));
            }
        }

        for (class_name, inherited) in per_class {
            if let Some(class) = graph.class_named_mut(class_name) {
                for method in &mut class.methods {
                    if inherited.contains(&method.signature.as_selector()) {
                        method.is_override = true;
                    }
                }
            }
        }
    }
}

enum ClassifiedMember {
    Method(MethodIntention),
    Init(InitIntention),
    Deinit(DeinitIntention),
}

fn nullability(in_nonnull: bool) -> NullabilityContext {
    if in_nonnull {
        NullabilityContext::nonnull()
    } else {
        NullabilityContext::unspecified()
    }
}

/// Merge a freshly collected class record into an existing intention.
/// Interface and implementation signatures reconcile per the nullability
/// rule: the version that carries annotations wins.
fn merge_class(existing: &mut ClassIntention, incoming: ClassIntention) {
    if existing.superclass.is_none() {
        existing.superclass = incoming.superclass;
    }
    for protocol in incoming.protocols {
        if !existing.protocols.contains(&protocol) {
            existing.protocols.push(protocol);
        }
    }
    for ivar in incoming.ivars {
        if existing.ivar_named(ivar.name).is_none() {
            existing.ivars.push(ivar);
        }
    }
    for property in incoming.properties {
        if existing.property_named(property.name).is_none() {
            existing.properties.push(property);
        }
    }
    for method in incoming.methods {
        merge_method_into_class(existing, method);
    }
    for init in incoming.inits {
        let position = existing.inits.iter().position(|i| {
            i.parameters
                .iter()
                .map(|p| p.label)
                .eq(init.parameters.iter().map(|p| p.label))
        });
        match position {
            Some(index) => {
                let found = &mut existing.inits[index];
                if found.body.is_none() {
                    found.body = init.body;
                }
                if !found.in_nonnull_context && init.in_nonnull_context {
                    found.parameters = init.parameters;
                    found.is_failable = init.is_failable;
                    found.in_nonnull_context = true;
                }
            }
            None => existing.inits.push(init),
        }
    }
    if existing.deinit.is_none() {
        existing.deinit = incoming.deinit;
    }
    existing.in_nonnull_context |= incoming.in_nonnull_context;
}

fn merge_method_into_class(class: &mut ClassIntention, method: MethodIntention) {
    let selector = method.signature.as_selector();
    let position = class
        .methods
        .iter()
        .position(|m| m.signature.as_selector() == selector);
    match position {
        Some(index) => {
            let existing = &mut class.methods[index];
            if existing.body.is_none() {
                existing.body = method.body;
            }
            // Annotated signature wins over the unannotated redeclaration.
            if !existing.in_nonnull_context && method.in_nonnull_context {
                existing.signature = method.signature;
                existing.in_nonnull_context = true;
            }
        }
        None => class.methods.push(method),
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
    use crate::objc::parse_objc_file;
    use objswift_ast::SourceFile;

    fn collect(sources: &[(&str, &str)]) -> IntentionGraph {
        let files: Vec<_> = sources
            .iter()
            .map(|(name, content)| {
                parse_objc_file(&SourceFile::new(*name, *content)).unwrap()
            })
            .collect();
        IntentionCollector::new().collect(&files)
    }

    #[test]
    fn weak_property_maps_to_weak_optional() {
        let graph = collect(&[(
            "A.h",
            "@interface A\n@property (weak) MyClass *d;\n@end",
        )]);
        let class = graph.class_named("A".into()).unwrap();
        let property = class.property_named("d".into()).unwrap();
        assert_eq!(property.ownership, Ownership::Weak);
        assert_eq!(
            property.ty,
            SwiftType::optional_of(SwiftType::type_name("MyClass"))
        );
    }

    #[test]
    fn assign_object_property_maps_to_unowned_unsafe_iuo() {
        let graph = collect(&[(
            "A.h",
            "@interface A\n@property (assign) MyClass *d;\n@end",
        )]);
        let class = graph.class_named("A".into()).unwrap();
        let property = class.property_named("d".into()).unwrap();
        assert_eq!(property.ownership, Ownership::UnownedUnsafe);
        assert_eq!(
            property.ty,
            SwiftType::iuo_of(SwiftType::type_name("MyClass"))
        );
    }

    #[test]
    fn interface_and_implementation_merge() {
        let graph = collect(&[
            (
                "A.h",
                "NS_ASSUME_NONNULL_BEGIN\n@interface A : NSObject\n- (NSString *)title;\n@end\nNS_ASSUME_NONNULL_END",
            ),
            (
                "A.m",
                "@implementation A\n- (NSString *)title { return name; }\n@end",
            ),
        ]);
        let class = graph.class_named("A".into()).unwrap();
        assert_eq!(class.methods.len(), 1);
        let method = &class.methods[0];
        // The annotated interface signature survives the merge…
        assert_eq!(method.signature.return_type, SwiftType::string());
        // …and the implementation supplies the body.
        assert!(method.body.is_some());
    }

    #[test]
    fn class_extension_merges_and_category_stays_separate() {
        let graph = collect(&[(
            "A.m",
            "@interface A\n@end\n\
             @interface A ()\n- (void)secret;\n@end\n\
             @interface A (Extras)\n- (void)bonus;\n@end",
        )]);
        let class = graph.class_named("A".into()).unwrap();
        assert!(class
            .methods
            .iter()
            .any(|m| m.signature.name == "secret"));

        let extensions: Vec<_> = graph.extensions_of("A".into()).collect();
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].category_name, Some(Name::new("Extras")));
    }

    #[test]
    fn init_with_selector_becomes_initializer() {
        let graph = collect(&[(
            "A.h",
            "@interface A\n- (instancetype)initWithFrame:(CGRect)frame andTag:(NSInteger)tag;\n@end",
        )]);
        let class = graph.class_named("A".into()).unwrap();
        assert_eq!(class.inits.len(), 1);
        let init = &class.inits[0];
        assert_eq!(init.parameters.len(), 2);
        assert_eq!(init.parameters[0].label, Some(Name::new("frame")));
        assert_eq!(init.parameters[1].label, Some(Name::new("andTag")));
    }

    #[test]
    fn dealloc_becomes_deinit() {
        let graph = collect(&[(
            "A.m",
            "@implementation A\n- (void)dealloc { cleanup(); }\n@end",
        )]);
        let class = graph.class_named("A".into()).unwrap();
        assert!(class.deinit.is_some());
    }

    #[test]
    fn class_scope_statics_become_globals() {
        let graph = collect(&[(
            "A.m",
            "@implementation A\nstatic NSInteger counter = 0;\n- (void)touch {}\n@end",
        )]);
        assert!(graph.global_variable_named("counter".into()).is_some());
    }

    #[test]
    fn overrides_are_marked_against_superclass_chain() {
        let graph = collect(&[(
            "V.h",
            "@interface Base\n- (void)layout;\n@end\n\
             @interface Child : Base\n- (void)layout;\n- (void)own;\n@end",
        )]);
        let child = graph.class_named("Child".into()).unwrap();
        let layout = child
            .methods
            .iter()
            .find(|m| m.signature.name == "layout")
            .unwrap();
        let own = child.methods.iter().find(|m| m.signature.name == "own").unwrap();
        assert!(layout.is_override);
        assert!(!own.is_override);
    }

    #[test]
    fn option_sets_are_flagged() {
        let graph = collect(&[(
            "E.h",
            "typedef NS_OPTIONS(NSUInteger, Edges) { EdgeTop = 1 };",
        )]);
        let e = graph.enum_named("Edges".into()).unwrap();
        assert!(e.is_option_set);
        assert_eq!(e.raw_type, SwiftType::uint());
    }
}
