//! # Intention Graph
//!
//! Intentions are the source-derived declaration records that outlive
//! parsing and drive emission: classes, protocols, extensions, enums,
//! structs, methods, properties, globals, typedefs. Each carries its access
//! level, a [`SourceRef`], and the nullability context it was declared in.
//!
//! Enclosing relationships are name-keyed: a method knows its parent class
//! by name and resolves it through the graph, never through an owning
//! pointer, so the graph stays cycle-free.

use objswift_ast::{
    CompoundStatement, Expression, FunctionSignature, Name, SelectorSignature, SourceRef,
    SwiftType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Swift access levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    Private,
    FilePrivate,
    Internal,
    Public,
    Open,
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Internal
    }
}

impl AccessLevel {
    /// The keyword, or `None` for the implicit `internal` default.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            AccessLevel::Private => Some("private"),
            AccessLevel::FilePrivate => Some("fileprivate"),
            AccessLevel::Internal => None,
            AccessLevel::Public => Some("public"),
            AccessLevel::Open => Some("open"),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or("internal"))
    }
}

/// Reference ownership of a stored property or ivar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    Strong,
    Weak,
    UnownedSafe,
    UnownedUnsafe,
}

impl Default for Ownership {
    fn default() -> Self {
        Ownership::Strong
    }
}

impl Ownership {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Ownership::Strong => None,
            Ownership::Weak => Some("weak"),
            Ownership::UnownedSafe => Some("unowned(safe)"),
            Ownership::UnownedUnsafe => Some("unowned(unsafe)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassIntention {
    pub name: Name,
    pub superclass: Option<Name>,
    pub protocols: Vec<Name>,
    pub ivars: Vec<IVarIntention>,
    pub properties: Vec<PropertyIntention>,
    pub methods: Vec<MethodIntention>,
    pub inits: Vec<InitIntention>,
    pub deinit: Option<DeinitIntention>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
}

impl ClassIntention {
    pub fn new(name: Name, source: SourceRef) -> Self {
        Self {
            name,
            superclass: None,
            protocols: Vec::new(),
            ivars: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            inits: Vec::new(),
            deinit: None,
            access: AccessLevel::Internal,
            source,
            in_nonnull_context: false,
        }
    }

    pub fn property_named(&self, name: Name) -> Option<&PropertyIntention> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn ivar_named(&self, name: Name) -> Option<&IVarIntention> {
        self.ivars.iter().find(|i| i.name == name)
    }

    pub fn method_with_selector(&self, selector: &SelectorSignature) -> Option<&MethodIntention> {
        self.methods.iter().find(|m| {
            m.signature
                .possible_selector_signatures()
                .iter()
                .any(|s| s == selector)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionIntention {
    pub class_name: Name,
    /// The category name; `None` marks a merged anonymous extension kept as
    /// its own record (e.g. when no base class interface exists).
    pub category_name: Option<Name>,
    pub protocols: Vec<Name>,
    pub properties: Vec<PropertyIntention>,
    pub methods: Vec<MethodIntention>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolIntention {
    pub name: Name,
    /// Inherited protocols; rendered as protocol inheritance in Swift.
    pub protocols: Vec<Name>,
    pub properties: Vec<PropertyIntention>,
    pub methods: Vec<MethodIntention>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCaseIntention {
    pub name: Name,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumIntention {
    pub name: Name,
    pub raw_type: SwiftType,
    /// `NS_OPTIONS` enums become `OptionSet` structs on the Swift side.
    pub is_option_set: bool,
    pub cases: Vec<EnumCaseIntention>,
    pub access: AccessLevel,
    pub source: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructFieldIntention {
    pub name: Name,
    pub ty: SwiftType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructIntention {
    pub name: Name,
    pub fields: Vec<StructFieldIntention>,
    pub access: AccessLevel,
    pub source: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefIntention {
    pub name: Name,
    pub aliased: SwiftType,
    pub access: AccessLevel,
    pub source: SourceRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIntention {
    pub name: Name,
    pub ty: SwiftType,
    pub ownership: Ownership,
    pub is_readonly: bool,
    pub is_static: bool,
    /// Protocol `@optional` member.
    pub is_optional: bool,
    pub getter_name: Option<Name>,
    pub setter_name: Option<Name>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
    /// Enclosing type, by name.
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IVarIntention {
    pub name: Name,
    pub ty: SwiftType,
    pub ownership: Ownership,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodIntention {
    pub signature: FunctionSignature,
    pub body: Option<CompoundStatement>,
    /// Protocol `@optional` member.
    pub is_optional: bool,
    pub is_override: bool,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitIntention {
    pub parameters: Vec<objswift_ast::ParameterSignature>,
    pub is_failable: bool,
    pub body: Option<CompoundStatement>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeinitIntention {
    pub body: Option<CompoundStatement>,
    pub source: SourceRef,
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVarIntention {
    pub name: Name,
    pub ty: SwiftType,
    pub is_constant: bool,
    pub initializer: Option<Expression>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalFuncIntention {
    pub signature: FunctionSignature,
    pub body: Option<CompoundStatement>,
    pub access: AccessLevel,
    pub source: SourceRef,
    pub in_nonnull_context: bool,
}

/// Everything collected from one translation unit. Intentions are owned by
/// their file record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileIntention {
    pub file_name: String,
    pub preprocessor_directives: Vec<String>,
    pub classes: Vec<ClassIntention>,
    pub extensions: Vec<ExtensionIntention>,
    pub protocols: Vec<ProtocolIntention>,
    pub enums: Vec<EnumIntention>,
    pub structs: Vec<StructIntention>,
    pub typedefs: Vec<TypedefIntention>,
    pub global_variables: Vec<GlobalVarIntention>,
    pub global_functions: Vec<GlobalFuncIntention>,
}

impl FileIntention {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }
}

/// The cross-unit symbol table. All lookups are by name so that references
/// between intentions never form ownership cycles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntentionGraph {
    pub files: Vec<FileIntention>,
}

impl IntentionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: FileIntention) {
        self.files.push(file);
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassIntention> {
        self.files.iter().flat_map(|f| f.classes.iter())
    }

    pub fn protocols(&self) -> impl Iterator<Item = &ProtocolIntention> {
        self.files.iter().flat_map(|f| f.protocols.iter())
    }

    pub fn class_named(&self, name: Name) -> Option<&ClassIntention> {
        self.classes().find(|c| c.name == name)
    }

    /// Locate a class as (file index, class index). Index-based so callers
    /// can mutate one class while still inserting into the graph.
    pub fn class_position(&self, name: Name) -> Option<(usize, usize)> {
        for (file_index, file) in self.files.iter().enumerate() {
            if let Some(class_index) = file.classes.iter().position(|c| c.name == name) {
                return Some((file_index, class_index));
            }
        }
        None
    }

    pub fn class_named_mut(&mut self, name: Name) -> Option<&mut ClassIntention> {
        let (file_index, class_index) = self.class_position(name)?;
        Some(&mut self.files[file_index].classes[class_index])
    }

    pub fn protocol_named(&self, name: Name) -> Option<&ProtocolIntention> {
        self.protocols().find(|p| p.name == name)
    }

    pub fn enum_named(&self, name: Name) -> Option<&EnumIntention> {
        self.files
            .iter()
            .flat_map(|f| f.enums.iter())
            .find(|e| e.name == name)
    }

    pub fn struct_named(&self, name: Name) -> Option<&StructIntention> {
        self.files
            .iter()
            .flat_map(|f| f.structs.iter())
            .find(|s| s.name == name)
    }

    pub fn typedef_named(&self, name: Name) -> Option<&TypedefIntention> {
        self.files
            .iter()
            .flat_map(|f| f.typedefs.iter())
            .find(|t| t.name == name)
    }

    pub fn extensions_of(&self, class_name: Name) -> impl Iterator<Item = &ExtensionIntention> {
        self.files
            .iter()
            .flat_map(|f| f.extensions.iter())
            .filter(move |e| e.class_name == class_name)
    }

    pub fn function_named(&self, name: Name) -> Option<&GlobalFuncIntention> {
        self.files
            .iter()
            .flat_map(|f| f.global_functions.iter())
            .find(|f| f.signature.name == name)
    }

    pub fn functions_named(&self, name: Name) -> Vec<&GlobalFuncIntention> {
        self.files
            .iter()
            .flat_map(|f| f.global_functions.iter())
            .filter(|f| f.signature.name == name)
            .collect()
    }

    pub fn global_variable_named(&self, name: Name) -> Option<&GlobalVarIntention> {
        self.files
            .iter()
            .flat_map(|f| f.global_variables.iter())
            .find(|g| g.name == name)
    }

    /// Climb the superclass chain starting at (and excluding) `name`.
    pub fn superclasses_of(&self, name: Name) -> Vec<&ClassIntention> {
        let mut chain = Vec::new();
        let mut current = self.class_named(name).and_then(|c| c.superclass);
        while let Some(super_name) = current {
            match self.class_named(super_name) {
                Some(class) => {
                    // A malformed hierarchy could cycle through names.
                    if chain.iter().any(|c: &&ClassIntention| c.name == class.name) {
                        break;
                    }
                    current = class.superclass;
                    chain.push(class);
                }
                None => break,
            }
        }
        chain
    }

    /// Does `name` name any known nominal intention?
    pub fn is_known_type(&self, name: Name) -> bool {
        self.class_named(name).is_some()
            || self.protocol_named(name).is_some()
            || self.enum_named(name).is_some()
            || self.struct_named(name).is_some()
            || self.typedef_named(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_hierarchy() -> IntentionGraph {
        let mut file = FileIntention::new("Shapes.m");
        let mut base = ClassIntention::new("Shape".into(), SourceRef::synthesized());
        base.properties.push(PropertyIntention {
            name: "name".into(),
            ty: SwiftType::string(),
            ownership: Ownership::Strong,
            is_readonly: false,
            is_static: false,
            is_optional: false,
            getter_name: None,
            setter_name: None,
            access: AccessLevel::Internal,
            source: SourceRef::synthesized(),
            in_nonnull_context: true,
            parent: Some("Shape".into()),
        });
        let mut circle = ClassIntention::new("Circle".into(), SourceRef::synthesized());
        circle.superclass = Some("Shape".into());
        file.classes.push(base);
        file.classes.push(circle);

        let mut graph = IntentionGraph::new();
        graph.add_file(file);
        graph
    }

    #[test]
    fn name_keyed_lookup() {
        let graph = graph_with_hierarchy();
        assert!(graph.class_named("Shape".into()).is_some());
        assert!(graph.class_named("Square".into()).is_none());
        assert!(graph.is_known_type("Circle".into()));
    }

    #[test]
    fn superclass_chain_resolves_by_name() {
        let graph = graph_with_hierarchy();
        let chain = graph.superclasses_of("Circle".into());
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "Shape");
    }

    #[test]
    fn cyclic_superclass_names_terminate() {
        let mut graph = graph_with_hierarchy();
        graph.class_named_mut("Shape".into()).unwrap().superclass = Some("Circle".into());
        // The walk must not spin on Shape → Circle → Shape.
        let chain = graph.superclasses_of("Circle".into());
        assert!(chain.len() <= 2);
    }

    #[test]
    fn parent_is_resolved_through_the_graph() {
        let graph = graph_with_hierarchy();
        let shape = graph.class_named("Shape".into()).unwrap();
        let property = shape.property_named("name".into()).unwrap();
        let parent = property.parent.and_then(|p| graph.class_named(p)).unwrap();
        assert_eq!(parent.name, shape.name);
    }
}
