//! # Objective-C → Swift Type Mapping
//!
//! Bridges input types onto the Swift model under a nullability context:
//! object pointers inside an `NS_ASSUME_NONNULL` region map to plain types,
//! outside it to implicitly-unwrapped optionals, and explicit `_Nullable` /
//! `_Nonnull` qualifiers always win over the region default.

use objswift_ast::{Name, ObjcType, SwiftType};

/// The nullability rules in effect at a declaration's source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullabilityContext {
    pub assume_nonnull: bool,
}

impl NullabilityContext {
    pub fn nonnull() -> Self {
        Self { assume_nonnull: true }
    }

    pub fn unspecified() -> Self {
        Self {
            assume_nonnull: false,
        }
    }
}

/// Explicit nullability spelled at the type, when any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExplicitNullability {
    Nullable,
    Nonnull,
}

/// Maps [`ObjcType`]s to [`SwiftType`]s.
#[derive(Debug, Default)]
pub struct ObjcTypeMapper;

impl ObjcTypeMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map a declaration type. `instance_type` names the enclosing class so
    /// `instancetype` can resolve.
    pub fn swift_type(
        &self,
        ty: &ObjcType,
        context: NullabilityContext,
        instance_type: Option<Name>,
    ) -> SwiftType {
        let explicit = Self::explicit_nullability(ty);
        let core = self.core_type(ty.unqualified(), context, instance_type);

        if !Self::is_nullability_bearing(ty) {
            return core;
        }

        match explicit {
            Some(ExplicitNullability::Nullable) => SwiftType::optional_of(core),
            Some(ExplicitNullability::Nonnull) => core,
            None if context.assume_nonnull => core,
            None => SwiftType::iuo_of(core),
        }
    }

    /// Whether nullability applies to this type at all: object pointers,
    /// `id`, `instancetype`, and blocks. Value types are never optional.
    fn is_nullability_bearing(ty: &ObjcType) -> bool {
        match ty.unqualified() {
            ObjcType::Pointer(_)
            | ObjcType::Id { .. }
            | ObjcType::InstanceType
            | ObjcType::Block { .. } => true,
            ObjcType::Generic(..) => true,
            _ => false,
        }
    }

    fn explicit_nullability(ty: &ObjcType) -> Option<ExplicitNullability> {
        let mut current = ty;
        loop {
            match current {
                ObjcType::Qualified { base, qualifiers } => {
                    for q in qualifiers {
                        if *q == "_Nullable" || *q == "__nullable" {
                            return Some(ExplicitNullability::Nullable);
                        }
                        if *q == "_Nonnull" || *q == "__nonnull" {
                            return Some(ExplicitNullability::Nonnull);
                        }
                    }
                    current = base;
                }
                ObjcType::Specified { base, .. } => current = base,
                _ => return None,
            }
        }
    }

    /// The bridged Swift type, ignoring nullability.
    fn core_type(
        &self,
        ty: &ObjcType,
        context: NullabilityContext,
        instance_type: Option<Name>,
    ) -> SwiftType {
        match ty {
            ObjcType::Void => SwiftType::void(),
            ObjcType::InstanceType => match instance_type {
                Some(name) => SwiftType::Nominal(
                    objswift_ast::NominalSwiftType::TypeName(name),
                ),
                None => SwiftType::any_object(),
            },
            ObjcType::Id { protocols } => match protocols.len() {
                0 => SwiftType::any_object(),
                1 => SwiftType::type_name(protocols[0]),
                _ => SwiftType::ProtocolComposition(
                    protocols
                        .iter()
                        .map(|p| {
                            objswift_ast::CompositionMember::Nominal(
                                objswift_ast::NominalSwiftType::TypeName(*p),
                            )
                        })
                        .collect(),
                ),
            },
            ObjcType::Struct(name) => self.scalar_type(*name),
            ObjcType::Pointer(inner) => match inner.unqualified() {
                ObjcType::Struct(name) => self.bridged_class_type(*name),
                ObjcType::Generic(name, args) => self.bridged_generic_type(*name, args, context),
                // `id *`, `T **`: read through to the pointee.
                other => self.core_type(other, context, instance_type),
            },
            ObjcType::Generic(name, args) => self.bridged_generic_type(*name, args, context),
            ObjcType::Qualified { base, .. } | ObjcType::Specified { base, .. } => {
                self.core_type(base, context, instance_type)
            }
            ObjcType::Block {
                return_type,
                parameters,
                ..
            }
            | ObjcType::FunctionPointer {
                return_type,
                parameters,
                ..
            } => SwiftType::block(
                self.swift_type(return_type, context, instance_type),
                parameters
                    .iter()
                    .map(|p| self.swift_type(p, context, instance_type))
                    .collect(),
            ),
            ObjcType::FixedArray(element, _) => {
                SwiftType::array_of(self.core_type(element.unqualified(), context, instance_type))
            }
        }
    }

    /// Scalars and C value types by name.
    fn scalar_type(&self, name: Name) -> SwiftType {
        name.with_str(|s| match s {
            "BOOL" | "bool" | "Boolean" => SwiftType::bool(),
            "NSInteger" | "int" | "long" | "long int" | "long long" | "long long int"
            | "short" | "short int" | "signed" | "signed int" => SwiftType::int(),
            "NSUInteger" | "unsigned" | "unsigned int" | "unsigned long"
            | "unsigned long long" | "unsigned short" => SwiftType::uint(),
            "CGFloat" => SwiftType::cg_float(),
            "float" => SwiftType::float(),
            "double" | "NSTimeInterval" => SwiftType::double(),
            "char" | "signed char" => SwiftType::type_name("Int8"),
            "unsigned char" => SwiftType::type_name("UInt8"),
            "SEL" => SwiftType::type_name("Selector"),
            other => SwiftType::type_name(other),
        })
    }

    /// Object-pointer classes with Foundation bridging.
    fn bridged_class_type(&self, name: Name) -> SwiftType {
        name.with_str(|s| match s {
            "NSString" | "NSMutableString" => SwiftType::string(),
            "NSArray" => SwiftType::array_of(SwiftType::type_name("Any")),
            "NSDictionary" => SwiftType::dictionary_of(
                SwiftType::type_name("AnyHashable"),
                SwiftType::type_name("Any"),
            ),
            "NSObject" => SwiftType::type_name("NSObject"),
            other => SwiftType::type_name(other),
        })
    }

    fn bridged_generic_type(
        &self,
        name: Name,
        args: &[ObjcType],
        context: NullabilityContext,
    ) -> SwiftType {
        // Element positions in collections follow the region default but
        // are never implicitly unwrapped; an unannotated element is plain.
        let element = |ty: &ObjcType| {
            let mapped = self.swift_type(ty, context, None);
            match mapped {
                SwiftType::ImplicitUnwrappedOptional(inner) => *inner,
                other => other,
            }
        };

        let is_array = name == "NSArray" || name == "NSMutableArray" || name == "NSSet";
        let is_dictionary = name == "NSDictionary" || name == "NSMutableDictionary";

        if is_array && args.len() == 1 {
            return SwiftType::array_of(element(&args[0]));
        }
        if is_dictionary && args.len() == 2 {
            return SwiftType::dictionary_of(element(&args[0]), element(&args[1]));
        }
        SwiftType::generic(name, args.iter().map(element).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ObjcTypeMapper {
        ObjcTypeMapper::new()
    }

    fn class_pointer(name: &str) -> ObjcType {
        ObjcType::pointer_to(ObjcType::struct_named(name))
    }

    #[test]
    fn scalars_map_to_value_types() {
        let m = mapper();
        let ctx = NullabilityContext::unspecified();
        assert_eq!(
            m.swift_type(&ObjcType::struct_named("NSInteger"), ctx, None),
            SwiftType::int()
        );
        assert_eq!(
            m.swift_type(&ObjcType::struct_named("BOOL"), ctx, None),
            SwiftType::bool()
        );
        assert_eq!(m.swift_type(&ObjcType::Void, ctx, None), SwiftType::void());
    }

    #[test]
    fn unannotated_pointers_follow_the_region() {
        let m = mapper();
        assert_eq!(
            m.swift_type(&class_pointer("MyClass"), NullabilityContext::unspecified(), None),
            SwiftType::iuo_of(SwiftType::type_name("MyClass"))
        );
        assert_eq!(
            m.swift_type(&class_pointer("MyClass"), NullabilityContext::nonnull(), None),
            SwiftType::type_name("MyClass")
        );
    }

    #[test]
    fn explicit_qualifiers_override_the_region() {
        let m = mapper();
        let nullable = ObjcType::qualified(class_pointer("MyClass"), vec!["_Nullable".into()]);
        assert_eq!(
            m.swift_type(&nullable, NullabilityContext::nonnull(), None),
            SwiftType::optional_of(SwiftType::type_name("MyClass"))
        );

        let nonnull = ObjcType::qualified(class_pointer("MyClass"), vec!["_Nonnull".into()]);
        assert_eq!(
            m.swift_type(&nonnull, NullabilityContext::unspecified(), None),
            SwiftType::type_name("MyClass")
        );
    }

    #[test]
    fn nsstring_bridges_to_string() {
        let m = mapper();
        assert_eq!(
            m.swift_type(&class_pointer("NSString"), NullabilityContext::nonnull(), None),
            SwiftType::string()
        );
    }

    #[test]
    fn generics_bridge_to_collections() {
        let m = mapper();
        let ctx = NullabilityContext::nonnull();
        let array = ObjcType::pointer_to(ObjcType::Generic(
            "NSArray".into(),
            vec![class_pointer("NSString")],
        ));
        assert_eq!(
            m.swift_type(&array, ctx, None),
            SwiftType::array_of(SwiftType::string())
        );

        let dictionary = ObjcType::pointer_to(ObjcType::Generic(
            "NSDictionary".into(),
            vec![class_pointer("NSString"), class_pointer("NSNumber")],
        ));
        assert_eq!(
            m.swift_type(&dictionary, ctx, None),
            SwiftType::dictionary_of(SwiftType::string(), SwiftType::type_name("NSNumber"))
        );
    }

    #[test]
    fn id_with_protocols_composes() {
        let m = mapper();
        let ctx = NullabilityContext::nonnull();
        assert_eq!(
            m.swift_type(&ObjcType::id(), ctx, None),
            SwiftType::any_object()
        );
        assert_eq!(
            m.swift_type(
                &ObjcType::Id {
                    protocols: vec!["NSCopying".into()]
                },
                ctx,
                None
            ),
            SwiftType::type_name("NSCopying")
        );
    }

    #[test]
    fn instancetype_resolves_to_enclosing_class() {
        let m = mapper();
        assert_eq!(
            m.swift_type(
                &ObjcType::InstanceType,
                NullabilityContext::nonnull(),
                Some("Builder".into())
            ),
            SwiftType::type_name("Builder")
        );
    }

    #[test]
    fn blocks_map_to_function_types() {
        let m = mapper();
        let block = ObjcType::Block {
            name: None,
            return_type: Box::new(ObjcType::Void),
            parameters: vec![ObjcType::struct_named("BOOL")],
        };
        assert_eq!(
            m.swift_type(&block, NullabilityContext::nonnull(), None),
            SwiftType::block(SwiftType::void(), vec![SwiftType::bool()])
        );
    }
}
