//! # Objective-C Type Model
//!
//! Input-language type signatures as the frontend parses them. These stay
//! close to the C surface (pointers, qualifiers, storage specifiers) and are
//! mapped to [`SwiftType`](crate::swift_type::SwiftType) only once the
//! declaration's nullability context is known.

use crate::arena::Name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An Objective-C type signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjcType {
    /// `id` with an optional protocol list: `id<NSCopying, NSCoding>`
    Id { protocols: Vec<Name> },
    InstanceType,
    /// A plain nominal reference: struct, class, or typedef name.
    Struct(Name),
    Void,
    Pointer(Box<ObjcType>),
    /// Lightweight generics: `NSArray<NSString *>`
    Generic(Name, Vec<ObjcType>),
    /// `const`, `_Nonnull`, `_Nullable`, `__nonnull`, `__nullable`
    Qualified {
        base: Box<ObjcType>,
        qualifiers: Vec<Name>,
    },
    /// `static`, `__weak`, `__block`
    Specified {
        specifiers: Vec<Name>,
        base: Box<ObjcType>,
    },
    /// `R (^name)(P...)`
    Block {
        name: Option<Name>,
        return_type: Box<ObjcType>,
        parameters: Vec<ObjcType>,
    },
    /// `R (*name)(P...)`
    FunctionPointer {
        name: Option<Name>,
        return_type: Box<ObjcType>,
        parameters: Vec<ObjcType>,
    },
    /// `T name[N]`
    FixedArray(Box<ObjcType>, usize),
}

impl ObjcType {
    pub fn id() -> Self {
        ObjcType::Id { protocols: vec![] }
    }

    pub fn struct_named(name: impl Into<Name>) -> Self {
        ObjcType::Struct(name.into())
    }

    pub fn pointer_to(base: ObjcType) -> Self {
        ObjcType::Pointer(Box::new(base))
    }

    pub fn qualified(base: ObjcType, qualifiers: Vec<Name>) -> Self {
        if qualifiers.is_empty() {
            base
        } else {
            ObjcType::Qualified {
                base: Box::new(base),
                qualifiers,
            }
        }
    }

    pub fn specified(specifiers: Vec<Name>, base: ObjcType) -> Self {
        if specifiers.is_empty() {
            base
        } else {
            ObjcType::Specified {
                specifiers,
                base: Box::new(base),
            }
        }
    }

    pub fn is_pointer(&self) -> bool {
        match self {
            ObjcType::Pointer(_) | ObjcType::Id { .. } | ObjcType::Block { .. } => true,
            ObjcType::Qualified { base, .. } | ObjcType::Specified { base, .. } => {
                base.is_pointer()
            }
            _ => false,
        }
    }

    /// The qualifiers applied at the outermost level, if any.
    pub fn qualifiers(&self) -> &[Name] {
        match self {
            ObjcType::Qualified { qualifiers, .. } => qualifiers,
            _ => &[],
        }
    }

    /// The specifiers applied at the outermost level, if any.
    pub fn specifiers(&self) -> &[Name] {
        match self {
            ObjcType::Specified { specifiers, .. } => specifiers,
            _ => &[],
        }
    }

    /// The type with outer qualifier/specifier layers removed.
    pub fn unqualified(&self) -> &ObjcType {
        let mut current = self;
        loop {
            match current {
                ObjcType::Qualified { base, .. } | ObjcType::Specified { base, .. } => {
                    current = base
                }
                other => return other,
            }
        }
    }

    /// Canonical form: nested qualified/specified chains flattened, empty
    /// qualifier and specifier lists removed.
    pub fn normalized(self) -> ObjcType {
        match self {
            ObjcType::Pointer(base) => ObjcType::Pointer(Box::new(base.normalized())),
            ObjcType::Generic(name, args) => ObjcType::Generic(
                name,
                args.into_iter().map(ObjcType::normalized).collect(),
            ),
            ObjcType::Qualified { base, qualifiers } => {
                let base = base.normalized();
                if qualifiers.is_empty() {
                    return base;
                }
                match base {
                    ObjcType::Qualified {
                        base: inner,
                        qualifiers: mut inner_quals,
                    } => {
                        inner_quals.extend(qualifiers);
                        ObjcType::Qualified {
                            base: inner,
                            qualifiers: inner_quals,
                        }
                    }
                    other => ObjcType::Qualified {
                        base: Box::new(other),
                        qualifiers,
                    },
                }
            }
            ObjcType::Specified { specifiers, base } => {
                let base = base.normalized();
                if specifiers.is_empty() {
                    return base;
                }
                match base {
                    ObjcType::Specified {
                        specifiers: inner_specs,
                        base: inner,
                    } => {
                        let mut merged = specifiers;
                        merged.extend(inner_specs);
                        ObjcType::Specified {
                            specifiers: merged,
                            base: inner,
                        }
                    }
                    other => ObjcType::Specified {
                        specifiers,
                        base: Box::new(other),
                    },
                }
            }
            ObjcType::Block {
                name,
                return_type,
                parameters,
            } => ObjcType::Block {
                name,
                return_type: Box::new(return_type.normalized()),
                parameters: parameters.into_iter().map(ObjcType::normalized).collect(),
            },
            ObjcType::FunctionPointer {
                name,
                return_type,
                parameters,
            } => ObjcType::FunctionPointer {
                name,
                return_type: Box::new(return_type.normalized()),
                parameters: parameters.into_iter().map(ObjcType::normalized).collect(),
            },
            ObjcType::FixedArray(base, len) => {
                ObjcType::FixedArray(Box::new(base.normalized()), len)
            }
            other => other,
        }
    }
}

impl fmt::Display for ObjcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjcType::Id { protocols } if protocols.is_empty() => write!(f, "id"),
            ObjcType::Id { protocols } => {
                write!(f, "id<")?;
                for (i, p) in protocols.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ">")
            }
            ObjcType::InstanceType => write!(f, "instancetype"),
            ObjcType::Struct(name) => write!(f, "{}", name),
            ObjcType::Void => write!(f, "void"),
            ObjcType::Pointer(base) => write!(f, "{} *", base),
            ObjcType::Generic(name, args) => {
                write!(f, "{}<", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ">")
            }
            ObjcType::Qualified { base, qualifiers } => {
                write!(f, "{}", base)?;
                for q in qualifiers {
                    write!(f, " {}", q)?;
                }
                Ok(())
            }
            ObjcType::Specified { specifiers, base } => {
                for s in specifiers {
                    write!(f, "{} ", s)?;
                }
                write!(f, "{}", base)
            }
            ObjcType::Block {
                name,
                return_type,
                parameters,
            } => {
                write!(f, "{} (^", return_type)?;
                if let Some(name) = name {
                    write!(f, "{}", name)?;
                }
                write!(f, ")(")?;
                for (i, p) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
            ObjcType::FunctionPointer {
                name,
                return_type,
                parameters,
            } => {
                write!(f, "{} (*", return_type)?;
                if let Some(name) = name {
                    write!(f, "{}", name)?;
                }
                write!(f, ")(")?;
                for (i, p) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
            ObjcType::FixedArray(base, len) => write!(f, "{}[{}]", base, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_qualifier_lists_normalize_away() {
        let t = ObjcType::Qualified {
            base: Box::new(ObjcType::struct_named("NSInteger")),
            qualifiers: vec![],
        };
        assert_eq!(t.normalized(), ObjcType::struct_named("NSInteger"));
    }

    #[test]
    fn nested_qualified_chains_flatten() {
        let inner = ObjcType::qualified(
            ObjcType::struct_named("NSString"),
            vec!["const".into()],
        );
        let outer = ObjcType::qualified(inner, vec!["_Nonnull".into()]);
        let normalized = outer.normalized();

        match normalized {
            ObjcType::Qualified { base, qualifiers } => {
                assert_eq!(*base, ObjcType::struct_named("NSString"));
                assert_eq!(qualifiers, vec![Name::new("const"), Name::new("_Nonnull")]);
            }
            other => panic!("expected flattened qualified type, got {:?}", other),
        }
    }

    #[test]
    fn normalized_is_idempotent_without_empty_lists() {
        let t = ObjcType::pointer_to(ObjcType::qualified(
            ObjcType::struct_named("MyClass"),
            vec!["_Nullable".into()],
        ));
        assert_eq!(t.clone().normalized(), t);
    }

    #[test]
    fn pointer_detection_sees_through_layers() {
        let t = ObjcType::specified(
            vec!["__weak".into()],
            ObjcType::pointer_to(ObjcType::struct_named("UIView")),
        );
        assert!(t.is_pointer());
        assert!(!ObjcType::struct_named("NSInteger").is_pointer());
    }

    #[test]
    fn display_forms() {
        assert_eq!(
            ObjcType::pointer_to(ObjcType::struct_named("NSString")).to_string(),
            "NSString *"
        );
        assert_eq!(
            ObjcType::Id {
                protocols: vec!["NSCopying".into()]
            }
            .to_string(),
            "id<NSCopying>"
        );
    }
}
