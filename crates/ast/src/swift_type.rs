//! # Swift Type Model
//!
//! The output-language type signatures: a closed sum over nominal types,
//! tuples, blocks, optionals, collections, metatypes, and protocol
//! compositions. Values are structural: two types are equal iff they print
//! the same canonical description after normalization.

use crate::arena::Name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A nominal reference: a bare type name or a generic instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NominalSwiftType {
    TypeName(Name),
    Generic(Name, Vec<SwiftType>),
}

impl NominalSwiftType {
    pub fn name(&self) -> Name {
        match self {
            NominalSwiftType::TypeName(name) => *name,
            NominalSwiftType::Generic(name, _) => *name,
        }
    }

    fn normalized(self) -> Self {
        match self {
            NominalSwiftType::Generic(name, args) if args.is_empty() => {
                NominalSwiftType::TypeName(name)
            }
            NominalSwiftType::Generic(name, args) => NominalSwiftType::Generic(
                name,
                args.into_iter().map(SwiftType::normalized).collect(),
            ),
            other => other,
        }
    }
}

impl fmt::Display for NominalSwiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NominalSwiftType::TypeName(name) => write!(f, "{}", name),
            NominalSwiftType::Generic(name, args) => {
                write!(f, "{}<", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// A member of a protocol composition `A & B.C & D`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositionMember {
    Nominal(NominalSwiftType),
    Nested(Vec<NominalSwiftType>),
}

impl CompositionMember {
    fn normalized(self) -> Self {
        match self {
            CompositionMember::Nominal(n) => CompositionMember::Nominal(n.normalized()),
            CompositionMember::Nested(path) if path.len() == 1 => {
                let only = path.into_iter().next().unwrap();
                CompositionMember::Nominal(only.normalized())
            }
            CompositionMember::Nested(path) => CompositionMember::Nested(
                path.into_iter().map(NominalSwiftType::normalized).collect(),
            ),
        }
    }
}

impl fmt::Display for CompositionMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMember::Nominal(n) => write!(f, "{}", n),
            CompositionMember::Nested(path) => {
                for (i, item) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Tuple shape. The empty tuple doubles as `Void`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TupleSwiftType {
    Empty,
    Types(Vec<SwiftType>),
}

/// A Swift type signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwiftType {
    Nominal(NominalSwiftType),
    /// Dotted qualified type `Outer.Inner.Leaf`; holds at least two entries
    /// once normalized.
    Nested(Vec<NominalSwiftType>),
    ProtocolComposition(Vec<CompositionMember>),
    Tuple(TupleSwiftType),
    Block {
        return_type: Box<SwiftType>,
        parameters: Vec<SwiftType>,
    },
    Metatype(Box<SwiftType>),
    Optional(Box<SwiftType>),
    ImplicitUnwrappedOptional(Box<SwiftType>),
    Array(Box<SwiftType>),
    Dictionary {
        key: Box<SwiftType>,
        value: Box<SwiftType>,
    },
    /// Sentinel for "type unknown"; resolution failures produce this.
    Error,
}

impl SwiftType {
    // Constructors

    pub fn type_name(name: impl Into<Name>) -> Self {
        SwiftType::Nominal(NominalSwiftType::TypeName(name.into()))
    }

    pub fn generic(name: impl Into<Name>, args: Vec<SwiftType>) -> Self {
        if args.is_empty() {
            Self::type_name(name)
        } else {
            SwiftType::Nominal(NominalSwiftType::Generic(name.into(), args))
        }
    }

    pub fn void() -> Self {
        SwiftType::Tuple(TupleSwiftType::Empty)
    }

    pub fn int() -> Self {
        Self::type_name("Int")
    }

    pub fn uint() -> Self {
        Self::type_name("UInt")
    }

    pub fn double() -> Self {
        Self::type_name("Double")
    }

    pub fn float() -> Self {
        Self::type_name("Float")
    }

    pub fn cg_float() -> Self {
        Self::type_name("CGFloat")
    }

    pub fn bool() -> Self {
        Self::type_name("Bool")
    }

    pub fn string() -> Self {
        Self::type_name("String")
    }

    pub fn any_object() -> Self {
        Self::type_name("AnyObject")
    }

    pub fn array_of(element: SwiftType) -> Self {
        SwiftType::Array(Box::new(element))
    }

    pub fn dictionary_of(key: SwiftType, value: SwiftType) -> Self {
        SwiftType::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn block(return_type: SwiftType, parameters: Vec<SwiftType>) -> Self {
        SwiftType::Block {
            return_type: Box::new(return_type),
            parameters,
        }
    }

    pub fn metatype_of(base: SwiftType) -> Self {
        SwiftType::Metatype(Box::new(base))
    }

    pub fn optional_of(base: SwiftType) -> Self {
        SwiftType::Optional(Box::new(base))
    }

    pub fn iuo_of(base: SwiftType) -> Self {
        SwiftType::ImplicitUnwrappedOptional(Box::new(base))
    }

    pub fn tuple_of(types: Vec<SwiftType>) -> Self {
        match types.len() {
            0 => Self::void(),
            1 => types.into_iter().next().unwrap(),
            _ => SwiftType::Tuple(TupleSwiftType::Types(types)),
        }
    }

    pub fn nested(path: Vec<NominalSwiftType>) -> Self {
        match path.len() {
            0 => SwiftType::Error,
            1 => SwiftType::Nominal(path.into_iter().next().unwrap()),
            _ => SwiftType::Nested(path),
        }
    }

    pub fn protocol_composition(members: Vec<CompositionMember>) -> Self {
        match members.len() {
            0 => SwiftType::Error,
            1 => match members.into_iter().next().unwrap() {
                CompositionMember::Nominal(n) => SwiftType::Nominal(n),
                CompositionMember::Nested(path) => Self::nested(path),
            },
            _ => SwiftType::ProtocolComposition(members),
        }
    }

    // Predicates

    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            SwiftType::Optional(_) | SwiftType::ImplicitUnwrappedOptional(_)
        )
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, SwiftType::Nominal(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, SwiftType::Block { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SwiftType::Error)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, SwiftType::Tuple(TupleSwiftType::Empty))
    }

    // Accessors

    pub fn as_nominal(&self) -> Option<&NominalSwiftType> {
        match self {
            SwiftType::Nominal(n) => Some(n),
            _ => None,
        }
    }

    /// The name of this type when it is nominal or a nested path (the leaf
    /// name), unwrapping optionals first.
    pub fn nominal_name(&self) -> Option<Name> {
        match self.deep_unwrapped() {
            SwiftType::Nominal(n) => Some(n.name()),
            SwiftType::Nested(path) => path.last().map(NominalSwiftType::name),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<(&SwiftType, &[SwiftType])> {
        match self {
            SwiftType::Block {
                return_type,
                parameters,
            } => Some((return_type, parameters)),
            _ => None,
        }
    }

    /// Strip one optional layer, if any.
    pub fn unwrapped(&self) -> &SwiftType {
        match self {
            SwiftType::Optional(inner) | SwiftType::ImplicitUnwrappedOptional(inner) => inner,
            other => other,
        }
    }

    /// Strip all outer optional layers.
    pub fn deep_unwrapped(&self) -> &SwiftType {
        let mut current = self;
        loop {
            match current {
                SwiftType::Optional(inner) | SwiftType::ImplicitUnwrappedOptional(inner) => {
                    current = inner
                }
                other => return other,
            }
        }
    }

    /// Canonical form: same-variant optional nesting collapsed, 1-ary tuples
    /// unwrapped, degenerate generic/nested/composition shapes simplified.
    pub fn normalized(self) -> SwiftType {
        match self {
            SwiftType::Nominal(n) => SwiftType::Nominal(n.normalized()),
            SwiftType::Nested(path) => {
                SwiftType::nested(path.into_iter().map(NominalSwiftType::normalized).collect())
            }
            SwiftType::ProtocolComposition(members) => SwiftType::protocol_composition(
                members.into_iter().map(CompositionMember::normalized).collect(),
            ),
            SwiftType::Tuple(TupleSwiftType::Empty) => SwiftType::void(),
            SwiftType::Tuple(TupleSwiftType::Types(types)) => {
                SwiftType::tuple_of(types.into_iter().map(SwiftType::normalized).collect())
            }
            SwiftType::Block {
                return_type,
                parameters,
            } => SwiftType::Block {
                return_type: Box::new(return_type.normalized()),
                parameters: parameters.into_iter().map(SwiftType::normalized).collect(),
            },
            SwiftType::Metatype(base) => SwiftType::Metatype(Box::new(base.normalized())),
            SwiftType::Optional(inner) => match inner.normalized() {
                SwiftType::Optional(deeper) => SwiftType::Optional(deeper),
                other => SwiftType::Optional(Box::new(other)),
            },
            SwiftType::ImplicitUnwrappedOptional(inner) => match inner.normalized() {
                SwiftType::ImplicitUnwrappedOptional(deeper) => {
                    SwiftType::ImplicitUnwrappedOptional(deeper)
                }
                other => SwiftType::ImplicitUnwrappedOptional(Box::new(other)),
            },
            SwiftType::Array(element) => SwiftType::Array(Box::new(element.normalized())),
            SwiftType::Dictionary { key, value } => SwiftType::Dictionary {
                key: Box::new(key.normalized()),
                value: Box::new(value.normalized()),
            },
            SwiftType::Error => SwiftType::Error,
        }
    }

    /// Whether the canonical description needs parentheses before a trailing
    /// `?`, `!`, `.Type`, or `.Protocol` can apply to the whole type.
    fn needs_suffix_parens(&self) -> bool {
        matches!(
            self,
            SwiftType::Block { .. } | SwiftType::ProtocolComposition(_)
        )
    }

    fn fmt_suffixed(&self, f: &mut fmt::Formatter<'_>, suffix: &str) -> fmt::Result {
        if self.needs_suffix_parens() {
            write!(f, "({}){}", self, suffix)
        } else {
            write!(f, "{}{}", self, suffix)
        }
    }
}

impl fmt::Display for SwiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwiftType::Nominal(n) => write!(f, "{}", n),
            SwiftType::Nested(path) => {
                for (i, item) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            SwiftType::ProtocolComposition(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            SwiftType::Tuple(TupleSwiftType::Empty) => write!(f, "Void"),
            SwiftType::Tuple(TupleSwiftType::Types(types)) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
            SwiftType::Block {
                return_type,
                parameters,
            } => {
                write!(f, "(")?;
                for (i, p) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", return_type)
            }
            SwiftType::Metatype(base) => base.fmt_suffixed(f, ".Type"),
            SwiftType::Optional(inner) => inner.fmt_suffixed(f, "?"),
            SwiftType::ImplicitUnwrappedOptional(inner) => inner.fmt_suffixed(f, "!"),
            SwiftType::Array(element) => write!(f, "[{}]", element),
            SwiftType::Dictionary { key, value } => write!(f, "[{}: {}]", key, value),
            SwiftType::Error => write!(f, "<<error type>>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_is_empty_tuple() {
        assert_eq!(SwiftType::void(), SwiftType::Tuple(TupleSwiftType::Empty));
        assert!(SwiftType::void().is_void());
        assert_eq!(SwiftType::void().to_string(), "Void");
    }

    #[test]
    fn one_ary_tuple_normalizes_to_element() {
        let t = SwiftType::Tuple(TupleSwiftType::Types(vec![SwiftType::int()]));
        assert_eq!(t.normalized(), SwiftType::int());
    }

    #[test]
    fn same_variant_optionals_collapse() {
        let double = SwiftType::optional_of(SwiftType::optional_of(SwiftType::int()));
        assert_eq!(double.normalized(), SwiftType::optional_of(SwiftType::int()));

        // Mixed optional variants stay as written.
        let mixed = SwiftType::optional_of(SwiftType::iuo_of(SwiftType::int()));
        assert_eq!(mixed.clone().normalized(), mixed);
    }

    #[test]
    fn deep_unwrapped_strips_all_layers() {
        let t = SwiftType::optional_of(SwiftType::iuo_of(SwiftType::string()));
        assert_eq!(t.deep_unwrapped(), &SwiftType::string());
        assert_eq!(t.unwrapped(), &SwiftType::iuo_of(SwiftType::string()));
    }

    #[test]
    fn display_parenthesizes_wrapped_blocks() {
        let block = SwiftType::block(SwiftType::void(), vec![SwiftType::int()]);
        assert_eq!(block.to_string(), "(Int) -> Void");
        assert_eq!(
            SwiftType::optional_of(block.clone()).to_string(),
            "((Int) -> Void)?"
        );
        assert_eq!(
            SwiftType::metatype_of(block).to_string(),
            "((Int) -> Void).Type"
        );
    }

    #[test]
    fn display_compositions_and_collections() {
        let comp = SwiftType::ProtocolComposition(vec![
            CompositionMember::Nominal(NominalSwiftType::TypeName("A".into())),
            CompositionMember::Nominal(NominalSwiftType::TypeName("B".into())),
        ]);
        assert_eq!(comp.to_string(), "A & B");
        assert_eq!(
            SwiftType::optional_of(comp).to_string(),
            "(A & B)?"
        );
        assert_eq!(
            SwiftType::dictionary_of(SwiftType::string(), SwiftType::int()).to_string(),
            "[String: Int]"
        );
        assert_eq!(
            SwiftType::array_of(SwiftType::optional_of(SwiftType::int())).to_string(),
            "[Int?]"
        );
    }

    #[test]
    fn generic_display() {
        let t = SwiftType::generic("NSArray", vec![SwiftType::string()]);
        assert_eq!(t.to_string(), "NSArray<String>");
        assert_eq!(SwiftType::generic("T", vec![]), SwiftType::type_name("T"));
    }

    #[test]
    fn nominal_name_sees_through_optionals() {
        let t = SwiftType::optional_of(SwiftType::type_name("UIView"));
        assert_eq!(t.nominal_name(), Some("UIView".into()));
        assert_eq!(SwiftType::void().nominal_name(), None);
    }
}
