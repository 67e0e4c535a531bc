//! Property tests for the Swift type grammar parser: the canonical
//! description of any normalized type parses back to the same type, and the
//! parser never panics on arbitrary input.

use objswift_ast::swift_type::{CompositionMember, NominalSwiftType, SwiftType, TupleSwiftType};
use objswift_ast::type_parser::parse_swift_type;
use proptest::prelude::*;

/// Type names that cannot collide with grammar keywords (`Void`, `Type`,
/// `Protocol`, `inout`).
fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("A".to_string()),
        Just("B".to_string()),
        Just("Foo".to_string()),
        Just("Bar".to_string()),
        Just("Value".to_string()),
        Just("NSString".to_string()),
        Just("T1".to_string()),
    ]
}

fn nominal_strategy(
    inner: BoxedStrategy<SwiftType>,
) -> impl Strategy<Value = NominalSwiftType> {
    prop_oneof![
        3 => name_strategy().prop_map(|n| NominalSwiftType::TypeName(n.as_str().into())),
        1 => (name_strategy(), prop::collection::vec(inner, 1..3))
            .prop_map(|(n, args)| NominalSwiftType::Generic(n.as_str().into(), args)),
    ]
}

fn swift_type_strategy() -> impl Strategy<Value = SwiftType> {
    let leaf = prop_oneof![
        name_strategy().prop_map(SwiftType::type_name),
        Just(SwiftType::void()),
    ];

    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            nominal_strategy(inner.clone().boxed()).prop_map(SwiftType::Nominal),
            prop::collection::vec(nominal_strategy(inner.clone().boxed()), 2..4)
                .prop_map(SwiftType::Nested),
            prop::collection::vec(
                nominal_strategy(inner.clone().boxed())
                    .prop_map(CompositionMember::Nominal),
                2..4
            )
            .prop_map(SwiftType::ProtocolComposition),
            prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|types| SwiftType::Tuple(TupleSwiftType::Types(types))),
            (inner.clone(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(ret, params)| SwiftType::block(ret, params)),
            inner.clone().prop_map(SwiftType::metatype_of),
            inner.clone().prop_map(SwiftType::optional_of),
            inner.clone().prop_map(SwiftType::iuo_of),
            inner.clone().prop_map(SwiftType::array_of),
            (inner.clone(), inner).prop_map(|(k, v)| SwiftType::dictionary_of(k, v)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    #[test]
    fn describe_then_parse_is_identity(ty in swift_type_strategy()) {
        let normalized = ty.normalized();
        let description = normalized.to_string();
        let parsed = parse_swift_type(&description)
            .unwrap_or_else(|e| panic!("description {:?} failed to parse: {}", description, e));

        prop_assert_eq!(
            parsed.normalized(),
            normalized.clone(),
            "description was {:?}",
            description
        );
    }

    #[test]
    fn normalization_is_idempotent(ty in swift_type_strategy()) {
        let once = ty.normalized();
        prop_assert_eq!(once.clone().normalized(), once);
    }

    #[test]
    fn parser_never_panics(input in ".*") {
        let _ = parse_swift_type(&input);
    }
}
