//! # Overload Resolution
//!
//! Selects one signature out of a candidate list given argument descriptors.
//! Resolution runs in two passes: an exact-match scan (nullability strict),
//! then an iterative elimination round that ignores optionality and admits
//! literal promotions (integer literals satisfy any numeric parameter, float
//! literals only floating-point ones). Declaration order breaks ties.
//!
//! Results are memoized in a cache that may be shared across translation
//! unit workers; see the locking discipline on [`OverloadResolverCache`].

use crate::type_system::TypeSystem;
use objswift_ast::{Expression, FunctionSignature, LiteralKind, SwiftType};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// What the resolver knows about one call-site argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    pub ty: Option<SwiftType>,
    pub is_literal: bool,
    pub literal_kind: Option<LiteralKind>,
}

impl Argument {
    pub fn typed(ty: SwiftType) -> Self {
        Self {
            ty: Some(ty),
            is_literal: false,
            literal_kind: None,
        }
    }

    pub fn untyped() -> Self {
        Self {
            ty: None,
            is_literal: false,
            literal_kind: None,
        }
    }

    pub fn literal(kind: LiteralKind) -> Self {
        Self {
            ty: None,
            is_literal: true,
            literal_kind: Some(kind),
        }
    }

    pub fn from_expression(exp: &Expression) -> Self {
        let literal_kind = exp.literal_kind();
        Self {
            ty: exp.resolved_type.clone(),
            is_literal: literal_kind.is_some(),
            literal_kind,
        }
    }

    pub fn is_missing_type(&self) -> bool {
        match &self.ty {
            None => true,
            Some(ty) => ty.is_error(),
        }
    }
}

type CacheKey = (Vec<FunctionSignature>, Vec<Argument>);

/// Memoization store for resolutions, including negative ones.
///
/// All four operations are safe under concurrent invocation: `lookup` takes
/// shared access, `insert` exclusive access, and `enable`/`teardown` are
/// exclusive and idempotent. While disabled every operation is a no-op.
#[derive(Debug, Default)]
pub struct OverloadResolverCache {
    entries: RwLock<Option<HashMap<CacheKey, Option<usize>>>>,
}

impl OverloadResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        let mut guard = self.entries.write().unwrap();
        if guard.is_none() {
            *guard = Some(HashMap::new());
        }
    }

    pub fn teardown(&self) {
        *self.entries.write().unwrap() = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.read().unwrap().is_some()
    }

    /// `Some(cached)` on a hit; the cached value itself may be `None` for a
    /// memoized failure.
    pub fn lookup(&self, key: &CacheKey) -> Option<Option<usize>> {
        self.entries
            .read()
            .unwrap()
            .as_ref()
            .and_then(|map| map.get(key).copied())
    }

    pub fn insert(&self, key: CacheKey, value: Option<usize>) {
        if let Some(map) = self.entries.write().unwrap().as_mut() {
            map.insert(key, value);
        }
    }
}

/// One selector form a signature answers to.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    signature_index: usize,
    argument_count: usize,
}

pub struct OverloadResolver {
    cache: Arc<OverloadResolverCache>,
}

impl Default for OverloadResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OverloadResolver {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(OverloadResolverCache::new()),
        }
    }

    pub fn with_cache(cache: Arc<OverloadResolverCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<OverloadResolverCache> {
        &self.cache
    }

    /// Pick the best signature index for the given arguments, or `None`.
    pub fn resolve(
        &self,
        type_system: &dyn TypeSystem,
        signatures: &[FunctionSignature],
        arguments: &[Argument],
    ) -> Option<usize> {
        if signatures.is_empty() {
            return None;
        }

        let key: CacheKey = (signatures.to_vec(), arguments.to_vec());
        if let Some(cached) = self.cache.lookup(&key) {
            return cached;
        }

        let result = Self::resolve_uncached(type_system, signatures, arguments);
        self.cache.insert(key, result);
        result
    }

    fn resolve_uncached(
        type_system: &dyn TypeSystem,
        signatures: &[FunctionSignature],
        arguments: &[Argument],
    ) -> Option<usize> {
        let mut candidates: Vec<Candidate> = Vec::new();
        for (signature_index, signature) in signatures.iter().enumerate() {
            for form in signature.possible_selector_signatures() {
                candidates.push(Candidate {
                    signature_index,
                    argument_count: form.argument_count(),
                });
            }
        }
        candidates.retain(|c| c.argument_count == arguments.len());

        let all_missing = arguments.iter().all(Argument::is_missing_type);
        let any_literal = arguments.iter().any(|a| a.is_literal);
        if candidates.is_empty() || (all_missing && !any_literal) {
            return None;
        }

        // Exact pass, only meaningful when every argument type is known.
        if arguments.iter().all(|a| !a.is_missing_type()) {
            for candidate in &candidates {
                let parameters = &signatures[candidate.signature_index].parameters;
                let exact = arguments.iter().zip(parameters.iter()).all(|(arg, param)| {
                    type_system.types_match(arg.ty.as_ref().unwrap(), &param.ty, false)
                });
                if exact {
                    return Some(candidate.signature_index);
                }
            }
        }

        // Nullability-ignoring elimination with literal promotion.
        loop {
            if candidates.len() <= 1 {
                break;
            }
            let mut eliminated_any = false;
            for (index, argument) in arguments.iter().enumerate() {
                if candidates.len() <= 1 {
                    break;
                }
                if argument.is_missing_type() && !argument.is_literal {
                    continue;
                }
                let before = candidates.len();
                candidates.retain(|candidate| {
                    let param = &signatures[candidate.signature_index].parameters[index].ty;
                    Self::argument_fits(type_system, argument, param)
                });
                if candidates.is_empty() {
                    // Over-elimination: no candidate accepts this argument.
                    return None;
                }
                if candidates.len() != before {
                    eliminated_any = true;
                }
            }
            if !eliminated_any {
                break;
            }
        }

        candidates.first().map(|c| c.signature_index)
    }

    fn argument_fits(
        type_system: &dyn TypeSystem,
        argument: &Argument,
        parameter: &SwiftType,
    ) -> bool {
        if argument.is_literal {
            match argument.literal_kind {
                Some(LiteralKind::Integer) if type_system.is_numeric(parameter) => return true,
                // Float literals never match integer parameters.
                Some(LiteralKind::Float) => return type_system.is_float(parameter),
                _ => {}
            }
        }
        match &argument.ty {
            Some(ty) if !ty.is_error() => {
                type_system.is_assignable(ty.deep_unwrapped(), parameter.deep_unwrapped())
            }
            // Missing-type literals only resolve through promotion above.
            _ => argument.is_literal,
        }
    }
}
