//! # Name Interning
//!
//! Identifiers, member names, and argument labels are interned through a
//! process-global string interner so that a [`Name`] is a `Copy` symbol:
//! - Deduplicates the many repeated identifiers a translation produces
//! - Makes name comparison a symbol comparison
//! - Supports serialization by resolving back to the string form

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Mutex;
use string_interner::{DefaultBackend, StringInterner, Symbol as SymbolTrait};

/// Symbol type used for string interning
pub type Symbol = string_interner::DefaultSymbol;

static GLOBAL_INTERNER: Lazy<Mutex<StringInterner<DefaultBackend<Symbol>>>> =
    Lazy::new(|| Mutex::new(StringInterner::new()));

/// An interned identifier.
///
/// `Name` is the currency for every identifier-like string in the model:
/// type names, selector keywords, argument labels, member names. Two names
/// are equal iff their backing strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Symbol);

impl Name {
    /// Intern a string and return its symbol.
    pub fn new(s: impl AsRef<str>) -> Self {
        let mut interner = GLOBAL_INTERNER.lock().unwrap();
        Name(interner.get_or_intern(s.as_ref()))
    }

    /// Resolve back to the interned string.
    pub fn resolve(&self) -> String {
        let interner = GLOBAL_INTERNER.lock().unwrap();
        interner
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default()
    }

    /// The raw symbol backing this name.
    pub fn symbol(&self) -> Symbol {
        self.0
    }

    /// Run a closure over the interned string without allocating.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = GLOBAL_INTERNER.lock().unwrap();
        f(interner.resolve(self.0).unwrap_or(""))
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

impl From<&String> for Name {
    fn from(s: &String) -> Self {
        Name::new(s)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.with_str(|s| s == *other)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl serde::Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.with_str(|s| serializer.serialize_str(s))
    }
}

impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Accept either a string (canonical) or a raw symbol index, the
        // format older dumps used.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(Name::new(s)),
            serde_json::Value::Number(n) => {
                let index = n
                    .as_u64()
                    .ok_or_else(|| D::Error::custom("name index must be a positive integer"))?
                    as usize;
                let symbol = Symbol::try_from_usize(index)
                    .ok_or_else(|| D::Error::custom(format!("invalid symbol index: {}", index)))?;
                Ok(Name(symbol))
            }
            _ => Err(D::Error::custom("name must be a string or a number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let a = Name::new("viewDidLoad");
        let b = Name::new("viewDidLoad");
        let c = Name::new("viewWillAppear");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.resolve(), "viewDidLoad");
    }

    #[test]
    fn compares_against_str() {
        let name = Name::new("CGPointMake");
        assert_eq!(name, "CGPointMake");
        assert_ne!(name, "CGSizeMake");
    }

    #[test]
    fn displays_as_plain_string() {
        assert_eq!(Name::new("frame").to_string(), "frame");
    }
}
