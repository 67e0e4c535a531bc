//! # Function and Selector Signatures
//!
//! [`FunctionSignature`] is the Swift-side identity of a method or free
//! function: name, labeled parameters, return type. [`SelectorSignature`] is
//! the Objective-C-style identity (keywords only, no types); one function
//! signature yields one selector form per droppable trailing default.

use crate::arena::Name;
use crate::swift_type::SwiftType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSignature {
    /// External argument label; `None` prints as `_`.
    pub label: Option<Name>,
    /// Internal parameter name.
    pub name: Name,
    pub ty: SwiftType,
    pub has_default: bool,
}

impl ParameterSignature {
    pub fn new(label: Option<Name>, name: impl Into<Name>, ty: SwiftType) -> Self {
        Self {
            label,
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    /// A parameter whose label equals its name, the common Swift case.
    pub fn labeled(name: impl Into<Name>, ty: SwiftType) -> Self {
        let name = name.into();
        Self {
            label: Some(name),
            name,
            ty,
            has_default: false,
        }
    }

    /// An unlabeled (`_`) parameter.
    pub fn anonymous(name: impl Into<Name>, ty: SwiftType) -> Self {
        Self::new(None, name, ty)
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// An Objective-C-style method identity: keywords, independent of types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectorSignature {
    pub is_static: bool,
    /// First keyword is the method base name; later entries are argument
    /// labels, with `None` standing for an anonymous position.
    pub keywords: Vec<Option<Name>>,
}

impl SelectorSignature {
    pub fn new(is_static: bool, keywords: Vec<Option<Name>>) -> Self {
        Self { is_static, keywords }
    }

    /// The method base name, when present.
    pub fn base_name(&self) -> Option<Name> {
        self.keywords.first().copied().flatten()
    }

    /// Number of arguments this selector form takes.
    pub fn argument_count(&self) -> usize {
        self.keywords.len().saturating_sub(1)
    }
}

impl fmt::Display for SelectorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keywords = self.keywords.iter();
        match keywords.next() {
            Some(Some(name)) => write!(f, "{}", name)?,
            _ => write!(f, "_")?,
        }
        write!(f, "(")?;
        for keyword in keywords {
            match keyword {
                Some(label) => write!(f, "{}:", label)?,
                None => write!(f, "_:")?,
            }
        }
        write!(f, ")")
    }
}

/// A full Swift function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: Name,
    pub parameters: Vec<ParameterSignature>,
    pub return_type: SwiftType,
    pub is_static: bool,
    pub is_mutating: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<Name>, parameters: Vec<ParameterSignature>, return_type: SwiftType) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            is_static: false,
            is_mutating: false,
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_mutating(mut self) -> Self {
        self.is_mutating = true;
        self
    }

    /// The selector form with every parameter present.
    pub fn as_selector(&self) -> SelectorSignature {
        let mut keywords = Vec::with_capacity(self.parameters.len() + 1);
        keywords.push(Some(self.name));
        keywords.extend(self.parameters.iter().map(|p| p.label));
        SelectorSignature::new(self.is_static, keywords)
    }

    /// Every selector form this signature answers to: the full form first,
    /// then one additional form per droppable trailing defaulted parameter.
    pub fn possible_selector_signatures(&self) -> Vec<SelectorSignature> {
        let mut signatures = vec![self.as_selector()];

        let mut remaining = self.parameters.len();
        while remaining > 0 && self.parameters[remaining - 1].has_default {
            remaining -= 1;
            let mut keywords = Vec::with_capacity(remaining + 1);
            keywords.push(Some(self.name));
            keywords.extend(self.parameters[..remaining].iter().map(|p| p.label));
            signatures.push(SelectorSignature::new(self.is_static, keywords));
        }

        signatures
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "static ")?;
        }
        if self.is_mutating {
            write!(f, "mutating ")?;
        }
        write!(f, "func {}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param.label {
                Some(label) if label == param.name => write!(f, "{}", param.name)?,
                Some(label) => write!(f, "{} {}", label, param.name)?,
                None => write!(f, "_ {}", param.name)?,
            }
            write!(f, ": {}", param.ty)?;
        }
        write!(f, ")")?;
        if !self.return_type.is_void() {
            write!(f, " -> {}", self.return_type)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_to_signature() -> FunctionSignature {
        FunctionSignature::new(
            "move",
            vec![ParameterSignature::new(
                Some("to".into()),
                "point",
                SwiftType::type_name("CGPoint"),
            )],
            SwiftType::void(),
        )
    }

    #[test]
    fn selector_from_signature() {
        let selector = move_to_signature().as_selector();
        assert_eq!(selector.base_name(), Some("move".into()));
        assert_eq!(selector.argument_count(), 1);
        assert_eq!(selector.to_string(), "move(to:)");
    }

    #[test]
    fn selectors_compare_structurally() {
        let a = SelectorSignature::new(false, vec![Some("doThing".into()), None, Some("with".into())]);
        let b = SelectorSignature::new(false, vec![Some("doThing".into()), None, Some("with".into())]);
        let c = SelectorSignature::new(true, vec![Some("doThing".into()), None, Some("with".into())]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "doThing(_:with:)");
    }

    #[test]
    fn trailing_defaults_produce_shorter_forms() {
        let signature = FunctionSignature::new(
            "animate",
            vec![
                ParameterSignature::labeled("duration", SwiftType::double()),
                ParameterSignature::labeled("delay", SwiftType::double()).with_default(),
                ParameterSignature::labeled("options", SwiftType::int()).with_default(),
            ],
            SwiftType::void(),
        );

        let forms = signature.possible_selector_signatures();
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[0].to_string(), "animate(duration:delay:options:)");
        assert_eq!(forms[1].to_string(), "animate(duration:delay:)");
        assert_eq!(forms[2].to_string(), "animate(duration:)");
    }

    #[test]
    fn defaults_before_the_tail_do_not_drop() {
        let signature = FunctionSignature::new(
            "f",
            vec![
                ParameterSignature::labeled("a", SwiftType::int()).with_default(),
                ParameterSignature::labeled("b", SwiftType::int()),
            ],
            SwiftType::void(),
        );
        assert_eq!(signature.possible_selector_signatures().len(), 1);
    }

    #[test]
    fn display_signature() {
        assert_eq!(
            move_to_signature().to_string(),
            "func move(to point: CGPoint)"
        );
    }
}
