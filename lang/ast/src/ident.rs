use std::fmt;

// Names
//
//

/// A hierarchical name such as `Lean.Parser.Term.app`.
///
/// Names are compared component-wise, which gives the lexicographic order
/// that is used when sorting the arguments of a normalized `max`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    pub components: Vec<String>,
}

impl Name {
    pub fn anonymous() -> Self {
        Name { components: vec![] }
    }

    pub fn is_anonymous(&self) -> bool {
        self.components.is_empty()
    }

    /// Extend the name by one more component.
    pub fn str(&self, component: &str) -> Self {
        let mut components = self.components.clone();
        components.push(component.to_owned());
        Name { components }
    }

    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.starts_with(&self.components)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return Name::anonymous();
        }
        Name { components: s.split('.').map(str::to_owned).collect() }
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::from(s.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            return write!(f, "[anonymous]");
        }
        write!(f, "{}", self.components.join("."))
    }
}

// Identifiers for variables and metavariables
//
//

/// Identifies a universe level metavariable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LMVarId(pub u64);

/// Identifies an expression metavariable, i.e. a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MVarId(pub u64);

/// Identifies a free variable of a local context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FVarId(pub u64);

impl fmt::Display for LMVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?u.{}", self.0)
    }
}

impl fmt::Display for MVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?m.{}", self.0)
    }
}

impl fmt::Display for FVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_fvar.{}", self.0)
    }
}
