use std::fmt;

/// The outcome of a one-directional attempt to solve a level constraint.
///
/// `Undef` means that the attempt was inconclusive: the constraint can neither be
/// solved by an assignment nor be refuted.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LBool {
    True,
    False,
    Undef,
}

impl LBool {
    pub fn from_bool(b: bool) -> Self {
        if b { LBool::True } else { LBool::False }
    }

    /// `Undef` counts as `false`.
    pub fn to_bool(self) -> bool {
        self == LBool::True
    }

    pub fn is_undef(self) -> bool {
        self == LBool::Undef
    }
}

impl From<bool> for LBool {
    fn from(b: bool) -> Self {
        LBool::from_bool(b)
    }
}

impl fmt::Debug for LBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.debug_tuple("True").finish(),
            Self::False => f.debug_tuple("False").finish(),
            Self::Undef => f.debug_tuple("Undef").finish(),
        }
    }
}
