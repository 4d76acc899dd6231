/// Three-valued logic used while scanning ACL terms.
///
/// A term that does not apply to the evaluated context is
/// [`Indeterminate`](Tribool::Indeterminate), not `False`: the absence of a
/// flag or a username mismatch is no denial by itself, it merely passes the
/// decision on to the next term. Only a definite value stops the scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tribool {
    /// The term matched and permits the context.
    True,
    /// The term matched and denies the context.
    False,
    /// The term does not apply to the context.
    Indeterminate,
}

impl Tribool {
    /// Inverts `True` and `False`; `Indeterminate` stays indeterminate.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Indeterminate => Self::Indeterminate,
        }
    }

    /// Returns `true` when the value is `True` or `False`.
    #[must_use]
    pub const fn is_definite(self) -> bool {
        !matches!(self, Self::Indeterminate)
    }

    /// Returns the definite value, if any.
    #[must_use]
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Indeterminate => None,
        }
    }
}

impl From<bool> for Tribool {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

#[cfg(test)]
mod tests {
    use super::Tribool;

    #[test]
    fn negate_swaps_definite_values() {
        assert_eq!(Tribool::True.negate(), Tribool::False);
        assert_eq!(Tribool::False.negate(), Tribool::True);
        assert_eq!(Tribool::Indeterminate.negate(), Tribool::Indeterminate);
    }

    #[test]
    fn definiteness() {
        assert!(Tribool::True.is_definite());
        assert!(Tribool::False.is_definite());
        assert!(!Tribool::Indeterminate.is_definite());
    }

    #[test]
    fn to_bool_round_trips_from_bool() {
        assert_eq!(Tribool::from(true).to_bool(), Some(true));
        assert_eq!(Tribool::from(false).to_bool(), Some(false));
        assert_eq!(Tribool::Indeterminate.to_bool(), None);
    }
}
