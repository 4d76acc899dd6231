use crate::tribool::Tribool;

/// Client identity an ACL is evaluated against.
///
/// Borrowed per call; the ACL itself never stores client state.
#[derive(Clone, Copy, Debug)]
pub struct AuthContext<'a> {
    /// Login name, matched case-sensitively by user terms.
    pub username: &'a str,
    /// Primary group name, matched case-sensitively by group terms.
    pub groupname: &'a str,
    /// The client's flag string, e.g. `"13A"`.
    pub flags: &'a str,
}

impl<'a> AuthContext<'a> {
    /// Creates a context from the client's identity fields.
    #[must_use]
    pub const fn new(username: &'a str, groupname: &'a str, flags: &'a str) -> Self {
        Self {
            username,
            groupname,
            flags,
        }
    }
}

/// One parsed term of an ACL expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Permission {
    /// Matches when any of the context's flags appears in the set.
    /// A `*` in the set matches every context.
    Flags(String),
    /// Matches the exact username.
    User(String),
    /// Matches the exact group name.
    Group(String),
}

/// A [`Permission`] with its negation marker, in source order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Term {
    pub(crate) negate: bool,
    pub(crate) permission: Permission,
}

impl Term {
    pub(crate) fn evaluate(&self, ctx: &AuthContext<'_>) -> Tribool {
        let matched = match &self.permission {
            Permission::Flags(set) => {
                set.contains('*') || ctx.flags.chars().any(|flag| set.contains(flag))
            }
            Permission::User(name) => ctx.username == name,
            Permission::Group(name) => ctx.groupname == name,
        };

        // Non-matching terms pass the decision on; negation only inverts a
        // definite match.
        if !matched {
            return Tribool::Indeterminate;
        }
        let result = Tribool::True;
        if self.negate { result.negate() } else { result }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthContext, Permission, Term};
    use crate::tribool::Tribool;

    fn ctx() -> AuthContext<'static> {
        AuthContext::new("bioboy", "staff", "13")
    }

    #[test]
    fn flag_term_matches_any_shared_flag() {
        let term = Term {
            negate: false,
            permission: Permission::Flags("3A".into()),
        };
        assert_eq!(term.evaluate(&ctx()), Tribool::True);
    }

    #[test]
    fn flag_term_without_overlap_is_indeterminate() {
        let term = Term {
            negate: false,
            permission: Permission::Flags("789".into()),
        };
        assert_eq!(term.evaluate(&ctx()), Tribool::Indeterminate);
    }

    #[test]
    fn wildcard_flag_matches_empty_flag_string() {
        let term = Term {
            negate: false,
            permission: Permission::Flags("*".into()),
        };
        let anonymous = AuthContext::new("x", "y", "");
        assert_eq!(term.evaluate(&anonymous), Tribool::True);
    }

    #[test]
    fn negated_match_is_a_definite_deny() {
        let term = Term {
            negate: true,
            permission: Permission::User("bioboy".into()),
        };
        assert_eq!(term.evaluate(&ctx()), Tribool::False);
    }

    #[test]
    fn negated_miss_stays_indeterminate() {
        let term = Term {
            negate: true,
            permission: Permission::User("someone".into()),
        };
        assert_eq!(term.evaluate(&ctx()), Tribool::Indeterminate);
    }

    #[test]
    fn group_term_matches_groupname() {
        let term = Term {
            negate: false,
            permission: Permission::Group("staff".into()),
        };
        assert_eq!(term.evaluate(&ctx()), Tribool::True);
    }
}
