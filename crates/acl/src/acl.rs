use std::str::FromStr;

use thiserror::Error;

use crate::permission::{AuthContext, Permission, Term};
use crate::tribool::Tribool;

/// Error returned when an ACL expression cannot be parsed.
///
/// Evaluation never fails; only [`Acl::from_string`] reports errors.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MalformedAcl {
    /// A token consisted of nothing but a negation marker.
    #[error("dangling negation marker in ACL expression")]
    DanglingNegation,
    /// A `@group` term carried an invalid group name.
    #[error("invalid group name '{0}' in ACL expression")]
    BadGroupName(String),
    /// A user term carried an invalid user name.
    #[error("invalid user name '{0}' in ACL expression")]
    BadUserName(String),
}

/// An ordered, immutable permission expression.
///
/// Terms are kept in source order; [`evaluate`](Acl::evaluate) stops at the
/// first term producing a definite answer. The default (and the empty
/// expression) denies everyone.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Acl {
    terms: Vec<Term>,
}

fn is_flag_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch.is_ascii_uppercase() || ch == '*'
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
}

impl Acl {
    /// Parses an expression of whitespace-separated permission terms.
    ///
    /// Each term optionally starts with `!` or `-` (both historical
    /// negation spellings) and is then classified: `@name` is a group term,
    /// a token made entirely of flag characters (`0-9`, `A-Z`, `*`) is a
    /// flag-set term, anything else is a user term. A lone `*` permits every
    /// context. An empty expression parses to the deny-all ACL.
    ///
    /// # Errors
    ///
    /// [`MalformedAcl`] when a negation marker has no operand or a
    /// user/group name fails identifier validation.
    pub fn from_string(source: &str) -> Result<Self, MalformedAcl> {
        let mut terms = Vec::new();
        for token in source.split_whitespace() {
            let (negate, body) = match token.strip_prefix(['!', '-']) {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            if body.is_empty() {
                return Err(MalformedAcl::DanglingNegation);
            }

            let permission = if let Some(group) = body.strip_prefix('@') {
                if !valid_name(group) {
                    return Err(MalformedAcl::BadGroupName(group.to_owned()));
                }
                Permission::Group(group.to_owned())
            } else if body.chars().all(is_flag_char) {
                Permission::Flags(body.to_owned())
            } else {
                if !valid_name(body) {
                    return Err(MalformedAcl::BadUserName(body.to_owned()));
                }
                Permission::User(body.to_owned())
            };

            terms.push(Term { negate, permission });
        }
        Ok(Self { terms })
    }

    /// The `*` expression: permits every context.
    #[must_use]
    pub fn permit_all() -> Self {
        Self {
            terms: vec![Term {
                negate: false,
                permission: Permission::Flags("*".into()),
            }],
        }
    }

    /// Returns `true` when the expression has no terms (deny-all).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression against a client context.
    ///
    /// Terms are scanned in source order; the first definite result wins.
    /// An all-indeterminate scan denies.
    #[must_use]
    pub fn evaluate(&self, ctx: &AuthContext<'_>) -> bool {
        for term in &self.terms {
            match term.evaluate(ctx) {
                Tribool::True => return true,
                Tribool::False => return false,
                Tribool::Indeterminate => {}
            }
        }
        false
    }
}

impl FromStr for Acl {
    type Err = MalformedAcl;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::from_string(source)
    }
}

#[cfg(test)]
mod tests {
    use super::{Acl, MalformedAcl};
    use crate::permission::AuthContext;

    fn user(name: &str) -> AuthContext<'_> {
        AuthContext::new(name, "users", "3")
    }

    #[test]
    fn empty_expression_denies_everyone() {
        let acl = Acl::from_string("").unwrap();
        assert!(acl.is_empty());
        assert!(!acl.evaluate(&user("anyone")));
    }

    #[test]
    fn wildcard_permits_everyone() {
        let acl = Acl::from_string("*").unwrap();
        assert!(acl.evaluate(&user("anyone")));
        assert!(acl.evaluate(&AuthContext::new("", "", "")));
    }

    #[test]
    fn negated_user_before_wildcard_wins() {
        let acl = Acl::from_string("!alice *").unwrap();
        assert!(!acl.evaluate(&user("alice")));
        assert!(acl.evaluate(&user("bob")));
    }

    #[test]
    fn hyphen_negation_is_accepted() {
        let acl = Acl::from_string("-alice *").unwrap();
        assert!(!acl.evaluate(&user("alice")));
        assert!(acl.evaluate(&user("bob")));
    }

    #[test]
    fn term_order_changes_the_outcome() {
        let first_deny = Acl::from_string("!@staff 1").unwrap();
        let first_allow = Acl::from_string("1 !@staff").unwrap();
        let siteop = AuthContext::new("op", "staff", "1");
        assert!(!first_deny.evaluate(&siteop));
        assert!(first_allow.evaluate(&siteop));
    }

    #[test]
    fn flag_set_matches_any_held_flag() {
        let acl = Acl::from_string("13").unwrap();
        assert!(acl.evaluate(&AuthContext::new("x", "y", "3")));
        assert!(!acl.evaluate(&AuthContext::new("x", "y", "2")));
    }

    #[test]
    fn group_term_requires_at_sign() {
        let acl = Acl::from_string("@staff").unwrap();
        assert!(acl.evaluate(&AuthContext::new("x", "staff", "")));
        // `staff` without `@` is a username, not a group.
        let acl = Acl::from_string("staff").unwrap();
        assert!(!acl.evaluate(&AuthContext::new("x", "staff", "")));
        assert!(acl.evaluate(&AuthContext::new("staff", "other", "")));
    }

    #[test]
    fn negated_group_denies_members_only() {
        let acl = Acl::from_string("!@banned *").unwrap();
        assert!(!acl.evaluate(&AuthContext::new("x", "banned", "")));
        assert!(acl.evaluate(&AuthContext::new("x", "other", "")));
    }

    #[test]
    fn all_indeterminate_scan_denies() {
        let acl = Acl::from_string("alice @staff 7").unwrap();
        assert!(!acl.evaluate(&AuthContext::new("bob", "users", "2")));
    }

    #[test]
    fn dangling_negation_is_rejected() {
        assert_eq!(Acl::from_string("!"), Err(MalformedAcl::DanglingNegation));
        assert_eq!(Acl::from_string("* -"), Err(MalformedAcl::DanglingNegation));
    }

    #[test]
    fn bad_group_name_is_rejected() {
        assert_eq!(
            Acl::from_string("@"),
            Err(MalformedAcl::BadGroupName(String::new()))
        );
        assert!(matches!(
            Acl::from_string("@st aff/"),
            Err(MalformedAcl::BadUserName(_) | MalformedAcl::BadGroupName(_))
        ));
    }

    #[test]
    fn permit_all_equals_parsed_wildcard() {
        assert_eq!(Acl::permit_all(), Acl::from_string("*").unwrap());
    }

    #[test]
    fn from_str_round_trip() {
        let acl: Acl = "!alice @staff *".parse().unwrap();
        assert!(acl.evaluate(&user("bob")));
    }
}
