use proptest::prelude::*;

use crate::{Acl, AuthContext};

fn valid_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // flag sets
        "[0-9A-Z]{1,4}",
        // users
        "[a-z][a-z0-9_]{0,7}",
        // groups
        "[a-z][a-z0-9_]{0,7}".prop_map(|g| format!("@{g}")),
        Just("*".to_owned()),
    ]
    .prop_flat_map(|body| {
        prop_oneof![
            Just(body.clone()),
            Just(format!("!{body}")),
            Just(format!("-{body}")),
        ]
    })
}

proptest! {
    // Parsing any sequence of valid tokens succeeds, and evaluation always
    // terminates with a boolean regardless of the context.
    #[test]
    fn valid_expressions_parse_and_evaluate(
        tokens in prop::collection::vec(valid_token(), 0..8),
        username in "[a-z]{1,8}",
        groupname in "[a-z]{1,8}",
        flags in "[0-9A-Z]{0,4}",
    ) {
        let source = tokens.join(" ");
        let acl = Acl::from_string(&source).unwrap();
        let _ = acl.evaluate(&AuthContext::new(&username, &groupname, &flags));
    }

    // A leading wildcard makes every later term unreachable.
    #[test]
    fn leading_wildcard_shadows_the_tail(
        tokens in prop::collection::vec(valid_token(), 0..8),
        username in "[a-z]{1,8}",
    ) {
        let source = format!("* {}", tokens.join(" "));
        let acl = Acl::from_string(&source).unwrap();
        prop_assert!(acl.evaluate(&AuthContext::new(&username, "g", "1")));
    }

    // Prepending a negated match for the evaluated user always denies.
    #[test]
    fn negated_self_term_denies(
        tokens in prop::collection::vec(valid_token(), 0..8),
        username in "[a-z]{1,8}",
    ) {
        let source = format!("!{username} {}", tokens.join(" "));
        let acl = Acl::from_string(&source).unwrap();
        prop_assert!(!acl.evaluate(&AuthContext::new(&username, "g", "1")));
    }
}
