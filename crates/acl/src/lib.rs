#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `acl` implements the permission mini-language used throughout the ebftpd
//! configuration: an ordered sequence of flag, user, and group terms that is
//! evaluated against a connected client with first-match-wins semantics.
//!
//! An expression such as `!alice @staff 1 *` reads, in order: deny the user
//! `alice`, permit members of group `staff`, permit anyone holding flag `1`,
//! permit everyone else. Term order is significant — a negated term placed
//! before a wildcard takes precedence over it.
//!
//! # Design
//!
//! - [`Acl::from_string`] parses the source text once into an immutable term
//!   list; parsing is the only fallible operation.
//! - [`Acl::evaluate`] walks the terms in source order. Each term yields a
//!   [`Tribool`]: a non-matching term is *indeterminate* rather than false,
//!   so evaluation continues until a term produces a definite answer. An
//!   all-indeterminate scan denies by default.
//! - [`AuthContext`] borrows the caller's username, group name, and flag
//!   string for the duration of a single evaluation; the ACL never stores
//!   client state.
//!
//! # Invariants
//!
//! - An [`Acl`] is immutable after construction and is `Send + Sync`;
//!   evaluation takes `&self` and performs no locking or allocation.
//! - The empty expression evaluates to `false` for every context.
//! - Evaluation never fails: every context resolves to a boolean.
//!
//! # Examples
//!
//! ```
//! use acl::{Acl, AuthContext};
//!
//! let acl: Acl = "!alice *".parse().unwrap();
//! assert!(!acl.evaluate(&AuthContext::new("alice", "staff", "1")));
//! assert!(acl.evaluate(&AuthContext::new("bob", "staff", "1")));
//! ```

mod acl;
mod permission;
mod tribool;

pub use crate::acl::{Acl, MalformedAcl};
pub use crate::permission::AuthContext;
pub use crate::tribool::Tribool;

/// Numeric user identifier as stored by the user database collaborator.
pub type UserId = i32;

#[cfg(test)]
mod tests;
