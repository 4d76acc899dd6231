#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfg` parses the ebftpd configuration file: a line-oriented,
//! glftpd-compatible text format with one directive per line, `#`
//! comments, case-insensitive keywords, and an embeddable ACL
//! mini-language (see the `acl` crate) trailing most directives.
//!
//! ```text
//! sitepath /site
//! datapath /data
//! port 2121
//! valid_ip *@127.0.0.1
//!
//! speed_limit /site/incoming/* 1000 500 !@leech *
//! upload /site/incoming/* *
//! -retr !@leech *
//! ```
//!
//! # Design
//!
//! - [`util`] holds the tokenizer and value parsers shared by every
//!   grammar (whitespace splitting with a `[:space:]` escape, booleans,
//!   sizes in a kilobyte base unit, anchored wildcard matching).
//! - [`setting`] defines one typed, validated value per composite
//!   grammar. Construction is the only fallible step; the values are
//!   immutable afterwards.
//! - [`Factory`] is the keyword registry: a static table mapping each
//!   lower-cased keyword to its arity bounds and parse function,
//!   assembled explicitly on first use.
//! - [`Config::load`] runs the line loop, dispatches through the
//!   registry, applies defaults, checks required settings, and returns
//!   an immutable snapshot behind [`Arc`](std::sync::Arc) with a
//!   strictly increasing version number. [`current`]/[`install`] hold
//!   the process-wide snapshot used by connection threads.
//!
//! # Invariants
//!
//! - A returned [`Config`] is never mutated; reload replaces the shared
//!   snapshot wholesale.
//! - Repeated single-valued keywords are last-occurrence-wins; list
//!   keywords accumulate in file order. The class is fixed per keyword
//!   in the registry.
//! - Unknown keywords are logged with file and line number and skipped;
//!   every other parse error aborts the load.
//!
//! # Errors
//!
//! All failures surface as [`ConfigError`]; line-scoped errors carry the
//! file path and line number in their rendered message.

mod config;
mod error;
mod factory;
pub mod setting;
mod slot;
pub mod util;

pub use crate::config::{CONFIG_FILE, Config, Section};
pub use crate::error::ConfigError;
pub use crate::factory::Factory;
pub use crate::slot::{current, install};
