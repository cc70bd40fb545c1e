//! Flat property view over a configuration tree.
//!
//! Responsibilities:
//! - Flatten a `ConfigTree` into `path -> value` entries keyed the way
//!   property binders expect (`a.b.c`, `list[0]`).
//! - Wrap the flattened entries as a named, read-only `PropertySource`.
//!
//! Does NOT handle:
//! - Loading or layering configuration (see `layered-config`).
//! - Relaxed binding or type conversion of the flat values.
//!
//! Invariants / Assumptions:
//! - Objects never appear as entries; only their descendants do.
//! - Sequences appear both whole and element by element.
//! - Keys are sorted lexicographically.

mod source;
mod visitor;

pub use source::{DEFAULT_PROPERTY_SOURCE_NAME, PropertySource, flatten};
