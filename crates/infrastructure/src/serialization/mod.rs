//! Deterministic JSON for files written by the client.
//!
//! Keys come out in `BTreeMap` order with 2-space indentation and a
//! trailing newline, so rewriting an unchanged session file is a no-op.

mod json;

pub use json::*;
