//! Shared utilities for JSL compilation.

mod variable_refs;

pub use variable_refs::*;
