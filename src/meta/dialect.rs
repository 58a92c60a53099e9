//! Dialect capability flags.
//!
//! Dialect variation is injected policy, not algorithm changes: the
//! resolver consults these flags and branches, it never special-cases a
//! database by name.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DialectCapabilities {
    /// Native `(a, b) = (x, y)` row-value-constructor comparisons. When
    /// false, multi-column comparisons are rewritten into conjunctions of
    /// single-column comparisons.
    pub supports_row_value_constructor_syntax: bool,

    /// `count((a, b))` over a column tuple.
    pub supports_tuple_counts: bool,

    /// `count(distinct (a, b))` needs the tuple parenthesized.
    pub requires_parens_for_tuple_distinct_counts: bool,
}

impl Default for DialectCapabilities {
    fn default() -> Self {
        Self {
            // Portable default: emulate row values, they are the exception
            // rather than the rule across target databases.
            supports_row_value_constructor_syntax: false,
            supports_tuple_counts: true,
            requires_parens_for_tuple_distinct_counts: false,
        }
    }
}
