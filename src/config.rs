use serde::{Deserialize, Serialize};

use crate::hql::statement::JoinType;

/// Per-compilation translator settings.
///
/// One value of this struct is passed into every [`crate::translate`] call;
/// there is no process-wide mutable state. Two compilations with different
/// configurations can run concurrently against the same metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Strict JPQL compliance mode. Affects alias case rules: aliases are
    /// matched case-insensitively when enabled, case-sensitively otherwise.
    pub strict_compliance: bool,

    /// Shallow query: suppress eager-fetch joins for entity projections
    /// (scalar results only, no object-graph assembly downstream).
    pub shallow_query: bool,

    /// Join type used for implicit joins declared in a FROM clause.
    pub implied_join_type: JoinType,

    /// Legacy compatibility knobs. These reproduce behavior of a much older
    /// translator and are deliberately NOT implemented; enabling either one
    /// makes translation fail loudly instead of silently generating
    /// different SQL. See DESIGN.md.
    pub compat: CompatOptions,
}

/// Historical toggles carried over from the legacy translator configuration
/// surface. Both default to off and both are rejected when enabled.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompatOptions {
    /// Skip physical joins for to-one implicit joins in shallow queries,
    /// matching the classic translator's (incorrect) result counts.
    pub regression_join_suppression: bool,

    /// Render implicit joins theta-style in the WHERE clause.
    pub theta_style_implicit_joins: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            strict_compliance: false,
            shallow_query: false,
            implied_join_type: JoinType::Inner,
            compat: CompatOptions::default(),
        }
    }
}
