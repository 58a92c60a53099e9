//! SQL alias generation.
//!
//! SQL table aliases must be unique across the whole statement (scopes only
//! bound user aliases). Aliases derive from the entity or role name so the
//! generated SQL stays readable: `Customer` -> `customer0_`.

pub struct SqlAliasGenerator {
    next: u32,
}

const MAX_BASE_LEN: usize = 10;

impl SqlAliasGenerator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Create a fresh alias from a descriptive name (entity name, role,
    /// dotted path - only the last segment is used).
    pub fn create(&mut self, description: &str) -> String {
        let base: String = description
            .rsplit(['.', '/'])
            .next()
            .unwrap_or(description)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(MAX_BASE_LEN)
            .collect::<String>()
            .to_lowercase();
        let base = if base.is_empty() || !base.starts_with(|c: char| c.is_ascii_alphabetic()) {
            format!("t{}", base)
        } else {
            base
        };
        let alias = format!("{}{}_", base, self.next);
        self.next += 1;
        alias
    }
}

impl Default for SqlAliasGenerator {
    fn default() -> Self {
        Self::new()
    }
}
