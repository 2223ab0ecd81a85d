/// Names that collide with the placeholder syntax inside date/time format
/// strings such as `to_char(ts, 'HH24:MI:SS')`.
pub const RESERVED_NAMES: &[&str] = &["MI", "SS"];

/// Settings shared by [`Resolver`](crate::Resolver) and [`QueryStore`](crate::QueryStore).
///
/// # Examples
///
/// ```
/// use sqlx_named_queries::{Config, Resolver};
///
/// let resolver = Resolver::with_config(Config::default().with_reserved_exclusion(false))?;
/// let query = resolver.resolve("SELECT to_char(now(), 'HH24:MI')");
/// assert_eq!(query.ordinal("MI"), Some(1));
/// # Ok::<(), sqlx_named_queries::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Skip placeholders whose name is in `reserved_names`.
    pub exclude_reserved: bool,
    /// Case-sensitive names that are never treated as parameters while
    /// `exclude_reserved` is on.
    pub reserved_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_reserved: true,
            reserved_names: RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn with_reserved_exclusion(mut self, enabled: bool) -> Self {
        self.exclude_reserved = enabled;
        self
    }

    /// Replaces the reserved set.
    pub fn with_reserved_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `name` must not become a parameter.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.exclude_reserved && self.reserved_names.iter().any(|r| r == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_reserved_default() {
        let config = Config::default();
        assert!(config.is_reserved("MI"));
        assert!(config.is_reserved("SS"));
        assert!(!config.is_reserved("not_reserved"));
        assert!(!config.is_reserved("mi"));
        assert!(!config.is_reserved(""));
    }

    #[test]
    fn test_is_reserved_disabled() {
        let config = Config::default().with_reserved_exclusion(false);
        assert!(!config.is_reserved("MI"));
        assert!(!config.is_reserved("SS"));
    }

    #[test]
    fn test_custom_reserved_names() {
        let config = Config::default().with_reserved_names(["HH24"]);
        assert!(config.is_reserved("HH24"));
        assert!(!config.is_reserved("MI"));
    }
}
