use crate::config::Config;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::hash::BuildHasher;
use tracing::debug;

/// `:` + optional quote + identifier + optional quote.
const PLACEHOLDER_PATTERN: &str = r#":['"]?([A-Za-z][A-Za-z0-9_]*)['"]?"#;

/// Rewrites named placeholders (`:name`) to PostgreSQL positional placeholders (`$1`).
///
/// Ordinals are handed out in order of first appearance, so the same name
/// always gets the same `$N`. A placeholder directly preceded by another
/// colon is a type cast (`::integer`) and is left alone, as are names in
/// the configured reserved set. A placeholder may also open the text
/// (`:id = 1`); only a colon in front disqualifies it.
///
/// # Examples
///
/// ```
/// use sqlx_named_queries::Resolver;
///
/// let query = Resolver::new()?.resolve("SELECT * FROM users WHERE id = :id AND name = :name");
/// assert_eq!(query.sql(), "SELECT * FROM users WHERE id = $1 AND name = $2");
/// assert_eq!(query.ordinal("name"), Some(2));
/// # Ok::<(), sqlx_named_queries::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    placeholder: Regex,
    config: Config,
}

impl Resolver {
    /// Creates a resolver with the default [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn new() -> crate::Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> crate::Result<Self> {
        Ok(Self {
            placeholder: Regex::new(PLACEHOLDER_PATTERN)?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discovers the parameters of `raw` and rewrites them to positional form.
    ///
    /// Never fails: text without placeholders comes back unchanged with an
    /// empty ordinal map.
    pub fn resolve(&self, raw: &str) -> ParsedQuery {
        let mut ordinals: IndexMap<String, usize> = IndexMap::new();
        let mut sql = String::with_capacity(raw.len());
        let mut last = 0;

        for caps in self.placeholder.captures_iter(raw) {
            let (Some(whole), Some(ident)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // `::name` is a cast, not a parameter
            if raw[..whole.start()].ends_with(':') {
                continue;
            }
            let name = ident.as_str();
            if self.config.is_reserved(name) {
                continue;
            }

            let next = ordinals.len() + 1;
            let ordinal = *ordinals.entry(name.to_owned()).or_insert(next);

            sql.push_str(&raw[last..whole.start()]);
            sql.push('$');
            sql.push_str(&ordinal.to_string());
            last = whole.end();
        }
        sql.push_str(&raw[last..]);

        debug!(parameters = ordinals.len(), "resolved named placeholders");
        ParsedQuery {
            raw: raw.to_owned(),
            sql,
            ordinals,
        }
    }
}

/// A query whose named placeholders have been rewritten to `$1..$N`.
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    raw: String,
    sql: String,
    ordinals: IndexMap<String, usize>,
}

impl ParsedQuery {
    /// The query text exactly as it was read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The query text with positional placeholders, ready for the driver.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter name to 1-based ordinal, iterated in ordinal order.
    pub fn ordinals(&self) -> &IndexMap<String, usize> {
        &self.ordinals
    }

    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    /// Parameter names in ordinal order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ordinals.keys().map(String::as_str)
    }

    /// Number of distinct parameters.
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Arranges named arguments into positional order.
    ///
    /// Slot `i` holds the value for the parameter with ordinal `i + 1`, or
    /// `None` when `args` has no entry for it. Entries in `args` that the
    /// query does not use are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use sqlx_named_queries::Resolver;
    ///
    /// let query = Resolver::new()?.resolve("SELECT * FROM users WHERE id = :id AND name = :name");
    /// let args = HashMap::from([("name".to_string(), "Ann"), ("id".to_string(), "5")]);
    /// assert_eq!(query.prepare(&args), vec![Some(&"5"), Some(&"Ann")]);
    /// # Ok::<(), sqlx_named_queries::Error>(())
    /// ```
    pub fn prepare<'a, V, S>(&self, args: &'a HashMap<String, V, S>) -> Vec<Option<&'a V>>
    where
        S: BuildHasher,
    {
        let mut slots = vec![None; self.ordinals.len()];
        for (name, &ordinal) in &self.ordinals {
            slots[ordinal - 1] = args.get(name);
        }
        slots
    }

    /// Like [`prepare`](Self::prepare), but every parameter must be supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`](crate::Error::MissingArgument) naming
    /// the first parameter, in ordinal order, with no value in `args`.
    pub fn prepare_strict<'a, V, S>(&self, args: &'a HashMap<String, V, S>) -> crate::Result<Vec<&'a V>>
    where
        S: BuildHasher,
    {
        self.prepare(args)
            .into_iter()
            .zip(self.names())
            .map(|(value, name)| value.ok_or_else(|| crate::Error::MissingArgument(name.to_owned())))
            .collect()
    }
}
