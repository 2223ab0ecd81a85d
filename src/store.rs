use crate::config::Config;
use crate::error::Error;
use crate::resolver::{ParsedQuery, Resolver};
use crate::scanner::{Blocks, Scanner};
use crate::source::{EmbeddedSource, FsSource, Open, Walk};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, trace};

/// Returns `true` for paths ending in `.sql`, in any letter case.
pub fn is_sql_file(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".sql")
}

/// Registry of parsed queries keyed by block name.
///
/// Every source is loaded all-or-nothing: if any block name in a file is
/// already registered, none of that file's queries are added.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sqlx_named_queries::QueryStore;
///
/// let mut store = QueryStore::new()?;
/// store.load_str("users.sql", "-- name: get_user\nSELECT * FROM users WHERE id = :id")?;
///
/// let query = store.query("get_user")?;
/// assert_eq!(query.sql(), "SELECT * FROM users WHERE id = $1");
///
/// let args = HashMap::from([("id".to_string(), 42)]);
/// assert_eq!(query.prepare(&args), vec![Some(&42)]);
/// # Ok::<(), sqlx_named_queries::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct QueryStore {
    queries: HashMap<String, ParsedQuery>,
    scanner: Scanner,
    resolver: Resolver,
}

impl QueryStore {
    /// Creates an empty store with the default [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner or resolver patterns cannot be compiled.
    pub fn new() -> crate::Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> crate::Result<Self> {
        Ok(Self {
            queries: HashMap::new(),
            scanner: Scanner::new()?,
            resolver: Resolver::with_config(config)?,
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Registers a single query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if `name` is taken; the store is left unchanged.
    pub fn insert(&mut self, name: impl Into<String>, query: ParsedQuery) -> crate::Result<()> {
        let name = name.into();
        if self.queries.contains_key(&name) {
            return Err(Error::DuplicateName { name, path: None });
        }
        self.queries.insert(name, query);
        Ok(())
    }

    /// Looks up a query by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownQuery`] if no query has that name.
    pub fn query(&self, name: &str) -> crate::Result<&ParsedQuery> {
        self.queries
            .get(name)
            .ok_or_else(|| Error::UnknownQuery(name.to_owned()))
    }

    /// Looks up a query that must exist.
    ///
    /// # Panics
    ///
    /// Panics if no query has that name.
    pub fn must_query(&self, name: &str) -> &ParsedQuery {
        match self.query(name) {
            Ok(query) => query,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParsedQuery> {
        self.queries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.queries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Loads every block in `text`, labelled `path` in errors and logs.
    /// Returns the number of queries added.
    pub fn load_str(&mut self, path: &str, text: &str) -> crate::Result<usize> {
        let blocks = self.scanner.scan_str(path, text);
        self.commit(path, blocks)
    }

    /// Loads every block readable from `reader`.
    pub fn load_reader<R: BufRead>(&mut self, path: &str, reader: R) -> crate::Result<usize> {
        let blocks = self.scanner.scan_reader(path, reader)?;
        self.commit(path, blocks)
    }

    /// Loads a single file, whatever its extension.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> crate::Result<usize> {
        let path = path.as_ref().display().to_string();
        self.load_one(&FsSource, &path)
    }

    /// Loads every `.sql` file below `dir`, recursively, in file-name order.
    ///
    /// Stops at the first file that fails; files loaded before it stay loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> crate::Result<usize> {
        let dir = dir.as_ref().display().to_string();
        self.load_from(&FsSource, &dir)
    }

    /// Loads every `.sql` file of an [`EmbeddedSource`] below `root`.
    pub fn load_embedded(&mut self, source: &EmbeddedSource<'_>, root: &str) -> crate::Result<usize> {
        self.load_from(source, root)
    }

    /// Loads every `.sql` file that `source` lists below `root`.
    pub fn load_from<S>(&mut self, source: &S, root: &str) -> crate::Result<usize>
    where
        S: Walk + Open,
    {
        let paths = source
            .walk(root)
            .map_err(|e| Error::unavailable(root, e))?;

        let mut loaded = 0;
        for path in paths {
            if !is_sql_file(&path) {
                trace!(path = %path, "skipping non-SQL file");
                continue;
            }
            loaded += self.load_one(source, &path)?;
        }
        debug!(root, queries = loaded, "loaded SQL directory");
        Ok(loaded)
    }

    fn load_one<S: Open>(&mut self, source: &S, path: &str) -> crate::Result<usize> {
        let reader = source.open(path).map_err(|e| Error::unavailable(path, e))?;
        self.load_reader(path, reader)
    }

    fn commit(&mut self, path: &str, blocks: Blocks) -> crate::Result<usize> {
        if let Some(name) = blocks.keys().find(|name| self.queries.contains_key(*name)) {
            return Err(Error::DuplicateName {
                name: name.clone(),
                path: Some(path.to_owned()),
            });
        }

        let count = blocks.len();
        for (name, raw) in blocks {
            let query = self.resolver.resolve(&raw);
            trace!(path, name = %name, parameters = query.len(), "registered query");
            self.queries.insert(name, query);
        }
        debug!(path, queries = count, "loaded SQL source");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sql_file() {
        assert!(is_sql_file("users.sql"));
        assert!(is_sql_file("dir/USERS.SQL"));
        assert!(is_sql_file("a.Sql"));
        assert!(!is_sql_file("users.sql.bak"));
        assert!(!is_sql_file("README.md"));
        assert!(!is_sql_file("sql"));
    }

    #[test]
    fn test_load_str_and_query() {
        let mut store = QueryStore::new().unwrap();
        let added = store
            .load_str(
                "users.sql",
                "-- name: get_user\nSELECT * FROM users WHERE id = :id\n-- name: count_users\nSELECT count(*) FROM users\n",
            )
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.names(), vec!["count_users", "get_user"]);
        assert_eq!(store.query("get_user").unwrap().sql(), "SELECT * FROM users WHERE id = $1");
        assert!(store.query("count_users").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_query() {
        let store = QueryStore::new().unwrap();
        let err = store.query("missing").unwrap_err();
        assert!(matches!(err, Error::UnknownQuery(ref name) if name == "missing"));
        assert_eq!(err.to_string(), "Query 'missing' not found");
        assert!(store.get("missing").is_none());
    }

    #[test]
    #[should_panic(expected = "Query 'missing' not found")]
    fn test_must_query_panics() {
        QueryStore::new().unwrap().must_query("missing");
    }

    #[test]
    fn test_duplicate_across_sources_is_atomic() {
        let mut store = QueryStore::new().unwrap();
        store.load_str("a.sql", "-- name: shared\nSELECT 1").unwrap();

        let err = store
            .load_str("b.sql", "-- name: fresh\nSELECT 2\n-- name: shared\nSELECT 3")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateName { ref name, ref path } if name == "shared" && path.as_deref() == Some("b.sql")
        ));
        assert!(!store.contains("fresh"));
        assert_eq!(store.must_query("shared").raw(), "SELECT 1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_within_source_later_wins() {
        let mut store = QueryStore::new().unwrap();
        let added = store
            .load_str("a.sql", "-- name: q\nSELECT :old\n-- name: q\nSELECT :new")
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.must_query("q").sql(), "SELECT $1");
        assert_eq!(store.must_query("q").ordinal("new"), Some(1));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut store = QueryStore::new().unwrap();
        let query = store.resolver().resolve("SELECT :id");
        store.insert("q", query.clone()).unwrap();
        assert!(matches!(
            store.insert("q", query),
            Err(Error::DuplicateName { ref name, .. }) if name == "q"
        ));
    }

    #[test]
    fn test_load_embedded_filters_sql_files() {
        static FILES: &[(&str, &str)] = &[
            ("sql/users.sql", "-- name: get_user\nSELECT * FROM users WHERE id = :id"),
            ("sql/orders.SQL", "-- name: get_order\nSELECT * FROM orders WHERE id = :id"),
            ("sql/notes.txt", "-- name: not_loaded\nSELECT 1"),
            ("other/x.sql", "-- name: elsewhere\nSELECT 1"),
        ];
        let mut store = QueryStore::new().unwrap();
        let added = store.load_embedded(&EmbeddedSource::new(FILES), "sql").unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.names(), vec!["get_order", "get_user"]);
    }

    #[test]
    fn test_load_embedded_missing_root() {
        static FILES: &[(&str, &str)] = &[("sql/users.sql", "-- name: get_user\nSELECT 1")];
        let mut store = QueryStore::new().unwrap();
        let err = store.load_embedded(&EmbeddedSource::new(FILES), "sqll").unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { ref path, .. } if path == "sqll"));
        assert!(store.is_empty());
    }

    struct Broken;

    impl std::io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_load_reader_failure_commits_nothing() {
        let text = &b"-- name: first\nSELECT 1\n-- name: second\nSELECT 2\n"[..];
        let reader = std::io::BufReader::new(std::io::Read::chain(text, Broken));

        let mut store = QueryStore::new().unwrap();
        let err = store.load_reader("broken.sql", reader).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { ref path, .. } if path == "broken.sql"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_reader_invalid_utf8() {
        let mut store = QueryStore::new().unwrap();
        store
            .load_reader("latin1.sql", &b"-- name: q\nSELECT 'caf\xe9' WHERE id = :id"[..])
            .unwrap();
        assert_eq!(store.must_query("q").sql(), "SELECT 'caf\u{FFFD}' WHERE id = $1");
    }

    #[test]
    fn test_load_embedded_duplicate_stops() {
        static FILES: &[(&str, &str)] = &[
            ("a.sql", "-- name: q\nSELECT 1"),
            ("b.sql", "-- name: q\nSELECT 2"),
            ("c.sql", "-- name: r\nSELECT 3"),
        ];
        let mut store = QueryStore::new().unwrap();
        let err = store.load_embedded(&EmbeddedSource::new(FILES), "").unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref path, .. } if path.as_deref() == Some("b.sql")));
        assert_eq!(store.names(), vec!["q"]);
    }

    #[test]
    fn test_config_reaches_resolver() {
        let config = Config::default().with_reserved_exclusion(false);
        let mut store = QueryStore::with_config(config).unwrap();
        store.load_str("t.sql", "-- name: t\nSELECT :MI").unwrap();
        assert_eq!(store.must_query("t").sql(), "SELECT $1");
    }
}
