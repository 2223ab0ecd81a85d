/// Error types for sqlx-named-queries
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error while compiling a scanner or resolver pattern
    #[error("Failed to compile SQL pattern: {0}")]
    Parse(#[from] regex::Error),

    /// A query source could not be opened, enumerated or read
    #[error("SQL source '{path}' is unavailable: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A query name is already registered; the source declaring it was not loaded
    #[error("Query '{name}' already exists{}", while_loading(.path))]
    DuplicateName { name: String, path: Option<String> },

    /// Lookup of a query name that was never registered
    #[error("Query '{0}' not found")]
    UnknownQuery(String),

    /// Parameter was referenced by the query but no value was supplied
    #[error("Parameter '{0}' was not supplied")]
    MissingArgument(String),
}

fn while_loading(path: &Option<String>) -> String {
    match path {
        Some(path) => format!(" (while loading '{path}')"),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn unavailable(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sqlx-named-queries operations
pub type Result<T> = std::result::Result<T, Error>;
