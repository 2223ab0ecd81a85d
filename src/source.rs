use std::fs::File;
use std::io::{self, BufRead, BufReader};
use walkdir::WalkDir;

/// Enumerates the logical paths below a root.
pub trait Walk {
    /// Lists every file below `root`. Order is the load order.
    fn walk(&self, root: &str) -> io::Result<Vec<String>>;
}

/// Opens a logical path for line-by-line reading.
pub trait Open {
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + '_>>;
}

/// Files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl Walk for FsSource {
    fn walk(&self, root: &str) -> io::Result<Vec<String>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                paths.push(entry.path().display().to_string());
            }
        }
        Ok(paths)
    }
}

impl Open for FsSource {
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Files compiled into the binary, as `(logical path, contents)` pairs.
///
/// # Examples
///
/// ```
/// use sqlx_named_queries::source::{EmbeddedSource, Walk};
///
/// static FILES: &[(&str, &str)] = &[
///     ("sql/users.sql", "-- name: get_user\nSELECT * FROM users WHERE id = :id"),
///     ("README.md", "# queries"),
/// ];
///
/// let source = EmbeddedSource::new(FILES);
/// assert_eq!(source.walk("sql")?, vec!["sql/users.sql"]);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource<'a> {
    files: &'a [(&'a str, &'a str)],
}

impl<'a> EmbeddedSource<'a> {
    pub const fn new(files: &'a [(&'a str, &'a str)]) -> Self {
        Self { files }
    }

    fn is_whole(root: &str) -> bool {
        let root = root.trim_end_matches('/');
        root.is_empty() || root == "."
    }

    fn is_under(path: &str, root: &str) -> bool {
        if Self::is_whole(root) {
            return true;
        }
        path.strip_prefix(root.trim_end_matches('/'))
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Walk for EmbeddedSource<'_> {
    /// Fails with `NotFound` when a named `root` holds no files, like a
    /// missing directory would.
    fn walk(&self, root: &str) -> io::Result<Vec<String>> {
        let paths: Vec<String> = self
            .files
            .iter()
            .filter(|(path, _)| Self::is_under(path, root))
            .map(|(path, _)| path.to_string())
            .collect();
        if paths.is_empty() && !Self::is_whole(root) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no embedded directory '{root}'"),
            ));
        }
        Ok(paths)
    }
}

impl Open for EmbeddedSource<'_> {
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + '_>> {
        self.files
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, contents)| Box::new(contents.as_bytes()) as Box<dyn BufRead + '_>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no embedded file '{path}'")))
    }
}
