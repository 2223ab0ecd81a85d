use indexmap::IndexMap;
use regex::Regex;
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Query name to raw query text, in the order the blocks were declared.
pub type Blocks = IndexMap<String, String>;

const HEADER_PATTERN: &str = r"^--\s*name:\s*(\S+)";

/// Splits SQL text into named blocks.
///
/// A block starts at a header line of the form `-- name: <name>` and runs
/// until the next header or the end of input. Lines before the first header
/// are dropped. A header without a name is an ordinary content line.
///
/// # Examples
///
/// ```
/// use sqlx_named_queries::Scanner;
///
/// let scanner = Scanner::new()?;
/// let blocks = scanner.scan_str("users.sql", "-- name: q1\nSELECT 1\n-- name: q2\nSELECT 2\n");
/// assert_eq!(blocks["q1"], "SELECT 1");
/// assert_eq!(blocks["q2"], "SELECT 2");
/// # Ok::<(), sqlx_named_queries::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    header: Regex,
}

enum Block {
    Closed,
    Open { name: String, lines: Vec<String> },
}

impl Block {
    fn flush(self, source: &str, blocks: &mut Blocks) {
        if let Block::Open { name, lines } = self {
            trace!(source, name = %name, lines = lines.len(), "query block finalized");
            if blocks.insert(name.clone(), lines.join("\n")).is_some() {
                warn!(source, name = %name, "query block declared twice, keeping the later one");
            }
        }
    }
}

impl Scanner {
    /// Creates a scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if the header pattern cannot be compiled.
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            header: Regex::new(HEADER_PATTERN)?,
        })
    }

    /// Returns the block name declared by `line`, if it is a header.
    pub fn header_name<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.header
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Scans a sequence of lines (without line terminators) read from `source`.
    ///
    /// `source` only labels log records. A repeated name within one scan
    /// replaces the earlier block.
    pub fn scan<I, S>(&self, source: &str, lines: I) -> Blocks
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocks = Blocks::new();
        let mut current = Block::Closed;

        for line in lines {
            let line = line.as_ref();
            if let Some(name) = self.header_name(line) {
                trace!(source, name, "query block header");
                let previous = std::mem::replace(
                    &mut current,
                    Block::Open {
                        name: name.to_owned(),
                        lines: Vec::new(),
                    },
                );
                previous.flush(source, &mut blocks);
            } else if let Block::Open { lines, .. } = &mut current {
                lines.push(line.to_owned());
            }
        }
        current.flush(source, &mut blocks);

        debug!(source, blocks = blocks.len(), "scanned SQL source");
        blocks
    }

    /// Scans in-memory text. `\n` and `\r\n` both end a line.
    pub fn scan_str(&self, source: &str, text: &str) -> Blocks {
        self.scan(source, text.lines())
    }

    /// Scans everything readable from `reader`.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD instead of failing the read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`](crate::Error::SourceUnavailable)
    /// if reading fails; nothing scanned so far is returned.
    pub fn scan_reader<R: BufRead>(&self, source: &str, reader: R) -> crate::Result<Blocks> {
        let mut lines = Vec::new();
        for line in reader.split(b'\n') {
            let mut line = line.map_err(|e| crate::Error::unavailable(source, e))?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        Ok(self.scan(source, lines))
    }
}
