//! # sqlx-named-queries
//!
//! Keep your SQL in `.sql` files, name each statement, write parameters as `:name`,
//! and get back PostgreSQL-ready text with `$1`, `$2`, ... plus the mapping needed
//! to line your named arguments up with them.
//!
//! ## Features
//!
//! - **Named Blocks**: One file holds many statements, each introduced by `-- name: <name>`
//! - **Named Placeholders**: Use `:param_name` (optionally quoted, `:'param_name'`) instead of `$1`
//! - **Cast Safe**: `::type` casts are never mistaken for parameters
//! - **Stable Ordinals**: Parameters are numbered in order of first appearance; repeats reuse their number
//! - **Pluggable Sources**: Load from strings, readers, files, directories, or files embedded in the binary
//! - **SQLx Binding**: Build a `sqlx::query` with arguments bound in the right order
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["postgres", "runtime-tokio"] }
//! sqlx-named-queries = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Query Files
//!
//! ```sql
//! -- name: get_user
//! SELECT id, name, email FROM users WHERE id = :id
//!
//! -- name: users_created_since
//! SELECT id, name FROM users
//!  WHERE created_at >= :since::timestamptz
//!    AND to_char(created_at, 'HH24:MI:SS') <> :skip_time
//! ```
//!
//! ### Loading and Preparing Arguments
//!
//! ```rust
//! use std::collections::HashMap;
//! use sqlx_named_queries::QueryStore;
//!
//! let mut store = QueryStore::new()?;
//! store.load_str(
//!     "users.sql",
//!     "-- name: find_user\nSELECT * FROM users WHERE id = :id AND name = :name\n",
//! )?;
//!
//! let query = store.query("find_user")?;
//! assert_eq!(query.sql(), "SELECT * FROM users WHERE id = $1 AND name = $2");
//!
//! let args = HashMap::from([("name".to_string(), "Ann"), ("id".to_string(), "5")]);
//! assert_eq!(query.prepare(&args), vec![Some(&"5"), Some(&"Ann")]);
//! # Ok::<(), sqlx_named_queries::Error>(())
//! ```
//!
//! ### Loading a Directory
//!
//! ```rust,no_run
//! use sqlx_named_queries::QueryStore;
//!
//! let mut store = QueryStore::new()?;
//! store.load_dir("sql")?;
//! let get_user = store.must_query("get_user");
//! println!("{}", get_user.sql());
//! # Ok::<(), sqlx_named_queries::Error>(())
//! ```
//!
//! ### Embedded Files
//!
//! ```rust
//! use sqlx_named_queries::{source::EmbeddedSource, QueryStore};
//!
//! static SQL: &[(&str, &str)] = &[
//!     ("sql/users.sql", "-- name: get_user\nSELECT * FROM users WHERE id = :id"),
//! ];
//!
//! let mut store = QueryStore::new()?;
//! store.load_embedded(&EmbeddedSource::new(SQL), "sql")?;
//! assert!(store.contains("get_user"));
//! # Ok::<(), sqlx_named_queries::Error>(())
//! ```
//!
//! ### Executing with SQLx
//!
//! ```rust,no_run
//! use sqlx::{FromRow, PgPool};
//! use sqlx_named_queries::QueryStore;
//!
//! #[derive(FromRow)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = PgPool::connect("postgres://localhost/test").await?;
//! let mut store = QueryStore::new()?;
//! store.load_dir("sql")?;
//!
//! let users: Vec<User> = store
//!     .must_query("users_by_name")
//!     .bind_with(|q, key| match key {
//!         "name" => q.bind("Ann"),
//!         _ => q,
//!     })
//!     .try_map(|row| User::from_row(&row))
//!     .fetch_all(&pool)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Scan**: Split the text into blocks at `-- name:` header lines
//! 2. **Resolve**: Find `:name` placeholders, number them by first appearance and rewrite them to `$N`
//! 3. **Register**: Store each parsed query by name; a file that reuses a registered name is rejected as a whole
//! 4. **Bind**: Arrange named arguments by ordinal, either as a plain list or straight onto an SQLx query
//!
//! ## Limitations
//!
//! - PostgreSQL-style `$N` output only
//! - Placeholder names must match `[A-Za-z][A-Za-z0-9_]*`
//! - `:MI` and `:SS` are treated as date format fields, not parameters, unless disabled via [`Config`]
//! - The SQL itself is not validated
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod bind;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod store;

pub use bind::PgQuery;
pub use config::Config;
pub use error::{Error, Result};
pub use resolver::{ParsedQuery, Resolver};
pub use scanner::{Blocks, Scanner};
pub use store::QueryStore;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::source::{EmbeddedSource, FsSource, Open, Walk};
    pub use crate::{Config, ParsedQuery, QueryStore, Resolver, Scanner};
}
