use crate::resolver::ParsedQuery;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Encode, Postgres, Type};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Type alias for SQLx Query with PostgreSQL arguments
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

impl ParsedQuery {
    /// Builds an SQLx query over the positional text, binding through `binder`.
    ///
    /// The binder is called once per parameter name in ordinal order, so the
    /// n-th value it binds lands on `$n`. The query is not executed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::PgPool;
    /// use sqlx_named_queries::QueryStore;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = PgPool::connect("postgres://localhost/test").await?;
    /// let mut store = QueryStore::new()?;
    /// store.load_str("users.sql", "-- name: rename\nUPDATE users SET name = :name WHERE id = :id")?;
    ///
    /// let result = store
    ///     .must_query("rename")
    ///     .bind_with(|q, key| match key {
    ///         "id" => q.bind(42),
    ///         "name" => q.bind("Jane Doe"),
    ///         _ => q,
    ///     })
    ///     .execute(&pool)
    ///     .await?;
    /// println!("Updated {} rows", result.rows_affected());
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind_with<F>(&self, mut binder: F) -> PgQuery<'_>
    where
        F: for<'q> FnMut(PgQuery<'q>, &str) -> PgQuery<'q>,
    {
        let mut q = sqlx::query::<Postgres>(self.sql());
        for key in self.names() {
            q = binder(q, key);
        }
        q
    }

    /// Builds an SQLx query with the values of `args` bound in ordinal order.
    ///
    /// Parameters missing from `args` are bound as `NULL`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::collections::HashMap;
    /// use sqlx::PgPool;
    /// use sqlx_named_queries::QueryStore;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = PgPool::connect("postgres://localhost/test").await?;
    /// let mut store = QueryStore::new()?;
    /// store.load_str("users.sql", "-- name: by_email\nDELETE FROM users WHERE email = :email")?;
    ///
    /// let args = HashMap::from([("email".to_string(), "user@example.com".to_string())]);
    /// store.must_query("by_email").bind_named(&args).execute(&pool).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind_named<'q, V, S>(&'q self, args: &HashMap<String, V, S>) -> PgQuery<'q>
    where
        V: 'q + Clone + Encode<'q, Postgres> + Type<Postgres> + Send,
        S: BuildHasher,
    {
        let mut q = sqlx::query::<Postgres>(self.sql());
        for value in self.prepare(args) {
            q = q.bind(value.cloned());
        }
        q
    }
}
