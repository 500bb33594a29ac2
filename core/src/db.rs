// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic abstraction to access the database.
//!
//! The facilities in this module wrap an SQLite connection pool so that services do not have to
//! deal with the specifics of the `sqlx` types.  Services issue their queries through an
//! `Executor`, which holds one connection from the pool for as long as it lives.

use crate::model::ModelError;
use async_trait::async_trait;

pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor.
///
/// This type provides a typed handle to the database, which is needed by sqlx to offer type
/// safety guarantees during query compilation.  Users of this type must destructure it to get
/// to the concrete connection.
pub enum Executor {
    /// A SQLite executor that can be used in `sqlx` operations.
    Sqlite(sqlite::SqliteExecutor),
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor for direct access to the pool.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes all connections to the database.  Pending operations are allowed to finish.
    async fn close(&self);
}

/// Macros to help instantiate tests for multiple backends.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Instantiates the `module::name` test for the backend configured by `setup`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Instantiates a collection of tests for a specific backend.
    ///
    /// The implementation to run the tests against is determined by the `setup` expression, which
    /// needs to return an object that the functions in `module` know how to consume.  The returned
    /// object should also have been initialized with the desired schema, if any.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;
    use std::sync::Arc;

    /// Runs a `query` on `ex` and does not care about its results.
    pub async fn exec(ex: &mut Executor, query: &str) -> DbResult<()> {
        let Executor::Sqlite(ex) = ex;
        let _result = sqlx::query(query).execute(ex.conn()).await.unwrap();
        Ok(())
    }

    /// Runs a `query` on `ex` that fetches a single row with an `i64` value on `column` and returns
    /// that value.
    async fn query_i64(ex: &mut Executor, column: &str, query: &str) -> i64 {
        let Executor::Sqlite(ex) = ex;
        let row = sqlx::query(query).fetch_one(ex.conn()).await.unwrap();
        row.try_get(column).unwrap()
    }

    pub(super) async fn test_direct_execution(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await.unwrap();
        exec(&mut db.ex().await.unwrap(), "INSERT INTO test (i) VALUES (3)").await.unwrap();
        assert_eq!(
            1,
            query_i64(&mut db.ex().await.unwrap(), "count", "SELECT COUNT(*) AS count FROM test")
                .await
        );
    }

    pub(super) async fn test_executors_share_database(db: Arc<dyn Db + Send + Sync>) {
        let mut ex1 = db.ex().await.unwrap();
        exec(&mut ex1, "CREATE TABLE test (i INTEGER)").await.unwrap();
        exec(&mut ex1, "INSERT INTO test (i) VALUES (3)").await.unwrap();

        let mut ex2 = db.ex().await.unwrap();
        exec(&mut ex2, "INSERT INTO test (i) VALUES (5)").await.unwrap();
        drop(ex2);

        assert_eq!(8, query_i64(&mut ex1, "total", "SELECT SUM(i) AS total FROM test").await);
    }

    /// Instantiates tests that need write access to the test database.
    macro_rules! generate_db_rw_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::tests,
                test_direct_execution,
                test_executors_share_database
            );
        }
    ];

    pub(super) use generate_db_rw_tests;
}
