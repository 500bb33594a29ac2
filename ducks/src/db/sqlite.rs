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

//! Implementation of the storage abstraction using SQLite.

use crate::db::DuckStore;
use crate::model::{DuckId, DuckSize, NewRubberDuck, RubberDuck};
use async_trait::async_trait;
use ducks_core::clocks::Clock;
use ducks_core::db::sqlite::{map_sqlx_error, run_schema, unpack_timestamp};
use ducks_core::db::{Db, DbError, DbResult, Executor};
use futures::TryStreamExt;
use log::debug;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;

/// Location of the database file used by the service, relative to the working directory.
pub const DB_PATH: &str = "ducks.db";

/// Schema to use to initialize the database.
const SCHEMA: &str = include_str!("sqlite.sql");

/// Representation of a duck as stored in the `ducks` table.
///
/// This is intentionally separate from `RubberDuck` so that the wire format and the storage
/// schema can evolve independently.
struct DuckRow {
    /// Value of the `id` primary key.
    id: i64,

    /// Value of the `name` column.
    name: String,

    /// Value of the `color` column.
    color: String,

    /// Value of the `size` column.
    size: String,
}

impl TryFrom<SqliteRow> for DuckRow {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(map_sqlx_error)?;
        let color: String = row.try_get("color").map_err(map_sqlx_error)?;
        let size: String = row.try_get("size").map_err(map_sqlx_error)?;
        Ok(DuckRow { id, name, color, size })
    }
}

impl TryFrom<DuckRow> for RubberDuck {
    type Error = DbError;

    fn try_from(row: DuckRow) -> DbResult<Self> {
        let id = DuckId::from_i64(row.id)?;
        let size = row.size.parse::<DuckSize>()?;
        Ok(RubberDuck::new(id, row.name, row.color, size))
    }
}

/// Checks that a single-row statement touched exactly one row, given the `affected` count.
fn expect_one_row(affected: u64) -> DbResult<()> {
    if affected != 1 {
        return Err(DbError::BackendError(format!(
            "Insertion affected {} rows instead of 1",
            affected
        )));
    }
    Ok(())
}

/// A store backed by an SQLite database.
pub struct SqliteStore {
    /// The database holding the `ducks` table.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock used to stamp the audit columns.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SqliteStore {
    /// Creates a new store backed by `db`, which must be an SQLite database.
    pub fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }

    /// Ensures the database schema exists.  This is safe to call on an already-initialized
    /// database.
    pub async fn migrate(&self) -> DbResult<()> {
        let Executor::Sqlite(mut ex) = self.db.ex().await?;
        run_schema(&mut ex, SCHEMA).await
    }
}

#[async_trait]
impl DuckStore for SqliteStore {
    async fn list(&self) -> DbResult<Vec<RubberDuck>> {
        let Executor::Sqlite(mut ex) = self.db.ex().await?;

        let query_str = "
            SELECT id, name, color, size
            FROM ducks
            WHERE deleted_at_secs IS NULL
            ORDER BY id
        ";
        let mut rows = sqlx::query(query_str).fetch(ex.conn());

        let mut ducks = vec![];
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
            ducks.push(RubberDuck::try_from(DuckRow::try_from(row)?)?);
        }
        Ok(ducks)
    }

    async fn create(&self, duck: NewRubberDuck) -> DbResult<RubberDuck> {
        let (now_secs, now_nsecs) = unpack_timestamp(self.clock.now_utc())?;
        let (name, color, size) = duck.dissolve();
        let row = DuckRow { id: 0, name, color, size: size.as_str().to_owned() };

        let Executor::Sqlite(mut ex) = self.db.ex().await?;

        let query_str = "
            INSERT INTO ducks (
                name, color, size,
                created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
            VALUES (?, ?, ?, ?, ?, ?, ?)
        ";
        let done = sqlx::query(query_str)
            .bind(&row.name)
            .bind(&row.color)
            .bind(&row.size)
            .bind(now_secs)
            .bind(now_nsecs)
            .bind(now_secs)
            .bind(now_nsecs)
            .execute(ex.conn())
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(done.rows_affected())?;

        let row = DuckRow { id: done.last_insert_rowid(), ..row };
        debug!("Inserted duck with id {}", row.id);
        RubberDuck::try_from(row)
    }

    async fn get(&self, id: DuckId) -> DbResult<RubberDuck> {
        let Executor::Sqlite(mut ex) = self.db.ex().await?;

        let query_str = "
            SELECT id, name, color, size
            FROM ducks
            WHERE id = ? AND deleted_at_secs IS NULL
        ";
        let row = sqlx::query(query_str)
            .bind(id.as_i64())
            .fetch_one(ex.conn())
            .await
            .map_err(map_sqlx_error)?;
        RubberDuck::try_from(DuckRow::try_from(row)?)
    }
}
