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

//! Storage abstraction in terms of the operations needed by the service.
//!
//! The `DuckStore` trait is the only seam between the business logic and the storage backends.
//! Backends are chosen at startup and injected into the driver.  They do not validate the
//! contents of the ducks they are given: that happens in the REST layer before any request gets
//! this far.

use crate::model::{DuckId, NewRubberDuck, RubberDuck};
use async_trait::async_trait;
use ducks_core::db::DbResult;

mod memory;
pub use memory::InMemoryStore;
mod sqlite;
pub use sqlite::{DB_PATH, SqliteStore};

/// Operations to manipulate the collection of rubber ducks.
///
/// Any failure of the backend itself is reported via the `DbError` kinds that represent an
/// unavailable store (`BackendError`, `DataIntegrityError` and `Unavailable`).
#[async_trait]
pub trait DuckStore {
    /// Gets all ducks, sorted by ascending identifier.
    async fn list(&self) -> DbResult<Vec<RubberDuck>>;

    /// Stores a new `duck`, assigning it a fresh identifier, and returns the stored duck.
    async fn create(&self, duck: NewRubberDuck) -> DbResult<RubberDuck>;

    /// Gets the duck identified by `id`, or `DbError::NotFound` if there is no such duck.
    async fn get(&self, id: DuckId) -> DbResult<RubberDuck>;
}
