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

//! Implementation of the storage abstraction that keeps ducks in memory.

use crate::db::DuckStore;
use crate::model::{DuckId, NewRubberDuck, RubberDuck};
use async_trait::async_trait;
use ducks_core::db::{DbError, DbResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Contents of the store, which are only reachable while holding the lock.
#[derive(Default)]
struct Ducks {
    /// All ducks created so far.
    by_id: HashMap<DuckId, RubberDuck>,

    /// Last identifier handed out, or zero if none.
    last_id: u64,
}

/// A store that keeps ducks in memory until the process exits.
///
/// A single lock protects all the data: reads can proceed concurrently but a write excludes all
/// other accesses.
#[derive(Default)]
pub struct InMemoryStore {
    /// The protected ducks.
    ducks: RwLock<Ducks>,
}

#[async_trait]
impl DuckStore for InMemoryStore {
    async fn list(&self) -> DbResult<Vec<RubberDuck>> {
        let ducks = self.ducks.read().map_err(|_| DbError::Unavailable)?;

        let mut list = ducks.by_id.values().cloned().collect::<Vec<RubberDuck>>();
        list.sort_by_key(|duck| *duck.id());
        Ok(list)
    }

    async fn create(&self, duck: NewRubberDuck) -> DbResult<RubberDuck> {
        let mut ducks = self.ducks.write().map_err(|_| DbError::Unavailable)?;

        let id = DuckId::new(ducks.last_id + 1)?;
        let duck = RubberDuck::from_new(id, duck);
        ducks.last_id = id.as_u64();
        ducks.by_id.insert(id, duck.clone());
        Ok(duck)
    }

    async fn get(&self, id: DuckId) -> DbResult<RubberDuck> {
        let ducks = self.ducks.read().map_err(|_| DbError::Unavailable)?;

        ducks.by_id.get(&id).cloned().ok_or(DbError::NotFound)
    }
}
