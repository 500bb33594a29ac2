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

//! Test utilities for the REST API.

use crate::REQUEST_TIMEOUT;
use crate::db::DuckStore;
use crate::driver::Driver;
use crate::driver::testutils::{FailingStore, SpyStore};
use crate::model::*;
use crate::rest::{app, schemas};
use async_trait::async_trait;
use axum::Router;
use ducks_core::db::{DbError, DbResult};
use std::sync::Arc;
use std::time::Duration;

/// A store whose operations never complete in any reasonable amount of time.
struct StalledStore;

impl StalledStore {
    async fn stall() {
        tokio::time::sleep(Duration::from_secs(600)).await;
    }
}

#[async_trait]
impl DuckStore for StalledStore {
    async fn list(&self) -> DbResult<Vec<RubberDuck>> {
        Self::stall().await;
        Ok(vec![])
    }

    async fn create(&self, duck: NewRubberDuck) -> DbResult<RubberDuck> {
        Self::stall().await;
        Ok(RubberDuck::from_new(DuckId::new(1)?, duck))
    }

    async fn get(&self, _id: DuckId) -> DbResult<RubberDuck> {
        Self::stall().await;
        Err(DbError::NotFound)
    }
}

pub(crate) struct TestContext {
    spy: Option<Arc<SpyStore>>,
    store: Arc<dyn DuckStore + Send + Sync>,
    app: Router,
}

impl TestContext {
    /// Initializes an application backed by an empty in-memory store.
    pub(crate) fn setup() -> Self {
        let spy = Arc::new(SpyStore::default());
        Self::setup_with(Some(spy.clone()), spy, REQUEST_TIMEOUT)
    }

    /// Initializes an application backed by a store that always fails.
    pub(crate) fn setup_failing() -> Self {
        Self::setup_with(None, Arc::new(FailingStore), REQUEST_TIMEOUT)
    }

    /// Initializes an application whose store never answers, with requests limited to `timeout`.
    pub(crate) fn setup_stalled(timeout: Duration) -> Self {
        Self::setup_with(None, Arc::new(StalledStore), timeout)
    }

    fn setup_with(
        spy: Option<Arc<SpyStore>>,
        store: Arc<dyn DuckStore + Send + Sync>,
        timeout: Duration,
    ) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        let driver = Driver::new(store.clone());
        let app = app(driver, Arc::new(schemas().unwrap()), timeout);
        Self { spy, store, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns how many times the store was asked to create a duck.
    pub(crate) fn creates(&self) -> usize {
        self.spy.as_ref().expect("Only available for the in-memory store").creates()
    }

    pub(crate) async fn create(&self, name: &str, color: &str, size: DuckSize) -> RubberDuck {
        let duck = NewRubberDuck::new(name.to_owned(), color.to_owned(), size);
        self.store.create(duck).await.unwrap()
    }

    pub(crate) async fn get(&self, id: u64) -> RubberDuck {
        self.store.get(DuckId::new(id).unwrap()).await.unwrap()
    }
}
