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

//! Test utilities for the business logic layer.

use crate::db::{DuckStore, InMemoryStore};
use crate::driver::Driver;
use crate::model::{DuckId, DuckSize, NewRubberDuck, RubberDuck};
use async_trait::async_trait;
use ducks_core::db::{DbError, DbResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store that wraps the in-memory store and records how many ducks it was asked to create.
#[derive(Default)]
pub(crate) struct SpyStore {
    /// The store that actually holds the ducks.
    inner: InMemoryStore,

    /// Number of calls to `create`, successful or not.
    creates: AtomicUsize,
}

impl SpyStore {
    /// Returns the number of times `create` has been called.
    pub(crate) fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DuckStore for SpyStore {
    async fn list(&self) -> DbResult<Vec<RubberDuck>> {
        self.inner.list().await
    }

    async fn create(&self, duck: NewRubberDuck) -> DbResult<RubberDuck> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(duck).await
    }

    async fn get(&self, id: DuckId) -> DbResult<RubberDuck> {
        self.inner.get(id).await
    }
}

/// A store whose every operation fails as if the backend were broken.
pub(crate) struct FailingStore;

impl FailingStore {
    fn error() -> DbError {
        DbError::BackendError("disk on fire".to_owned())
    }
}

#[async_trait]
impl DuckStore for FailingStore {
    async fn list(&self) -> DbResult<Vec<RubberDuck>> {
        Err(Self::error())
    }

    async fn create(&self, _duck: NewRubberDuck) -> DbResult<RubberDuck> {
        Err(Self::error())
    }

    async fn get(&self, _id: DuckId) -> DbResult<RubberDuck> {
        Err(Self::error())
    }
}

/// State of a running test.
pub(crate) struct TestContext {
    store: Arc<dyn DuckStore + Send + Sync>,
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver backed by an empty in-memory store.
    pub(crate) fn setup() -> Self {
        Self::setup_with(Arc::new(InMemoryStore::default()))
    }

    /// Initializes a driver backed by a store that always fails.
    pub(crate) fn setup_failing() -> Self {
        Self::setup_with(Arc::new(FailingStore))
    }

    fn setup_with(store: Arc<dyn DuckStore + Send + Sync>) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        let driver = Driver::new(store.clone());
        Self { store, driver }
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Inserts a duck directly into the store, bypassing the driver.
    pub(crate) async fn create(&self, name: &str, color: &str, size: DuckSize) -> RubberDuck {
        let duck = NewRubberDuck::new(name.to_owned(), color.to_owned(), size);
        self.store.create(duck).await.unwrap()
    }

    /// Fetches the duck with identifier `id` directly from the store.
    pub(crate) async fn get(&self, id: u64) -> RubberDuck {
        self.store.get(DuckId::new(id).unwrap()).await.unwrap()
    }
}
