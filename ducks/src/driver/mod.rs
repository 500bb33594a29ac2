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

//! Business logic for the service.

use crate::db::DuckStore;
use ducks_core::db::DbError;
use ducks_core::driver::DriverError;
use log::warn;
use std::sync::Arc;

mod duck;
mod ducks;
#[cfg(test)]
pub(crate) mod testutils;

/// Business logic.
///
/// The operations exposed by the driver consume `self`.  Each request handler gets its own clone
/// of the driver, which is cheap because all the state lives behind the store.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The store that the driver uses for persistence.
    store: Arc<dyn DuckStore + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(store: Arc<dyn DuckStore + Send + Sync>) -> Self {
        Self { store }
    }
}

/// Converts a storage error `e` raised while performing `op` into a driver error.
///
/// Backend failures get `op` prepended to their message so that the caller can tell what failed.
fn annotate(op: &str, e: DbError) -> DriverError {
    match DriverError::from(e) {
        DriverError::BackendError(message) => {
            warn!("{}: {}", op, message);
            DriverError::BackendError(format!("{}: {}", op, message))
        }
        e => e,
    }
}
