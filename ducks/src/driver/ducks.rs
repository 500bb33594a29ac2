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

//! Operations on the collection of ducks.

use crate::driver::{Driver, annotate};
use crate::model::{NewRubberDuck, RubberDuck};
use ducks_core::driver::DriverResult;
use log::debug;

impl Driver {
    /// Gets all existing ducks, sorted by identifier.
    pub(crate) async fn list_ducks(self) -> DriverResult<Vec<RubberDuck>> {
        let ducks = self.store.list().await.map_err(|e| annotate("failed to list ducks", e))?;
        debug!("Listed {} ducks", ducks.len());
        Ok(ducks)
    }

    /// Creates a new duck from `duck` and returns it with its assigned identifier.
    pub(crate) async fn create_duck(self, duck: NewRubberDuck) -> DriverResult<RubberDuck> {
        let duck = self.store.create(duck).await.map_err(|e| annotate("failed to create duck", e))?;
        debug!("Created duck {}", duck.id());
        Ok(duck)
    }
}
