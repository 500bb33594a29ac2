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

//! Operations on one duck.

use crate::driver::{Driver, annotate};
use crate::model::{DuckId, RubberDuck};
use ducks_core::driver::DriverResult;

impl Driver {
    /// Gets the duck identified by `id`.
    pub(crate) async fn get_duck(self, id: DuckId) -> DriverResult<RubberDuck> {
        let duck = self.store.get(id).await.map_err(|e| annotate("failed to get duck", e))?;
        Ok(duck)
    }
}
