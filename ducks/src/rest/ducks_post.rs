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

//! API to create a new duck.

use crate::driver::Driver;
use crate::model::{NewRubberDuck, RubberDuck};
use axum::body::Bytes;
use axum::extract::State;
use axum::{Json, http};
use ducks_core::rest::RestError;

/// API handler.
///
/// The body has already been validated against the new duck schema by the time it gets here.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    body: Bytes,
) -> Result<(http::StatusCode, Json<RubberDuck>), RestError> {
    let duck: NewRubberDuck = serde_json::from_slice(&body)?;
    let duck = driver.create_duck(duck).await?;
    Ok((http::StatusCode::CREATED, Json(duck)))
}
