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

//! High-level data types.

use derive_getters::{Dissolve, Getters};
use derive_more::{Constructor, Display};
use ducks_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a rubber duck.  Identifiers are assigned by the store when a duck is created and
/// are always positive.  We hold them as a `u64` but guarantee that they fit in an `i64` because
/// that is what the SQLite backend deals with.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(transparent)]
pub struct DuckId(u64);

impl DuckId {
    /// Creates an identifier from a `u64` with range validation.
    pub fn new(id: u64) -> ModelResult<Self> {
        if id == 0 {
            return Err(ModelError("Duck id must be positive".to_owned()));
        }
        match i64::try_from(id) {
            Ok(_) => Ok(Self(id)),
            Err(e) => Err(ModelError(format!("Duck id {} cannot be represented: {}", id, e))),
        }
    }

    /// Creates an identifier from an `i64` with range validation.
    pub fn from_i64(id: i64) -> ModelResult<Self> {
        match u64::try_from(id) {
            Ok(id) => Self::new(id),
            Err(_) => Err(ModelError(format!("Duck id must be positive but got {}", id))),
        }
    }

    /// Returns the identifier as an `i64`.
    pub fn as_i64(&self) -> i64 {
        i64::try_from(self.0).expect("i64 compatibility validated at construction time")
    }

    /// Returns the identifier as a `u64`.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for DuckId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<u64>() {
            Ok(id) => Self::new(id),
            Err(e) => Err(ModelError(format!("Invalid duck id '{}': {}", s, e))),
        }
    }
}

/// Size category of a rubber duck.  This is a closed set.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuckSize {
    /// Fits in the palm of a hand.
    Small,

    /// Regular bathtub duck.
    Medium,

    /// Needs two hands.
    Large,
}

impl DuckSize {
    /// Returns the canonical textual representation of the size.
    pub fn as_str(&self) -> &'static str {
        match self {
            DuckSize::Small => "small",
            DuckSize::Medium => "medium",
            DuckSize::Large => "large",
        }
    }
}

impl FromStr for DuckSize {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            "small" => Ok(DuckSize::Small),
            "medium" => Ok(DuckSize::Medium),
            "large" => Ok(DuckSize::Large),
            _ => Err(ModelError(format!("Unknown duck size '{}'", s))),
        }
    }
}

/// Contents of a request to create a rubber duck.  The identifier is assigned by the store.
#[derive(Clone, Constructor, Deserialize, Dissolve, Getters)]
#[cfg_attr(test, derive(Debug, PartialEq, Serialize))]
pub struct NewRubberDuck {
    /// Name given to the duck.
    name: String,

    /// Color of the duck.
    color: String,

    /// Size category of the duck.
    size: DuckSize,
}

/// A stored rubber duck.  Ducks are never modified once created.
#[derive(Clone, Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub struct RubberDuck {
    /// Identifier assigned at creation time.
    id: DuckId,

    /// Name given to the duck.
    name: String,

    /// Color of the duck.
    color: String,

    /// Size category of the duck.
    size: DuckSize,
}

impl RubberDuck {
    /// Creates a stored duck from its creation payload and the `id` the store assigned to it.
    pub fn from_new(id: DuckId, duck: NewRubberDuck) -> Self {
        let (name, color, size) = duck.dissolve();
        Self { id, name, color, size }
    }
}
