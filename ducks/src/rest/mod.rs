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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use axum::http::Method;
use ducks_core::rest::{
    RequestSchemas, SchemaError, not_found, render_bare_errors, validate_request,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

mod duck_get;
mod ducks_get;
mod ducks_post;
#[cfg(test)]
mod testutils;

/// Schema that the body of requests to create a duck must satisfy.
const NEW_DUCK_SCHEMA: &str = include_str!("new_duck.schema.json");

/// Paths under which the collection of ducks is served.  The singular form is an alias.
const COLLECTION_PATHS: &[&str] = &["/ducks", "/duck"];

/// Compiles the schemas that guard the request bodies of the application.
pub(crate) fn schemas() -> Result<RequestSchemas, SchemaError> {
    let mut schemas = RequestSchemas::default();
    for path in COLLECTION_PATHS {
        schemas = schemas.with_body_schema(Method::POST, *path, NEW_DUCK_SCHEMA)?;
    }
    Ok(schemas)
}

/// Creates the router for the application.  Requests that take longer than `timeout` are
/// answered with a `408`.
pub(crate) fn app(driver: Driver, schemas: Arc<RequestSchemas>, timeout: Duration) -> Router {
    use axum::middleware::{from_fn_with_state, map_response};
    use axum::routing::get;
    let mut router = Router::new().route("/ducks/:id", get(duck_get::handler));
    for path in COLLECTION_PATHS {
        router = router.route(path, get(ducks_get::handler).post(ducks_post::handler));
    }
    router
        .fallback(not_found)
        .layer(from_fn_with_state(schemas, validate_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(render_bare_errors))
        .with_state(driver)
}
