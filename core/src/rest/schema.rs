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

//! Validation of request bodies against JSON schemas before they reach the handlers.

use crate::rest::{RestError, RestResult, get_unique_header};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Default maximum size of a request body that is subject to validation.
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Errors raised while loading schema documents.  These are startup errors.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Invalid schema for {method} {path}: {message}")]
pub struct SchemaError {
    /// Method of the route the schema was meant for.
    method: Method,

    /// Path of the route the schema was meant for.
    path: String,

    /// Description of the problem.
    message: String,
}

/// Collection of compiled JSON schemas keyed by the route whose request bodies they describe.
///
/// This is process-wide immutable configuration: it is built once during startup and then shared
/// by all requests via `validate_request`.
pub struct RequestSchemas {
    /// Compiled validators for the request bodies of every route that has one.
    bodies: HashMap<(Method, String), jsonschema::Validator>,

    /// Maximum size of a body to accept for validation.
    max_body_size: usize,
}

impl Default for RequestSchemas {
    fn default() -> Self {
        Self { bodies: HashMap::default(), max_body_size: DEFAULT_MAX_BODY_SIZE }
    }
}

impl RequestSchemas {
    /// Registers the JSON `schema` document that the body of `method` requests to `path` must
    /// satisfy.
    pub fn with_body_schema<P: Into<String>>(
        mut self,
        method: Method,
        path: P,
        schema: &str,
    ) -> Result<Self, SchemaError> {
        let path = path.into();
        let make_error = |message: String| SchemaError {
            method: method.clone(),
            path: path.clone(),
            message,
        };

        let schema: Value = serde_json::from_str(schema).map_err(|e| make_error(e.to_string()))?;
        let validator =
            jsonschema::Validator::new(&schema).map_err(|e| make_error(e.to_string()))?;

        self.bodies.insert((method, path), validator);
        Ok(self)
    }

    /// Overrides the maximum size of the bodies to validate.  Larger bodies are rejected.
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Checks that the body of `request` conforms to the schema registered for its route, if any,
    /// and returns an equivalent request ready to be passed to the next handler.
    async fn check(&self, request: Request) -> RestResult<Request> {
        let key = (request.method().clone(), request.uri().path().to_owned());
        let validator = match self.bodies.get(&key) {
            Some(validator) => validator,
            None => return Ok(request),
        };

        let is_json = get_unique_header(request.headers(), &header::CONTENT_TYPE)?
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .map(|mime| mime.essence_str() == mime::APPLICATION_JSON.essence_str())
            .unwrap_or(false);
        if !is_json {
            return Err(bad_request("Content-Type must be application/json"));
        }

        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|e| bad_request(format!("cannot read body: {}", e)))?;

        let value: Value = serde_json::from_slice(&bytes).map_err(bad_request)?;
        if let Some(e) = validator.iter_errors(&value).next() {
            debug!("Rejecting {} {}: {}", key.0, key.1, e);
            return Err(bad_request(e));
        }

        Ok(Request::from_parts(parts, Body::from(bytes)))
    }
}

/// Builds the error returned for requests that do not conform to their schema.
fn bad_request<E: ToString>(e: E) -> RestError {
    RestError::InvalidRequest(format!("bad request: {}", e.to_string()))
}

/// Middleware that rejects requests whose bodies do not conform to their registered schemas.
///
/// Install with `axum::middleware::from_fn_with_state`.  Rejected requests never reach the
/// handlers and get a `400` with the standard error body.
pub async fn validate_request(
    State(schemas): State<Arc<RequestSchemas>>,
    request: Request,
    next: Next,
) -> Response {
    match schemas.check(request).await {
        Ok(request) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
