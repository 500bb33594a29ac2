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

//! REST service to keep track of a collection of rubber ducks.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use axum::Router;
use log::{info, warn};
use std::error::Error;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::oneshot;

pub mod db;
use db::DuckStore;
mod driver;
use driver::Driver;
pub mod model;
mod rest;

/// Maximum time a single request may take before it is aborted with a `408`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum time to wait for in-flight requests to finish once shutdown has been requested.
///
/// This bounds how long the server waits, not how long the requests live: see `run`.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Result type for the top-level operations of the service.
pub type ServeResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Serves the application on `listener` using `store` for persistence until `shutdown` resolves.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve<F>(
    listener: TcpListener,
    store: Arc<dyn DuckStore + Send + Sync>,
    shutdown: F,
) -> ServeResult
where
    F: Future<Output = ()> + Send + 'static,
{
    let schemas = Arc::new(rest::schemas()?);
    let driver = Driver::new(store);
    let app = rest::app(driver, schemas, REQUEST_TIMEOUT);
    run(listener, app, shutdown, SHUTDOWN_GRACE_PERIOD).await
}

/// Runs `app` on `listener` until `shutdown` resolves, and then gives in-flight requests up to
/// `grace` to complete before abandoning them.
///
/// Abandoning only stops the accept loop: `axum::serve` runs every connection in its own task and
/// does not expose those tasks, so requests still in flight keep running until they finish or
/// hit the request timeout of the router.  Anything those requests hold, such as pooled database
/// connections, is released no later than that.
async fn run<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> ServeResult
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, draining_rx) = oneshot::channel();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let _can_fail = draining_tx.send(());
            })
            .await
    });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = draining_rx => (),
    }

    info!("Shutting down; waiting up to {:?} for in-flight requests", grace);
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result??;
            info!("Shutdown complete");
            Ok(())
        }
        Err(_) => {
            warn!("In-flight requests did not finish within {:?}; abandoning them", grace);
            server.abort();
            Ok(())
        }
    }
}

/// Listener for the process signals that request the service to stop.
pub struct ShutdownSignals {
    /// Stream of `SIGINT` deliveries.
    sigint: Signal,

    /// Stream of `SIGTERM` deliveries.
    sigterm: Signal,
}

impl ShutdownSignals {
    /// Installs the signal handlers.  Must be called from within the runtime.
    pub fn install() -> io::Result<Self> {
        let sigint = signal(SignalKind::interrupt())?;
        let sigterm = signal(SignalKind::terminate())?;
        Ok(Self { sigint, sigterm })
    }

    /// Waits until the next shutdown signal is delivered.
    pub async fn recv(&mut self) {
        let name = tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        };
        info!("Received {}", name);
    }
}
