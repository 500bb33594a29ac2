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

//! Entry point to the rubber duck service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use clap::{Parser, ValueEnum};
use ducks::db::{DB_PATH, DuckStore, InMemoryStore, SqliteStore};
use ducks::{ServeResult, ShutdownSignals, serve};
use ducks_core::clocks::SystemClock;
use ducks_core::db::Db;
use ducks_core::db::sqlite::{SqliteDb, connect};
use log::{error, info, warn};
use std::future::Future;
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Storage backends that the service can run with.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    /// Ducks live in process memory and are lost on exit.
    Memory,

    /// Ducks live in a SQLite database in the working directory.
    Sqlite,
}

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "ducks", version, about = "REST service to keep track of rubber ducks")]
struct Args {
    /// Port to listen on, on all interfaces.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Storage backend to use.
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,
}

/// Waits for the first shutdown signal and arranges for a second one to terminate the process
/// without waiting for in-flight requests.
async fn wait_for_shutdown(mut signals: ShutdownSignals) {
    signals.recv().await;
    info!("Shutdown requested; send the signal again to exit immediately");
    tokio::spawn(async move {
        signals.recv().await;
        warn!("Second shutdown signal; exiting immediately");
        process::exit(1);
    });
}

/// Sets up the backend selected by `args` and serves until shut down.
async fn run(args: Args) -> ServeResult {
    let signals = ShutdownSignals::install()?;

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, args.port)).await?;
    info!("Listening on http://localhost:{} with the {:?} store", args.port, args.store);

    match args.store {
        StoreKind::Memory => {
            let store: Arc<dyn DuckStore + Send + Sync> = Arc::new(InMemoryStore::default());
            serve(listener, store, wait_for_shutdown(signals)).await
        }
        StoreKind::Sqlite => {
            let db = Arc::new(connect(DB_PATH).await?);
            serve_sqlite(listener, db, wait_for_shutdown(signals)).await
        }
    }
}

/// Serves from the SQLite database `db` until `shutdown` resolves.  The database is closed on
/// return, whether serving succeeded or not.
async fn serve_sqlite<F>(listener: TcpListener, db: Arc<SqliteDb>, shutdown: F) -> ServeResult
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = migrate_and_serve(listener, db.clone(), shutdown).await;
    db.close().await;
    result
}

/// Prepares the schema of `db` and serves from it until `shutdown` resolves.
async fn migrate_and_serve<F>(listener: TcpListener, db: Arc<SqliteDb>, shutdown: F) -> ServeResult
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = SqliteStore::new(db, Arc::new(SystemClock::default()));
    store.migrate().await?;
    serve(listener, Arc::new(store), shutdown).await
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{}", e);
        process::exit(1);
    }
}
