// Bookshelf
// Copyright 2024 Julio Merino
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

//! REST service to manage a catalog of books stored in MySQL.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use bookshelf_core::db::mysql::{MySqlDb, MySqlOptions};
use bookshelf_core::db::Db;
use log::{error, info, warn};
use std::error::Error;
use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;

pub(crate) mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Checks out and returns one connection from `db` to verify that the database is reachable.
///
/// Returns whether the check succeeded.  The outcome is only logged because requests fail
/// individually while the database is unavailable.
async fn check_connection(db: &(dyn Db + Send + Sync)) -> bool {
    match db.ex().await {
        Ok(_) => {
            info!("Database connected successfully");
            true
        }
        Err(e) => {
            error!("Failed to connect to the database: {}", e);
            false
        }
    }
}

/// Runs `check_connection` on `db` in the background so that serving does not wait for it.
fn spawn_connection_check(db: Arc<dyn Db + Send + Sync>) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let ok = check_connection(db.as_ref()).await;
        if !ok {
            warn!("Requests that need the database will fail until it becomes available");
        }
        ok
    })
}

/// Waits until the process is asked to terminate via SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install SIGINT handler: {}", e);
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::SignalKind;
        match signal::unix::signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT; shutting down"),
        _ = terminate => info!("Received SIGTERM; shutting down"),
    }
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db_opts: MySqlOptions,
) -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind(bind_addr.into()).await?;

    let db: Arc<dyn Db + Send + Sync> = Arc::new(MySqlDb::connect(db_opts));
    let check = spawn_connection_check(db.clone());
    let driver = Driver::new(db.clone());
    let app = app(driver);

    info!("Server listening on {}", listener.local_addr()?);
    let result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    check.abort();
    info!("Closing database connections");
    db.close().await;

    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::db::sqlite;

    #[tokio::test]
    async fn test_check_connection_ok() {
        let db = sqlite::testutils::setup().await;
        assert!(check_connection(&db).await);
        db.close().await;
    }

    #[tokio::test]
    async fn test_check_connection_unavailable() {
        let db = sqlite::testutils::setup().await;
        db.close().await;
        assert!(!check_connection(&db).await);
    }

    #[tokio::test]
    async fn test_spawn_connection_check() {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        assert!(spawn_connection_check(db.clone()).await.unwrap());

        db.close().await;
        assert!(!spawn_connection_check(db).await.unwrap());
    }
}
