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

//! Entry point to the books service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use bookshelf_core::db::mysql::MySqlOptions;
use bookshelf_core::env::get_optional_named_var;
use bookshelf_server::serve;
use log::{debug, error};
use std::net::Ipv4Addr;
use std::process::ExitCode;

/// Port to listen on when `PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Gathers the configuration from the environment and runs the server until it is shut down.
async fn run() -> Result<(), String> {
    let port = get_optional_named_var::<u16>("PORT")?.unwrap_or(DEFAULT_PORT);
    let db_opts = MySqlOptions::from_env("DB")?;
    debug!("Database configuration: {:?}", db_opts);

    serve((Ipv4Addr::UNSPECIFIED, port), db_opts).await.map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => (),
        Err(e) => {
            error!("Failed to load .env file: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
