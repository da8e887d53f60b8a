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

//! Common utilities to interact with a MySQL database.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::get_optional_var;
use async_trait::async_trait;
use derivative::Derivative;
use log::warn;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;

/// Default value for the `host` configuration property.
const DEFAULT_HOST: &str = "localhost";

/// Default value for the `port` configuration property.
const DEFAULT_PORT: u16 = 3306;

/// Default value for the `max_connections` configuration property.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// A connection checked out of a MySQL pool.
pub type MySqlExecutor = PoolConnection<MySql>;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.downcast_ref::<MySqlDatabaseError>().number() {
            1040 /* ER_CON_COUNT_ERROR */
            | 1044 /* ER_DBACCESS_DENIED_ERROR */
            | 1045 /* ER_ACCESS_DENIED_ERROR */
            | 1049 /* ER_BAD_DB_ERROR */ => DbError::Unavailable(e.to_string()),
            number => DbError::BackendError(format!("mysql error {}: {}", number, e)),
        },
        sqlx::Error::RowNotFound => DbError::NotFound,
        e @ (sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed) => DbError::Unavailable(e.to_string()),
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a MySQL database.
///
/// All connection properties are optional so that a misconfigured service can still start.  Any
/// problems with them surface when the pool first tries to open a connection.
#[derive(Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct MySqlOptions {
    /// Host to connect to.
    pub host: String,

    /// Port to connect to (typically 3306).
    pub port: u16,

    /// Database name to connect to.
    pub database: Option<String>,

    /// Username to establish the connection with.
    pub username: Option<String>,

    /// Password to establish the connection with.
    #[derivative(Debug = "ignore")]
    pub password: Option<String>,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.  Requests for more
    /// connections wait until one is returned to the pool.
    pub max_connections: u32,
}

impl MySqlOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_NAME`,
    /// `<prefix>_USER`, `<prefix>_PASSWORD`, `<prefix>_MIN_CONNECTIONS` and
    /// `<prefix>_MAX_CONNECTIONS`.  Missing variables fall back to defaults but variables with
    /// values of the wrong type are an error.
    pub fn from_env(prefix: &str) -> Result<MySqlOptions, String> {
        Ok(MySqlOptions {
            host: get_optional_var::<String>(prefix, "HOST")?
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            database: get_optional_var::<String>(prefix, "NAME")?,
            username: get_optional_var::<String>(prefix, "USER")?,
            password: get_optional_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }
}

/// Shareable connection pool to a MySQL database.
pub struct MySqlDb {
    /// Shared MySQL connection pool.  This is a cloneable type that all concurrent requests can
    /// use concurrently.
    pool: MySqlPool,
}

impl Drop for MySqlDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

impl MySqlDb {
    /// Creates a new pool with a set of connection and pool options.
    ///
    /// Note that this does *not* establish the connection.
    fn connect_lazy_with_pool_options(opts: MySqlOptions, pool_options: MySqlPoolOptions) -> Self {
        let mut options = MySqlConnectOptions::new().host(&opts.host).port(opts.port);
        if let Some(database) = opts.database.as_deref() {
            options = options.database(database);
        }
        if let Some(username) = opts.username.as_deref() {
            options = options.username(username);
        }
        if let Some(password) = opts.password.as_deref() {
            options = options.password(password);
        }

        let pool = pool_options.connect_lazy_with(options);
        Self { pool }
    }

    /// Creates a new pool based on a set of options.
    ///
    /// Note that this does *not* establish the connection.
    pub fn connect(opts: MySqlOptions) -> Self {
        let mut pool_options = MySqlPoolOptions::new().max_connections(opts.max_connections);
        if let Some(min_connections) = opts.min_connections {
            pool_options = pool_options.min_connections(min_connections);
        }
        MySqlDb::connect_lazy_with_pool_options(opts, pool_options)
    }
}

#[async_trait]
impl Db for MySqlDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::MySql(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema that may contain multiple
/// statements.
pub async fn run_schema(ex: &mut MySqlExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(&mut **ex).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Test utilities for the MySQL connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;
    use crate::env::get_required_var;

    /// Creates a new connection to the test database configured via `DB_TEST_*` variables.
    ///
    /// The pool is limited to a single connection that is never recycled so that any temporary
    /// tables created during the test live until the pool is dropped and are not visible to other
    /// tests.
    ///
    /// Given that this is for testing purposes only, any errors will panic.
    pub async fn setup() -> MySqlDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = MySqlOptions::from_env("DB_TEST").unwrap();
        opts.database = Some(get_required_var::<String>("DB_TEST", "NAME").unwrap());
        MySqlDb::connect_lazy_with_pool_options(
            opts,
            MySqlPoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        )
    }
}
