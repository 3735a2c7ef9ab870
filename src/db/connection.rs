use sqlx::{
    Connection, Error, PgConnection,
    postgres::{PgConnectOptions, PgSslMode},
};

use crate::config::{DbConfig, DB_PORT};

/// Build connection options from the injected database configuration
///
/// TLS is required but the server certificate is not verified.
pub fn connect_options(config: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(DB_PORT)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(PgSslMode::Require)
}

/// Open a single PostgreSQL connection
///
/// One connection is opened per invocation and closed by the caller; there is
/// no pool.
pub async fn get_connection(config: &DbConfig) -> Result<PgConnection, Error> {
    PgConnection::connect_with(&connect_options(config)).await
}
