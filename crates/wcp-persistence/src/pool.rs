//! Pool construction and startup migration (`§6` configuration contract).

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use wcp_domain::config::DatabaseConfig;
use wcp_domain::error::{Error, Result};

/// Connect a bounded sqlite pool from `§6`'s `DB_*` configuration and run
/// pending migrations. Connection failure here is `Fatal` (`§7`): the
/// process aborts startup rather than limping along without persistence.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = config.sqlite_url();
    let opts = SqliteConnectOptions::from_str(&url)
        .map_err(|e| Error::Fatal(format!("invalid sqlite url {url}: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.pool_max)
        .idle_timeout(Some(Duration::from_millis(config.idle_timeout_ms)))
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .connect_with(opts)
        .await
        .map_err(|e| Error::Fatal(format!("failed to connect to {url}: {e}")))?;

    crate::migrations::run(&pool).await?;

    tracing::info!(url = %redact(&url), pool_max = config.pool_max, "persistence pool ready");
    Ok(pool)
}

fn redact(url: &str) -> String {
    // sqlite urls carry no credentials, but keep the helper for parity with
    // the host/port/password-bearing DB_* contract documented in `§6`.
    url.to_string()
}
