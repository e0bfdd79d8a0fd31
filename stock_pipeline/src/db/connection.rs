//! Opening the price database.
//!
//! Every store connection goes through [`connect_sqlite`] so the ingest run and
//! the read-only commands (`bars`, `predict`, `sentiment`) see the same
//! journaling and locking behaviour.

use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

/// Connects to the price database at `database_url`.
///
/// WAL lets a `bars` query read while an ingest batch holds the write lock.
/// Readers wait up to five seconds on a locked database before failing.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;

    for pragma in [
        "PRAGMA journal_mode=WAL;",
        // stock_prices.stock_id cascades only with this on, and it is per connection
        "PRAGMA foreign_keys=ON;",
        "PRAGMA busy_timeout=5000;",
    ] {
        sql_query(pragma).execute(&mut conn)?;
    }
    Ok(conn)
}

