//! Embedded schema migrations.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Diesel migrations bundled with this crate, applied by [`run_sqlite`].
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs pending migrations on the SQLite database at `url`, creating the file if needed.
///
/// Returns the number of migrations applied; zero when the schema is current.
pub fn run_sqlite(url: &str) -> anyhow::Result<usize> {
    let mut conn = SqliteConnection::establish(url)?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))?;

    info!(database = url, applied = applied.len(), "migrations up to date");
    Ok(applied.len())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn migrations_apply_once_on_temp_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path().to_string_lossy().to_string();

        assert_eq!(run_sqlite(&path).expect("first run"), 1);
        assert_eq!(run_sqlite(&path).expect("second run"), 0);

        let mut conn = SqliteConnection::establish(&path).unwrap();
        conn.batch_execute("INSERT INTO stocks (symbol, company_name) VALUES ('TST', 'Test Corp')")
            .unwrap();
    }
}
