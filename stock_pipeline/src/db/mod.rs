//! Database utilities for connections and schema migrations.
//!
//! - [`connection::connect_sqlite`] applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - [`migrate::run_sqlite`] applies the embedded Diesel migrations.
//!
//! Example:
//! ```no_run
//! use stock_pipeline::db::{connection, migrate};
//!
//! let db_path = std::env::temp_dir().join("stock_pipeline_example.db");
//! migrate::run_sqlite(db_path.to_str().unwrap()).expect("migrations");
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;
