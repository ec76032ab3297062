pub mod config_table;
pub mod connection;
pub mod lock;
pub mod reservations;
pub mod runs;

pub use connection::Database;
pub use reservations::SqliteStore;
