//! User data database
//!
//! A single SQLite file (`<data_dir>/userdata.db`) holding a key/value
//! `settings` table. The only persisted setting today is the cookie signing
//! secret.

pub mod init;

pub use init::{init_database, initialize_cookie_secret, load_cookie_secret};
