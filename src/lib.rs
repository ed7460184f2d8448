//! Load the practice data set (employees, departments, sales) from CSV into a
//! freshly created SQLite database and print it back for verification.
//!
//! - [`config`] - defaults, optional YAML settings file and CLI flags
//! - [`db`] - table registry plus the SQLite and CSV operations
//! - [`loader`] - the end-to-end run
//! - [`logger`] - leveled file logger
//! - [`sample`] - a small runnable data set

pub mod config;
pub mod db;
pub mod loader;
pub mod logger;
pub mod sample;
