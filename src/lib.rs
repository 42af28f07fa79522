//! Client directory backed by PostgreSQL: clients with a unique email and
//! any number of phone numbers each.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub use db::Directory;
pub use error::{DirectoryError, Result};
pub use models::{Client, ClientChanges, ClientFilter, PhoneNumber, Phones};
