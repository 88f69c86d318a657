//! Database module: view models and SQL repositories.
//!
//! This module is split into two submodules:
//! - `model`: view models and insert outcomes returned by repositories.
//! - `repo`: SQL-only functions that map rows into entities.
//!
//! External modules should import from `disaster_watch::db`; the repository
//! API and commonly used models are re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::{InsertError, InsertOutcome, RecentNews};
