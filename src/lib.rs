//! Disaster news pipeline: pull a keyword-filtered news feed, tag each entry
//! with the first Thai province named in its title, keep new items in SQLite
//! and print the latest ones as a table.

pub mod catalog;
pub mod config;
pub mod db;
pub mod feed;
pub mod ingest;
pub mod model;
pub mod report;
