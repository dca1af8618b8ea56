//! Test helpers module
//!
//! Database setup for the Postgres-backed tests and fake fixture data.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
