//! Session archival batch for the Little Sprouts enrollment platform
//!
//! Ended sessions and their enrollments are copied into the historical
//! tables and removed from the live tables. The binary entry point runs a
//! single pass and exits.

pub mod archive;
pub mod database;
pub mod models;
