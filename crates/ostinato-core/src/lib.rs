//! Core domain model for ostinato.
//!
//! This crate defines the chart request model (items, kinds, periods,
//! grid sizes), the SQLite identity store that links Discord users to
//! their scrobbling-service usernames, and configuration loading.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
