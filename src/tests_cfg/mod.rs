//! Fixtures shared by unit and integration tests.

pub mod app;
pub mod config;
pub mod model;
pub mod store;
