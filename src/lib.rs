#![doc = include_str!("../README.md")]

pub use self::errors::{Error, Result};

pub mod ai;
pub mod app;
pub mod boot;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod environment;
pub mod errors;
pub mod import;
pub mod logger;
pub mod mapping;
pub mod ontology;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod tests_cfg;
pub mod threads;
