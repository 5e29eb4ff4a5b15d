//! Library components of the `fqc` command.

pub mod config;
pub mod logging;
pub mod outcomes;
pub mod trigger;
