//! Process bootstrap shared by teamcal binaries

pub mod bootstrap;

pub use bootstrap::{init_env, init_tracing};
