//! Library exports for bazaar, shared between the binary and tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod guard;
pub mod models;
pub mod resources;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;
