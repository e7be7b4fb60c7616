pub mod azure;
pub mod common;
pub mod config;
pub mod google;
pub mod memory;
pub mod service;

pub use config::*;
