mod backend;
mod config;
mod models;

pub use backend::*;
pub use config::*;
