mod comparison;
mod config;
mod error;
mod http;
mod models;

pub use comparison::*;
pub(crate) use config::*;
pub use error::*;
pub(crate) use http::*;
pub use models::*;
