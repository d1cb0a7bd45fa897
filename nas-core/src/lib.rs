pub mod command;
pub mod config;
pub mod constants;
pub mod docker;
pub mod error;
pub mod host;
pub mod nas;
pub mod network;
pub mod settings;

pub use error::{NasError, Result};
