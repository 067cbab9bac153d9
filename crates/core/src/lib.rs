// querywrap Core - Query Pipeline & Ports
// NO driver dependencies (infra-sqlite implements the connection ports)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
