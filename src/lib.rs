pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod http;
pub mod models;
pub mod services;
pub mod telemetry;

pub use context::{AppContext, Settings};
pub use error::{AppError, Result};
