pub mod app;
pub mod cli;
pub mod config;
pub mod email_content;
pub mod error;
pub mod export;
pub mod gmail_api;
pub mod query;
pub mod types;

pub use error::{Error, Result};
