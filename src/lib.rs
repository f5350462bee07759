pub mod ast;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod hql;
pub mod request;

pub use error::{HqlError, Result};
