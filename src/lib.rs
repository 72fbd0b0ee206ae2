//! taskhub - client library for the task marketplace API
//!
//! The API facades live under [`api`], fronted by a short-lived response
//! cache ([`cache`]). Form validation, the profile wizard, session state and
//! route guards mirror what the web client enforces before it talks to the
//! server.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod routes;
pub mod session;
pub mod storage;
pub mod validation;
pub mod wizard;

pub use api::TaskHub;
pub use cache::ResponseCache;
pub use config::Config;
pub use error::ApiError;
pub use storage::{FileStore, LocalStore, MemoryStore};
