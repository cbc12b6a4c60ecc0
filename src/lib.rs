pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod metrics;
pub mod models;
pub mod store;
