pub mod api;
pub mod config;
pub mod control;
pub mod db;
pub mod error;
pub mod ingest;
pub mod projection;
pub mod query;
pub mod store;
