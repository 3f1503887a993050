// Library exports for askaround
// This allows integration tests to drive the router directly

pub mod auth;
pub mod config;
pub mod db;
pub mod drafts;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
