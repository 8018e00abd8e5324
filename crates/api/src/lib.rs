//! Blueprint API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background jobs) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
