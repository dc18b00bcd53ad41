//! HTTP API: routing, permission middleware, and request/response mapping.

pub mod app;
pub mod middleware;
