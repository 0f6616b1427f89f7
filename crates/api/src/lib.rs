//! HTTP API: bearer-token actor resolution, routing, and error mapping.

pub mod app;
pub mod context;
pub mod middleware;
