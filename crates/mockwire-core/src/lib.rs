//! Ambient building blocks shared by mockwire services: JSON error bodies,
//! health endpoints, request-id middleware and tracing setup.

pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
