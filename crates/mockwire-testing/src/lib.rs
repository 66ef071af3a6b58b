//! Test utilities for the mockwire stub server.
//!
//! Provides JSON fixtures for the admin API and a gRPC client for the
//! `market_data` test service. Import from tests only.

pub mod fixture;
pub mod grpc;
