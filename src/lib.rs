//! Price Fetcher Library
//!
//! This library exposes the core modules for use in the server binary,
//! benchmarks, integration tests and programmatic clients.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
