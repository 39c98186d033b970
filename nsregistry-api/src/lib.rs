//! Namespace registry API library
//!
//! Exposes the registry core, persistence and HTTP surface for the binary
//! and for integration tests.

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

// Application state
pub mod state;
pub use state::AppState;

// Authentication
pub mod middleware;

// Registry core
pub mod registry;

// Database
pub mod db;

// Kubernetes integration
#[cfg(feature = "kubernetes")]
pub mod kubernetes;

// HTTP surface
pub mod routes;
pub mod shutdown;
