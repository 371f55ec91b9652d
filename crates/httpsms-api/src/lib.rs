//! httpsms API server library.
//!
//! The binary in `main.rs` reads [`config::Config`], sets up
//! [`telemetry`], and hands a connection pool to
//! [`container::Container::build`], which wires repositories, the event
//! dispatcher, services and listener groups and exposes the router.

pub mod config;
pub mod container;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validators;
