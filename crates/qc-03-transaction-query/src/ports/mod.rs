//! # Ports Layer
//!
//! Hexagonal architecture ports (interfaces) for the Transaction Query subsystem.
//!
//! - **Driving Ports (Inbound)**: APIs consumed by adapters (the API handler)
//! - **Driven Ports (Outbound)**: SPIs implemented by adapters (pool store, response cache)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
