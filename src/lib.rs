//! Lead Route Worker - lead search and visiting-route planning
//!
//! Core planning (distance, nearest-neighbor ordering, batching, links) is
//! synchronous and lives in `services`; `handlers` exposes it over NATS.

pub mod cli;
pub mod commands;
pub mod config;
pub mod defaults;
pub mod error;
pub mod handlers;
pub mod services;
pub mod types;
