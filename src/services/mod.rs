//! Business logic services

pub mod batch;
pub mod geo;
pub mod geocoding;
pub mod links;
pub mod locations;
pub mod optimizer;
pub mod places;
pub mod planner;
pub mod search;
pub mod session_store;
