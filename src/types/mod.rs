//! Type definitions

pub mod lead;
pub mod messages;
pub mod route;
pub mod search;

pub use lead::*;
pub use messages::*;
pub use route::*;
pub use search::*;
