//! Request handlers.

pub mod health;
pub mod potholes;

pub use health::*;
pub use potholes::*;
