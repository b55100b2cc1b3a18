//! The central domain types and interface definitions for the board.

pub mod auth;
pub mod error;
pub mod models;
pub mod policy;
pub mod role;
pub mod traits;

// Re-exporting for easier access in other crates
pub use auth::*;
pub use error::*;
pub use models::*;
pub use policy::*;
pub use role::*;
pub use traits::*;
