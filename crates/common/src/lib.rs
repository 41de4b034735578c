//! Shared types for the Drive migration workspace

mod secret;
mod error;

pub use secret::Secret;
pub use error::{Error, Result};
