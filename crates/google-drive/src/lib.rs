//! Minimal Google Drive v3 client
//!
//! Covers the single Drive call the migration service performs: copying one
//! file into a destination folder with the end user's OAuth access token.
//! A copy creates a new file every time it runs, so nothing here retries,
//! dedupes, or rolls back.

pub mod copy;
pub mod error;

pub use copy::{CopiedFile, DriveClient};
pub use error::{Error, Result};
