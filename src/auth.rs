//! Credential material: redacted secrets, the per-transaction credential pair, and the shared
//! handle that serializes refreshes.

pub mod secret;
pub mod shared;
pub mod tokens;

pub use secret::*;
pub use shared::*;
pub use tokens::*;
