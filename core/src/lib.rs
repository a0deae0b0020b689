//! Issue and redeem one-time codes organized into packs.
//!
//! Each pack is a directory under the registry root holding a `pack.json`
//! metadata file and a redb key store mapping every code to Ready or Used.

pub mod core;
pub mod error;
pub mod keygen;
pub mod types;

pub use crate::core::key_store::error::KeyStoreError;
pub use crate::core::pack::{Pack, PackInfoError};
pub use crate::core::Registry;
pub use error::{CdkeyError, ErrorBody, ErrorKind, Result};
