//! ASM Core - shared types, errors and invariant-culture scalar handling

mod error;
mod scalar;
mod types;

pub use error::*;
pub use scalar::*;
pub use types::*;
