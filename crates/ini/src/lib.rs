//! # ASM INI Store
//!
//! Flat key/value storage for the server's INI files.
//!
//! ## Features
//! - Line tokenizer (blank, comment, section header, key/value)
//! - In-memory documents with ordered, duplicate-preserving sections
//! - Per-file session buffering with a concurrent flush to disk
//!
//! ## File Format
//!
//! ```text
//! [ServerSettings]
//! DifficultyOffset=0.2
//! PerLevelStatsMultiplier_Player[0]=1.5
//!
//! [/script/shootergame.shootergamemode]
//! OverridePlayerLevelEngramPoints=5
//! OverridePlayerLevelEngramPoints=7
//! ```
//!
//! Section names and keys compare case-insensitively. Comments are
//! recognised but not retained.

pub mod document;
pub mod error;
pub mod layout;
pub mod session;
pub mod tokenizer;

pub use document::{is_collection_key, Entry, IniDocument, Section};
pub use error::{IniError, Result};
pub use layout::IniLayout;
pub use session::IniSession;
pub use tokenizer::{tokenize, Line};
