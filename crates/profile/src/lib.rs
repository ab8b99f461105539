//! # ASM Profile
//!
//! The settings facade for one ARK server instance.
//!
//! ## Features
//! - [`ServerProfile`]: typed settings bound to `GameUserSettings.ini` and `Game.ini`
//! - Aggregate record types (class multipliers, engram overrides, NPC spawn
//!   containers, supply crates, stack sizes)
//! - Default game data for reconciling collections on load
//! - JSON profile metadata for settings outside the INI files
//!
//! ## Usage
//!
//! ```rust,ignore
//! let layout = IniLayout::for_install_dir(Path::new("/srv/ark"));
//! let mut profile = ServerProfile::load(&layout)?;
//! profile.max_players = 40;
//! profile.save(&layout).await?;
//! ```

pub mod error;
pub mod gamedata;
pub mod metadata;
pub mod profile;
pub mod records;

pub use error::{ProfileError, Result};
pub use gamedata::{BuiltinGameData, GameData, StatMultiplierKind, STAT_COUNT};
pub use metadata::ProfileMetadata;
pub use profile::{bindings, load_shared, save_shared, ServerProfile, SharedProfile};
pub use records::*;
