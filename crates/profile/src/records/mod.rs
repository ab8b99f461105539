//! Aggregate record types stored in the server's INI files

mod class_multiplier;
mod engram;
mod npc_spawn;
mod stack_size;
mod supply_crate;

pub use class_multiplier::ClassMultiplier;
pub use engram::EngramEntry;
pub use npc_spawn::{NpcSpawnContainer, NpcSpawnEntry, NpcSpawnLimit};
pub use stack_size::{StackQuantity, StackSizeOverride};
pub use supply_crate::{SupplyCrateItemEntry, SupplyCrateItemSet, SupplyCrateOverride};
