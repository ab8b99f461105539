//! NPC spawn container overrides
//!
//! ```text
//! ConfigAddNPCSpawnEntriesContainer=(NPCSpawnEntriesContainerClassString="DinoSpawnEntriesBeach_C",NPCSpawnEntries=((AnEntryName="Raptors",EntryWeight=0.5,NPCsToSpawnStrings=("Raptor_Character_BP_C"))),NPCSpawnLimits=((NPCClassString="Raptor_Character_BP_C",MaxPercentageOfDesiredNumToAllow=0.2)))
//! ```
//!
//! The same record is used under the add, subtract and override keys.

use asm_settings::{AggregateRecord, FieldOptions, Schema};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct NpcSpawnEntry {
    pub entry_name: String,
    pub entry_weight: f32,
    pub npcs_to_spawn: Vec<String>,
}

impl Default for NpcSpawnEntry {
    fn default() -> Self {
        Self {
            entry_name: String::new(),
            entry_weight: 1.0,
            npcs_to_spawn: Vec::new(),
        }
    }
}

impl AggregateRecord for NpcSpawnEntry {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<NpcSpawnEntry>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text("AnEntryName", FieldOptions::QUOTED, |r| r.entry_name.as_str(), |r, v| r.entry_name = v)
                .float("EntryWeight", |r| r.entry_weight, |r, v| r.entry_weight = v)
                .text_list(
                    "NPCsToSpawnStrings",
                    FieldOptions::QUOTED,
                    |r| r.npcs_to_spawn.as_slice(),
                    |r, v| r.npcs_to_spawn = v,
                )
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.entry_name.clone()
    }

    fn sort_key(&self) -> String {
        self.entry_name.clone()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.entry_weight = parsed.entry_weight;
        self.npcs_to_spawn = parsed.npcs_to_spawn.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcSpawnLimit {
    pub npc_class: String,
    pub max_percentage: f32,
}

impl Default for NpcSpawnLimit {
    fn default() -> Self {
        Self {
            npc_class: String::new(),
            max_percentage: 1.0,
        }
    }
}

impl AggregateRecord for NpcSpawnLimit {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<NpcSpawnLimit>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text("NPCClassString", FieldOptions::QUOTED, |r| r.npc_class.as_str(), |r, v| r.npc_class = v)
                .float(
                    "MaxPercentageOfDesiredNumToAllow",
                    |r| r.max_percentage,
                    |r, v| r.max_percentage = v,
                )
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.npc_class.clone()
    }

    fn sort_key(&self) -> String {
        self.npc_class.clone()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.max_percentage = parsed.max_percentage;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NpcSpawnContainer {
    pub container_class: String,
    pub entries: Vec<NpcSpawnEntry>,
    pub limits: Vec<NpcSpawnLimit>,
}

impl AggregateRecord for NpcSpawnContainer {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<NpcSpawnContainer>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text(
                    "NPCSpawnEntriesContainerClassString",
                    FieldOptions::QUOTED,
                    |r| r.container_class.as_str(),
                    |r, v| r.container_class = v,
                )
                .records("NPCSpawnEntries", FieldOptions::PLAIN, |r| r.entries.as_slice(), |r, v| r.entries = v)
                .records("NPCSpawnLimits", FieldOptions::PLAIN, |r| r.limits.as_slice(), |r, v| r.limits = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.container_class.clone()
    }

    fn sort_key(&self) -> String {
        self.container_class.clone()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.entries = parsed.entries.clone();
        self.limits = parsed.limits.clone();
    }
}
