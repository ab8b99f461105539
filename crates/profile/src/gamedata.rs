//! Default game data
//!
//! Collections that reconcile against a canonical set get it from a
//! [`GameData`] implementation. Every method must be a pure function of the
//! implementation: the same call always yields the same records.

use crate::records::EngramEntry;

/// Number of character stats the per-level multiplier arrays cover
pub const STAT_COUNT: usize = 12;

/// Which per-level stat multiplier array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatMultiplierKind {
    Player,
    DinoWild,
    DinoTamed,
    DinoTamedAdd,
    DinoTamedAffinity,
}

impl StatMultiplierKind {
    pub const ALL: [StatMultiplierKind; 5] = [
        StatMultiplierKind::Player,
        StatMultiplierKind::DinoWild,
        StatMultiplierKind::DinoTamed,
        StatMultiplierKind::DinoTamedAdd,
        StatMultiplierKind::DinoTamedAffinity,
    ];

    /// INI key of the array
    pub fn key(&self) -> &'static str {
        match self {
            Self::Player => "PerLevelStatsMultiplier_Player",
            Self::DinoWild => "PerLevelStatsMultiplier_DinoWild",
            Self::DinoTamed => "PerLevelStatsMultiplier_DinoTamed",
            Self::DinoTamedAdd => "PerLevelStatsMultiplier_DinoTamed_Add",
            Self::DinoTamedAffinity => "PerLevelStatsMultiplier_DinoTamed_Affinity",
        }
    }
}

/// Source of canonical default records
pub trait GameData: Send + Sync {
    /// Every engram with its stock level requirement and cost
    fn engrams(&self) -> Vec<EngramEntry>;

    /// Stock per-level multipliers, [`STAT_COUNT`] values
    fn stat_multipliers(&self, kind: StatMultiplierKind) -> Vec<f32>;
}

/// A small compiled-in catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinGameData;

const ENGRAMS: &[(&str, i32, i32)] = &[
    ("EngramEntry_Campfire_C", 2, 3),
    ("EngramEntry_StonePick_C", 1, 0),
    ("EngramEntry_Spear_C", 3, 2),
    ("EngramEntry_ThatchFloor_C", 3, 3),
    ("EngramEntry_Torch_C", 3, 3),
    ("EngramEntry_StoneHatchet_C", 2, 3),
    ("EngramEntry_Bow_C", 15, 12),
    ("EngramEntry_Sleeping_Bag_C", 10, 6),
    ("EngramEntry_MortarAndPestle_C", 10, 6),
    ("EngramEntry_Forge_C", 20, 15),
    ("EngramEntry_Smithy_C", 20, 15),
    ("EngramEntry_MetalPick_C", 20, 10),
];

const TAMED: [f32; STAT_COUNT] = [0.2, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.17, 1.0, 1.0, 1.0];
const TAMED_ADD: [f32; STAT_COUNT] = [0.14, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.14, 1.0, 1.0, 1.0];
const TAMED_AFFINITY: [f32; STAT_COUNT] = [0.44, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.44, 1.0, 1.0, 1.0];

impl GameData for BuiltinGameData {
    fn engrams(&self) -> Vec<EngramEntry> {
        ENGRAMS
            .iter()
            .map(|&(class_name, level, cost)| EngramEntry::new(class_name, level, cost))
            .collect()
    }

    fn stat_multipliers(&self, kind: StatMultiplierKind) -> Vec<f32> {
        match kind {
            StatMultiplierKind::Player | StatMultiplierKind::DinoWild => vec![1.0; STAT_COUNT],
            StatMultiplierKind::DinoTamed => TAMED.to_vec(),
            StatMultiplierKind::DinoTamedAdd => TAMED_ADD.to_vec(),
            StatMultiplierKind::DinoTamedAffinity => TAMED_AFFINITY.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_stable() {
        let data = BuiltinGameData;
        assert_eq!(data.engrams(), data.engrams());
        assert!(data.engrams().iter().all(|engram| !engram.save_override));
        for kind in StatMultiplierKind::ALL {
            assert_eq!(data.stat_multipliers(kind).len(), STAT_COUNT);
        }
    }
}
