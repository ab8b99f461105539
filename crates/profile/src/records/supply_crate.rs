//! Supply crate loot overrides
//!
//! The deepest structure the game reads: a crate holds item sets, an item
//! set holds entries, and an entry holds two parallel scalar lists.
//!
//! ```text
//! ConfigOverrideSupplyCrateItems=(SupplyCrateClassString="SupplyCrate_Cave_QualityTier1_C",MinItemSets=1.0,MaxItemSets=1.0,NumItemSetsPower=1.0,bSetsRandomWithoutReplacement=True,bAppendItemSets=False,ItemSets=((MinNumItems=1.0,MaxNumItems=1.0,NumItemsPower=1.0,SetWeight=1.0,bItemsRandomWithoutReplacement=True,ItemEntries=((EntryWeight=1.0,ItemClassStrings=("PrimalItem_WeaponBow_C"),ItemsWeights=(1.0),MinQuantity=1.0,MaxQuantity=1.0,MinQuality=1.0,MaxQuality=1.0,bForceBlueprint=False,ChanceToBeBlueprintOverride=0.0)))))
//! ```

use asm_settings::{AggregateRecord, FieldOptions, Schema};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCrateItemEntry {
    pub entry_weight: f32,
    pub item_classes: Vec<String>,
    pub item_weights: Vec<f32>,
    pub min_quantity: f32,
    pub max_quantity: f32,
    pub min_quality: f32,
    pub max_quality: f32,
    pub force_blueprint: bool,
    pub chance_to_be_blueprint: f32,
}

impl Default for SupplyCrateItemEntry {
    fn default() -> Self {
        Self {
            entry_weight: 1.0,
            item_classes: Vec::new(),
            item_weights: Vec::new(),
            min_quantity: 1.0,
            max_quantity: 1.0,
            min_quality: 1.0,
            max_quality: 1.0,
            force_blueprint: false,
            chance_to_be_blueprint: 0.0,
        }
    }
}

impl AggregateRecord for SupplyCrateItemEntry {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SupplyCrateItemEntry>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .float("EntryWeight", |r| r.entry_weight, |r, v| r.entry_weight = v)
                .text_list(
                    "ItemClassStrings",
                    FieldOptions::QUOTED,
                    |r| r.item_classes.as_slice(),
                    |r, v| r.item_classes = v,
                )
                .float_list(
                    "ItemsWeights",
                    FieldOptions::PLAIN,
                    |r| r.item_weights.as_slice(),
                    |r, v| r.item_weights = v,
                )
                .float("MinQuantity", |r| r.min_quantity, |r, v| r.min_quantity = v)
                .float("MaxQuantity", |r| r.max_quantity, |r, v| r.max_quantity = v)
                .float("MinQuality", |r| r.min_quality, |r, v| r.min_quality = v)
                .float("MaxQuality", |r| r.max_quality, |r, v| r.max_quality = v)
                .bool("bForceBlueprint", |r| r.force_blueprint, |r, v| r.force_blueprint = v)
                .float(
                    "ChanceToBeBlueprintOverride",
                    |r| r.chance_to_be_blueprint,
                    |r, v| r.chance_to_be_blueprint = v,
                )
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.item_classes.join(",")
    }

    fn sort_key(&self) -> String {
        String::new()
    }

    fn update_from(&mut self, parsed: &Self) {
        *self = parsed.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCrateItemSet {
    pub min_num_items: f32,
    pub max_num_items: f32,
    pub num_items_power: f32,
    pub set_weight: f32,
    pub items_random_without_replacement: bool,
    pub entries: Vec<SupplyCrateItemEntry>,
}

impl Default for SupplyCrateItemSet {
    fn default() -> Self {
        Self {
            min_num_items: 1.0,
            max_num_items: 1.0,
            num_items_power: 1.0,
            set_weight: 1.0,
            items_random_without_replacement: true,
            entries: Vec::new(),
        }
    }
}

impl AggregateRecord for SupplyCrateItemSet {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SupplyCrateItemSet>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .float("MinNumItems", |r| r.min_num_items, |r, v| r.min_num_items = v)
                .float("MaxNumItems", |r| r.max_num_items, |r, v| r.max_num_items = v)
                .float("NumItemsPower", |r| r.num_items_power, |r, v| r.num_items_power = v)
                .float("SetWeight", |r| r.set_weight, |r, v| r.set_weight = v)
                .bool(
                    "bItemsRandomWithoutReplacement",
                    |r| r.items_random_without_replacement,
                    |r, v| r.items_random_without_replacement = v,
                )
                .records("ItemEntries", FieldOptions::PLAIN, |r| r.entries.as_slice(), |r, v| r.entries = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        String::new()
    }

    fn sort_key(&self) -> String {
        String::new()
    }

    fn update_from(&mut self, parsed: &Self) {
        *self = parsed.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCrateOverride {
    pub crate_class: String,
    pub min_item_sets: f32,
    pub max_item_sets: f32,
    pub num_item_sets_power: f32,
    pub sets_random_without_replacement: bool,
    /// Add to the crate's own sets instead of replacing them
    pub append_item_sets: bool,
    pub item_sets: Vec<SupplyCrateItemSet>,
}

impl Default for SupplyCrateOverride {
    fn default() -> Self {
        Self {
            crate_class: String::new(),
            min_item_sets: 1.0,
            max_item_sets: 1.0,
            num_item_sets_power: 1.0,
            sets_random_without_replacement: true,
            append_item_sets: false,
            item_sets: Vec::new(),
        }
    }
}

impl AggregateRecord for SupplyCrateOverride {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SupplyCrateOverride>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text(
                    "SupplyCrateClassString",
                    FieldOptions::QUOTED,
                    |r| r.crate_class.as_str(),
                    |r, v| r.crate_class = v,
                )
                .float("MinItemSets", |r| r.min_item_sets, |r, v| r.min_item_sets = v)
                .float("MaxItemSets", |r| r.max_item_sets, |r, v| r.max_item_sets = v)
                .float("NumItemSetsPower", |r| r.num_item_sets_power, |r, v| r.num_item_sets_power = v)
                .bool(
                    "bSetsRandomWithoutReplacement",
                    |r| r.sets_random_without_replacement,
                    |r, v| r.sets_random_without_replacement = v,
                )
                .bool("bAppendItemSets", |r| r.append_item_sets, |r, v| r.append_item_sets = v)
                .records("ItemSets", FieldOptions::PLAIN, |r| r.item_sets.as_slice(), |r, v| r.item_sets = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.crate_class.clone()
    }

    fn sort_key(&self) -> String {
        self.crate_class.clone()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.min_item_sets = parsed.min_item_sets;
        self.max_item_sets = parsed.max_item_sets;
        self.num_item_sets_power = parsed.num_item_sets_power;
        self.sets_random_without_replacement = parsed.sets_random_without_replacement;
        self.append_item_sets = parsed.append_item_sets;
        self.item_sets = parsed.item_sets.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cave_crate() -> SupplyCrateOverride {
        SupplyCrateOverride {
            crate_class: "SupplyCrate_Cave_QualityTier1_C".into(),
            min_item_sets: 1.0,
            max_item_sets: 2.0,
            item_sets: vec![SupplyCrateItemSet {
                set_weight: 0.5,
                entries: vec![
                    SupplyCrateItemEntry {
                        item_classes: vec!["PrimalItem_WeaponBow_C".into(), "PrimalItemAmmo_ArrowStone_C".into()],
                        item_weights: vec![1.0, 0.25],
                        min_quality: 2.0,
                        max_quality: 5.5,
                        ..Default::default()
                    },
                    SupplyCrateItemEntry {
                        item_classes: vec!["PrimalItemResource_Wood_C".into()],
                        item_weights: vec![1.0],
                        max_quantity: 20.0,
                        force_blueprint: true,
                        chance_to_be_blueprint: 0.1,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_serialize_nested_sets() {
        let text = cave_crate().to_ini_value();
        assert_eq!(
            text,
            "(SupplyCrateClassString=\"SupplyCrate_Cave_QualityTier1_C\",MinItemSets=1.0,MaxItemSets=2.0,\
             NumItemSetsPower=1.0,bSetsRandomWithoutReplacement=True,bAppendItemSets=False,\
             ItemSets=((MinNumItems=1.0,MaxNumItems=1.0,NumItemsPower=1.0,SetWeight=0.5,bItemsRandomWithoutReplacement=True,\
             ItemEntries=((EntryWeight=1.0,ItemClassStrings=(\"PrimalItem_WeaponBow_C\",\"PrimalItemAmmo_ArrowStone_C\"),\
             ItemsWeights=(1.0,0.25),MinQuantity=1.0,MaxQuantity=1.0,MinQuality=2.0,MaxQuality=5.5,bForceBlueprint=False,\
             ChanceToBeBlueprintOverride=0.0),\
             (EntryWeight=1.0,ItemClassStrings=(\"PrimalItemResource_Wood_C\"),ItemsWeights=(1.0),MinQuantity=1.0,\
             MaxQuantity=20.0,MinQuality=1.0,MaxQuality=1.0,bForceBlueprint=True,ChanceToBeBlueprintOverride=0.1)))))"
        );
    }

    #[test]
    fn test_round_trip() {
        let record = cave_crate();
        let parsed =
            SupplyCrateOverride::from_ini_value("ConfigOverrideSupplyCrateItems", &record.to_ini_value()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_quantity_and_quality_fields_stay_apart() {
        let entry = SupplyCrateItemEntry::from_ini_value(
            "ItemEntries",
            "(MinQuantity=3.0,MinQuality=7.0,MaxQuantity=4.0,MaxQuality=8.0)",
        )
        .unwrap();
        assert_eq!((entry.min_quantity, entry.min_quality), (3.0, 7.0));
        assert_eq!((entry.max_quantity, entry.max_quality), (4.0, 8.0));
    }

    #[test]
    fn test_malformed_crate_is_rejected() {
        let result = SupplyCrateOverride::from_ini_value(
            "ConfigOverrideSupplyCrateItems",
            "(SupplyCrateClassString=\"Crate_C\",ItemSets=((SetWeight=1.0)",
        );
        assert!(result.is_err());
    }
}
