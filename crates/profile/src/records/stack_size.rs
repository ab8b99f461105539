//! Item stack size overrides
//!
//! ```text
//! ConfigOverrideItemMaxQuantity=(ItemClassString="PrimalItemResource_Stone_C",Quantity=(MaxItemQuantity=1000,bIgnoreMultiplier=True))
//! ```

use asm_settings::{AggregateRecord, FieldOptions, Schema};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct StackQuantity {
    pub max_item_quantity: i32,
    pub ignore_multiplier: bool,
}

impl Default for StackQuantity {
    fn default() -> Self {
        Self {
            max_item_quantity: 1,
            ignore_multiplier: true,
        }
    }
}

impl AggregateRecord for StackQuantity {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<StackQuantity>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .int("MaxItemQuantity", |r| r.max_item_quantity, |r, v| r.max_item_quantity = v)
                .bool("bIgnoreMultiplier", |r| r.ignore_multiplier, |r, v| r.ignore_multiplier = v)
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackSizeOverride {
    pub item_class: String,
    pub quantity: StackQuantity,
}

impl StackSizeOverride {
    pub fn new(item_class: impl Into<String>, max_item_quantity: i32) -> Self {
        Self {
            item_class: item_class.into(),
            quantity: StackQuantity {
                max_item_quantity,
                ..Default::default()
            },
        }
    }
}

impl AggregateRecord for StackSizeOverride {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<StackSizeOverride>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text("ItemClassString", FieldOptions::QUOTED, |r| r.item_class.as_str(), |r, v| r.item_class = v)
                .record("Quantity", |r| &r.quantity, |r, v| r.quantity = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.item_class.clone()
    }

    fn sort_key(&self) -> String {
        self.item_class.clone()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.quantity = parsed.quantity.clone();
    }
}
