//! Per-class multipliers
//!
//! ```text
//! DinoClassDamageMultipliers=(ClassName="Raptor_Character_BP_C",Multiplier=2.0)
//! HarvestResourceItemAmountClassMultipliers=(ClassName="PrimalItemResource_Wood_C",Multiplier=1.5)
//! ```

use asm_settings::{AggregateRecord, FieldOptions, Schema};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMultiplier {
    pub class_name: String,
    pub multiplier: f32,
}

impl Default for ClassMultiplier {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            multiplier: 1.0,
        }
    }
}

impl ClassMultiplier {
    pub fn new(class_name: impl Into<String>, multiplier: f32) -> Self {
        Self {
            class_name: class_name.into(),
            multiplier,
        }
    }
}

impl AggregateRecord for ClassMultiplier {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ClassMultiplier>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text("ClassName", FieldOptions::QUOTED, |r| r.class_name.as_str(), |r, v| r.class_name = v)
                .float("Multiplier", |r| r.multiplier, |r, v| r.multiplier = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.class_name.clone()
    }

    fn sort_key(&self) -> String {
        self.class_name.to_ascii_lowercase()
    }

    fn update_from(&mut self, parsed: &Self) {
        self.multiplier = parsed.multiplier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let record = ClassMultiplier::new("Raptor_Character_BP_C", 2.5);
        let text = record.to_ini_value();
        assert_eq!(text, "(ClassName=\"Raptor_Character_BP_C\",Multiplier=2.5)");
        assert_eq!(ClassMultiplier::from_ini_value("DinoClassDamageMultipliers", &text).unwrap(), record);
    }

    #[test]
    fn test_class_name_with_quote_round_trips() {
        let record = ClassMultiplier::new("Weird\"Name_C", 2.0);
        let text = record.to_ini_value();
        assert_eq!(text, "(ClassName=\"Weird\\\"Name_C\",Multiplier=2.0)");
        assert_eq!(ClassMultiplier::from_ini_value("DinoClassDamageMultipliers", &text).unwrap(), record);
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        let record = ClassMultiplier::from_ini_value("X", "(ClassName=\"Rex_Character_BP_C\")").unwrap();
        assert_eq!(record.multiplier, 1.0);
    }
}
