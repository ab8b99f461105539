//! Engram overrides
//!
//! ```text
//! OverrideNamedEngramEntries=(EngramClassName="EngramEntry_Campfire_C",EngramHidden=False,EngramPointsCost=3,EngramLevelRequirement=2,RemoveEngramPreReq=False)
//! ```
//!
//! The full engram catalog is kept in memory so entries can be edited, but
//! only the ones marked as overridden are written back.

use asm_settings::{AggregateRecord, FieldOptions, Result, Schema};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngramEntry {
    pub engram_class_name: String,
    pub hidden: bool,
    pub points_cost: i32,
    pub level_requirement: i32,
    pub remove_prereq: bool,
    /// Written to the file only when set; not part of the INI value
    pub save_override: bool,
}

impl EngramEntry {
    pub fn new(engram_class_name: impl Into<String>, level_requirement: i32, points_cost: i32) -> Self {
        Self {
            engram_class_name: engram_class_name.into(),
            level_requirement,
            points_cost,
            ..Default::default()
        }
    }
}

impl AggregateRecord for EngramEntry {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<EngramEntry>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::builder()
                .text(
                    "EngramClassName",
                    FieldOptions::QUOTED,
                    |r| r.engram_class_name.as_str(),
                    |r, v| r.engram_class_name = v,
                )
                .bool("EngramHidden", |r| r.hidden, |r, v| r.hidden = v)
                .int("EngramPointsCost", |r| r.points_cost, |r, v| r.points_cost = v)
                .int("EngramLevelRequirement", |r| r.level_requirement, |r, v| r.level_requirement = v)
                .bool("RemoveEngramPreReq", |r| r.remove_prereq, |r, v| r.remove_prereq = v)
                .build()
        })
    }

    fn equivalence_key(&self) -> String {
        self.engram_class_name.clone()
    }

    fn sort_key(&self) -> String {
        format!("{:05}{}", self.level_requirement.max(0), self.engram_class_name)
    }

    fn update_from(&mut self, parsed: &Self) {
        self.hidden = parsed.hidden;
        self.points_cost = parsed.points_cost;
        self.level_requirement = parsed.level_requirement;
        self.remove_prereq = parsed.remove_prereq;
        self.save_override = true;
    }

    fn should_write(&self) -> bool {
        self.save_override
    }

    /// Anything present in the file is an override
    fn parse_onto(base: Self, key: &str, text: &str) -> Result<Self> {
        let mut entry = Self::schema().parse_onto(key, text, base)?;
        entry.save_override = true;
        Ok(entry)
    }
}
