//! Structured settings codec
//!
//! Turns typed settings into INI entries and back:
//!
//! - [`value`]: the paren/comma grammar of aggregate values
//! - [`schema`]: per-record field tables driving the aggregate codec
//! - [`reconcile`]: merging reloaded records with a default set
//! - [`collections`]: record lists and scalar lists bound to one key
//! - [`custom`]: passthrough for unknown sections
//! - [`binding`]: field to (file, section, key) tables for whole objects

pub mod binding;
pub mod collections;
pub mod custom;
pub mod error;
pub mod reconcile;
pub mod schema;
pub mod value;

pub use binding::{Binding, BindingFlags, BindingTable, BindingTableBuilder, Condition, Property};
pub use collections::{AggregateRecordList, DefaultProvider, IniCollection, ListShape, ScalarValueList};
pub use custom::{CustomSection, CustomSections};
pub use error::{Result, SettingsError};
pub use reconcile::{reconcile, Reconciled};
pub use schema::{AggregateRecord, FieldOptions, ListStyle, Schema, SchemaBuilder};
pub use value::{AggregateValue, MalformedValue};
