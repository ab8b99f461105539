//! Collections bound to a single INI key
//!
//! Two kinds of collection back the settings model:
//!
//! - [`AggregateRecordList`]: one aggregate value per line, `Key=(...)`,
//!   reconciled against an optional default set on load.
//! - [`ScalarValueList`]: primitives, either repeated `Key=value` lines or
//!   indexed `Key[i]=value` lines.
//!
//! Collections are owned by one settings object and mutated only during an
//! explicit load or save; they are not synchronised.

use crate::error::{Result, SettingsError};
use crate::reconcile::reconcile;
use crate::schema::AggregateRecord;
use asm_core::IniScalar;
use asm_ini::Entry;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A collection the binding layer can load from and write to a section
pub trait IniCollection: Send + Sync {
    /// Replace contents from the section lines stored under `key`
    fn from_ini_values(&mut self, key: &str, lines: &[String]) -> Result<()>;

    /// `key=value` lines to write; empty when disabled
    fn to_ini_values(&self, key: &str) -> Vec<String>;

    fn is_enabled(&self) -> bool;
}

/// Pure function yielding the canonical records of a collection
pub type DefaultProvider<R> = Arc<dyn Fn() -> Vec<R> + Send + Sync>;

pub struct AggregateRecordList<R: AggregateRecord> {
    items: Vec<R>,
    defaults: Option<DefaultProvider<R>>,
    enabled: bool,
}

impl<R: AggregateRecord> fmt::Debug for AggregateRecordList<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateRecordList")
            .field("items", &self.items)
            .field("has_defaults", &self.defaults.is_some())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl<R: AggregateRecord> Default for AggregateRecordList<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AggregateRecord> AggregateRecordList<R> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            defaults: None,
            enabled: false,
        }
    }

    /// A list seeded from, and reconciled against, a default provider
    pub fn with_defaults(provider: DefaultProvider<R>) -> Self {
        let mut list = Self {
            items: Vec::new(),
            defaults: Some(provider),
            enabled: false,
        };
        list.reset();
        list
    }

    /// Back to the default set (or empty without a provider)
    pub fn reset(&mut self) {
        let parsed = Vec::new();
        self.apply(parsed);
    }

    fn apply(&mut self, parsed: Vec<R>) {
        let provider = self.defaults.as_deref();
        let result = reconcile(
            parsed,
            provider.map(|provider| provider as &dyn Fn() -> Vec<R>),
            R::is_equivalent,
            R::update_from,
            R::sort_key,
        );
        debug!(
            "Reconciled {}: {} item(s), {} added, {} updated",
            std::any::type_name::<R>(),
            result.items.len(),
            result.added,
            result.updated
        );
        self.items = result.items;
        self.enabled = result.enabled;
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<R> {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a record, enabling the list
    pub fn push(&mut self, record: R) {
        self.items.push(record);
        self.enabled = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.enabled = false;
    }

    pub fn find(&self, equivalence_key: &str) -> Option<&R> {
        self.items
            .iter()
            .find(|item| item.equivalence_key().eq_ignore_ascii_case(equivalence_key))
    }

    pub fn find_mut(&mut self, equivalence_key: &str) -> Option<&mut R> {
        self.items
            .iter_mut()
            .find(|item| item.equivalence_key().eq_ignore_ascii_case(equivalence_key))
    }
}

impl<R: AggregateRecord> IniCollection for AggregateRecordList<R> {
    fn from_ini_values(&mut self, key: &str, lines: &[String]) -> Result<()> {
        let defaults = self
            .defaults
            .as_deref()
            .map(|provider| provider())
            .unwrap_or_default();

        let mut parsed = Vec::new();
        for entry in lines.iter().map(|line| Entry::parse(line)) {
            if !entry.key.eq_ignore_ascii_case(key) {
                continue;
            }
            let record = R::from_ini_value(key, &entry.value)?;
            // A partial override of a default keeps the default's other fields.
            let record = match defaults.iter().find(|default| default.is_equivalent(&record)) {
                Some(default) => R::parse_onto(default.clone(), key, &entry.value)?,
                None => record,
            };
            parsed.push(record);
        }

        self.apply(parsed);
        Ok(())
    }

    fn to_ini_values(&self, key: &str) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| item.should_write())
            .map(|item| format!("{}={}", key, item.to_ini_value()))
            .collect()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Serialized layout of a scalar list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `Key=a`, `Key=b`, ...
    Flat,
    /// `Key[0]=a`, `Key[2]=c`, ...; only included indices are written
    Array,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValueList<T: IniScalar> {
    shape: ListShape,
    items: Vec<T>,
    /// Array shape only: which indices are written
    included: Vec<bool>,
    defaults: Vec<T>,
}

impl<T: IniScalar> ScalarValueList<T> {
    pub fn flat() -> Self {
        Self {
            shape: ListShape::Flat,
            items: Vec::new(),
            included: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Fixed-size array seeded with `defaults`, nothing included
    pub fn array(defaults: Vec<T>) -> Self {
        Self {
            shape: ListShape::Array,
            included: vec![false; defaults.len()],
            items: defaults.clone(),
            defaults,
        }
    }

    pub fn shape(&self) -> ListShape {
        self.shape
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn included(&self) -> &[bool] {
        &self.included
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Flat shape: append a value
    pub fn push(&mut self, value: T) {
        self.items.push(value);
        if self.shape == ListShape::Array {
            self.included.push(true);
        }
    }

    /// Set a value and include it; out-of-range indices are ignored
    pub fn set(&mut self, index: usize, value: T) {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = value;
            if let Some(flag) = self.included.get_mut(index) {
                *flag = true;
            }
        }
    }

    /// Array shape: stop writing an index without changing its value
    pub fn set_included(&mut self, index: usize, included: bool) {
        if let Some(flag) = self.included.get_mut(index) {
            *flag = included;
        }
    }

    pub fn reset(&mut self) {
        self.items = self.defaults.clone();
        self.included = match self.shape {
            ListShape::Flat => Vec::new(),
            ListShape::Array => vec![false; self.defaults.len()],
        };
    }

    fn index_of(entry_key: &str, key: &str) -> Option<usize> {
        if !entry_key.get(..key.len())?.eq_ignore_ascii_case(key) {
            return None;
        }
        let suffix = entry_key.get(key.len()..)?;
        suffix
            .strip_prefix('[')?
            .strip_suffix(']')?
            .trim()
            .parse()
            .ok()
    }
}

impl<T: IniScalar + Send + Sync> IniCollection for ScalarValueList<T> {
    fn from_ini_values(&mut self, key: &str, lines: &[String]) -> Result<()> {
        self.reset();

        for line in lines {
            let entry = Entry::parse(line);
            let value = || T::from_ini(&entry.value).map_err(|err| SettingsError::scalar(&entry.key, err));

            match self.shape {
                ListShape::Flat => {
                    if entry.key.eq_ignore_ascii_case(key) {
                        self.items.push(value()?);
                    }
                }
                ListShape::Array => match Self::index_of(&entry.key, key) {
                    Some(index) if index < self.items.len() => {
                        self.items[index] = value()?;
                        self.included[index] = true;
                    }
                    Some(index) => {
                        warn!("{}: index {} beyond {} slots, ignored", key, index, self.items.len());
                    }
                    None => {
                        warn!("{}: expected an indexed key, got {}", key, entry.key);
                    }
                },
            }
        }

        Ok(())
    }

    fn to_ini_values(&self, key: &str) -> Vec<String> {
        match self.shape {
            ListShape::Flat => self
                .items
                .iter()
                .map(|item| format!("{}={}", key, item.to_ini()))
                .collect(),
            ListShape::Array => self
                .items
                .iter()
                .zip(&self.included)
                .enumerate()
                .filter(|(_, (_, included))| **included)
                .map(|(index, (item, _))| format!("{}[{}]={}", key, index, item.to_ini()))
                .collect(),
        }
    }

    fn is_enabled(&self) -> bool {
        match self.shape {
            ListShape::Flat => !self.items.is_empty(),
            ListShape::Array => self.included.iter().any(|included| *included),
        }
    }
}
