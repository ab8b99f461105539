//! Property bindings
//!
//! A [`BindingTable`] maps fields of a settings object onto (file, section,
//! key) locations. It is declared once per settings type, next to the type,
//! and drives both [`BindingTable::deserialize`] and
//! [`BindingTable::serialize`].
//!
//! ```rust,ignore
//! BindingTable::<ServerProfile>::builder()
//!     .int(IniSection::ServerSettings, "MaxPlayers", |p| p.max_players, |p, v| p.max_players = v)
//!     .bool(IniSection::ServerSettings, "bDisableStructureDecayPvE", |p| p.structure_decay, |p, v| p.structure_decay = v)
//!     .invert()
//!     .text(IniSection::MessageOfTheDay, "Message", |p| p.motd.as_str(), |p, v| p.motd = v)
//!     .multiline()
//!     .clear_section()
//!     .conditioned_on(|p| p.motd_enabled, |p, v| p.motd_enabled = v)
//!     .build()
//! ```
//!
//! Absent keys leave scalar fields at their defaults. Collections are loaded
//! from every `Key=` and `Key[i]=` line of their section and, on save, all
//! such lines are removed before the collection writes its current contents.
//!
//! Loading and saving mutate the object's collections and are not
//! synchronised; callers serialise them per object.

use crate::collections::IniCollection;
use crate::error::{Result, SettingsError};
use asm_core::{
    format_bool, format_float_compact, format_int, parse_bool, parse_float, parse_int, quote,
    unquote, IniSection,
};
use asm_ini::{is_collection_key, Entry, IniSession};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, trace};

pub enum Property<T> {
    Bool { get: fn(&T) -> bool, set: fn(&mut T, bool) },
    Int { get: fn(&T) -> i32, set: fn(&mut T, i32) },
    Float { get: fn(&T) -> f32, set: fn(&mut T, f32) },
    Text { get: fn(&T) -> &str, set: fn(&mut T, String) },
    Collection {
        get: fn(&T) -> &dyn IniCollection,
        get_mut: fn(&mut T) -> &mut dyn IniCollection,
    },
}

impl<T> Property<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Property::Bool { .. } => "bool",
            Property::Int { .. } => "int",
            Property::Float { .. } => "float",
            Property::Text { .. } => "string",
            Property::Collection { .. } => "collection",
        }
    }
}

/// Companion boolean gating whether a key is written
pub struct Condition<T> {
    pub get: fn(&T) -> bool,
    pub set: fn(&mut T, bool),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingFlags {
    /// Stored value is the negation of the field
    pub invert_bool: bool,
    /// Write `True`/`False` for whether the string is non-empty instead of the string
    pub write_bool_if_non_empty: bool,
    /// Erase the whole section before anything is written to it
    pub clear_section: bool,
    /// Newlines are stored as a literal `\n`
    pub multiline: bool,
    pub quoted: bool,
}

pub struct Binding<T> {
    pub section: IniSection,
    pub key: &'static str,
    pub property: Property<T>,
    pub flags: BindingFlags,
    pub conditioned_on: Option<Condition<T>>,
    /// Delete the key while this returns false
    pub clear_when_off: Option<fn(&T) -> bool>,
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("section", &self.section)
            .field("key", &self.key)
            .field("kind", &self.property.kind())
            .field("flags", &self.flags)
            .field("conditioned", &self.conditioned_on.is_some())
            .field("clear_when_off", &self.clear_when_off.is_some())
            .finish()
    }
}

impl<T> Binding<T> {
    fn unsupported(&self) -> SettingsError {
        SettingsError::UnsupportedProperty {
            kind: self.property.kind(),
            key: self.key.to_string(),
            section: self.section.name().to_string(),
        }
    }

    /// Reject flags that mean nothing for the property kind
    pub fn validate(&self) -> Result<()> {
        let flags = &self.flags;
        let is_bool = matches!(self.property, Property::Bool { .. });
        let is_text = matches!(self.property, Property::Text { .. });

        if flags.invert_bool && !is_bool {
            return Err(self.unsupported());
        }
        if (flags.write_bool_if_non_empty || flags.multiline || flags.quoted) && !is_text {
            return Err(self.unsupported());
        }
        Ok(())
    }

    fn load(&self, target: &mut T, session: &IniSession) -> Result<()> {
        let file = self.section.file();
        let section = self.section.name();
        let key = self.key;

        if let Property::Collection { get_mut, .. } = &self.property {
            let lines: Vec<String> = session
                .read_section(file, section)?
                .into_iter()
                .filter(|line| is_collection_key(&Entry::parse(line).key, key))
                .collect();
            trace!("{}: {} line(s) for collection", key, lines.len());
            return get_mut(target).from_ini_values(key, &lines);
        }

        // The key holds a derived flag, not the field's value.
        if self.flags.write_bool_if_non_empty {
            return Ok(());
        }

        let value = session.read_value(file, section, key)?;

        if let Some(condition) = &self.conditioned_on {
            (condition.set)(target, !value.trim().is_empty());
        }

        match &self.property {
            Property::Text { set, .. } => {
                let mut text = if self.flags.quoted {
                    unquote(&value).into_owned()
                } else {
                    value
                };
                if self.flags.multiline {
                    text = text.replace("\\n", "\n");
                }
                set(target, text);
            }
            _ if value.trim().is_empty() => {
                trace!("{}/{} absent, keeping default", section, key);
            }
            Property::Bool { set, .. } => {
                let parsed = parse_bool(&value).map_err(|err| SettingsError::scalar(key, err))?;
                set(target, parsed != self.flags.invert_bool);
            }
            Property::Int { set, .. } => {
                set(target, parse_int(&value).map_err(|err| SettingsError::scalar(key, err))?);
            }
            Property::Float { set, .. } => {
                set(target, parse_float(&value).map_err(|err| SettingsError::scalar(key, err))?);
            }
            Property::Collection { .. } => return Err(self.unsupported()),
        }
        Ok(())
    }

    fn store(&self, target: &T, session: &IniSession) -> Result<()> {
        let file = self.section.file();
        let section = self.section.name();
        let key = self.key;

        if let Property::Collection { get, .. } = &self.property {
            session.remove_keys(file, section, key)?;
            if !self.is_on(target) {
                return Ok(());
            }
            let collection = get(target);
            if !collection.is_enabled() {
                return Ok(());
            }
            let mut lines = session.read_section(file, section)?;
            lines.extend(collection.to_ini_values(key));
            return Ok(session.write_section(file, section, &lines)?);
        }

        if !self.is_on(target) {
            session.write_key(file, section, key, None)?;
            return Ok(());
        }

        let value = match &self.property {
            Property::Text { get, .. } if self.flags.write_bool_if_non_empty => {
                format_bool(!get(target).is_empty())
            }
            Property::Text { get, .. } => {
                let mut text = get(target).to_string();
                if self.flags.multiline {
                    text = text.replace("\r\n", "\n").replace('\n', "\\n");
                }
                if self.flags.quoted {
                    text = quote(&text);
                }
                text
            }
            Property::Bool { get, .. } => format_bool(get(target) != self.flags.invert_bool),
            Property::Int { get, .. } => format_int(get(target)),
            Property::Float { get, .. } => format_float_compact(get(target)),
            Property::Collection { .. } => return Err(self.unsupported()),
        };
        session.write_key(file, section, key, Some(&value))?;
        Ok(())
    }

    /// Whether the key should be present at all
    fn is_on(&self, target: &T) -> bool {
        let conditioned = self
            .conditioned_on
            .as_ref()
            .map_or(true, |condition| (condition.get)(target));
        let kept = self.clear_when_off.map_or(true, |enabled| enabled(target));
        conditioned && kept
    }
}

/// Bindings of one settings type, in declaration order
pub struct BindingTable<T> {
    bindings: Vec<Binding<T>>,
}

impl<T> fmt::Debug for BindingTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.bindings).finish()
    }
}

impl<T> BindingTable<T> {
    pub fn builder() -> BindingTableBuilder<T> {
        BindingTableBuilder {
            bindings: Vec::new(),
        }
    }

    pub fn bindings(&self) -> &[Binding<T>] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        self.bindings.iter().try_for_each(Binding::validate)
    }

    /// Populate `target` from the session; absent keys keep current values
    pub fn deserialize(&self, target: &mut T, session: &IniSession) -> Result<()> {
        self.validate()?;
        for binding in &self.bindings {
            binding.load(target, session)?;
        }
        debug!("Loaded {} binding(s)", self.bindings.len());
        Ok(())
    }

    /// Write every bound field of `target` into the session
    pub fn serialize(&self, target: &T, session: &IniSession) -> Result<()> {
        self.validate()?;

        let mut cleared = HashSet::new();
        for binding in self.bindings.iter().filter(|b| b.flags.clear_section) {
            if cleared.insert(binding.section) {
                trace!("Clearing section {}", binding.section);
                session.clear_section(binding.section.file(), binding.section.name())?;
            }
        }

        for binding in &self.bindings {
            binding.store(target, session)?;
        }
        debug!("Stored {} binding(s)", self.bindings.len());
        Ok(())
    }
}

pub struct BindingTableBuilder<T> {
    bindings: Vec<Binding<T>>,
}

impl<T> BindingTableBuilder<T> {
    fn push(mut self, section: IniSection, key: &'static str, property: Property<T>) -> Self {
        self.bindings.push(Binding {
            section,
            key,
            property,
            flags: BindingFlags::default(),
            conditioned_on: None,
            clear_when_off: None,
        });
        self
    }

    fn modify_last(mut self, f: impl FnOnce(&mut Binding<T>)) -> Self {
        if let Some(last) = self.bindings.last_mut() {
            f(last);
        }
        self
    }

    pub fn bool(
        self,
        section: IniSection,
        key: &'static str,
        get: fn(&T) -> bool,
        set: fn(&mut T, bool),
    ) -> Self {
        self.push(section, key, Property::Bool { get, set })
    }

    pub fn int(
        self,
        section: IniSection,
        key: &'static str,
        get: fn(&T) -> i32,
        set: fn(&mut T, i32),
    ) -> Self {
        self.push(section, key, Property::Int { get, set })
    }

    pub fn float(
        self,
        section: IniSection,
        key: &'static str,
        get: fn(&T) -> f32,
        set: fn(&mut T, f32),
    ) -> Self {
        self.push(section, key, Property::Float { get, set })
    }

    pub fn text(
        self,
        section: IniSection,
        key: &'static str,
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
    ) -> Self {
        self.push(section, key, Property::Text { get, set })
    }

    pub fn collection(
        self,
        section: IniSection,
        key: &'static str,
        get: fn(&T) -> &dyn IniCollection,
        get_mut: fn(&mut T) -> &mut dyn IniCollection,
    ) -> Self {
        self.push(section, key, Property::Collection { get, get_mut })
    }

    pub fn invert(self) -> Self {
        self.modify_last(|b| b.flags.invert_bool = true)
    }

    pub fn write_bool_if_non_empty(self) -> Self {
        self.modify_last(|b| b.flags.write_bool_if_non_empty = true)
    }

    pub fn clear_section(self) -> Self {
        self.modify_last(|b| b.flags.clear_section = true)
    }

    pub fn multiline(self) -> Self {
        self.modify_last(|b| b.flags.multiline = true)
    }

    pub fn quoted(self) -> Self {
        self.modify_last(|b| b.flags.quoted = true)
    }

    pub fn conditioned_on(self, get: fn(&T) -> bool, set: fn(&mut T, bool)) -> Self {
        self.modify_last(|b| b.conditioned_on = Some(Condition { get, set }))
    }

    pub fn clear_when_off(self, enabled: fn(&T) -> bool) -> Self {
        self.modify_last(|b| b.clear_when_off = Some(enabled))
    }

    pub fn build(self) -> BindingTable<T> {
        BindingTable {
            bindings: self.bindings,
        }
    }
}
