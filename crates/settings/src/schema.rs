//! Record schemas
//!
//! Each aggregate record type declares, once, a table of its INI fields:
//! name, formatting options and a getter/setter pair. The table drives both
//! directions of the codec, so parse and serialize can never disagree about
//! a field's name or shape.
//!
//! ```rust,ignore
//! impl AggregateRecord for ClassMultiplier {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<ClassMultiplier>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::<Self>::builder()
//!                 .text("ClassName", FieldOptions::QUOTED, |r| r.class_name.as_str(), |r, v| r.class_name = v)
//!                 .float("Multiplier", |r| r.multiplier, |r, v| r.multiplier = v)
//!                 .build()
//!         })
//!     }
//!     // ...
//! }
//! ```

use crate::error::{Result, SettingsError};
use crate::value::AggregateValue;
use asm_core::{format_bool, format_float, format_int, parse_bool, parse_float, parse_int, quote, unquote};
use std::fmt;
use tracing::trace;

/// How a field of records is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStyle {
    /// `Field=((..),(..))`
    #[default]
    Wrapped,
    /// `Field=(..),Field=(..)`
    Repeated,
}

/// Per-field formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    /// Wrap string values in double quotes
    pub quoted: bool,
    /// Wrap list values in `(...)`; unbracketed lists are joined with `delimiter`
    pub bracket_value: bool,
    /// Wrap each list item in its own `(...)`
    pub bracket_items: bool,
    /// Item separator for unbracketed lists
    pub delimiter: char,
    pub style: ListStyle,
}

impl FieldOptions {
    pub const PLAIN: FieldOptions = FieldOptions {
        quoted: false,
        bracket_value: true,
        bracket_items: false,
        delimiter: ',',
        style: ListStyle::Wrapped,
    };

    pub const QUOTED: FieldOptions = FieldOptions {
        quoted: true,
        ..FieldOptions::PLAIN
    };

    pub const REPEATED: FieldOptions = FieldOptions {
        style: ListStyle::Repeated,
        ..FieldOptions::PLAIN
    };
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions::PLAIN
    }
}

type Encoder<T> = Box<dyn Fn(&T) -> Vec<AggregateValue> + Send + Sync>;
type Decoder<T> = Box<dyn Fn(&mut T, &[&AggregateValue]) -> Result<()> + Send + Sync>;

enum Accessor<T> {
    Float { get: fn(&T) -> f32, set: fn(&mut T, f32) },
    Int { get: fn(&T) -> i32, set: fn(&mut T, i32) },
    Bool { get: fn(&T) -> bool, set: fn(&mut T, bool) },
    Text { get: fn(&T) -> &str, set: fn(&mut T, String) },
    TextList { get: fn(&T) -> &[String], set: fn(&mut T, Vec<String>) },
    FloatList { get: fn(&T) -> &[f32], set: fn(&mut T, Vec<f32>) },
    Nested { encode: Encoder<T>, decode: Decoder<T> },
}

struct Field<T> {
    name: &'static str,
    options: FieldOptions,
    accessor: Accessor<T>,
}

/// Declared INI fields of one record type, in write order
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T: 'static> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.field_names())
            .finish()
    }
}

/// A structured value stored in one INI value
pub trait AggregateRecord: Clone + Default + fmt::Debug + Send + Sync + 'static {
    fn schema() -> &'static Schema<Self>;

    /// Identifies "the same logical item" across reloads
    fn equivalence_key(&self) -> String;

    /// Display and write order; independent of equivalence
    fn sort_key(&self) -> String;

    /// Copy the fields a reload is allowed to change from `parsed` onto `self`
    fn update_from(&mut self, parsed: &Self);

    /// Whether this record belongs in the written file
    fn should_write(&self) -> bool {
        true
    }

    fn is_equivalent(&self, other: &Self) -> bool {
        self.equivalence_key()
            .eq_ignore_ascii_case(&other.equivalence_key())
    }

    fn from_ini_value(key: &str, text: &str) -> Result<Self> {
        Self::parse_onto(Self::default(), key, text)
    }

    /// Parse `text` over `base`; fields the value leaves out keep `base`'s values
    fn parse_onto(base: Self, key: &str, text: &str) -> Result<Self> {
        Self::schema().parse_onto(key, text, base)
    }

    fn to_ini_value(&self) -> String {
        Self::schema().serialize(self)
    }
}

impl<T: 'static> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    /// Encode a record as a value tree
    pub fn to_value(&self, record: &T) -> AggregateValue {
        let mut pairs = Vec::new();
        for field in &self.fields {
            for value in field.encode(record) {
                pairs.push((field.name.to_string(), value));
            }
        }
        AggregateValue::Record(pairs)
    }

    pub fn serialize(&self, record: &T) -> String {
        self.to_value(record).to_string()
    }
}

impl<T: 'static> Schema<T> {
    /// Decode a value tree over `record`; absent fields keep what `record` holds
    pub fn decode_onto(&self, key: &str, value: &AggregateValue, mut record: T) -> Result<T> {
        match value {
            AggregateValue::Record(pairs) => {
                for (name, _) in pairs {
                    if !self.fields.iter().any(|field| field.name.eq_ignore_ascii_case(name)) {
                        trace!("{}: ignoring undeclared field {}", key, name);
                    }
                }
            }
            AggregateValue::List(items) if items.is_empty() => return Ok(record),
            AggregateValue::Scalar(text) if text.is_empty() => return Ok(record),
            _ => {
                return Err(SettingsError::UnexpectedShape {
                    key: key.to_string(),
                    expected: "record",
                })
            }
        }

        for field in &self.fields {
            let occurrences: Vec<&AggregateValue> = value.fields(field.name).collect();
            if occurrences.is_empty() {
                continue;
            }
            field.decode(&mut record, &occurrences)?;
        }

        Ok(record)
    }

    /// Parse INI value text over `record`
    pub fn parse_onto(&self, key: &str, text: &str, record: T) -> Result<T> {
        let value = AggregateValue::parse(text).map_err(|err| SettingsError::MalformedAggregate {
            key: key.to_string(),
            reason: err.reason,
            offset: err.offset,
        })?;
        self.decode_onto(key, &value, record)
    }
}

impl<T: Default + 'static> Schema<T> {
    /// Decode a record from a value tree; absent fields keep their defaults
    pub fn from_value(&self, key: &str, value: &AggregateValue) -> Result<T> {
        self.decode_onto(key, value, T::default())
    }

    pub fn parse(&self, key: &str, text: &str) -> Result<T> {
        self.parse_onto(key, text, T::default())
    }
}

impl<T> Field<T> {
    fn encode(&self, record: &T) -> Vec<AggregateValue> {
        let options = &self.options;
        match &self.accessor {
            Accessor::Float { get, .. } => vec![AggregateValue::Scalar(format_float(get(record)))],
            Accessor::Int { get, .. } => vec![AggregateValue::Scalar(format_int(get(record)))],
            Accessor::Bool { get, .. } => vec![AggregateValue::Scalar(format_bool(get(record)))],
            Accessor::Text { get, .. } => vec![AggregateValue::Scalar(text_out(get(record), options))],
            Accessor::TextList { get, .. } => {
                let items = get(record)
                    .iter()
                    .map(|item| text_out(item, options))
                    .collect();
                encode_list(items, options)
            }
            Accessor::FloatList { get, .. } => {
                let items = get(record).iter().map(|item| format_float(*item)).collect();
                encode_list(items, options)
            }
            Accessor::Nested { encode, .. } => encode(record),
        }
    }

    fn decode(&self, record: &mut T, occurrences: &[&AggregateValue]) -> Result<()> {
        let name = self.name;
        match &self.accessor {
            Accessor::Float { set, .. } => {
                let text = single_scalar(name, occurrences)?;
                set(record, parse_float(text).map_err(|err| SettingsError::scalar(name, err))?);
            }
            Accessor::Int { set, .. } => {
                let text = single_scalar(name, occurrences)?;
                set(record, parse_int(text).map_err(|err| SettingsError::scalar(name, err))?);
            }
            Accessor::Bool { set, .. } => {
                let text = single_scalar(name, occurrences)?;
                set(record, parse_bool(text).map_err(|err| SettingsError::scalar(name, err))?);
            }
            Accessor::Text { set, .. } => {
                let text = single_scalar(name, occurrences)?;
                set(record, unquote(text).into_owned());
            }
            Accessor::TextList { set, .. } => {
                let items = decode_list(name, occurrences, &self.options)?
                    .into_iter()
                    .map(|item| unquote(item).into_owned())
                    .collect();
                set(record, items);
            }
            Accessor::FloatList { set, .. } => {
                let items = decode_list(name, occurrences, &self.options)?
                    .into_iter()
                    .map(|item| parse_float(item).map_err(|err| SettingsError::scalar(name, err)))
                    .collect::<Result<Vec<f32>>>()?;
                set(record, items);
            }
            Accessor::Nested { decode, .. } => decode(record, occurrences)?,
        }
        Ok(())
    }
}

fn text_out(text: &str, options: &FieldOptions) -> String {
    if options.quoted {
        quote(text)
    } else {
        text.to_string()
    }
}

fn single_scalar<'v>(name: &str, occurrences: &[&'v AggregateValue]) -> Result<&'v str> {
    occurrences
        .first()
        .copied()
        .and_then(AggregateValue::as_scalar)
        .ok_or_else(|| SettingsError::UnexpectedShape {
            key: name.to_string(),
            expected: "scalar",
        })
}

/// Scalar list items; an empty list omits the field entirely
fn encode_list(items: Vec<String>, options: &FieldOptions) -> Vec<AggregateValue> {
    if items.is_empty() {
        return Vec::new();
    }

    if !options.bracket_value {
        let joined = items.join(&options.delimiter.to_string());
        return vec![AggregateValue::Scalar(joined)];
    }

    let values = items
        .into_iter()
        .map(|item| {
            if options.bracket_items {
                AggregateValue::List(vec![AggregateValue::Scalar(item)])
            } else {
                AggregateValue::Scalar(item)
            }
        })
        .collect();
    vec![AggregateValue::List(values)]
}

fn decode_list<'v>(
    name: &str,
    occurrences: &[&'v AggregateValue],
    options: &FieldOptions,
) -> Result<Vec<&'v str>> {
    let mut items = Vec::new();
    for value in occurrences.iter().copied() {
        match value {
            AggregateValue::Scalar(text) if !options.bracket_value => {
                items.extend(
                    text.split(options.delimiter)
                        .map(str::trim)
                        .filter(|item| !item.is_empty()),
                );
            }
            AggregateValue::Scalar(text) => items.push(text.as_str()),
            AggregateValue::List(values) => {
                for item in values {
                    let scalar = match item {
                        AggregateValue::List(inner) if inner.len() == 1 => inner[0].as_scalar(),
                        other => other.as_scalar(),
                    };
                    items.push(scalar.ok_or_else(|| SettingsError::UnexpectedShape {
                        key: name.to_string(),
                        expected: "list of scalars",
                    })?);
                }
            }
            AggregateValue::Record(_) => {
                return Err(SettingsError::UnexpectedShape {
                    key: name.to_string(),
                    expected: "list of scalars",
                })
            }
        }
    }
    Ok(items)
}

/// Records in a field: a wrapped list, a lone record, or repeated occurrences
fn collect_records<'v>(occurrences: &[&'v AggregateValue]) -> Vec<&'v AggregateValue> {
    let mut records = Vec::new();
    for value in occurrences.iter().copied() {
        match value {
            AggregateValue::List(items) => records.extend(items.iter()),
            other => records.push(other),
        }
    }
    records
}

pub struct SchemaBuilder<T> {
    fields: Vec<Field<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn push(mut self, name: &'static str, options: FieldOptions, accessor: Accessor<T>) -> Self {
        self.fields.push(Field {
            name,
            options,
            accessor,
        });
        self
    }

    pub fn float(self, name: &'static str, get: fn(&T) -> f32, set: fn(&mut T, f32)) -> Self {
        self.push(name, FieldOptions::PLAIN, Accessor::Float { get, set })
    }

    pub fn int(self, name: &'static str, get: fn(&T) -> i32, set: fn(&mut T, i32)) -> Self {
        self.push(name, FieldOptions::PLAIN, Accessor::Int { get, set })
    }

    pub fn bool(self, name: &'static str, get: fn(&T) -> bool, set: fn(&mut T, bool)) -> Self {
        self.push(name, FieldOptions::PLAIN, Accessor::Bool { get, set })
    }

    pub fn text(
        self,
        name: &'static str,
        options: FieldOptions,
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
    ) -> Self {
        self.push(name, options, Accessor::Text { get, set })
    }

    pub fn text_list(
        self,
        name: &'static str,
        options: FieldOptions,
        get: fn(&T) -> &[String],
        set: fn(&mut T, Vec<String>),
    ) -> Self {
        self.push(name, options, Accessor::TextList { get, set })
    }

    pub fn float_list(
        self,
        name: &'static str,
        options: FieldOptions,
        get: fn(&T) -> &[f32],
        set: fn(&mut T, Vec<f32>),
    ) -> Self {
        self.push(name, options, Accessor::FloatList { get, set })
    }

    /// A field holding a list of nested records
    pub fn records<R: AggregateRecord>(
        self,
        name: &'static str,
        options: FieldOptions,
        get: fn(&T) -> &[R],
        set: fn(&mut T, Vec<R>),
    ) -> Self {
        let style = options.style;
        let encode: Encoder<T> = Box::new(move |record: &T| {
            let items: Vec<AggregateValue> = get(record)
                .iter()
                .filter(|item| item.should_write())
                .map(|item| R::schema().to_value(item))
                .collect();
            if items.is_empty() {
                return Vec::new();
            }
            match style {
                ListStyle::Wrapped => vec![AggregateValue::List(items)],
                ListStyle::Repeated => items,
            }
        });
        let decode: Decoder<T> = Box::new(move |record: &mut T, occurrences: &[&AggregateValue]| {
            let items = collect_records(occurrences)
                .into_iter()
                .map(|value| R::schema().from_value(name, value))
                .collect::<Result<Vec<R>>>()?;
            set(record, items);
            Ok(())
        });
        self.push(name, options, Accessor::Nested { encode, decode })
    }

    /// A field holding exactly one nested record
    pub fn record<R: AggregateRecord>(
        self,
        name: &'static str,
        get: fn(&T) -> &R,
        set: fn(&mut T, R),
    ) -> Self {
        let encode: Encoder<T> = Box::new(move |record: &T| vec![R::schema().to_value(get(record))]);
        let decode: Decoder<T> = Box::new(move |record: &mut T, occurrences: &[&AggregateValue]| {
            if let Some(value) = occurrences.first() {
                set(record, R::schema().from_value(name, value)?);
            }
            Ok(())
        });
        self.push(name, FieldOptions::PLAIN, Accessor::Nested { encode, decode })
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Range {
        min: f32,
        min_quality: f32,
    }

    impl AggregateRecord for Range {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Range>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Self>::builder()
                    .float("Min", |r| r.min, |r, v| r.min = v)
                    .float("MinQuality", |r| r.min_quality, |r, v| r.min_quality = v)
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
    struct Holder {
        name: String,
        tags: Vec<String>,
        weights: Vec<f32>,
        enabled: bool,
        count: i32,
        ranges: Vec<Range>,
        repeated: Vec<Range>,
        single: Range,
    }

    impl AggregateRecord for Holder {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Holder>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Self>::builder()
                    .text("Name", FieldOptions::QUOTED, |r| r.name.as_str(), |r, v| r.name = v)
                    .text_list("Tags", FieldOptions::QUOTED, |r| r.tags.as_slice(), |r, v| r.tags = v)
                    .float_list("Weights", FieldOptions::PLAIN, |r| r.weights.as_slice(), |r, v| r.weights = v)
                    .bool("bEnabled", |r| r.enabled, |r, v| r.enabled = v)
                    .int("Count", |r| r.count, |r, v| r.count = v)
                    .records("Ranges", FieldOptions::PLAIN, |r| r.ranges.as_slice(), |r, v| r.ranges = v)
                    .records("Repeated", FieldOptions::REPEATED, |r| r.repeated.as_slice(), |r, v| r.repeated = v)
                    .record("Single", |r| &r.single, |r, v| r.single = v)
                    .build()
            })
        }

        fn equivalence_key(&self) -> String {
            self.name.clone()
        }

        fn sort_key(&self) -> String {
            self.name.clone()
        }

        fn update_from(&mut self, parsed: &Self) {
            self.count = parsed.count;
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Empty;

    impl AggregateRecord for Empty {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Empty>> = OnceLock::new();
            SCHEMA.get_or_init(|| Schema::<Self>::builder().build())
        }

        fn equivalence_key(&self) -> String {
            String::new()
        }

        fn sort_key(&self) -> String {
            String::new()
        }

        fn update_from(&mut self, _parsed: &Self) {}
    }

    fn sample() -> Holder {
        Holder {
            name: "Crate".into(),
            tags: vec!["A_C".into(), "B_C".into()],
            weights: vec![1.0, 0.25],
            enabled: true,
            count: 3,
            ranges: vec![
                Range { min: 1.0, min_quality: 2.0 },
                Range { min: 0.5, min_quality: 0.0 },
            ],
            repeated: vec![Range { min: 3.0, min_quality: 4.0 }],
            single: Range { min: 7.0, min_quality: 8.0 },
        }
    }

    #[test]
    fn test_serialize_layout() {
        assert_eq!(
            sample().to_ini_value(),
            "(Name=\"Crate\",Tags=(\"A_C\",\"B_C\"),Weights=(1.0,0.25),bEnabled=True,Count=3,\
             Ranges=((Min=1.0,MinQuality=2.0),(Min=0.5,MinQuality=0.0)),\
             Repeated=(Min=3.0,MinQuality=4.0),Single=(Min=7.0,MinQuality=8.0))"
        );
    }

    #[test]
    fn test_round_trip() {
        let record = sample();
        let parsed = Holder::from_ini_value("Holder", &record.to_ini_value()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_prefix_anchors_parse_separately() {
        let range = Range::from_ini_value("Range", "(Min=1,MinQuality=2)").unwrap();
        assert_eq!(range, Range { min: 1.0, min_quality: 2.0 });
    }

    #[test]
    fn test_empty_collections_are_omitted() {
        let record = Holder {
            name: "Bare".into(),
            ..Default::default()
        };
        assert_eq!(
            record.to_ini_value(),
            "(Name=\"Bare\",bEnabled=False,Count=0,Single=(Min=0.0,MinQuality=0.0))"
        );
    }

    #[test]
    fn test_lone_record_in_list_field() {
        let holder = Holder::from_ini_value("Holder", "(Ranges=(Min=2,MinQuality=3))").unwrap();
        assert_eq!(holder.ranges, vec![Range { min: 2.0, min_quality: 3.0 }]);
    }

    #[test]
    fn test_zero_field_record_is_empty_string() {
        assert_eq!(Empty.to_ini_value(), "");
        assert!(Empty::from_ini_value("Empty", "").is_ok());
    }

    #[test]
    fn test_invalid_scalar_names_field() {
        let err = Range::from_ini_value("Range", "(Min=abc)").unwrap_err();
        match err {
            SettingsError::InvalidScalar { key, value, expected } => {
                assert_eq!(key, "Min");
                assert_eq!(value, "abc");
                assert_eq!(expected, "float");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Range::from_ini_value("Range", "(Min=(1,2))").unwrap_err();
        assert!(matches!(err, SettingsError::UnexpectedShape { .. }));
    }

    #[test]
    fn test_unbracketed_delimited_list() {
        let options = FieldOptions {
            bracket_value: false,
            delimiter: ';',
            ..FieldOptions::PLAIN
        };
        assert_eq!(
            encode_list(vec!["a".into(), "b".into()], &options),
            vec![AggregateValue::scalar("a;b")]
        );
        let value = AggregateValue::scalar("a; b;");
        assert_eq!(decode_list("X", &[&value], &options).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_bracketed_items() {
        let options = FieldOptions {
            bracket_items: true,
            ..FieldOptions::PLAIN
        };
        let encoded = encode_list(vec!["1.0".into(), "2.0".into()], &options);
        assert_eq!(encoded[0].to_string(), "((1.0),(2.0))");
        assert_eq!(
            decode_list("X", &[&encoded[0]], &options).unwrap(),
            vec!["1.0", "2.0"]
        );
    }
}
