//! Aggregate value grammar
//!
//! A single INI value can carry a whole record:
//!
//! ```text
//! (SupplyCrateClassString="Crate_C",MinItemSets=1.0,ItemSets=((SetWeight=1.0,ItemEntries=((EntryWeight=1.0)))))
//! ```
//!
//! The grammar, parsed by recursive descent with explicit bracket matching:
//!
//! ```text
//! value  := group | scalar
//! group  := '(' ')' | '(' item (',' item)* ')'
//! item   := name '=' value | value
//! scalar := any run of characters up to a top-level ',' or ')'; "..." may contain both
//!           and escapes '"' and '\' with a backslash
//! ```
//!
//! A group whose items are all named is a record; a group with no named
//! items is a list. Field names are matched whole (up to their `=`), so a
//! name that is a prefix of another (`Min`, `MinQuality`) never collides.

use std::fmt;

/// Deepest bracket nesting accepted
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    /// Raw scalar text, quotes included
    Scalar(String),
    /// `(a,b,c)`
    List(Vec<AggregateValue>),
    /// `(Name=value,...)`; names may repeat
    Record(Vec<(String, AggregateValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} at offset {offset}")]
pub struct MalformedValue {
    pub reason: String,
    pub offset: usize,
}

impl AggregateValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        AggregateValue::Scalar(text.into())
    }

    /// Parse one complete value; anything left over is an error
    pub fn parse(text: &str) -> Result<Self, MalformedValue> {
        let mut parser = Parser { text, pos: 0, depth: 0 };
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if parser.pos < text.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(value)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AggregateValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Every value recorded under `name` (case-insensitive), in order
    pub fn fields<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AggregateValue> + 'a {
        let fields: &[(String, AggregateValue)] = match self {
            AggregateValue::Record(fields) => fields,
            _ => &[],
        };
        fields
            .iter()
            .filter(move |(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn write(&self, out: &mut String) {
        match self {
            AggregateValue::Scalar(text) => out.push_str(text),
            AggregateValue::List(items) => {
                out.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write(out);
                }
                out.push(')');
            }
            AggregateValue::Record(fields) => {
                // A record with nothing to say is written as nothing at all.
                if fields.is_empty() {
                    return;
                }
                out.push('(');
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(name);
                    out.push('=');
                    value.write(out);
                }
                out.push(')');
            }
        }
    }
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &str) -> MalformedValue {
        MalformedValue {
            reason: reason.to_string(),
            offset: self.pos,
        }
    }

    fn parse_value(&mut self) -> Result<AggregateValue, MalformedValue> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => self.parse_group(),
            _ => self.parse_scalar().map(AggregateValue::Scalar),
        }
    }

    fn parse_group(&mut self) -> Result<AggregateValue, MalformedValue> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let group = self.parse_group_items();
        self.depth -= 1;
        group
    }

    fn parse_group_items(&mut self) -> Result<AggregateValue, MalformedValue> {
        let open = self.pos;
        self.pos += 1;

        self.skip_whitespace();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(AggregateValue::List(Vec::new()));
        }

        let mut fields = Vec::new();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.field_name() {
                Some(name) => {
                    let value = self.parse_value()?;
                    fields.push((name, value));
                }
                None => items.push(self.parse_value()?),
            }

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected ',' or ')'")),
                None => {
                    return Err(MalformedValue {
                        reason: "unbalanced '('".to_string(),
                        offset: open,
                    })
                }
            }
        }

        match (fields.is_empty(), items.is_empty()) {
            (false, true) => Ok(AggregateValue::Record(fields)),
            (true, _) => Ok(AggregateValue::List(items)),
            (false, false) => Err(MalformedValue {
                reason: "group mixes named and unnamed items".to_string(),
                offset: open,
            }),
        }
    }

    /// Consume `Name=` if the next item is named
    fn field_name(&mut self) -> Option<String> {
        let rest = &self.text[self.pos..];
        for (i, b) in rest.bytes().enumerate() {
            match b {
                b'=' => {
                    let name = rest[..i].trim();
                    if name.is_empty() {
                        return None;
                    }
                    self.pos += i + 1;
                    return Some(name.to_string());
                }
                b',' | b'(' | b')' | b'"' => return None,
                _ => {}
            }
        }
        None
    }

    fn parse_scalar(&mut self) -> Result<String, MalformedValue> {
        let start = self.pos;
        let mut in_quotes = false;

        while let Some(b) = self.peek() {
            match b {
                b'\\' if in_quotes => self.pos += 1,
                b'"' => in_quotes = !in_quotes,
                b',' | b')' if !in_quotes => break,
                b'(' if !in_quotes => return Err(self.error("unexpected '('")),
                _ => {}
            }
            self.pos += 1;
        }

        if in_quotes {
            return Err(MalformedValue {
                reason: "unterminated string".to_string(),
                offset: start,
            });
        }

        Ok(self.text[start..self.pos].trim().to_string())
    }
}
