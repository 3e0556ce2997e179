//! Value Renderer - Typed Assignment Lines
//!
//! One renderer per value kind. Plain renderers emit nothing for an absent
//! value; `_required` variants fail with `MissingRequiredValue` instead.
//! Strings, names and list items are escaped as JSON string literals.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::emitter::Emitter;
use crate::error::{RenderError, RenderResult};

/// An untyped value, rendered by shape through [`Emitter::any`].
///
/// JSON integers too large for `i64` are kept as their digit string, which
/// the infer renderer still emits as a bare integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    /// Accepted on input so that the infer renderer can reject it.
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Normalize into a flat list of strings.
    ///
    /// A bare scalar becomes a one-element list. Nested lists collapse into
    /// the outer one in order, at any depth.
    pub fn to_string_list(&self, field: &str) -> RenderResult<Vec<String>> {
        let mut out = Vec::new();
        self.flatten_into(field, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&self, field: &str, out: &mut Vec<String>) -> RenderResult<()> {
        match self {
            Value::List(items) => items.iter().try_for_each(|x| x.flatten_into(field, out)),
            other => {
                out.push(other.scalar_string(field)?);
                Ok(())
            }
        }
    }

    pub(crate) fn scalar_string(&self, field: &str) -> RenderResult<String> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(RenderError::UnsupportedValueType {
                field: field.to_string(),
                kind: other.kind(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean, number, string, list or map")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Boolean(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(i64::try_from(v)
                    .map(Value::Integer)
                    .unwrap_or_else(|_| Value::String(v.to_string())))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
                let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    map.insert(k, v);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Quote `s` as a JSON string literal.
pub fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Compact JSON array of string literals.
pub fn json_string_array<S: AsRef<str>>(items: &[S]) -> String {
    serde_json::Value::Array(
        items
            .iter()
            .map(|s| serde_json::Value::String(s.as_ref().to_string()))
            .collect(),
    )
    .to_string()
}

/// True when `s` is an integer written in canonical decimal form, of any
/// magnitude.
///
/// `"42"`, `"-7"` and `"99999999999999999999"` qualify; `"007"`, `"-0"`,
/// `"+3"` and `" 5"` do not.
pub fn is_canonical_integer(s: &str) -> bool {
    if s == "0" {
        return true;
    }
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.starts_with(|c: char| matches!(c, '1'..='9'))
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Fails unless `value` is one of the literal `allowed` values.
pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> RenderResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(RenderError::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Emitter {
    fn missing(&self, key: &str) -> RenderError {
        RenderError::MissingRequiredValue {
            stanza: self.context().current().to_string(),
            field: key.to_string(),
        }
    }

    pub fn str(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.emit_line(&format!("{} = {}", key, json_string(v)));
        }
    }

    pub fn str_required(&mut self, key: &str, value: Option<&str>) -> RenderResult<()> {
        let v = value.ok_or_else(|| self.missing(key))?;
        self.str(key, Some(v));
        Ok(())
    }

    pub fn int(&mut self, key: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.emit_line(&format!("{} = {}", key, v));
        }
    }

    pub fn int_required(&mut self, key: &str, value: Option<i64>) -> RenderResult<()> {
        let v = value.ok_or_else(|| self.missing(key))?;
        self.int(key, Some(v));
        Ok(())
    }

    pub fn bool(&mut self, key: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.emit_line(&format!("{} = {}", key, v));
        }
    }

    pub fn bool_required(&mut self, key: &str, value: Option<bool>) -> RenderResult<()> {
        let v = value.ok_or_else(|| self.missing(key))?;
        self.bool(key, Some(v));
        Ok(())
    }

    pub fn list<S: AsRef<str>>(&mut self, key: &str, value: Option<&[S]>) {
        if let Some(items) = value {
            self.emit_line(&format!("{} = {}", key, json_string_array(items)));
        }
    }

    pub fn list_required<S: AsRef<str>>(
        &mut self,
        key: &str,
        value: Option<&[S]>,
    ) -> RenderResult<()> {
        let items = value.ok_or_else(|| self.missing(key))?;
        self.list(key, Some(items));
        Ok(())
    }

    /// List from an untyped value: scalars are wrapped, nested lists flattened.
    pub fn list_value(&mut self, key: &str, value: Option<&Value>) -> RenderResult<()> {
        if let Some(v) = value {
            let items = v.to_string_list(key)?;
            self.list(key, Some(items.as_slice()));
        }
        Ok(())
    }

    /// Nested block named `key` with one string assignment per entry.
    pub fn strmap(&mut self, key: &str, value: Option<&IndexMap<String, String>>) {
        if let Some(map) = value {
            self.open_block(key, None);
            for (k, v) in map {
                self.str(k, Some(v));
            }
            self.close_block(key);
        }
    }

    pub fn strmap_required(
        &mut self,
        key: &str,
        value: Option<&IndexMap<String, String>>,
    ) -> RenderResult<()> {
        let map = value.ok_or_else(|| self.missing(key))?;
        self.strmap(key, Some(map));
        Ok(())
    }

    /// Heredoc block. Trailing whitespace is trimmed and one newline added.
    pub fn blob(&mut self, key: &str, value: Option<&str>) {
        if let Some(text) = value {
            self.emit_line(&format!("{} = <<BLOB", key));
            self.emit_raw(text.trim_end());
            self.emit_raw("\nBLOB\n");
        }
    }

    pub fn blob_required(&mut self, key: &str, value: Option<&str>) -> RenderResult<()> {
        let text = value.ok_or_else(|| self.missing(key))?;
        self.blob(key, Some(text));
        Ok(())
    }

    /// Render by shape: list, integer, boolean, string, then map.
    ///
    /// A string holding the canonical decimal form of an integer is emitted
    /// as a bare integer, so `"8080"` becomes `8080` in the output.
    pub fn any(&mut self, key: &str, value: Option<&Value>) -> RenderResult<()> {
        match value {
            None => Ok(()),
            Some(Value::List(_)) => self.list_value(key, value),
            Some(Value::Integer(i)) => {
                self.int(key, Some(*i));
                Ok(())
            }
            Some(Value::Boolean(b)) => {
                self.bool(key, Some(*b));
                Ok(())
            }
            Some(Value::String(s)) => {
                if is_canonical_integer(s) {
                    self.emit_line(&format!("{} = {}", key, s));
                } else {
                    self.str(key, Some(s));
                }
                Ok(())
            }
            Some(Value::Map(map)) => {
                self.block(key, None, |e| map.iter().try_for_each(|(k, v)| e.any(k, Some(v))))
            }
            Some(other) => Err(RenderError::UnsupportedValueType {
                field: key.to_string(),
                kind: other.kind(),
            }),
        }
    }
}
