use std::collections::BTreeMap;
use crate::model::{Gender, Schema, Value};
use crate::{Error, IdAllocator, Result};

/// The attribute name under which a record's identifier is looked up.
pub const ID_KEY: &str = "id";

/// An identifier plus a flat mapping from attribute name to value.
///
/// Blank values are never stored: setting an attribute to blank text removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: u64,
    attrs: BTreeMap<String, Value>,
}

impl Record {
    /// Validates `attrs` against `schema` and, only if every check passes,
    /// allocates an identifier from the schema's counter.
    ///
    /// Unknown attribute names are rejected and every required attribute must
    /// be present with a non-blank value.
    pub fn create<I, K, V>(schema: &Schema, attrs: I, ids: &dyn IdAllocator) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut map = BTreeMap::new();
        for (name, value) in attrs {
            let name = name.into().to_lowercase();
            let value = schema.normalize(&name, value.into());
            schema.check(&name, &value, true)?;
            if !value.is_blank() {
                map.insert(name, value);
            }
        }

        if let Some(missing) = schema.required_attrs().into_iter().find(|name| !map.contains_key(*name)) {
            return Err(Error::MissingAttribute(missing.to_string()));
        }

        Ok(Self {
            id: ids.next_id(schema.counter())?,
            attrs: map,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Looks up an attribute by name; `"id"` yields the identifier.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == ID_KEY {
            return Some(Value::from(self.id));
        }
        self.attrs.get(name).cloned()
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Text attribute, or `""` when absent.
    pub fn text(&self, name: &str) -> &str {
        self.attrs.get(name).and_then(Value::as_text).unwrap_or("")
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(Value::as_integer)
    }

    pub fn gender(&self, name: &str) -> Option<Gender> {
        self.attrs.get(name).and_then(Value::as_gender)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stores `value`, or removes the attribute when `value` is blank.
    ///
    /// Callers validate first; the identifier cannot be changed here.
    pub(crate) fn set(&mut self, name: &str, value: Value) {
        if value.is_blank() {
            self.attrs.remove(name);
        } else {
            self.attrs.insert(name.to_string(), value);
        }
    }
}
