//! Records and record identity.
//!
//! A record is a loosely-typed JSON object plus a numeric identity assigned
//! by the store. The string identity (`_id`) is always derived from the
//! numeric one, so the two can never diverge.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::DbError;

/// Field map of a record, identity excluded.
pub type Fields = Map<String, Value>;

/// Numeric identity field.
pub const ID_FIELD: &str = "id";

/// String mirror of the numeric identity.
pub const MIRROR_ID_FIELD: &str = "_id";

pub(crate) fn is_identity_field(name: &str) -> bool {
    name == ID_FIELD || name == MIRROR_ID_FIELD
}

pub(crate) fn strip_identity(fields: &mut Fields) {
    fields.remove(ID_FIELD);
    fields.remove(MIRROR_ID_FIELD);
}

/// Unwrap a JSON value into record fields.
pub fn into_fields(value: Value) -> Result<Fields, DbError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(DbError::NotAnObject("null")),
        Value::Bool(_) => Err(DbError::NotAnObject("a boolean")),
        Value::Number(_) => Err(DbError::NotAnObject("a number")),
        Value::String(_) => Err(DbError::NotAnObject("a string")),
        Value::Array(_) => Err(DbError::NotAnObject("an array")),
    }
}

/// A stored record.
///
/// Serializes as a flat object: `{"id": 1, "_id": "1", ...fields}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    fields: Fields,
}

impl Record {
    pub(crate) fn new(id: u64, mut fields: Fields) -> Self {
        strip_identity(&mut fields);
        Self { id, fields }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The string form of the identity.
    pub fn mirror_id(&self) -> String {
        self.id.to_string()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Get a non-identity field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// True when `key` names this record.
    pub fn matches(&self, key: &RecordKey) -> bool {
        key.as_str() == self.mirror_id()
    }

    /// Shallow merge: patch keys overwrite, absent keys are kept, identity is untouched.
    pub(crate) fn merge(&mut self, patch: Fields) {
        for (name, value) in patch {
            if !is_identity_field(&name) {
                self.fields.insert(name, value);
            }
        }
    }

    /// The full record, identity included, as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 2);
        map.insert(ID_FIELD.to_string(), Value::from(self.id));
        map.insert(MIRROR_ID_FIELD.to_string(), Value::from(self.mirror_id()));
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.clone());
        }
        Value::Object(map)
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        map.serialize_entry(MIRROR_ID_FIELD, &self.mirror_id())?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Fields::deserialize(deserializer)?;

        let id = match fields.remove(ID_FIELD) {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| de::Error::custom(format!("record id {} is not a u64", n)))?,
            Some(Value::String(s)) => s
                .parse::<u64>()
                .map_err(|_| de::Error::custom(format!("record id {:?} is not numeric", s)))?,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "record id must be a number, got {}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field(ID_FIELD)),
        };

        if let Some(mirror) = fields.remove(MIRROR_ID_FIELD) {
            let expected = id.to_string();
            if mirror.as_str() != Some(expected.as_str()) {
                return Err(de::Error::custom(format!(
                    "record _id {} does not match id {}",
                    mirror, id
                )));
            }
        }

        Ok(Record { id, fields })
    }
}

/// Lookup key accepting either the numeric id or its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! record_key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RecordKey {
                fn from(id: $ty) -> Self {
                    RecordKey(id.to_string())
                }
            }
        )*
    };
}

record_key_from_int!(u64, u32, usize, i64, i32);

impl From<&str> for RecordKey {
    fn from(id: &str) -> Self {
        RecordKey(id.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(id: String) -> Self {
        RecordKey(id)
    }
}

impl From<&String> for RecordKey {
    fn from(id: &String) -> Self {
        RecordKey(id.clone())
    }
}

impl From<&Record> for RecordKey {
    fn from(record: &Record) -> Self {
        RecordKey(record.mirror_id())
    }
}
