//! Typed key/value metadata attached to dungeon items.
//!
//! The textual form is a `;`-separated list of `KEY:TYPE:VALUE` entries, e.g.
//! `Health:s:150;Attack:s:120;`. Supported types are `b` (byte), `s` (short),
//! `i` (int), `f` (float) and `str` (string).

use std::{collections::BTreeMap, fmt, str::FromStr};

use thiserror::Error;

/// Single typed metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    /// Unsigned byte (`b`).
    Byte(u8),
    /// Signed 16-bit integer (`s`).
    Short(i16),
    /// Signed 32-bit integer (`i`).
    Int(i32),
    /// Floating point number (`f`).
    Float(f32),
    /// Free-form string (`str`).
    Str(String),
}

impl MetaValue {
    fn type_code(&self) -> &'static str {
        match self {
            Self::Byte(_) => "b",
            Self::Short(_) => "s",
            Self::Int(_) => "i",
            Self::Float(_) => "f",
            Self::Str(_) => "str",
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(value) => write!(f, "{value}"),
            Self::Short(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

/// Errors raised while parsing the textual metadata form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaDataError {
    /// An entry did not contain the three `KEY:TYPE:VALUE` fields.
    #[error("metadata entry `{entry}` is not of the form KEY:TYPE:VALUE")]
    MalformedEntry {
        /// Raw entry that failed to split.
        entry: String,
    },
    /// The type code is not one of `b`, `s`, `i`, `f`, `str`.
    #[error("metadata key `{key}` uses unknown type `{code}`")]
    UnknownType {
        /// Key of the offending entry.
        key: String,
        /// Type code that was not recognised.
        code: String,
    },
    /// The value could not be parsed as the declared type.
    #[error("metadata key `{key}` has invalid {code} value `{value}`")]
    InvalidValue {
        /// Key of the offending entry.
        key: String,
        /// Declared type code.
        code: String,
        /// Raw value that failed to parse.
        value: String,
    },
}

/// Dungeon item metadata, e.g. the scaling percentages of a dungeon pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemMetaData {
    values: BTreeMap<String, MetaValue>,
}

impl ItemMetaData {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the key is present, regardless of its type.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the raw value stored under the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    /// Reads the key as a short.
    ///
    /// Bytes widen losslessly and ints narrow only when they fit. Floats and
    /// strings are not shorts and yield `None`.
    #[must_use]
    pub fn get_short(&self, key: &str) -> Option<i16> {
        match self.values.get(key)? {
            MetaValue::Byte(value) => Some(i16::from(*value)),
            MetaValue::Short(value) => Some(*value),
            MetaValue::Int(value) => i16::try_from(*value).ok(),
            MetaValue::Float(_) | MetaValue::Str(_) => None,
        }
    }

    /// Stores a short under the key, replacing any previous value.
    pub fn set_short(&mut self, key: impl Into<String>, value: i16) {
        let _ = self.values.insert(key.into(), MetaValue::Short(value));
    }

    /// Stores an arbitrary value under the key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: MetaValue) {
        let _ = self.values.insert(key.into(), value);
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromStr for ItemMetaData {
    type Err = MetaDataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut meta = Self::new();

        for entry in raw.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            let mut fields = entry.splitn(3, ':');
            let (Some(key), Some(code), Some(value)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(MetaDataError::MalformedEntry {
                    entry: entry.to_owned(),
                });
            };

            let parsed = parse_value(key, code, value)?;
            meta.set(key, parsed);
        }

        Ok(meta)
    }
}

impl fmt::Display for ItemMetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            write!(f, "{key}:{}:{value};", value.type_code())?;
        }
        Ok(())
    }
}

fn parse_value(key: &str, code: &str, value: &str) -> Result<MetaValue, MetaDataError> {
    let invalid = || MetaDataError::InvalidValue {
        key: key.to_owned(),
        code: code.to_owned(),
        value: value.to_owned(),
    };

    match code {
        "b" => value.parse().map(MetaValue::Byte).map_err(|_| invalid()),
        "s" => value.parse().map(MetaValue::Short).map_err(|_| invalid()),
        "i" => value.parse().map(MetaValue::Int).map_err(|_| invalid()),
        "f" => value.parse().map(MetaValue::Float).map_err(|_| invalid()),
        "str" => Ok(MetaValue::Str(value.to_owned())),
        _ => Err(MetaDataError::UnknownType {
            key: key.to_owned(),
            code: code.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dungeon_pass_percentages() {
        let meta: ItemMetaData = "Health:s:150;Defense:s:120;Protection:s:10;"
            .parse()
            .expect("valid metadata");

        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get_short("Health"), Some(150));
        assert_eq!(meta.get_short("Protection"), Some(10));
        assert!(!meta.has("Attack"));
    }

    #[test]
    fn short_reads_widen_bytes_and_narrow_ints() {
        let meta: ItemMetaData = "A:b:200;B:i:300;C:i:70000;D:f:1.5;E:str:x"
            .parse()
            .expect("valid metadata");

        assert_eq!(meta.get_short("A"), Some(200));
        assert_eq!(meta.get_short("B"), Some(300));
        assert_eq!(meta.get_short("C"), None);
        assert_eq!(meta.get_short("D"), None);
        assert!(meta.has("E"));
        assert_eq!(meta.get_short("E"), None);
    }

    #[test]
    fn string_values_may_contain_separators() {
        let meta: ItemMetaData = "NAME:str:a:b".parse().expect("valid metadata");
        assert_eq!(meta.get("NAME"), Some(&MetaValue::Str("a:b".to_owned())));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            "Health:150".parse::<ItemMetaData>(),
            Err(MetaDataError::MalformedEntry {
                entry: "Health:150".to_owned()
            })
        );
        assert!(matches!(
            "Health:q:150".parse::<ItemMetaData>(),
            Err(MetaDataError::UnknownType { .. })
        ));
        assert!(matches!(
            "Health:s:lots".parse::<ItemMetaData>(),
            Err(MetaDataError::InvalidValue { .. })
        ));
    }

    #[test]
    fn display_writes_the_parseable_form() {
        let mut meta = ItemMetaData::new();
        meta.set_short("Attack", 130);
        meta.set_short("Health", 200);

        let text = meta.to_string();
        assert_eq!(text, "Attack:s:130;Health:s:200;");
        assert_eq!(text.parse::<ItemMetaData>(), Ok(meta));
    }
}
