//! Typed key/value properties attached to the map, players, teams and objects
//!
//! Layout:
//!   count: i16
//!   count entries:
//!     type tag: u8
//!     name: i16 (string table index)
//!     reserved: u8 (0)
//!     value (tag dependent):
//!       Boolean        1 byte
//!       Integer        i32
//!       Float          f32
//!       OneByteString  i16 length + bytes
//!       TwoByteString  i16 code unit count + UTF-16LE

use indexmap::IndexMap;
use serde::Serialize;

use crate::codec::{latin1_len, wide_len, Decode, Decoder, Encode, Encoder};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum PropertyType {
    Boolean = 0,
    Integer = 1,
    Float = 2,
    OneByteString = 3,
    TwoByteString = 4,
}

impl PropertyType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Boolean),
            1 => Some(Self::Integer),
            2 => Some(Self::Float),
            3 => Some(Self::OneByteString),
            4 => Some(Self::TwoByteString),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i32),
    Float(f32),
    OneByteString(String),
    TwoByteString(String),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Boolean(_) => PropertyType::Boolean,
            Self::Integer(_) => PropertyType::Integer,
            Self::Float(_) => PropertyType::Float,
            Self::OneByteString(_) => PropertyType::OneByteString,
            Self::TwoByteString(_) => PropertyType::TwoByteString,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::OneByteString(s) | Self::TwoByteString(s) => Some(s),
            _ => None,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Self::Boolean(_) => 1,
            Self::Integer(_) | Self::Float(_) => 4,
            Self::OneByteString(s) => 2 + latin1_len(s),
            Self::TwoByteString(s) => 2 + 2 * wide_len(s),
        }
    }
}

/// One named property as it appears in the stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Decode for Property {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let offset = de.position();
        let tag = de.read_u8()?;
        let kind = PropertyType::from_u8(tag).ok_or(Error::UnknownValueTag {
            kind: "property",
            tag: i32::from(tag),
            offset,
        })?;
        let name = de.read_name()?;
        de.expect_zeros(1)?;

        let value = match kind {
            PropertyType::Boolean => PropertyValue::Boolean(de.read_bool()?),
            PropertyType::Integer => PropertyValue::Integer(de.read_i32()?),
            PropertyType::Float => PropertyValue::Float(de.read_f32()?),
            PropertyType::OneByteString => PropertyValue::OneByteString(de.read_string()?),
            PropertyType::TwoByteString => PropertyValue::TwoByteString(de.read_wide_string()?),
        };
        Ok(Self { name, value })
    }
}

impl Encode for Property {
    fn encoded_len(&self) -> usize {
        1 + 2 + 1 + self.value.encoded_len()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_u8(self.value.property_type() as u8);
        en.write_name(&self.name)?;
        en.write_zeros(1);
        match &self.value {
            PropertyValue::Boolean(v) => en.write_bool(*v),
            PropertyValue::Integer(v) => en.write_i32(*v),
            PropertyValue::Float(v) => en.write_f32(*v),
            PropertyValue::OneByteString(s) => en.write_string(s)?,
            PropertyValue::TwoByteString(s) => en.write_wide_string(s)?,
        }
        Ok(())
    }
}

/// Name-keyed property map; setting an existing name replaces its value
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Properties(IndexMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            PropertyValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut properties = Self::new();
        for property in iter {
            properties.set(property.name, property.value);
        }
        properties
    }
}

impl Decode for Properties {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let offset = de.position();
        let count = de.read_i16()?;
        if count < 0 {
            return Err(de.violation_at(offset, format!("negative property count {count}")));
        }
        let mut properties = Self::new();
        for _ in 0..count {
            let property = Property::decode(de)?;
            tracing::trace!(name = %property.name, value = ?property.value, "property");
            properties.set(property.name, property.value);
        }
        Ok(properties)
    }
}

impl Encode for Properties {
    fn encoded_len(&self) -> usize {
        2 + self
            .0
            .values()
            .map(|value| 1 + 2 + 1 + value.encoded_len())
            .sum::<usize>()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        let count = i16::try_from(self.len())
            .map_err(|_| Error::InvalidModel(format!("{} properties exceed i16", self.len())))?;
        en.write_i16(count);
        for (name, value) in &self.0 {
            let property = Property {
                name: name.clone(),
                value: value.clone(),
            };
            en.write_value("Property", &property)?;
        }
        Ok(())
    }
}
