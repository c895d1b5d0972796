//! Script element parameters
//!
//! Every parameter starts with an i32 type tag. The bytes that follow depend on the
//! layout class of the type:
//!   Boolean      1 byte + 9 reserved
//!   Integer      i32 + 6 reserved
//!   Enumeration  i32 (holding an i16 member) + 6 reserved
//!   Real         4 reserved + f32 + 2 reserved
//!   Location     3 x f32
//!   Color        B, G, R, A bytes + 6 reserved
//!   KindOf       i32 member + 4 reserved + i16-prefixed member name
//!   Text         8 reserved + i16-prefixed string

use serde::Serialize;

use super::enumerations::{enumeration, Enumeration};
use crate::codec::{latin1_len, Decode, Decoder, Encode, Encoder, Vector3};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum ParameterType {
    Integer = 0,
    Float = 1,
    Script = 2,
    Team = 3,
    Counter = 4,
    Flag = 5,
    ComparisonOperator = 6,
    Waypoint = 7,
    Boolean = 8,
    Area = 9,
    String = 10,
    Player = 11,
    Sound = 12,
    Subroutine = 13,
    Unit = 14,
    UnitType = 15,
    Location = 16,
    Angle = 17,
    State = 18,
    Relation = 19,
    Mood = 20,
    Speech = 21,
    Music = 22,
    Video = 23,
    Path = 24,
    LocalizedString = 25,
    Bridge = 26,
    KindOf = 27,
    AttackPrioritySet = 28,
    RadarEvent = 29,
    SpecialPower = 30,
    Science = 31,
    Upgrade = 32,
    Boundary = 34,
    Buildability = 35,
    Surface = 36,
    ShakeIntensity = 37,
    CommandButton = 38,
    Font = 39,
    ObjectStatus = 40,
    Ability = 41,
    SkirmishApproachPath = 42,
    Color = 43,
    Emoticon = 44,
    ObjectFlag = 45,
    Faction = 46,
    RevealName = 48,
    ScienceAvailability = 49,
    EvacuationSide = 50,
    Percent = 51,
}

/// How a parameter's value is laid out after its type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLayout {
    Boolean,
    Integer,
    Enumeration,
    Real,
    Location,
    Color,
    KindOf,
    Text,
}

impl ParameterType {
    pub const ALL: [ParameterType; 50] = [
        Self::Integer,
        Self::Float,
        Self::Script,
        Self::Team,
        Self::Counter,
        Self::Flag,
        Self::ComparisonOperator,
        Self::Waypoint,
        Self::Boolean,
        Self::Area,
        Self::String,
        Self::Player,
        Self::Sound,
        Self::Subroutine,
        Self::Unit,
        Self::UnitType,
        Self::Location,
        Self::Angle,
        Self::State,
        Self::Relation,
        Self::Mood,
        Self::Speech,
        Self::Music,
        Self::Video,
        Self::Path,
        Self::LocalizedString,
        Self::Bridge,
        Self::KindOf,
        Self::AttackPrioritySet,
        Self::RadarEvent,
        Self::SpecialPower,
        Self::Science,
        Self::Upgrade,
        Self::Boundary,
        Self::Buildability,
        Self::Surface,
        Self::ShakeIntensity,
        Self::CommandButton,
        Self::Font,
        Self::ObjectStatus,
        Self::Ability,
        Self::SkirmishApproachPath,
        Self::Color,
        Self::Emoticon,
        Self::ObjectFlag,
        Self::Faction,
        Self::RevealName,
        Self::ScienceAvailability,
        Self::EvacuationSide,
        Self::Percent,
    ];

    pub fn from_i32(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *kind as i32 == tag)
    }

    pub fn layout(self) -> ParameterLayout {
        match self {
            Self::Boolean => ParameterLayout::Boolean,
            Self::Integer => ParameterLayout::Integer,
            Self::ComparisonOperator
            | Self::Surface
            | Self::ShakeIntensity
            | Self::Mood
            | Self::EvacuationSide
            | Self::RadarEvent
            | Self::Buildability
            | Self::Boundary => ParameterLayout::Enumeration,
            Self::Float | Self::Angle | Self::Percent => ParameterLayout::Real,
            Self::Location => ParameterLayout::Location,
            Self::Color => ParameterLayout::Color,
            Self::KindOf => ParameterLayout::KindOf,
            _ => ParameterLayout::Text,
        }
    }
}

/// Colour as stored in a Color parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i32),
    Real(f32),
    Location(Vector3),
    Color(Color),
    /// Member of the registry of the parameter's type
    Enum(i16),
    Text(String),
}

impl ParameterValue {
    fn fits(&self, layout: ParameterLayout) -> bool {
        matches!(
            (self, layout),
            (Self::Boolean(_), ParameterLayout::Boolean)
                | (Self::Integer(_), ParameterLayout::Integer)
                | (Self::Real(_), ParameterLayout::Real)
                | (Self::Location(_), ParameterLayout::Location)
                | (Self::Color(_), ParameterLayout::Color)
                | (Self::Enum(_), ParameterLayout::Enumeration | ParameterLayout::KindOf)
                | (Self::Text(_), ParameterLayout::Text)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub kind: ParameterType,
    pub value: ParameterValue,
}

impl Parameter {
    /// Build a parameter, checking that `value` has the layout `kind` requires
    pub fn new(kind: ParameterType, value: ParameterValue) -> Result<Self> {
        let parameter = Self { kind, value };
        parameter.validate()?;
        Ok(parameter)
    }

    pub fn boolean(value: bool) -> Self {
        Self { kind: ParameterType::Boolean, value: ParameterValue::Boolean(value) }
    }

    pub fn integer(value: i32) -> Self {
        Self { kind: ParameterType::Integer, value: ParameterValue::Integer(value) }
    }

    pub fn float(value: f32) -> Self {
        Self { kind: ParameterType::Float, value: ParameterValue::Real(value) }
    }

    pub fn location(x: f32, y: f32, z: f32) -> Self {
        Self {
            kind: ParameterType::Location,
            value: ParameterValue::Location(Vector3::new(x, y, z)),
        }
    }

    pub fn color(color: Color) -> Self {
        Self { kind: ParameterType::Color, value: ParameterValue::Color(color) }
    }

    /// A string-valued parameter such as a team, waypoint or sound name
    pub fn text(kind: ParameterType, value: impl Into<String>) -> Result<Self> {
        Self::new(kind, ParameterValue::Text(value.into()))
    }

    /// An enum-like parameter, given its member name
    pub fn enumeration(kind: ParameterType, member: &str) -> Result<Self> {
        let registry = enumeration(kind)
            .ok_or_else(|| Error::InvalidModel(format!("{kind:?} is not an enumeration")))?;
        let value = registry.value_of(member).ok_or_else(|| {
            Error::InvalidModel(format!("{member:?} is not a member of {}", registry.name))
        })?;
        Self::new(kind, ParameterValue::Enum(value))
    }

    pub fn kind_of(member: &str) -> Result<Self> {
        Self::enumeration(ParameterType::KindOf, member)
    }

    /// Registry name of an enum-like value
    pub fn member_name(&self) -> Option<&'static str> {
        match self.value {
            ParameterValue::Enum(v) => enumeration(self.kind)?.name_of(v),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        let layout = self.kind.layout();
        if !self.value.fits(layout) {
            return Err(Error::InvalidModel(format!(
                "{:?} parameter cannot hold {:?}",
                self.kind, self.value
            )));
        }
        if let ParameterValue::Enum(v) = self.value {
            if !enumeration(self.kind).is_some_and(|registry| registry.accepts(v)) {
                return Err(Error::InvalidModel(format!(
                    "{v} is not a member of {:?}",
                    self.kind
                )));
            }
        }
        Ok(())
    }
}

fn read_member(de: &mut Decoder<'_>, registry: &Enumeration) -> Result<i16> {
    let offset = de.position();
    let raw = de.read_i32()?;
    match i16::try_from(raw) {
        Ok(value) if registry.accepts(value) => Ok(value),
        _ => Err(de.violation_at(offset, format!("{raw} is not a member of {}", registry.name))),
    }
}

impl Decode for Parameter {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let offset = de.position();
        let tag = de.read_i32()?;
        let kind = ParameterType::from_i32(tag).ok_or(Error::UnknownValueTag {
            kind: "parameter",
            tag,
            offset,
        })?;

        let value = match kind.layout() {
            ParameterLayout::Boolean => {
                let v = de.read_bool()?;
                de.expect_zeros(9)?;
                ParameterValue::Boolean(v)
            }
            ParameterLayout::Integer => {
                let v = de.read_i32()?;
                de.expect_zeros(6)?;
                ParameterValue::Integer(v)
            }
            ParameterLayout::Enumeration => {
                let registry = enumeration(kind).ok_or_else(|| de.violation("missing registry"))?;
                let v = read_member(de, registry)?;
                de.expect_zeros(6)?;
                ParameterValue::Enum(v)
            }
            ParameterLayout::Real => {
                de.expect_zeros(4)?;
                let v = de.read_f32()?;
                de.expect_zeros(2)?;
                ParameterValue::Real(v)
            }
            ParameterLayout::Location => ParameterValue::Location(Vector3::decode(de)?),
            ParameterLayout::Color => {
                let b = de.read_u8()?;
                let g = de.read_u8()?;
                let r = de.read_u8()?;
                let a = de.read_u8()?;
                de.expect_zeros(6)?;
                ParameterValue::Color(Color { r, g, b, a })
            }
            ParameterLayout::KindOf => {
                let registry = enumeration(kind).ok_or_else(|| de.violation("missing registry"))?;
                let v = read_member(de, registry)?;
                de.expect_zeros(4)?;
                let offset = de.position();
                let name = de.read_string()?;
                if registry.name_of(v) != Some(name.as_str()) {
                    return Err(de.violation_at(
                        offset,
                        format!("KindOf {v} is spelled {name:?}"),
                    ));
                }
                ParameterValue::Enum(v)
            }
            ParameterLayout::Text => {
                de.expect_zeros(8)?;
                ParameterValue::Text(de.read_string()?)
            }
        };

        let parameter = Self { kind, value };
        tracing::trace!(kind = ?parameter.kind, value = ?parameter.value, "parameter");
        Ok(parameter)
    }
}

impl Encode for Parameter {
    fn encoded_len(&self) -> usize {
        4 + match &self.value {
            ParameterValue::Location(_) => 12,
            ParameterValue::Text(s) => 8 + 2 + latin1_len(s),
            ParameterValue::Enum(_) if self.kind.layout() == ParameterLayout::KindOf => {
                8 + 2 + self.member_name().map_or(0, latin1_len)
            }
            _ => 10,
        }
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        self.validate()?;
        en.write_i32(self.kind as i32);

        match &self.value {
            ParameterValue::Boolean(v) => {
                en.write_bool(*v);
                en.write_zeros(9);
            }
            ParameterValue::Integer(v) => {
                en.write_i32(*v);
                en.write_zeros(6);
            }
            ParameterValue::Real(v) => {
                en.write_zeros(4);
                en.write_f32(*v);
                en.write_zeros(2);
            }
            ParameterValue::Location(v) => v.encode(en)?,
            ParameterValue::Color(c) => {
                en.write_bytes(&[c.b, c.g, c.r, c.a]);
                en.write_zeros(6);
            }
            ParameterValue::Enum(v) => {
                en.write_i32(i32::from(*v));
                if self.kind.layout() == ParameterLayout::KindOf {
                    en.write_zeros(4);
                    en.write_string(self.member_name().unwrap_or_default())?;
                } else {
                    en.write_zeros(6);
                }
            }
            ParameterValue::Text(s) => {
                en.write_zeros(8);
                en.write_string(s)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BinaryReader, BinaryWriter, StringTable};

    fn roundtrip(parameter: &Parameter) -> Parameter {
        let mut en = Encoder::new();
        en.write_value("Parameter", parameter).unwrap();
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let decoded = Parameter::decode(&mut de).unwrap();
        assert!(de.is_empty());
        decoded
    }

    fn representative(kind: ParameterType) -> Parameter {
        let value = match kind.layout() {
            ParameterLayout::Boolean => ParameterValue::Boolean(true),
            ParameterLayout::Integer => ParameterValue::Integer(-7),
            ParameterLayout::Real => ParameterValue::Real(42.5),
            ParameterLayout::Location => ParameterValue::Location(Vector3::new(10.0, -2.5, 0.125)),
            ParameterLayout::Color => ParameterValue::Color(Color::new(255, 128, 1, 200)),
            ParameterLayout::Enumeration | ParameterLayout::KindOf => {
                let members = enumeration(kind).unwrap().members();
                ParameterValue::Enum(members[members.len() - 1].1)
            }
            ParameterLayout::Text => ParameterValue::Text(format!("{kind:?} value")),
        };
        Parameter::new(kind, value).unwrap()
    }

    #[test]
    fn test_every_parameter_type_roundtrips() {
        for kind in ParameterType::ALL {
            let parameter = representative(kind);
            assert_eq!(roundtrip(&parameter), parameter, "{kind:?}");
        }
    }

    #[test]
    fn test_unassigned_tags_are_unknown() {
        for tag in [33, 47, 52, -1] {
            assert_eq!(ParameterType::from_i32(tag), None);
            let mut writer = BinaryWriter::new();
            writer.write_i32_le(tag);
            writer.write_zeros(10);
            let data = writer.into_vec();
            let mut de = Decoder::new(BinaryReader::new(&data), StringTable::new());
            assert!(matches!(
                Parameter::decode(&mut de),
                Err(Error::UnknownValueTag { kind: "parameter", .. })
            ));
        }
    }

    #[test]
    fn test_fixed_layouts_are_fourteen_bytes() {
        assert_eq!(Parameter::boolean(true).encoded_len(), 14);
        assert_eq!(Parameter::integer(1).encoded_len(), 14);
        assert_eq!(Parameter::float(1.0).encoded_len(), 14);
        assert_eq!(Parameter::color(Color::default()).encoded_len(), 14);
        assert_eq!(Parameter::location(0.0, 0.0, 0.0).encoded_len(), 16);
        assert_eq!(Parameter::kind_of("STRUCTURE").unwrap().encoded_len(), 4 + 8 + 2 + 9);
    }

    #[test]
    fn test_wire_layouts() {
        let mut en = Encoder::new();
        Parameter::integer(42).encode(&mut en).unwrap();
        Parameter::float(1.0).encode(&mut en).unwrap();
        Parameter::color(Color::new(1, 2, 3, 4)).encode(&mut en).unwrap();
        let (_, body) = en.finish();
        assert_eq!(
            body,
            vec![
                0, 0, 0, 0, 42, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
                1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x80, 0x3f, 0, 0, //
                43, 0, 0, 0, 3, 2, 1, 4, 0, 0, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_kind_of_carries_its_name() {
        let parameter = Parameter::kind_of("INFANTRY").unwrap();
        let mut en = Encoder::new();
        parameter.encode(&mut en).unwrap();
        let (_, body) = en.finish();
        assert_eq!(&body[..8], &[27, 0, 0, 0, 8, 0, 0, 0]);
        assert_eq!(&body[12..14], &[8, 0]);
        assert_eq!(&body[14..], b"INFANTRY");
    }

    #[test]
    fn test_kind_of_name_mismatch_is_fatal() {
        let mut writer = BinaryWriter::new();
        writer.write_i32_le(ParameterType::KindOf as i32);
        writer.write_i32_le(8);
        writer.write_zeros(4);
        writer.write_string("VEHICLE").unwrap();
        let data = writer.into_vec();

        let mut de = Decoder::new(BinaryReader::new(&data), StringTable::new());
        assert!(matches!(Parameter::decode(&mut de), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_enum_value_outside_registry() {
        let mut writer = BinaryWriter::new();
        writer.write_i32_le(ParameterType::Surface as i32);
        writer.write_i32_le(0);
        writer.write_zeros(6);
        let data = writer.into_vec();
        let mut de = Decoder::new(BinaryReader::new(&data), StringTable::new());
        assert!(matches!(Parameter::decode(&mut de), Err(Error::FormatViolation { .. })));

        let mut writer = BinaryWriter::new();
        writer.write_i32_le(ParameterType::ComparisonOperator as i32);
        writer.write_i32_le(0x10000);
        writer.write_zeros(6);
        let data = writer.into_vec();
        let mut de = Decoder::new(BinaryReader::new(&data), StringTable::new());
        assert!(matches!(Parameter::decode(&mut de), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_boundary_index_beyond_named_members() {
        let parameter = Parameter::new(ParameterType::Boundary, ParameterValue::Enum(12)).unwrap();
        assert_eq!(parameter.member_name(), None);
        assert_eq!(roundtrip(&parameter), parameter);

        let mut writer = BinaryWriter::new();
        writer.write_i32_le(ParameterType::Boundary as i32);
        writer.write_i32_le(-1);
        writer.write_zeros(6);
        let data = writer.into_vec();
        let mut de = Decoder::new(BinaryReader::new(&data), StringTable::new());
        assert!(matches!(Parameter::decode(&mut de), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_mismatched_value_is_rejected_on_write() {
        let bad = Parameter {
            kind: ParameterType::Waypoint,
            value: ParameterValue::Integer(3),
        };
        let mut en = Encoder::new();
        assert!(matches!(bad.encode(&mut en), Err(Error::InvalidModel(_))));

        let bad = Parameter {
            kind: ParameterType::Surface,
            value: ParameterValue::Enum(9),
        };
        assert!(matches!(bad.encode(&mut en), Err(Error::InvalidModel(_))));
        assert!(Parameter::enumeration(ParameterType::Mood, "Furious").is_err());
        assert!(Parameter::text(ParameterType::Integer, "1").is_err());
    }

    #[test]
    fn test_enumeration_constructor() {
        let parameter = Parameter::enumeration(ParameterType::ComparisonOperator, "GreaterEqual").unwrap();
        assert_eq!(parameter.value, ParameterValue::Enum(3));
        assert_eq!(parameter.member_name(), Some("GreaterEqual"));
    }
}
