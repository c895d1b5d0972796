use bitflags::bitflags;
use serde::Serialize;

use crate::codec::{latin1_len, Decode, Decoder, Encode, Encoder, Header, Identifier, Point3};
use crate::error::Result;
use crate::property::Properties;

bitflags! {
    /// Road segment flags carried by road objects
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct RoadOptions: i32 {
        const START = 2;
        const END = 4;
        const ANGLED = 8;
        const BRIDGE_START = 16;
        const BRIDGE_END = 32;
        const TIGHT_CURVE = 64;
        const JOIN = 128;
    }
}

/// An object placed on the map
///
/// Framed as an `Object` section (tag 3):
///   x, y, z, rotation: f32
///   road options: i32
///   type: i16-prefixed string
///   properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptObject {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotation: f32,
    pub road_options: RoadOptions,
    #[serde(rename = "type")]
    pub object_type: String,
    pub properties: Properties,
}

impl ScriptObject {
    pub const WAYPOINT_TYPE: &'static str = "*Waypoints/Waypoint";

    pub fn new(object_type: impl Into<String>, x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            rotation: 0.0,
            road_options: RoadOptions::empty(),
            object_type: object_type.into(),
            properties: Properties::new(),
        }
    }

    pub fn waypoint(x: f32, y: f32, z: f32) -> Self {
        Self::new(Self::WAYPOINT_TYPE, x, y, z)
    }

    pub fn is_waypoint(&self) -> bool {
        self.object_type == Self::WAYPOINT_TYPE
    }

    pub fn squared_distance_on_ground(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }

    pub fn squared_distance_to(&self, other: &ScriptObject) -> f32 {
        self.squared_distance_on_ground(other.x, other.y)
    }

    /// Size including the `Object` header
    pub fn framed_len(&self) -> usize {
        Header::SIZE + self.encoded_len()
    }

    /// Read one framed `Object`
    pub fn read(de: &mut Decoder<'_>) -> Result<Self> {
        let section = de.expect_section(Identifier::Object)?;
        let object = Self::decode(de)?;
        de.finish(&section)?;
        Ok(object)
    }

    pub fn write(&self, en: &mut Encoder) -> Result<()> {
        en.write_section(Identifier::Object, Identifier::Object.format_tag(), self.encoded_len(), |en| {
            self.encode(en)
        })
    }
}

impl Decode for ScriptObject {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let x = de.read_f32()?;
        let y = de.read_f32()?;
        let z = de.read_f32()?;
        let rotation = de.read_f32()?;
        let road_options = RoadOptions::from_bits_retain(de.read_i32()?);
        let object_type = de.read_string()?;
        tracing::trace!(%object_type, x, y, z, "object");
        let properties = Properties::decode(de)?;

        Ok(Self {
            x,
            y,
            z,
            rotation,
            road_options,
            object_type,
            properties,
        })
    }
}

impl Encode for ScriptObject {
    fn encoded_len(&self) -> usize {
        4 * 4 + 4 + 2 + latin1_len(&self.object_type) + self.properties.encoded_len()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_f32(self.x);
        en.write_f32(self.y);
        en.write_f32(self.z);
        en.write_f32(self.rotation);
        en.write_i32(self.road_options.bits());
        en.write_string(&self.object_type)?;
        self.properties.encode(en)
    }
}

/// A named polygon trigger region
///
///   name: i16-prefixed string
///   reserved: 2 bytes
///   id: i32
///   is water, is river: bool
///   river start: i32
///   point count: i32, points (3 x i32 each)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub name: String,
    pub id: i32,
    pub is_water: bool,
    pub is_river: bool,
    pub river_start: i32,
    pub points: Vec<Point3>,
}

impl Area {
    pub fn new(name: impl Into<String>, id: i32, points: Vec<Point3>) -> Self {
        Self {
            name: name.into(),
            id,
            is_water: false,
            is_river: false,
            river_start: 0,
            points,
        }
    }
}

impl Decode for Area {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let name = de.read_string()?;
        de.expect_zeros(2)?;
        let id = de.read_i32()?;
        let is_water = de.read_bool()?;
        let is_river = de.read_bool()?;
        let river_start = de.read_i32()?;

        let count = de.read_count()?;
        tracing::trace!(%name, id, points = count, "area");
        let mut points = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            points.push(Point3::decode(de)?);
        }

        Ok(Self {
            name,
            id,
            is_water,
            is_river,
            river_start,
            points,
        })
    }
}

impl Encode for Area {
    fn encoded_len(&self) -> usize {
        2 + latin1_len(&self.name) + 2 + 4 + 2 + 4 + 4 + 12 * self.points.len()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_string(&self.name)?;
        en.write_zeros(2);
        en.write_i32(self.id);
        en.write_bool(self.is_water);
        en.write_bool(self.is_river);
        en.write_i32(self.river_start);
        en.write_count(self.points.len())?;
        for point in &self.points {
            point.encode(en)?;
        }
        Ok(())
    }
}
