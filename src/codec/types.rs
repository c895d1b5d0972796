use serde::Serialize;

use super::{Decode, Decoder, Encode, Encoder};
use crate::error::Result;

/// Floating point colour (each channel nominally 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Decode for Rgb {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            r: de.read_f32()?,
            g: de.read_f32()?,
            b: de.read_f32()?,
        })
    }
}

impl Encode for Rgb {
    fn encoded_len(&self) -> usize {
        12
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_f32(self.r);
        en.write_f32(self.g);
        en.write_f32(self.b);
        Ok(())
    }
}

/// Direction or position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Decode for Vector3 {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            x: de.read_f32()?,
            y: de.read_f32()?,
            z: de.read_f32()?,
        })
    }
}

impl Encode for Vector3 {
    fn encoded_len(&self) -> usize {
        12
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_f32(self.x);
        en.write_f32(self.y);
        en.write_f32(self.z);
        Ok(())
    }
}

/// Integer world position (polygon trigger vertices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<(i32, i32, i32)> for Point3 {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

impl Decode for Point3 {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            x: de.read_i32()?,
            y: de.read_i32()?,
            z: de.read_i32()?,
        })
    }
}

impl Encode for Point3 {
    fn encoded_len(&self) -> usize {
        12
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_i32(self.x);
        en.write_i32(self.y);
        en.write_i32(self.z);
        Ok(())
    }
}
