//! GlobalLighting payload
//!
//!   time of day: u8 + 3 reserved
//!   morning, afternoon, evening, night: LightOptions (216 bytes each)
//!   trailer: 160, 160, 160, 127

use serde::Serialize;

use crate::codec::{Decode, Decoder, Encode, Encoder, Rgb, Vector3};
use crate::error::Result;

const TRAILER: [u8; 4] = [160, 160, 160, 127];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum TimeOfDay {
    #[default]
    Invalid = 0,
    Morning = 1,
    Afternoon = 2,
    Evening = 3,
    Night = 4,
}

impl TimeOfDay {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Invalid),
            1 => Some(Self::Morning),
            2 => Some(Self::Afternoon),
            3 => Some(Self::Evening),
            4 => Some(Self::Night),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Light {
    pub color: Rgb,
    pub direction: Vector3,
}

impl Light {
    pub const fn new(color: Rgb, direction: Vector3) -> Self {
        Self { color, direction }
    }

    /// Black light pointing straight down
    pub const fn off() -> Self {
        Self::new(Rgb::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0))
    }
}

impl Decode for Light {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            color: Rgb::decode(de)?,
            direction: Vector3::decode(de)?,
        })
    }
}

impl Encode for Light {
    fn encoded_len(&self) -> usize {
        24
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        self.color.encode(en)?;
        self.direction.encode(en)
    }
}

/// Lighting of one time of day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LightOptions {
    pub object_ambient: Rgb,
    pub objects_sun: Light,
    pub terrain_ambient: Rgb,
    pub terrain_sun: Light,
    pub objects_accent1: Light,
    pub objects_accent2: Light,
    pub terrain_accent1: Light,
    pub terrain_accent2: Light,
}

impl LightOptions {
    pub const SIZE: usize = 12 + 24 + 12 + 24 + 4 * (12 + 24);

    /// Same ambient colour and sun for objects and terrain, accents off
    const fn sunlit(ambient: Rgb, sun: Light) -> Self {
        Self {
            object_ambient: ambient,
            objects_sun: sun,
            terrain_ambient: ambient,
            terrain_sun: sun,
            objects_accent1: Light::off(),
            objects_accent2: Light::off(),
            terrain_accent1: Light::off(),
            terrain_accent2: Light::off(),
        }
    }
}

impl Decode for LightOptions {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let object_ambient = Rgb::decode(de)?;
        let objects_sun = Light::decode(de)?;
        let terrain_ambient = Rgb::decode(de)?;
        let terrain_sun = Light::decode(de)?;
        let mut accents = [Light::default(); 4];
        for accent in &mut accents {
            de.expect_zeros(12)?;
            *accent = Light::decode(de)?;
        }
        let [objects_accent1, objects_accent2, terrain_accent1, terrain_accent2] = accents;

        Ok(Self {
            object_ambient,
            objects_sun,
            terrain_ambient,
            terrain_sun,
            objects_accent1,
            objects_accent2,
            terrain_accent1,
            terrain_accent2,
        })
    }
}

impl Encode for LightOptions {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        self.object_ambient.encode(en)?;
        self.objects_sun.encode(en)?;
        self.terrain_ambient.encode(en)?;
        self.terrain_sun.encode(en)?;
        for accent in [
            &self.objects_accent1,
            &self.objects_accent2,
            &self.terrain_accent1,
            &self.terrain_accent2,
        ] {
            en.write_zeros(12);
            accent.encode(en)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GlobalLightOptions {
    pub time_of_day: TimeOfDay,
    pub morning: LightOptions,
    pub afternoon: LightOptions,
    pub evening: LightOptions,
    pub night: LightOptions,
}

impl GlobalLightOptions {
    pub const SIZE: usize = 4 + 4 * LightOptions::SIZE + 4;

    /// The stock four-period preset used for generated maps
    pub fn default_lighting() -> Self {
        let mut afternoon = LightOptions::sunlit(
            Rgb::new(0.22, 0.2, 0.17),
            Light::new(Rgb::new(1.0, 1.0, 1.0), Vector3::new(-0.81, 0.38, -0.45)),
        );
        let accent1 = Vector3::new(0.79, 0.62, 0.0);
        let accent2 = Light::new(Rgb::new(0.12, 0.12, 0.08), Vector3::new(0.81, -0.48, -0.34));
        afternoon.objects_accent1 = Light::new(Rgb::new(0.23, 0.23, 0.31), accent1);
        afternoon.terrain_accent1 = Light::new(Rgb::new(0.23, 0.23, 0.47), accent1);
        afternoon.objects_accent2 = accent2;
        afternoon.terrain_accent2 = accent2;

        Self {
            time_of_day: TimeOfDay::Afternoon,
            morning: LightOptions::sunlit(
                Rgb::new(0.5, 0.4, 0.3),
                Light::new(Rgb::new(0.9, 0.7, 0.6), Vector3::new(-0.96, 0.05, -0.28)),
            ),
            afternoon,
            evening: LightOptions::sunlit(
                Rgb::new(0.25, 0.23, 0.2),
                Light::new(Rgb::new(0.6, 0.5, 0.4), Vector3::new(-1.0, 0.0, -0.2)),
            ),
            night: LightOptions::sunlit(
                Rgb::new(0.1, 0.1, 0.15),
                Light::new(Rgb::new(0.2, 0.2, 0.3), Vector3::new(-1.0, 1.0, -2.0)),
            ),
        }
    }
}

impl Decode for GlobalLightOptions {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let offset = de.position();
        let tag = de.read_u8()?;
        let time_of_day = TimeOfDay::from_u8(tag)
            .ok_or_else(|| de.violation_at(offset, format!("unknown time of day {tag}")))?;
        de.expect_zeros(3)?;

        let morning = LightOptions::decode(de)?;
        let afternoon = LightOptions::decode(de)?;
        let evening = LightOptions::decode(de)?;
        let night = LightOptions::decode(de)?;

        let offset = de.position();
        let trailer = de.read_bytes(TRAILER.len())?;
        if trailer != TRAILER {
            return Err(de.violation_at(offset, format!("lighting trailer is {trailer:?}")));
        }

        Ok(Self {
            time_of_day,
            morning,
            afternoon,
            evening,
            night,
        })
    }
}

impl Encode for GlobalLightOptions {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_u8(self.time_of_day as u8);
        en.write_zeros(3);
        for options in [&self.morning, &self.afternoon, &self.evening, &self.night] {
            options.encode(en)?;
        }
        en.write_bytes(&TRAILER);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryReader;
    use crate::error::Error;

    #[test]
    fn test_default_lighting_roundtrip() {
        let lighting = GlobalLightOptions::default_lighting();
        let mut en = Encoder::new();
        en.write_value("GlobalLighting", &lighting).unwrap();
        let (strings, body) = en.finish();
        assert_eq!(body.len(), 872);
        assert_eq!(&body[..4], &[2, 0, 0, 0]);
        assert_eq!(&body[868..], &TRAILER);

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert_eq!(GlobalLightOptions::decode(&mut de).unwrap(), lighting);
    }

    #[test]
    fn test_preset_values() {
        let lighting = GlobalLightOptions::default_lighting();
        assert_eq!(lighting.night.terrain_sun.direction, Vector3::new(-1.0, 1.0, -2.0));
        assert_eq!(lighting.morning.objects_accent2, Light::off());
        assert_eq!(lighting.afternoon.terrain_accent1.color, Rgb::new(0.23, 0.23, 0.47));
    }

    #[test]
    fn test_bad_trailer_is_fatal() {
        let mut en = Encoder::new();
        GlobalLightOptions::default().encode(&mut en).unwrap();
        let (strings, mut body) = en.finish();
        let last = body.len() - 1;
        body[last] = 128;

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(GlobalLightOptions::decode(&mut de), Err(Error::FormatViolation { .. })));
    }
}
