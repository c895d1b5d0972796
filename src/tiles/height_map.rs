//! HeightMapData payload
//!
//!   width, height, border: i32
//!   magic: i32 (1)
//!   playable width, playable height: i32
//!   cell count: i32 (width * height)
//!   cell count elevation bytes, row-major

use serde::Serialize;

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightMap {
    width: usize,
    height: usize,
    border: i32,
    map_width: i32,
    map_height: i32,
    #[serde(skip)]
    elevations: Vec<u8>,
}

impl HeightMap {
    /// Flat height map whose playable area is the total size minus the border on each side
    pub fn new(width: usize, height: usize, border: i32) -> Result<Self> {
        let playable = |size: usize| {
            i32::try_from(size)
                .ok()
                .zip(border.checked_mul(2))
                .and_then(|(size, borders)| size.checked_sub(borders))
                .filter(|playable| *playable >= 0 && border >= 0)
        };
        let invalid = || Error::InvalidModel(format!("{width}x{height} map cannot have border {border}"));

        let count = width.checked_mul(height).ok_or_else(invalid)?;
        Ok(Self {
            width,
            height,
            border,
            map_width: playable(width).ok_or_else(invalid)?,
            map_height: playable(height).ok_or_else(invalid)?,
            elevations: vec![0; count],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn border(&self) -> i32 {
        self.border
    }

    /// Playable width as stored in the file (may disagree with `width - 2 * border`
    /// for maps resized by hand)
    pub fn map_width(&self) -> i32 {
        self.map_width
    }

    pub fn map_height(&self) -> i32 {
        self.map_height
    }

    pub fn set_map_size(&mut self, map_width: i32, map_height: i32) {
        self.map_width = map_width;
        self.map_height = map_height;
    }

    pub fn count(&self) -> usize {
        self.elevations.len()
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.elevations[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, elevation: u8) {
        self.elevations[y * self.width + x] = elevation;
    }

    pub fn elevations(&self) -> &[u8] {
        &self.elevations
    }

    pub fn elevations_mut(&mut self) -> &mut [u8] {
        &mut self.elevations
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

impl Decode for HeightMap {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let width = de.read_count()?;
        let height = de.read_count()?;
        let border = de.read_i32()?;
        de.expect_i32(1, "height map magic")?;
        let map_width = de.read_i32()?;
        let map_height = de.read_i32()?;

        let offset = de.position();
        let count = de.read_count()?;
        if Some(count) != width.checked_mul(height) {
            return Err(de.violation_at(
                offset,
                format!("cell count {count} does not match {width}x{height}"),
            ));
        }
        let elevations = de.read_bytes(count)?.to_vec();

        Ok(Self {
            width,
            height,
            border,
            map_width,
            map_height,
            elevations,
        })
    }
}

impl Encode for HeightMap {
    fn encoded_len(&self) -> usize {
        7 * 4 + self.count()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        if self.count() != self.width * self.height {
            return Err(Error::InvalidModel(format!(
                "height map has {} cells for {}x{}",
                self.count(),
                self.width,
                self.height
            )));
        }
        en.write_count(self.width)?;
        en.write_count(self.height)?;
        en.write_i32(self.border);
        en.write_i32(1);
        en.write_i32(self.map_width);
        en.write_i32(self.map_height);
        en.write_count(self.count())?;
        en.write_bytes(&self.elevations);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryReader;

    #[test]
    fn test_height_map_roundtrip() {
        let mut map = HeightMap::new(5, 3, 1).unwrap();
        map.set(4, 2, 200);
        map.set(0, 1, 17);
        map.set_map_size(4, 1);

        let mut en = Encoder::new();
        map.encode(&mut en).unwrap();
        assert_eq!(en.len(), map.encoded_len());
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let read = HeightMap::decode(&mut de).unwrap();
        assert_eq!(read, map);
        assert_eq!(read.get(4, 2), 200);
        assert_eq!(read.get(0, 1), 17);
        assert_eq!(read.map_width(), 4);
    }

    #[test]
    fn test_new_rejects_impossible_sizes() {
        assert_eq!(HeightMap::new(10, 6, 3).unwrap().map_height(), 0);
        for (width, height, border) in [(10, 5, 3), (4, 4, -1), (usize::MAX, 1, 0), (8, 8, i32::MAX)] {
            assert!(
                matches!(HeightMap::new(width, height, border), Err(Error::InvalidModel(_))),
                "{width}x{height} border {border}"
            );
        }
    }

    #[test]
    fn test_cell_count_must_match_dimensions() {
        let mut en = Encoder::new();
        for v in [2, 2, 0, 1, 2, 2, 3] {
            en.write_i32(v);
        }
        en.write_bytes(&[0, 0, 0]);
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(HeightMap::decode(&mut de), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_magic_must_be_one() {
        let mut en = Encoder::new();
        for v in [1, 1, 0, 2, 1, 1, 1] {
            en.write_i32(v);
        }
        en.write_u8(0);
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(HeightMap::decode(&mut de), Err(Error::FormatViolation { .. })));
    }
}
