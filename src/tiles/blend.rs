use serde::Serialize;

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::Result;

/// 64-bit blend flag word.
///
/// Bits 16, 24, 32, 40, 48 and 56 carry the edge/corner flags. Only twelve
/// combinations have names, but any value read from a file is kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct BlendType(i64);

impl BlendType {
    pub const TOP: Self = Self(281474993487872);
    pub const BOTTOM: Self = Self(16777216);
    pub const LEFT: Self = Self(65536);
    pub const RIGHT: Self = Self(281474976776192);
    pub const TOP_LEFT_SMALL: Self = Self(281479271677952);
    pub const TOP_LEFT_LARGE: Self = Self(72339073309605888);
    pub const TOP_RIGHT_SMALL: Self = Self(282574488338432);
    pub const TOP_RIGHT_LARGE: Self = Self(72340168526266368);
    pub const BOTTOM_LEFT_SMALL: Self = Self(4294967296);
    pub const BOTTOM_LEFT_LARGE: Self = Self(72057598332895232);
    pub const BOTTOM_RIGHT_SMALL: Self = Self(1099511627776);
    pub const BOTTOM_RIGHT_LARGE: Self = Self(72058693549555712);

    const NAMED: [(Self, &'static str); 12] = [
        (Self::TOP, "Top"),
        (Self::BOTTOM, "Bottom"),
        (Self::LEFT, "Left"),
        (Self::RIGHT, "Right"),
        (Self::TOP_LEFT_SMALL, "TopLeftSmall"),
        (Self::TOP_LEFT_LARGE, "TopLeftLarge"),
        (Self::TOP_RIGHT_SMALL, "TopRightSmall"),
        (Self::TOP_RIGHT_LARGE, "TopRightLarge"),
        (Self::BOTTOM_LEFT_SMALL, "BottomLeftSmall"),
        (Self::BOTTOM_LEFT_LARGE, "BottomLeftLarge"),
        (Self::BOTTOM_RIGHT_SMALL, "BottomRightSmall"),
        (Self::BOTTOM_RIGHT_LARGE, "BottomRightLarge"),
    ];

    pub const fn from_bits(bits: i64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i64 {
        self.0
    }

    const fn bit(self, shift: u32) -> bool {
        (self.0 >> shift) & 1 == 1
    }

    pub const fn is_vertical_edge(self) -> bool {
        self.bit(16)
    }

    pub const fn is_horizontal_edge(self) -> bool {
        self.bit(24)
    }

    pub const fn is_left_angled_edge(self) -> bool {
        self.bit(32)
    }

    pub const fn is_right_angled_edge(self) -> bool {
        self.bit(40)
    }

    pub const fn is_top_right_corner(self) -> bool {
        self.bit(48)
    }

    pub const fn is_large_angled_edge(self) -> bool {
        self.bit(56)
    }

    /// Name of one of the twelve canonical patterns
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(blend, _)| *blend == self)
            .map(|(_, name)| *name)
    }
}

impl From<i64> for BlendType {
    fn from(bits: i64) -> Self {
        Self(bits)
    }
}

impl From<BlendType> for i64 {
    fn from(blend: BlendType) -> Self {
        blend.0
    }
}

impl std::fmt::Display for BlendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown: {}", self.0),
        }
    }
}

/// One entry of the blend tile table
///
///   tile index: i16
///   blend type: i64
///   blend data: i64 (always [`BlendTile::BLEND_DATA`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlendTile {
    pub tile_index: i16,
    pub blend_type: BlendType,
}

impl BlendTile {
    pub const BLEND_DATA: i64 = 8852388021845098495;
    pub const SIZE: usize = 2 + 8 + 8;
}

impl Decode for BlendTile {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let tile_index = de.read_i16()?;
        let blend_type = BlendType(de.read_i64()?);
        let offset = de.position();
        let blend_data = de.read_i64()?;
        if blend_data != Self::BLEND_DATA {
            return Err(de.violation_at(offset, format!("blend data is {blend_data:#x}")));
        }
        Ok(Self { tile_index, blend_type })
    }
}

impl Encode for BlendTile {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_i16(self.tile_index);
        en.write_i64(self.blend_type.0);
        en.write_i64(Self::BLEND_DATA);
        Ok(())
    }
}
