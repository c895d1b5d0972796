//! Terrain tiles: height field, texture planes, impassability and blend tiles
//!
//! BlendTileData payload:
//!   cell count: i32
//!   base texture plane:  cell count x i16
//!   blend 1..3 planes:   cell count x i16 each
//!   impassability:       per row, ceil(width / 8) bytes, tile j in bit j % 8
//!   base tile count:     i32
//!   blend tile count:    i32 (table length + 1)
//!   magic:               i32 (1)
//!   texture count:       i32, textures, 8 reserved bytes
//!   blend tiles:         (blend tile count - 1) entries

pub mod blend;
pub mod height_map;

pub use blend::{BlendTile, BlendType};
pub use height_map::HeightMap;

use ahash::AHashMap;
use serde::Serialize;

use crate::codec::{latin1_len, Decode, Decoder, Encode, Encoder};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tile {
    pub base_texture: i16,
    /// 0 = none, otherwise a 1-based index into the blend tile table
    pub blend_textures: [i16; 3],
    pub impassable: bool,
}

/// A terrain texture occupying `block_count` 2x2 tile blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Texture {
    pub name: String,
    pub block_start_index: i32,
    pub block_count: i32,
    pub blocks_per_row: i32,
}

impl Texture {
    pub fn new(name: impl Into<String>, blocks_per_row: i32) -> Self {
        Self {
            name: name.into(),
            block_start_index: 0,
            block_count: blocks_per_row * blocks_per_row,
            blocks_per_row,
        }
    }

    /// Tile index of this texture for map cell `(x, y)`, repeating every `blocks_per_row` blocks
    pub fn tile_index(&self, x: usize, y: usize) -> Result<i16> {
        let per_row = usize::try_from(self.blocks_per_row.max(1)).unwrap_or(1);
        let block_x = (x / 2) % per_row;
        let block_y = (y / 2) % per_row;

        let mut index = block_y * 4 * per_row + block_x * 4;
        if x % 2 == 1 {
            index += 1;
        }
        if y % 2 == 1 {
            index += 2;
        }
        i32::try_from(index)
            .ok()
            .and_then(|index| self.block_start_index.checked_mul(4)?.checked_add(index))
            .and_then(|tile| i16::try_from(tile).ok())
            .filter(|tile| *tile >= 0)
            .ok_or_else(|| {
                Error::InvalidModel(format!(
                    "texture {:?} starting at block {} has no tile index for ({x}, {y})",
                    self.name, self.block_start_index
                ))
            })
    }

    fn contains_tile(&self, tile_index: i16) -> bool {
        let tile = i32::from(tile_index);
        self.block_start_index * 4 <= tile && tile < (self.block_start_index + self.block_count) * 4
    }
}

impl Decode for Texture {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let block_start_index = de.read_i32()?;
        let offset = de.position();
        let block_count = de.read_i32()?;
        let blocks_per_row = de.read_i32()?;
        if Some(block_count) != blocks_per_row.checked_mul(blocks_per_row) {
            return Err(de.violation_at(
                offset,
                format!("texture has {block_count} blocks but {blocks_per_row} blocks per row"),
            ));
        }
        de.expect_i32(0, "texture magic")?;
        let name = de.read_string()?;
        Ok(Self {
            name,
            block_start_index,
            block_count,
            blocks_per_row,
        })
    }
}

impl Encode for Texture {
    fn encoded_len(&self) -> usize {
        4 * 4 + 2 + latin1_len(&self.name)
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_i32(self.block_start_index);
        en.write_i32(self.block_count);
        en.write_i32(self.blocks_per_row);
        en.write_i32(0);
        en.write_string(&self.name)
    }
}

/// Bytes used by one row of the impassability plane
pub fn impassability_row_len(width: usize) -> usize {
    width.div_ceil(8)
}

/// Pack row-major impassability flags; every row starts on a fresh byte
pub fn pack_impassability(flags: &[bool], width: usize) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let row_len = impassability_row_len(width);
    let mut out = Vec::with_capacity(flags.len().div_ceil(width) * row_len);
    for row in flags.chunks(width) {
        let mut bytes = vec![0u8; row_len];
        for (j, &impassable) in row.iter().enumerate() {
            if impassable {
                bytes[j / 8] |= 1 << (j % 8);
            }
        }
        out.extend_from_slice(&bytes);
    }
    out
}

/// Inverse of [`pack_impassability`]; unused high bits of a row's last byte are ignored
pub fn unpack_impassability(bytes: &[u8], width: usize, height: usize) -> Vec<bool> {
    let row_len = impassability_row_len(width);
    let mut flags = Vec::with_capacity(width * height);
    for row in bytes.chunks(row_len.max(1)).take(height) {
        for j in 0..width {
            flags.push((row[j / 8] >> (j % 8)) & 1 == 1);
        }
    }
    flags
}

/// Tile grid plus the texture and blend tile tables it indexes into
#[derive(Debug, Clone, Serialize)]
pub struct TileData {
    width: usize,
    height: usize,
    #[serde(skip)]
    tiles: Vec<Tile>,
    pub number_of_base_tiles: i32,
    textures: Vec<Texture>,
    blend_tiles: Vec<BlendTile>,
    /// tile index -> positions in `blend_tiles` registered for it
    #[serde(skip)]
    blend_index: AHashMap<i16, Vec<usize>>,
}

impl PartialEq for TileData {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.tiles == other.tiles
            && self.number_of_base_tiles == other.number_of_base_tiles
            && self.textures == other.textures
            && self.blend_tiles == other.blend_tiles
    }
}

impl TileData {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width * height],
            number_of_base_tiles: 0,
            textures: Vec::new(),
            blend_tiles: Vec::new(),
            blend_index: AHashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[y * self.width + x]
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        &mut self.tiles[y * self.width + x]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn blend_tiles(&self) -> &[BlendTile] {
        &self.blend_tiles
    }

    /// Stored blend tile counter: always one more than the table length
    pub fn number_of_blend_tiles(&self) -> usize {
        self.blend_tiles.len() + 1
    }

    /// Register a texture, returning the already registered one if the name is taken.
    /// New textures are placed after all previously registered blocks.
    pub fn add_texture(&mut self, mut texture: Texture) -> &Texture {
        if let Some(i) = self.textures.iter().position(|t| t.name == texture.name) {
            return &self.textures[i];
        }
        texture.block_start_index = self.number_of_base_tiles;
        self.number_of_base_tiles += texture.block_count;
        self.textures.push(texture);
        &self.textures[self.textures.len() - 1]
    }

    /// Texture owning the base texture of cell `(x, y)`
    pub fn texture_at(&self, x: usize, y: usize) -> Option<&Texture> {
        let base = self.tile(x, y).base_texture;
        self.textures.iter().find(|t| t.contains_tile(base))
    }

    /// 1-based index of the blend tile `(tile_index, blend_type)`, adding it if new
    pub fn get_blend_tile_index(&mut self, tile_index: i16, blend_type: BlendType) -> Result<i16> {
        let candidates = self.blend_index.entry(tile_index).or_default();
        if let Some(&i) = candidates
            .iter()
            .find(|&&i| self.blend_tiles[i].blend_type == blend_type)
        {
            return Ok((i + 1) as i16);
        }

        let index = i16::try_from(self.blend_tiles.len() + 1)
            .map_err(|_| Error::InvalidModel("blend tile table exceeds i16 indices".into()))?;
        candidates.push(self.blend_tiles.len());
        self.blend_tiles.push(BlendTile { tile_index, blend_type });
        Ok(index)
    }

    fn rebuild_blend_index(&mut self) {
        self.blend_index.clear();
        for (i, blend) in self.blend_tiles.iter().enumerate() {
            self.blend_index.entry(blend.tile_index).or_default().push(i);
        }
    }

    /// Parse a BlendTileData payload for a `width` x `height` grid
    pub fn read(de: &mut Decoder<'_>, width: usize, height: usize) -> Result<Self> {
        let mut data = Self::new(width, height);

        let offset = de.position();
        let count = de.read_count()?;
        if count != data.count() {
            return Err(de.violation_at(
                offset,
                format!("tile count {count} does not match {width}x{height}"),
            ));
        }

        for tile in &mut data.tiles {
            tile.base_texture = de.read_i16()?;
        }
        for plane in 0..3 {
            for tile in &mut data.tiles {
                tile.blend_textures[plane] = de.read_i16()?;
            }
        }

        let packed = de.read_bytes(impassability_row_len(width) * height)?;
        let flags = unpack_impassability(packed, width, height);
        for (tile, impassable) in data.tiles.iter_mut().zip(flags) {
            tile.impassable = impassable;
        }

        data.number_of_base_tiles = de.read_i32()?;
        let offset = de.position();
        let number_of_blend_tiles = de.read_i32()?;
        if number_of_blend_tiles < 1 {
            return Err(de.violation_at(
                offset,
                format!("blend tile count {number_of_blend_tiles} is below 1"),
            ));
        }
        de.expect_i32(1, "blend tile magic")?;

        let texture_count = de.read_count()?;
        data.textures.reserve(texture_count);
        for _ in 0..texture_count {
            data.textures.push(Texture::decode(de)?);
        }
        de.expect_zeros(8)?;

        for _ in 1..number_of_blend_tiles {
            data.blend_tiles.push(BlendTile::decode(de)?);
        }
        data.rebuild_blend_index();

        tracing::trace!(
            textures = data.textures.len(),
            blend_tiles = data.blend_tiles.len(),
            "tile data"
        );
        Ok(data)
    }
}

impl Encode for TileData {
    fn encoded_len(&self) -> usize {
        4 + self.count() * 2 * 4
            + impassability_row_len(self.width) * self.height
            + 4 * 4
            + self.textures.iter().map(Encode::encoded_len).sum::<usize>()
            + 8
            + self.blend_tiles.len() * BlendTile::SIZE
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_count(self.count())?;
        for tile in &self.tiles {
            en.write_i16(tile.base_texture);
        }
        for plane in 0..3 {
            for tile in &self.tiles {
                en.write_i16(tile.blend_textures[plane]);
            }
        }

        let flags: Vec<bool> = self.tiles.iter().map(|t| t.impassable).collect();
        en.write_bytes(&pack_impassability(&flags, self.width));

        en.write_i32(self.number_of_base_tiles);
        en.write_count(self.number_of_blend_tiles())?;
        en.write_i32(1);

        en.write_count(self.textures.len())?;
        for texture in &self.textures {
            texture.encode(en)?;
        }
        en.write_zeros(8);

        for blend in &self.blend_tiles {
            blend.encode(en)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryReader;

    #[test]
    fn test_impassability_pack_unpack_identity() {
        for width in [1usize, 7, 8, 9, 17] {
            let height = 3;
            let flags: Vec<bool> = (0..width * height).map(|i| i % 3 == 0 || i % 5 == 1).collect();
            let packed = pack_impassability(&flags, width);
            assert_eq!(packed.len(), impassability_row_len(width) * height);
            assert_eq!(unpack_impassability(&packed, width, height), flags, "width {width}");
        }
    }

    #[test]
    fn test_impassability_rows_start_on_new_byte() {
        // 9 wide: row 0 = tile 0 and tile 8, row 1 = tile 1
        let mut flags = vec![false; 18];
        flags[0] = true;
        flags[8] = true;
        flags[10] = true;
        assert_eq!(pack_impassability(&flags, 9), vec![0b01, 0b1, 0b10, 0]);
    }

    #[test]
    fn test_blend_tile_dedup() {
        let mut data = TileData::new(2, 2);
        let a = data.get_blend_tile_index(4, BlendType::TOP).unwrap();
        let b = data.get_blend_tile_index(4, BlendType::LEFT).unwrap();
        let c = data.get_blend_tile_index(9, BlendType::TOP).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));

        assert_eq!(data.get_blend_tile_index(4, BlendType::TOP).unwrap(), 1);
        assert_eq!(data.get_blend_tile_index(9, BlendType::TOP).unwrap(), 3);
        assert_eq!(data.blend_tiles().len(), 3);
        assert_eq!(data.number_of_blend_tiles(), 4);
    }

    #[test]
    fn test_add_texture_allocates_blocks_in_order() {
        let mut data = TileData::new(4, 4);
        assert_eq!(data.add_texture(Texture::new("GrassLight", 4)).block_start_index, 0);
        assert_eq!(data.add_texture(Texture::new("Cliff", 2)).block_start_index, 16);
        assert_eq!(data.add_texture(Texture::new("GrassLight", 8)).block_count, 16);
        assert_eq!(data.number_of_base_tiles, 20);
        assert_eq!(data.textures().len(), 2);
    }

    #[test]
    fn test_texture_tile_index_and_lookup() {
        let mut data = TileData::new(4, 4);
        data.add_texture(Texture::new("GrassLight", 1));
        let cliff = data.add_texture(Texture::new("Cliff", 2)).clone();

        assert_eq!(cliff.tile_index(0, 0).unwrap(), 4);
        assert_eq!(cliff.tile_index(1, 0).unwrap(), 5);
        assert_eq!(cliff.tile_index(0, 1).unwrap(), 6);
        assert_eq!(cliff.tile_index(2, 2).unwrap(), 4 + 2 * 4 * 1 + 4);
        assert_eq!(cliff.tile_index(4, 0).unwrap(), 4);

        data.tile_mut(1, 1).base_texture = cliff.tile_index(1, 1).unwrap();
        assert_eq!(data.texture_at(1, 1).map(|t| t.name.as_str()), Some("Cliff"));
        assert_eq!(data.texture_at(0, 0).map(|t| t.name.as_str()), Some("GrassLight"));
    }

    #[test]
    fn test_tile_index_out_of_range() {
        let mut texture = Texture::new("GrassLight", 2);
        texture.block_start_index = -1;
        assert!(matches!(texture.tile_index(0, 0), Err(Error::InvalidModel(_))));

        texture.block_start_index = 8191;
        assert_eq!(texture.tile_index(1, 1).unwrap(), i16::MAX);
        assert!(texture.tile_index(2, 0).is_err());
    }

    #[test]
    fn test_unused_impassability_bits_are_ignored() {
        assert_eq!(unpack_impassability(&[0xFF], 3, 1), vec![true; 3]);
        assert_eq!(unpack_impassability(&[0xF8, 0xFA], 3, 2), [[false; 3], [false, true, false]].concat());
    }

    #[test]
    fn test_tile_data_roundtrip() {
        let mut data = TileData::new(9, 2);
        let grass = data.add_texture(Texture::new("GrassLight", 2)).clone();
        data.add_texture(Texture::new("Sand", 1));
        for y in 0..2 {
            for x in 0..9 {
                data.tile_mut(x, y).base_texture = grass.tile_index(x, y).unwrap();
            }
        }
        let blend = data.get_blend_tile_index(20, BlendType::TOP_LEFT_LARGE).unwrap();
        data.tile_mut(3, 1).blend_textures = [blend, 0, -1];
        data.tile_mut(8, 0).impassable = true;
        data.tile_mut(0, 1).impassable = true;

        let mut en = Encoder::new();
        data.encode(&mut en).unwrap();
        assert_eq!(en.len(), data.encoded_len());
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let mut read = TileData::read(&mut de, 9, 2).unwrap();
        assert!(de.is_empty());
        assert_eq!(read, data);

        // The dedup index is rebuilt on load.
        assert_eq!(read.get_blend_tile_index(20, BlendType::TOP_LEFT_LARGE).unwrap(), blend);
    }

    #[test]
    fn test_blend_tile_counter_below_one_is_rejected() {
        let data = TileData::new(1, 1);
        let mut en = Encoder::new();
        data.encode(&mut en).unwrap();
        let (strings, mut body) = en.finish();
        // count(4) + planes(8) + impassability(1) + base tiles(4) -> blend counter
        body[17..21].copy_from_slice(&0i32.to_le_bytes());

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(TileData::read(&mut de, 1, 1), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_texture_block_count_must_be_square() {
        let texture = Texture {
            name: "Bad".into(),
            block_start_index: 0,
            block_count: 5,
            blocks_per_row: 2,
        };
        let mut en = Encoder::new();
        texture.encode(&mut en).unwrap();
        let (strings, body) = en.finish();
        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(Texture::decode(&mut de), Err(Error::FormatViolation { .. })));
    }
}
