//! CkMp map files
//!
//! Reads and writes the binary map container used by the SAGE engine: terrain
//! heightfield and tiles, placed objects, trigger areas, players and teams, and
//! trigger script trees.

pub mod codec;
pub mod error;
pub mod file;
pub mod map;
pub mod property;
pub mod script;
pub mod tiles;

pub use error::{Error, ErrorKind, Result};
pub use file::{
    read_map, write_map, Layout, MapReader, MapWriter, ReadOptions, UnknownSectionPolicy,
};
pub use map::{
    Area, GlobalLightOptions, Map, Player, RoadOptions, ScriptObject, Team, TimeOfDay,
};
pub use property::{Properties, PropertyType, PropertyValue};
pub use script::{
    OrCondition, Parameter, ParameterType, ParameterValue, Script, ScriptElement, ScriptGroup,
    ScriptNode,
};
pub use tiles::{BlendTile, BlendType, HeightMap, Texture, Tile, TileData};
