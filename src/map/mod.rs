//! In-memory model of a CkMp file

pub mod lighting;
pub mod objects;
pub mod players;

pub use lighting::{GlobalLightOptions, Light, LightOptions, TimeOfDay};
pub use objects::{Area, RoadOptions, ScriptObject};
pub use players::{Player, Team};

use serde::Serialize;

use crate::error::Result;
use crate::property::Properties;
use crate::script::{self, Script, ScriptNode};
use crate::tiles::{HeightMap, TileData};

/// A top-level section the reader did not recognize and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedSection {
    pub name: String,
    pub tag: i16,
    pub offset: usize,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl UnrecognizedSection {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Map {
    pub height_map: Option<HeightMap>,
    pub tiles: Option<TileData>,
    pub lighting: Option<GlobalLightOptions>,
    /// WorldInfo properties
    pub properties: Properties,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub objects: Vec<ScriptObject>,
    pub areas: Vec<Area>,
    /// Waypoint links as (from id, to id)
    pub paths: Vec<(i32, i32)>,
    /// One script list per player slot
    pub player_scripts: Vec<Vec<ScriptNode>>,
    pub unrecognized_sections: Vec<UnrecognizedSection>,
}

impl Map {
    /// Flat, untextured terrain of `width` x `height` cells with the stock lighting
    pub fn new(width: usize, height: usize, border: i32) -> Result<Self> {
        Ok(Self {
            height_map: Some(HeightMap::new(width, height, border)?),
            tiles: Some(TileData::new(width, height)),
            lighting: Some(GlobalLightOptions::default_lighting()),
            ..Self::default()
        })
    }

    pub fn width(&self) -> Option<usize> {
        self.height_map.as_ref().map(HeightMap::width)
    }

    pub fn height(&self) -> Option<usize> {
        self.height_map.as_ref().map(HeightMap::height)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &ScriptObject> {
        self.objects.iter().filter(|o| o.is_waypoint())
    }

    /// Every script of every player, group members included
    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.player_scripts.iter().flat_map(|list| script::scripts(list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_map_has_terrain_and_lighting() {
        let map = Map::new(64, 48, 10).unwrap();
        assert_eq!(map.width(), Some(64));
        assert_eq!(map.height(), Some(48));
        assert_eq!(map.height_map.as_ref().unwrap().map_width(), 44);
        assert_eq!(map.tiles.as_ref().unwrap().count(), 64 * 48);
        assert_eq!(map.lighting.unwrap().time_of_day, TimeOfDay::Afternoon);
    }

    #[test]
    fn test_lookups() {
        let mut map = Map::default();
        map.players.push(Player::new("Resources"));
        map.objects.push(ScriptObject::waypoint(1.0, 1.0, 0.0));
        map.objects.push(ScriptObject::new("TreeA", 1.0, 1.0, 0.0));
        let mut group = script::ScriptGroup::new("g");
        group.scripts.push(Script::new("a"));
        map.player_scripts.push(vec![group.into(), Script::new("b").into()]);
        map.player_scripts.push(vec![Script::new("c").into()]);

        assert!(map.player("Resources").is_some());
        assert_eq!(map.waypoints().count(), 1);
        let names: Vec<&str> = map.scripts().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
