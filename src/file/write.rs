use std::io::Write;

use crate::codec::{BinaryWriter, Encode, Encoder, Header, Identifier};
use crate::error::{Error, Result};
use crate::map::{GlobalLightOptions, Map};
use crate::script;
use crate::tiles::{HeightMap, TileData};

use super::SIGNATURE;

/// Section sequence emitted by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Full map: terrain, sides, objects, triggers, lighting and waypoint paths
    #[default]
    Map,
    /// Script export: scripts, named players, objects, teams, triggers and paths
    Scripts,
}

/// Serializes a [`Map`] in two stages: body into a staging buffer (interning every
/// identifier on the way), then signature, string table and body.
#[derive(Debug, Clone, Default)]
pub struct MapWriter {
    layout: Layout,
}

impl MapWriter {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn write(&self, map: &Map) -> Result<Vec<u8>> {
        let mut en = Encoder::new();
        match self.layout {
            Layout::Map => write_map_sections(&mut en, map)?,
            Layout::Scripts => write_script_sections(&mut en, map)?,
        }
        let (strings, body) = en.finish();

        let mut out = BinaryWriter::with_capacity(SIGNATURE.len() + strings.encoded_len() + body.len());
        out.write_bytes(&SIGNATURE);
        strings.write(&mut out)?;
        out.write_bytes(&body);

        tracing::debug!(
            layout = ?self.layout,
            strings = strings.len(),
            bytes = out.len(),
            "wrote map"
        );
        Ok(out.into_vec())
    }

    pub fn write_to(&self, map: &Map, mut sink: impl Write) -> Result<()> {
        let data = self.write(map)?;
        sink.write_all(&data)?;
        Ok(())
    }
}

fn section<T: Encode>(en: &mut Encoder, id: Identifier, value: &T) -> Result<()> {
    tracing::debug!(section = %id, length = value.encoded_len(), "writing section");
    en.write_section(id, id.format_tag(), value.encoded_len(), |en| value.encode(en))
}

fn write_map_sections(en: &mut Encoder, map: &Map) -> Result<()> {
    let (height_map, tiles) = terrain(map)?;

    section(en, Identifier::HeightMapData, height_map)?;
    section(en, Identifier::BlendTileData, tiles)?;
    section(en, Identifier::WorldInfo, &map.properties)?;
    section(en, Identifier::SidesList, &SidesList(map))?;
    section(en, Identifier::ObjectsList, &ObjectsList(map))?;
    en.write_section(
        Identifier::PolygonTriggers,
        4,
        PolygonTriggers(map).encoded_len(),
        |en| PolygonTriggers(map).encode(en),
    )?;
    section(en, Identifier::GlobalLighting, &Lighting(map.lighting.as_ref()))?;
    section(en, Identifier::WaypointsList, &WaypointsList(map))
}

fn write_script_sections(en: &mut Encoder, map: &Map) -> Result<()> {
    tracing::debug!(lists = map.player_scripts.len(), "writing section PlayerScriptsList");
    script::write_player_scripts(en, &map.player_scripts)?;
    section(en, Identifier::ScriptsPlayers, &ScriptsPlayers(map))?;
    section(en, Identifier::ObjectsList, &ObjectsList(map))?;
    section(en, Identifier::ScriptTeams, &ScriptTeams(map))?;
    en.write_section(
        Identifier::PolygonTriggers,
        3,
        PolygonTriggers(map).encoded_len(),
        |en| PolygonTriggers(map).encode(en),
    )?;
    section(en, Identifier::WaypointsList, &WaypointsList(map))
}

fn terrain(map: &Map) -> Result<(&HeightMap, &TileData)> {
    let height_map = map
        .height_map
        .as_ref()
        .ok_or_else(|| Error::InvalidModel("map layout requires a height map".into()))?;
    let tiles = map
        .tiles
        .as_ref()
        .ok_or_else(|| Error::InvalidModel("map layout requires tile data".into()))?;
    if (tiles.width(), tiles.height()) != (height_map.width(), height_map.height()) {
        return Err(Error::InvalidModel(format!(
            "tile grid {}x{} does not match height map {}x{}",
            tiles.width(),
            tiles.height(),
            height_map.width(),
            height_map.height()
        )));
    }
    Ok((height_map, tiles))
}

struct SidesList<'a>(&'a Map);

impl Encode for SidesList<'_> {
    fn encoded_len(&self) -> usize {
        let map = self.0;
        4 + map
            .players
            .iter()
            .map(|p| p.properties.encoded_len() + 4)
            .sum::<usize>()
            + 4
            + map.teams.iter().map(Encode::encoded_len).sum::<usize>()
            + Header::SIZE
            + script::player_scripts_len(&map.player_scripts)
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        let map = self.0;
        en.write_count(map.players.len())?;
        for player in &map.players {
            player.check_side_name()?;
            player.properties.encode(en)?;
            en.write_zeros(4);
        }
        en.write_count(map.teams.len())?;
        for team in &map.teams {
            team.encode(en)?;
        }
        script::write_player_scripts(en, &map.player_scripts)
    }
}

struct ScriptsPlayers<'a>(&'a Map);

impl Encode for ScriptsPlayers<'_> {
    fn encoded_len(&self) -> usize {
        1 + 3 + 4 + self.0.players.iter().map(|p| p.named_len(true)).sum::<usize>()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_bool(true);
        en.write_zeros(3);
        en.write_count(self.0.players.len())?;
        for player in &self.0.players {
            player.write_named(en, true)?;
        }
        Ok(())
    }
}

struct ObjectsList<'a>(&'a Map);

impl Encode for ObjectsList<'_> {
    fn encoded_len(&self) -> usize {
        self.0.objects.iter().map(|o| o.framed_len()).sum()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        for object in &self.0.objects {
            object.write(en)?;
        }
        Ok(())
    }
}

struct PolygonTriggers<'a>(&'a Map);

impl Encode for PolygonTriggers<'_> {
    fn encoded_len(&self) -> usize {
        4 + self.0.areas.iter().map(Encode::encoded_len).sum::<usize>()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_count(self.0.areas.len())?;
        for area in &self.0.areas {
            en.write_value("Area", area)?;
        }
        Ok(())
    }
}

struct ScriptTeams<'a>(&'a Map);

impl Encode for ScriptTeams<'_> {
    fn encoded_len(&self) -> usize {
        self.0.teams.iter().map(Encode::encoded_len).sum()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        for team in &self.0.teams {
            team.encode(en)?;
        }
        Ok(())
    }
}

/// Absent lighting is written as an empty section
struct Lighting<'a>(Option<&'a GlobalLightOptions>);

impl Encode for Lighting<'_> {
    fn encoded_len(&self) -> usize {
        self.0.map_or(0, Encode::encoded_len)
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        match self.0 {
            Some(lighting) => lighting.encode(en),
            None => Ok(()),
        }
    }
}

struct WaypointsList<'a>(&'a Map);

impl Encode for WaypointsList<'_> {
    fn encoded_len(&self) -> usize {
        4 + 8 * self.0.paths.len()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_count(self.0.paths.len())?;
        for &(from, to) in &self.0.paths {
            en.write_i32(from);
            en.write_i32(to);
        }
        Ok(())
    }
}

/// Write `map` in the full map layout
pub fn write_map(map: &Map) -> Result<Vec<u8>> {
    MapWriter::default().write(map)
}
