use std::io::Read;

use crate::codec::{BinaryReader, Decode, Decoder, Identifier, Section, StringTable};
use crate::error::{Error, Result};
use crate::map::{
    Area, GlobalLightOptions, Map, Player, ScriptObject, Team, UnrecognizedSection,
};
use crate::property::Properties;
use crate::script;
use crate::tiles::{HeightMap, TileData};

use super::SIGNATURE;

/// What to do with a top-level section whose identifier is not known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSectionPolicy {
    /// Consume its payload, log a warning and keep it in [`Map::unrecognized_sections`]
    #[default]
    Skip,
    /// Fail the read with a format violation
    Reject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub unknown_sections: UnknownSectionPolicy,
}

impl ReadOptions {
    pub fn strict() -> Self {
        Self {
            unknown_sections: UnknownSectionPolicy::Reject,
        }
    }
}

/// Parses complete CkMp files
#[derive(Debug, Clone, Default)]
pub struct MapReader {
    options: ReadOptions,
}

impl MapReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn read_from(&self, mut source: impl Read) -> Result<Map> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        self.read(&data)
    }

    pub fn read(&self, data: &[u8]) -> Result<Map> {
        let mut reader = BinaryReader::new(data);
        let signature = reader.read_bytes(SIGNATURE.len())?;
        if signature != SIGNATURE {
            return Err(Error::FormatViolation {
                context: "file",
                offset: 0,
                message: format!("signature is {signature:?}, expected \"CkMp\""),
            });
        }

        let strings = StringTable::read(&mut reader)?;
        tracing::debug!(strings = strings.len(), "read string table");

        let mut de = Decoder::new(reader, strings);
        let mut map = Map::default();
        while !de.is_empty() {
            self.read_section(&mut de, &mut map)?;
        }

        tracing::debug!(
            players = map.players.len(),
            teams = map.teams.len(),
            objects = map.objects.len(),
            areas = map.areas.len(),
            script_lists = map.player_scripts.len(),
            skipped = map.unrecognized_sections.len(),
            "read map"
        );
        Ok(map)
    }

    fn read_section(&self, de: &mut Decoder<'_>, map: &mut Map) -> Result<()> {
        let offset = de.position();
        let section = de.read_section()?;

        let id = match section.identifier {
            Some(id) if is_top_level(id) => id,
            Some(id) => {
                return Err(de.violation_at(offset, format!("{id} is not a top-level section")));
            }
            None => return self.skip_unknown(de, &section, offset, map),
        };

        tracing::debug!(
            section = %id,
            tag = section.header.tag,
            length = section.len(),
            offset,
            "reading section"
        );
        de.check_tag(&section, offset)?;
        de.in_context(id.as_str(), |de| {
            read_payload(de, id, &section, map)?;
            de.finish(&section)
        })
    }

    fn skip_unknown(
        &self,
        de: &mut Decoder<'_>,
        section: &Section,
        offset: usize,
        map: &mut Map,
    ) -> Result<()> {
        let name = de.resolve(section.header.index)?.to_owned();
        if self.options.unknown_sections == UnknownSectionPolicy::Reject {
            return Err(de.violation_at(offset, format!("unknown section {name:?}")));
        }

        tracing::warn!(section = %name, length = section.len(), offset, "skipping unknown section");
        let payload = de.skip_section(section)?.to_vec();
        map.unrecognized_sections.push(UnrecognizedSection {
            name,
            tag: section.header.tag,
            offset,
            payload,
        });
        Ok(())
    }
}

fn is_top_level(id: Identifier) -> bool {
    matches!(
        id,
        Identifier::HeightMapData
            | Identifier::BlendTileData
            | Identifier::WorldInfo
            | Identifier::SidesList
            | Identifier::GlobalLighting
            | Identifier::ObjectsList
            | Identifier::PolygonTriggers
            | Identifier::ScriptsPlayers
            | Identifier::ScriptTeams
            | Identifier::WaypointsList
            | Identifier::PlayerScriptsList
    )
}

fn read_payload(de: &mut Decoder<'_>, id: Identifier, section: &Section, map: &mut Map) -> Result<()> {
    match id {
        Identifier::HeightMapData => {
            map.height_map = Some(HeightMap::decode(de)?);
        }
        Identifier::BlendTileData => {
            let (width, height) = match &map.height_map {
                Some(h) => (h.width(), h.height()),
                None => return Err(de.violation("BlendTileData precedes HeightMapData")),
            };
            map.tiles = Some(TileData::read(de, width, height)?);
        }
        Identifier::WorldInfo => {
            map.properties = Properties::decode(de)?;
        }
        Identifier::SidesList => read_sides_list(de, section, map)?,
        Identifier::GlobalLighting => {
            map.lighting = if section.is_empty() {
                None
            } else {
                Some(GlobalLightOptions::decode(de)?)
            };
        }
        Identifier::ObjectsList => {
            while de.has_more(section) {
                map.objects.push(ScriptObject::read(de)?);
            }
        }
        Identifier::PolygonTriggers => {
            let count = de.read_count()?;
            for _ in 0..count {
                map.areas.push(Area::decode(de)?);
            }
        }
        Identifier::ScriptsPlayers => {
            let with_properties = de.read_bool()?;
            de.expect_zeros(3)?;
            let count = de.read_count()?;
            for _ in 0..count {
                map.players.push(Player::read_named(de, with_properties)?);
            }
        }
        Identifier::ScriptTeams => {
            while de.has_more(section) {
                map.teams.push(Team::decode(de)?);
            }
        }
        Identifier::WaypointsList => {
            let count = de.read_count()?;
            for _ in 0..count {
                let from = de.read_i32()?;
                let to = de.read_i32()?;
                map.paths.push((from, to));
            }
        }
        Identifier::PlayerScriptsList => {
            let lists = script::read_player_scripts(de, section.end)?;
            map.player_scripts.extend(lists);
        }
        other => return Err(de.violation(format!("{other} is not a top-level section"))),
    }
    Ok(())
}

fn read_sides_list(de: &mut Decoder<'_>, section: &Section, map: &mut Map) -> Result<()> {
    let count = de.read_count()?;
    for _ in 0..count {
        map.players.push(Player::read_side(de)?);
        de.expect_zeros(4)?;
    }

    let count = de.read_count()?;
    for _ in 0..count {
        map.teams.push(Team::decode(de)?);
    }

    if de.has_more(section) {
        let nested = de.expect_section(Identifier::PlayerScriptsList)?;
        let lists = script::read_player_scripts(de, nested.end)?;
        de.finish(&nested)?;
        map.player_scripts.extend(lists);
    }
    Ok(())
}

/// Read a complete file with the default options
pub fn read_map(data: &[u8]) -> Result<Map> {
    MapReader::default().read(data)
}
