//! Section framing
//!
//! Every structural region of a CkMp file starts with a 10 byte header:
//!   identifier: i32 (string table index)
//!   format tag: i16
//!   byte length: i32 (exact size of the payload that follows)
//!
//! The byte length, not an element count, bounds nested reads: children are parsed
//! while the stream position is before `payload start + byte length`.

use super::{BinaryReader, BinaryWriter};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub index: i32,
    pub tag: i16,
    pub length: i32,
}

impl Header {
    pub const SIZE: usize = 4 + 2 + 4;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            index: reader.read_i32_le()?,
            tag: reader.read_i16_le()?,
            length: reader.read_i32_le()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_i32_le(self.index);
        writer.write_i16_le(self.tag);
        writer.write_i32_le(self.length);
    }
}

/// Known section identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier {
    HeightMapData,
    BlendTileData,
    WorldInfo,
    SidesList,
    GlobalLighting,
    ObjectsList,
    Object,
    PolygonTriggers,
    ScriptsPlayers,
    ScriptTeams,
    WaypointsList,
    PlayerScriptsList,
    ScriptList,
    ScriptGroup,
    Script,
    OrCondition,
    Condition,
    ScriptAction,
    ScriptActionFalse,
}

impl Identifier {
    pub const ALL: [Identifier; 19] = [
        Self::HeightMapData,
        Self::BlendTileData,
        Self::WorldInfo,
        Self::SidesList,
        Self::GlobalLighting,
        Self::ObjectsList,
        Self::Object,
        Self::PolygonTriggers,
        Self::ScriptsPlayers,
        Self::ScriptTeams,
        Self::WaypointsList,
        Self::PlayerScriptsList,
        Self::ScriptList,
        Self::ScriptGroup,
        Self::Script,
        Self::OrCondition,
        Self::Condition,
        Self::ScriptAction,
        Self::ScriptActionFalse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeightMapData => "HeightMapData",
            Self::BlendTileData => "BlendTileData",
            Self::WorldInfo => "WorldInfo",
            Self::SidesList => "SidesList",
            Self::GlobalLighting => "GlobalLighting",
            Self::ObjectsList => "ObjectsList",
            Self::Object => "Object",
            Self::PolygonTriggers => "PolygonTriggers",
            Self::ScriptsPlayers => "ScriptsPlayers",
            Self::ScriptTeams => "ScriptTeams",
            Self::WaypointsList => "WaypointsList",
            Self::PlayerScriptsList => "PlayerScriptsList",
            Self::ScriptList => "ScriptList",
            Self::ScriptGroup => "ScriptGroup",
            Self::Script => "Script",
            Self::OrCondition => "OrCondition",
            Self::Condition => "Condition",
            Self::ScriptAction => "ScriptAction",
            Self::ScriptActionFalse => "ScriptActionFalse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// Format tags a section with this identifier may carry
    pub fn format_tags(self) -> &'static [i16] {
        match self {
            Self::WorldInfo
            | Self::ScriptTeams
            | Self::WaypointsList
            | Self::ScriptList
            | Self::OrCondition => &[1],
            Self::ScriptsPlayers
            | Self::ScriptGroup
            | Self::Script
            | Self::ScriptAction
            | Self::ScriptActionFalse => &[2],
            Self::SidesList | Self::GlobalLighting | Self::ObjectsList | Self::Object => &[3],
            Self::PolygonTriggers => &[3, 4],
            Self::HeightMapData | Self::Condition => &[4],
            Self::PlayerScriptsList => &[5],
            Self::BlendTileData => &[8],
        }
    }

    /// Tag written for this identifier (first accepted tag)
    pub fn format_tag(self) -> i16 {
        self.format_tags()[0]
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section header that has been read, with its absolute payload bounds
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub header: Header,
    pub identifier: Option<Identifier>,
    pub start: usize,
    pub end: usize,
}

impl Section {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
