use serde::Serialize;

use crate::codec::{latin1_len, Decode, Decoder, Encode, Encoder};
use crate::error::{Error, Result};
use crate::property::{Properties, PropertyValue};

/// A player slot
///
/// Map files store only the properties; script files prefix them with the name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Player {
    pub name: String,
    pub properties: Properties,
}

impl Player {
    pub const NAME: &'static str = "playerName";

    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut properties = Properties::new();
        properties.set(Self::NAME, PropertyValue::OneByteString(name.clone()));
        Self { name, properties }
    }

    fn with_side(
        name: impl Into<String>,
        is_human: bool,
        display_name: &str,
        faction: &str,
        allies: &str,
        enemies: &str,
    ) -> Self {
        let mut player = Self::new(name);
        let properties = &mut player.properties;
        properties.set("playerIsHuman", PropertyValue::Boolean(is_human));
        properties.set("playerDisplayName", PropertyValue::TwoByteString(display_name.into()));
        properties.set("playerFaction", PropertyValue::OneByteString(faction.into()));
        properties.set("playerAllies", PropertyValue::OneByteString(allies.into()));
        properties.set("playerEnemies", PropertyValue::OneByteString(enemies.into()));
        player
    }

    pub fn human(
        name: impl Into<String>,
        display_name: &str,
        faction: &str,
        allies: &str,
        enemies: &str,
    ) -> Self {
        Self::with_side(name, true, display_name, faction, allies, enemies)
    }

    pub fn ai(
        name: impl Into<String>,
        display_name: &str,
        faction: &str,
        allies: &str,
        enemies: &str,
    ) -> Self {
        Self::with_side(name, false, display_name, faction, allies, enemies)
    }

    /// Set `playerColor` as packed ARGB
    pub fn with_color(mut self, a: u8, r: u8, g: u8, b: u8) -> Self {
        let argb = u32::from_be_bytes([a, r, g, b]) as i32;
        self.properties.set("playerColor", PropertyValue::Integer(argb));
        self
    }

    pub fn is_human(&self) -> Option<bool> {
        self.properties.get_bool("playerIsHuman")
    }

    pub fn faction(&self) -> Option<&str> {
        self.properties.get_str("playerFaction")
    }

    /// SidesList stores no name; it must be carried by `playerName`
    pub fn check_side_name(&self) -> Result<()> {
        match self.properties.get_str(Self::NAME) {
            Some(name) if name == self.name => Ok(()),
            stored => Err(Error::InvalidModel(format!(
                "player {:?} has {} {stored:?}",
                self.name,
                Self::NAME
            ))),
        }
    }

    /// Player as stored in a SidesList: properties only, name taken from `playerName`
    pub fn read_side(de: &mut Decoder<'_>) -> Result<Self> {
        let properties = Properties::decode(de)?;
        let name = properties.get_str(Self::NAME).unwrap_or_default().to_owned();
        tracing::trace!(%name, "player");
        Ok(Self { name, properties })
    }

    /// Player as stored in ScriptsPlayers: name, then properties if the list carries them
    pub fn read_named(de: &mut Decoder<'_>, with_properties: bool) -> Result<Self> {
        let name = de.read_string()?;
        tracing::trace!(%name, "player");
        let properties = if with_properties {
            Properties::decode(de)?
        } else {
            Properties::new()
        };
        Ok(Self { name, properties })
    }

    pub fn named_len(&self, with_properties: bool) -> usize {
        2 + latin1_len(&self.name) + if with_properties { self.properties.encoded_len() } else { 0 }
    }

    pub fn write_named(&self, en: &mut Encoder, with_properties: bool) -> Result<()> {
        en.write_string(&self.name)?;
        if with_properties {
            self.properties.encode(en)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Team {
    pub properties: Properties,
}

impl Team {
    pub fn new(name: &str, owner: &str) -> Self {
        let mut properties = Properties::new();
        properties.set("teamName", PropertyValue::OneByteString(name.into()));
        properties.set("teamOwner", PropertyValue::OneByteString(owner.into()));
        properties.set("teamIsSingleton", PropertyValue::Boolean(true));
        Self { properties }
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get_str("teamName")
    }
}

impl Decode for Team {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let properties = Properties::decode(de)?;
        tracing::trace!(name = ?properties.get_str("teamName"), "team");
        Ok(Self { properties })
    }
}

impl Encode for Team {
    fn encoded_len(&self) -> usize {
        self.properties.encoded_len()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        self.properties.encode(en)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryReader;

    #[test]
    fn test_side_player_recovers_name() {
        let player = Player::human("player0", "Player 1", "FactionAmerica", "", "player1")
            .with_color(255, 10, 20, 30);
        assert_eq!(player.is_human(), Some(true));
        assert_eq!(
            player.properties.get_i32("playerColor"),
            Some(((255u32 << 24) | (10 << 16) | (20 << 8) | 30) as i32)
        );

        let mut en = Encoder::new();
        player.properties.encode(&mut en).unwrap();
        let (strings, body) = en.finish();
        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert_eq!(Player::read_side(&mut de).unwrap(), player);
    }

    #[test]
    fn test_side_name_must_match_player_name_property() {
        assert!(Player::new("PlyrCreeps").check_side_name().is_ok());

        let bare = Player { name: "PlyrCreeps".into(), properties: Properties::new() };
        assert!(matches!(bare.check_side_name(), Err(Error::InvalidModel(_))));

        let mut renamed = Player::new("PlyrCreeps");
        renamed.name = "PlyrCivilian".into();
        assert!(matches!(renamed.check_side_name(), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_named_player_without_properties() {
        let player = Player::ai("SkirmishChina", "China", "FactionChina", "", "");
        let mut en = Encoder::new();
        player.write_named(&mut en, false).unwrap();
        assert_eq!(en.len(), player.named_len(false));
        let (strings, body) = en.finish();

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let read = Player::read_named(&mut de, false).unwrap();
        assert_eq!(read.name, "SkirmishChina");
        assert!(read.properties.is_empty());
    }

    #[test]
    fn test_team_roundtrip() {
        let team = Team::new("teamPlyrCivilian", "PlyrCivilian");
        let mut en = Encoder::new();
        en.write_value("Team", &team).unwrap();
        let (strings, body) = en.finish();
        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let read = Team::decode(&mut de).unwrap();
        assert_eq!(read.name(), Some("teamPlyrCivilian"));
        assert_eq!(read, team);
    }
}
