//! Trigger script trees
//!
//!   PlayerScriptsList := framed(ScriptList*)            one per player slot
//!   ScriptList        := framed((ScriptGroup | Script)*)
//!   ScriptGroup       := name, isActive, isSubroutine, framed(Script)*
//!   Script            := name, comment, conditionComment, actionComment,
//!                        6 flags, interval, then framed children:
//!                        OrCondition | ScriptAction | ScriptActionFalse
//!   OrCondition       := framed(Condition)*
//!
//! Children are discriminated by the identifier of their header; an identifier that
//! does not belong at a position is a format violation.

pub mod enumerations;
pub mod parameter;

pub use enumerations::{enumeration, Enumeration};
pub use parameter::{Color, Parameter, ParameterLayout, ParameterType, ParameterValue};

use serde::Serialize;

use crate::codec::{latin1_len, Decode, Decoder, Encode, Encoder, Header, Identifier};
use crate::error::Result;

/// A condition or action: a named script function and its arguments
///
///   id: i32
///   sentinel: u8 (3)
///   name: i16 (string table index)
///   reserved: u8
///   parameter count: i32
///   parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptElement {
    pub id: i32,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl ScriptElement {
    pub const SENTINEL: u8 = 3;

    pub fn new(id: i32, name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            id,
            name: name.into(),
            parameters,
        }
    }
}

impl Decode for ScriptElement {
    fn decode(de: &mut Decoder<'_>) -> Result<Self> {
        let id = de.read_i32()?;
        de.expect_u8(Self::SENTINEL, "script element sentinel")?;
        let name = de.read_name()?;
        de.expect_zeros(1)?;

        let count = de.read_count()?;
        tracing::trace!(id, %name, count, "script element");
        let mut parameters = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            parameters.push(Parameter::decode(de)?);
        }
        Ok(Self { id, name, parameters })
    }
}

impl Encode for ScriptElement {
    fn encoded_len(&self) -> usize {
        4 + 1 + 2 + 1 + 4 + self.parameters.iter().map(Encode::encoded_len).sum::<usize>()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_i32(self.id);
        en.write_u8(Self::SENTINEL);
        en.write_name(&self.name)?;
        en.write_zeros(1);
        en.write_count(self.parameters.len())?;
        for parameter in &self.parameters {
            en.write_value("Parameter", parameter)?;
        }
        Ok(())
    }
}

/// Conditions joined by AND; a script fires if any of its OrConditions holds
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OrCondition {
    pub conditions: Vec<ScriptElement>,
}

impl OrCondition {
    pub fn new(conditions: Vec<ScriptElement>) -> Self {
        Self { conditions }
    }

    fn read(de: &mut Decoder<'_>, end: usize) -> Result<Self> {
        let mut conditions = Vec::new();
        while de.position() < end {
            let section = de.expect_section(Identifier::Condition)?;
            conditions.push(ScriptElement::decode(de)?);
            de.finish(&section)?;
        }
        Ok(Self { conditions })
    }
}

impl Encode for OrCondition {
    fn encoded_len(&self) -> usize {
        self.conditions
            .iter()
            .map(|c| Header::SIZE + c.encoded_len())
            .sum()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        for condition in &self.conditions {
            write_element(en, Identifier::Condition, condition)?;
        }
        Ok(())
    }
}

fn write_element(en: &mut Encoder, identifier: Identifier, element: &ScriptElement) -> Result<()> {
    en.write_section(identifier, identifier.format_tag(), element.encoded_len(), |en| {
        element.encode(en)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub name: String,
    pub comment: String,
    pub condition_comment: String,
    pub action_comment: String,
    pub is_active: bool,
    pub deactivate: bool,
    pub easy: bool,
    pub normal: bool,
    pub hard: bool,
    pub is_subroutine: bool,
    pub interval: i32,
    pub or_conditions: Vec<OrCondition>,
    pub actions_if_true: Vec<ScriptElement>,
    pub actions_if_false: Vec<ScriptElement>,
}

impl Script {
    /// An active script enabled on every difficulty
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            condition_comment: String::new(),
            action_comment: String::new(),
            is_active: true,
            deactivate: false,
            easy: true,
            normal: true,
            hard: true,
            is_subroutine: false,
            interval: 0,
            or_conditions: Vec::new(),
            actions_if_true: Vec::new(),
            actions_if_false: Vec::new(),
        }
    }

    /// Parse the payload of a Script section ending at `end`
    pub fn read(de: &mut Decoder<'_>, end: usize) -> Result<Self> {
        let name = de.read_string()?;
        tracing::trace!(%name, "script");
        let mut script = Self::new(name);
        script.comment = de.read_string()?;
        script.condition_comment = de.read_string()?;
        script.action_comment = de.read_string()?;
        script.is_active = de.read_bool()?;
        script.deactivate = de.read_bool()?;
        script.easy = de.read_bool()?;
        script.normal = de.read_bool()?;
        script.hard = de.read_bool()?;
        script.is_subroutine = de.read_bool()?;
        script.interval = de.read_i32()?;

        while de.position() < end {
            let offset = de.position();
            let section = de.read_section()?;
            match section.identifier {
                Some(Identifier::OrCondition) => {
                    de.check_tag(&section, offset)?;
                    script.or_conditions.push(OrCondition::read(de, section.end)?);
                }
                Some(Identifier::ScriptAction) => {
                    de.check_tag(&section, offset)?;
                    script.actions_if_true.push(ScriptElement::decode(de)?);
                }
                Some(Identifier::ScriptActionFalse) => {
                    de.check_tag(&section, offset)?;
                    script.actions_if_false.push(ScriptElement::decode(de)?);
                }
                _ => {
                    let found = de.resolve(section.header.index)?;
                    return Err(de.violation_at(offset, format!("unexpected {found:?} in script")));
                }
            }
            de.finish(&section)?;
        }
        Ok(script)
    }
}

impl Encode for Script {
    fn encoded_len(&self) -> usize {
        let strings = [&self.name, &self.comment, &self.condition_comment, &self.action_comment]
            .iter()
            .map(|s| 2 + latin1_len(s))
            .sum::<usize>();
        let elements = |list: &[ScriptElement]| -> usize {
            list.iter().map(|e| Header::SIZE + e.encoded_len()).sum()
        };
        strings
            + 6
            + 4
            + self
                .or_conditions
                .iter()
                .map(|c| Header::SIZE + c.encoded_len())
                .sum::<usize>()
            + elements(&self.actions_if_true)
            + elements(&self.actions_if_false)
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_string(&self.name)?;
        en.write_string(&self.comment)?;
        en.write_string(&self.condition_comment)?;
        en.write_string(&self.action_comment)?;
        for flag in [
            self.is_active,
            self.deactivate,
            self.easy,
            self.normal,
            self.hard,
            self.is_subroutine,
        ] {
            en.write_bool(flag);
        }
        en.write_i32(self.interval);

        for condition in &self.or_conditions {
            en.write_section(
                Identifier::OrCondition,
                Identifier::OrCondition.format_tag(),
                condition.encoded_len(),
                |en| condition.encode(en),
            )?;
        }
        for action in &self.actions_if_true {
            write_element(en, Identifier::ScriptAction, action)?;
        }
        for action in &self.actions_if_false {
            write_element(en, Identifier::ScriptActionFalse, action)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptGroup {
    pub name: String,
    pub is_active: bool,
    pub is_subroutine: bool,
    pub scripts: Vec<Script>,
}

impl ScriptGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            is_subroutine: false,
            scripts: Vec::new(),
        }
    }

    pub fn read(de: &mut Decoder<'_>, end: usize) -> Result<Self> {
        let name = de.read_string()?;
        tracing::trace!(%name, "script group");
        let mut group = Self::new(name);
        group.is_active = de.read_bool()?;
        group.is_subroutine = de.read_bool()?;

        while de.position() < end {
            let section = de.expect_section(Identifier::Script)?;
            group.scripts.push(Script::read(de, section.end)?);
            de.finish(&section)?;
        }
        Ok(group)
    }
}

impl Encode for ScriptGroup {
    fn encoded_len(&self) -> usize {
        2 + latin1_len(&self.name)
            + 2
            + self
                .scripts
                .iter()
                .map(|s| Header::SIZE + s.encoded_len())
                .sum::<usize>()
    }

    fn encode(&self, en: &mut Encoder) -> Result<()> {
        en.write_string(&self.name)?;
        en.write_bool(self.is_active);
        en.write_bool(self.is_subroutine);
        for script in &self.scripts {
            write_script(en, script)?;
        }
        Ok(())
    }
}

fn write_script(en: &mut Encoder, script: &Script) -> Result<()> {
    en.write_section(Identifier::Script, Identifier::Script.format_tag(), script.encoded_len(), |en| {
        script.encode(en)
    })
}

/// Top-level entry of a script list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ScriptNode {
    Script(Script),
    Group(ScriptGroup),
}

impl ScriptNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Script(script) => &script.name,
            Self::Group(group) => &group.name,
        }
    }

    pub fn identifier(&self) -> Identifier {
        match self {
            Self::Script(_) => Identifier::Script,
            Self::Group(_) => Identifier::ScriptGroup,
        }
    }

    /// Size of the node including its own header
    pub fn framed_len(&self) -> usize {
        Header::SIZE
            + match self {
                Self::Script(script) => script.encoded_len(),
                Self::Group(group) => group.encoded_len(),
            }
    }

    fn write(&self, en: &mut Encoder) -> Result<()> {
        match self {
            Self::Script(script) => write_script(en, script),
            Self::Group(group) => en.write_section(
                Identifier::ScriptGroup,
                Identifier::ScriptGroup.format_tag(),
                group.encoded_len(),
                |en| group.encode(en),
            ),
        }
    }
}

impl From<Script> for ScriptNode {
    fn from(script: Script) -> Self {
        Self::Script(script)
    }
}

impl From<ScriptGroup> for ScriptNode {
    fn from(group: ScriptGroup) -> Self {
        Self::Group(group)
    }
}

/// All scripts of a list, with group members flattened in order
pub fn scripts(list: &[ScriptNode]) -> impl Iterator<Item = &Script> {
    list.iter().flat_map(|node| match node {
        ScriptNode::Script(script) => std::slice::from_ref(script).iter(),
        ScriptNode::Group(group) => group.scripts.iter(),
    })
}

/// Payload size of one framed ScriptList
pub fn script_list_len(list: &[ScriptNode]) -> usize {
    list.iter().map(ScriptNode::framed_len).sum()
}

/// Parse one framed ScriptList
pub fn read_script_list(de: &mut Decoder<'_>) -> Result<Vec<ScriptNode>> {
    let list_section = de.expect_section(Identifier::ScriptList)?;
    let mut list = Vec::new();
    while de.has_more(&list_section) {
        let offset = de.position();
        let section = de.read_section()?;
        match section.identifier {
            Some(Identifier::ScriptGroup) => {
                de.check_tag(&section, offset)?;
                list.push(ScriptNode::Group(ScriptGroup::read(de, section.end)?));
            }
            Some(Identifier::Script) => {
                de.check_tag(&section, offset)?;
                list.push(ScriptNode::Script(Script::read(de, section.end)?));
            }
            _ => {
                let found = de.resolve(section.header.index)?;
                return Err(de.violation_at(offset, format!("unexpected {found:?} in script list")));
            }
        }
        de.finish(&section)?;
    }
    de.finish(&list_section)?;
    Ok(list)
}

pub fn write_script_list(en: &mut Encoder, list: &[ScriptNode]) -> Result<()> {
    en.write_section(
        Identifier::ScriptList,
        Identifier::ScriptList.format_tag(),
        script_list_len(list),
        |en| {
            for node in list {
                node.write(en)?;
            }
            Ok(())
        },
    )
}

/// Payload size of a PlayerScriptsList holding `lists`
pub fn player_scripts_len(lists: &[Vec<ScriptNode>]) -> usize {
    lists
        .iter()
        .map(|list| Header::SIZE + script_list_len(list))
        .sum()
}

/// Parse ScriptLists until `end`, one per player slot
pub fn read_player_scripts(de: &mut Decoder<'_>, end: usize) -> Result<Vec<Vec<ScriptNode>>> {
    de.in_context("PlayerScriptsList", |de| {
        let mut lists = Vec::new();
        while de.position() < end {
            lists.push(read_script_list(de)?);
        }
        Ok(lists)
    })
}

/// Write a complete framed PlayerScriptsList section
pub fn write_player_scripts(en: &mut Encoder, lists: &[Vec<ScriptNode>]) -> Result<()> {
    en.write_section(
        Identifier::PlayerScriptsList,
        Identifier::PlayerScriptsList.format_tag(),
        player_scripts_len(lists),
        |en| {
            for list in lists {
                write_script_list(en, list)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BinaryReader, StringTable};
    use crate::error::Error;

    fn sample_script() -> Script {
        let mut script = Script::new("Spawn reinforcements");
        script.comment = "fires once".into();
        script.interval = 5;
        script.hard = false;
        script.or_conditions.push(OrCondition::new(vec![
            ScriptElement::new(
                1,
                "COUNTER",
                vec![
                    Parameter::text(ParameterType::Counter, "waves").unwrap(),
                    Parameter::enumeration(ParameterType::ComparisonOperator, "Greater").unwrap(),
                    Parameter::integer(42),
                ],
            ),
            ScriptElement::new(2, "CONDITION_TRUE", Vec::new()),
        ]));
        script.or_conditions.push(OrCondition::default());
        script.actions_if_true.push(ScriptElement::new(
            3,
            "MOVE_CAMERA_TO",
            vec![
                Parameter::text(ParameterType::Waypoint, "Center").unwrap(),
                Parameter::float(2.5),
                Parameter::location(1.0, 2.0, 3.0),
            ],
        ));
        script.actions_if_false.push(ScriptElement::new(
            4,
            "NO_OP",
            vec![Parameter::kind_of("VEHICLE").unwrap(), Parameter::boolean(true)],
        ));
        script
    }

    fn sample_lists() -> Vec<Vec<ScriptNode>> {
        let mut group = ScriptGroup::new("Intro");
        group.is_subroutine = true;
        group.scripts.push(sample_script());
        group.scripts.push(Script::new("Empty"));

        vec![
            vec![ScriptNode::from(sample_script()), ScriptNode::from(group)],
            Vec::new(),
            vec![ScriptNode::Group(ScriptGroup::new("Nothing inside"))],
        ]
    }

    fn encode_lists(lists: &[Vec<ScriptNode>]) -> (StringTable, Vec<u8>) {
        let mut en = Encoder::new();
        write_player_scripts(&mut en, lists).unwrap();
        en.finish()
    }

    #[test]
    fn test_player_scripts_roundtrip() {
        let lists = sample_lists();
        let (strings, body) = encode_lists(&lists);
        assert_eq!(body.len(), Header::SIZE + player_scripts_len(&lists));

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let section = de.expect_section(Identifier::PlayerScriptsList).unwrap();
        let read = read_player_scripts(&mut de, section.end).unwrap();
        de.finish(&section).unwrap();
        assert_eq!(read, lists);
    }

    #[test]
    fn test_script_sizes_match_output() {
        let script = sample_script();
        let mut en = Encoder::new();
        en.write_value("Script", &script).unwrap();

        let mut group = ScriptGroup::new("g");
        group.scripts.push(script);
        en.write_value("ScriptGroup", &group).unwrap();
    }

    #[test]
    fn test_flattened_scripts() {
        let lists = sample_lists();
        let names: Vec<&str> = scripts(&lists[0]).map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Spawn reinforcements", "Spawn reinforcements", "Empty"]);
        assert_eq!(lists[0][1].name(), "Intro");
    }

    #[test]
    fn test_element_sentinel_must_be_three() {
        let element = ScriptElement::new(9, "NO_OP", Vec::new());
        let mut en = Encoder::new();
        element.encode(&mut en).unwrap();
        let (strings, mut body) = en.finish();
        body[4] = 2;

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        assert!(matches!(ScriptElement::decode(&mut de), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_unknown_child_in_script_is_fatal() {
        let mut en = Encoder::new();
        let mut script = Script::new("s");
        script.actions_if_true.push(ScriptElement::new(1, "NO_OP", Vec::new()));
        en.write_value("Script", &script).unwrap();
        let (mut strings, mut body) = en.finish();

        // Point the action's header at a name that is not a script child.
        let bogus = strings.intern("WorldInfo");
        let header_at = body.len() - Header::SIZE - script.actions_if_true[0].encoded_len();
        body[header_at..header_at + 4].copy_from_slice(&bogus.to_le_bytes());

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let end = body.len();
        assert!(matches!(Script::read(&mut de, end), Err(Error::FormatViolation { .. })));
    }

    #[test]
    fn test_child_overrunning_its_frame_is_fatal() {
        let lists = vec![vec![ScriptNode::from(Script::new("s"))]];
        let (strings, mut body) = encode_lists(&lists);
        // Shrink the Script header's length by one byte.
        let script_header = 2 * Header::SIZE;
        let length = i32::from_le_bytes(body[script_header + 6..script_header + 10].try_into().unwrap());
        body[script_header + 6..script_header + 10].copy_from_slice(&(length - 1).to_le_bytes());

        let mut de = Decoder::new(BinaryReader::new(&body), strings);
        let section = de.expect_section(Identifier::PlayerScriptsList).unwrap();
        assert!(matches!(
            read_player_scripts(&mut de, section.end),
            Err(Error::FormatViolation { .. })
        ));
    }
}
