use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::Spell,
    error::{ProtocolError, ValidationError},
};

pub const OPTION_SHUTDOWN: u8 = 0;
pub const OPTION_ADD: u8 = 1;
pub const OPTION_REMOVE: u8 = 2;
pub const OPTION_CREATE: u8 = 1;
pub const OPTION_EDIT: u8 = 2;
pub const OPTION_ROLL: u8 = 1;
pub const OPTION_ROLL_MODIFIED: u8 = 2;

pub const MAX_DICE_FACES: u32 = 10_000;
pub const MAX_DICE_MODIFIER: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    Sort,
    Bookmark,
    SpellBuilder,
    Dice,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Sort,
        ServiceKind::Bookmark,
        ServiceKind::SpellBuilder,
        ServiceKind::Dice,
    ];

    /// Order in which shutdown sentinels are broadcast.
    pub const SHUTDOWN_ORDER: [ServiceKind; 4] = [
        ServiceKind::SpellBuilder,
        ServiceKind::Bookmark,
        ServiceKind::Sort,
        ServiceKind::Dice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Sort => "sort",
            ServiceKind::Bookmark => "bookmark",
            ServiceKind::SpellBuilder => "builder",
            ServiceKind::Dice => "dice",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Sort => 5555,
            ServiceKind::Bookmark => 5553,
            ServiceKind::SpellBuilder => 5554,
            ServiceKind::Dice => 5552,
        }
    }

    pub fn default_addr(self) -> String {
        format!("127.0.0.1:{}", self.default_port())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sort" => Ok(ServiceKind::Sort),
            "bookmark" | "bookmarks" => Ok(ServiceKind::Bookmark),
            "builder" | "spell_builder" | "spell-builder" => Ok(ServiceKind::SpellBuilder),
            "dice" => Ok(ServiceKind::Dice),
            other => Err(format!("unknown service '{other}'")),
        }
    }
}

// Sort service

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Level,
    Name,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SortWire", into = "SortWire")]
pub enum SortRequest {
    ByLevel { descending: bool, spells: Vec<Spell> },
    ByName { spells: Vec<Spell> },
    ByClass { class_name: String, spells: Vec<Spell> },
    Shutdown,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SortWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    descending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bookmarks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spell_list: Option<Vec<Spell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_program: Option<bool>,
}

impl From<SortRequest> for SortWire {
    fn from(value: SortRequest) -> Self {
        let listing = |sort_by, spells| SortWire {
            sort_by: Some(sort_by),
            bookmarks: Some(true),
            spell_list: Some(spells),
            ..SortWire::default()
        };
        match value {
            SortRequest::ByLevel { descending, spells } => SortWire {
                descending: Some(descending),
                ..listing(SortKey::Level, spells)
            },
            SortRequest::ByName { spells } => listing(SortKey::Name, spells),
            SortRequest::ByClass { class_name, spells } => SortWire {
                class_name: Some(class_name),
                ..listing(SortKey::Class, spells)
            },
            SortRequest::Shutdown => SortWire {
                end_program: Some(true),
                ..SortWire::default()
            },
        }
    }
}

impl TryFrom<SortWire> for SortRequest {
    type Error = ProtocolError;

    fn try_from(wire: SortWire) -> Result<Self, Self::Error> {
        if wire.end_program.unwrap_or(false) {
            return Ok(SortRequest::Shutdown);
        }
        let spells = wire.spell_list.unwrap_or_default();
        match wire.sort_by.ok_or(ProtocolError::MissingSortKey)? {
            SortKey::Level => Ok(SortRequest::ByLevel {
                descending: wire.descending.unwrap_or(false),
                spells,
            }),
            SortKey::Name => Ok(SortRequest::ByName { spells }),
            SortKey::Class => Ok(SortRequest::ByClass {
                class_name: wire.class_name.ok_or(ProtocolError::MissingField {
                    request: "sort by class",
                    field: "class_name",
                })?,
                spells,
            }),
        }
    }
}

/// Reply the sort worker sends for its shutdown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortAck {
    pub end_program: bool,
}

// Bookmark service

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookmarkWire", into = "BookmarkWire")]
pub enum BookmarkRequest {
    Add { bookmarks: Vec<Spell>, spell: Spell },
    Remove { bookmarks: Vec<Spell>, spell: Spell },
    Shutdown,
}

impl BookmarkRequest {
    pub fn option(&self) -> u8 {
        match self {
            BookmarkRequest::Add { .. } => OPTION_ADD,
            BookmarkRequest::Remove { .. } => OPTION_REMOVE,
            BookmarkRequest::Shutdown => OPTION_SHUTDOWN,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BookmarkWire {
    #[serde(default)]
    json_array: Vec<Spell>,
    #[serde(default)]
    json_object: Option<Spell>,
    option: u8,
}

impl From<BookmarkRequest> for BookmarkWire {
    fn from(value: BookmarkRequest) -> Self {
        let option = value.option();
        match value {
            BookmarkRequest::Add { bookmarks, spell }
            | BookmarkRequest::Remove { bookmarks, spell } => BookmarkWire {
                json_array: bookmarks,
                json_object: Some(spell),
                option,
            },
            BookmarkRequest::Shutdown => BookmarkWire {
                json_array: Vec::new(),
                json_object: None,
                option,
            },
        }
    }
}

impl TryFrom<BookmarkWire> for BookmarkRequest {
    type Error = ProtocolError;

    fn try_from(wire: BookmarkWire) -> Result<Self, Self::Error> {
        let spell = |request| {
            wire.json_object.clone().ok_or(ProtocolError::MissingField {
                request,
                field: "json_object",
            })
        };
        match wire.option {
            OPTION_SHUTDOWN => Ok(BookmarkRequest::Shutdown),
            OPTION_ADD => Ok(BookmarkRequest::Add {
                spell: spell("bookmark add")?,
                bookmarks: wire.json_array,
            }),
            OPTION_REMOVE => Ok(BookmarkRequest::Remove {
                spell: spell("bookmark remove")?,
                bookmarks: wire.json_array,
            }),
            other => Err(ProtocolError::UnknownOption(other)),
        }
    }
}

// Spell builder service

/// Raw, unparsed answers for each custom spell field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellFields {
    pub name: String,
    pub level: String,
    pub range: String,
    pub casting_time: String,
    pub duration: String,
    pub attack_type: String,
    pub desc: String,
    pub higher_level: String,
    pub concentration: String,
    pub ritual: String,
    pub components: String,
    pub has_damage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_type: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub damage_values: BTreeMap<String, String>,
    pub school: String,
    pub classes: String,
}

impl SpellFields {
    /// True when the damage answer is an affirmative yes/no answer.
    pub fn deals_damage(&self) -> bool {
        parse_flag(&self.has_damage) == Some(true)
    }
}

/// Yes/no answer: `yes`, `y`, `true` or `no`, `n`, `false`, any case.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BuildWire", into = "BuildWire")]
pub enum BuildRequest {
    Create {
        bookmarks: Vec<Spell>,
        fields: SpellFields,
    },
    Edit {
        bookmarks: Vec<Spell>,
        target: Spell,
        fields: SpellFields,
    },
    Shutdown,
}

impl BuildRequest {
    pub fn option(&self) -> u8 {
        match self {
            BuildRequest::Create { .. } => OPTION_CREATE,
            BuildRequest::Edit { .. } => OPTION_EDIT,
            BuildRequest::Shutdown => OPTION_SHUTDOWN,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BuildWire {
    option: u8,
    #[serde(default)]
    json_array: Vec<Spell>,
    #[serde(default)]
    json_object: Option<Spell>,
    #[serde(default)]
    spell_fields: Option<SpellFields>,
}

impl From<BuildRequest> for BuildWire {
    fn from(value: BuildRequest) -> Self {
        let option = value.option();
        match value {
            BuildRequest::Create { bookmarks, fields } => BuildWire {
                option,
                json_array: bookmarks,
                json_object: None,
                spell_fields: Some(fields),
            },
            BuildRequest::Edit {
                bookmarks,
                target,
                fields,
            } => BuildWire {
                option,
                json_array: bookmarks,
                json_object: Some(target),
                spell_fields: Some(fields),
            },
            BuildRequest::Shutdown => BuildWire {
                option,
                json_array: Vec::new(),
                json_object: None,
                spell_fields: None,
            },
        }
    }
}

impl TryFrom<BuildWire> for BuildRequest {
    type Error = ProtocolError;

    fn try_from(wire: BuildWire) -> Result<Self, Self::Error> {
        match wire.option {
            OPTION_SHUTDOWN => Ok(BuildRequest::Shutdown),
            OPTION_CREATE => Ok(BuildRequest::Create {
                bookmarks: wire.json_array,
                fields: wire.spell_fields.ok_or(ProtocolError::MissingField {
                    request: "spell create",
                    field: "spell_fields",
                })?,
            }),
            OPTION_EDIT => Ok(BuildRequest::Edit {
                bookmarks: wire.json_array,
                target: wire.json_object.ok_or(ProtocolError::MissingField {
                    request: "spell edit",
                    field: "json_object",
                })?,
                fields: wire.spell_fields.ok_or(ProtocolError::MissingField {
                    request: "spell edit",
                    field: "spell_fields",
                })?,
            }),
            other => Err(ProtocolError::UnknownOption(other)),
        }
    }
}

// Dice service

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

impl DiceOperator {
    pub fn apply(self, base: i64, modifier: u32) -> i64 {
        match self {
            DiceOperator::Add => base + i64::from(modifier),
            DiceOperator::Subtract => base - i64::from(modifier),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            DiceOperator::Add => '+',
            DiceOperator::Subtract => '-',
        }
    }
}

impl FromStr for DiceOperator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(DiceOperator::Add),
            "-" => Ok(DiceOperator::Subtract),
            other => Err(ValidationError::UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceModifier {
    pub operator: DiceOperator,
    pub value: u32,
}

/// A validated roll: faces and modifier are both within `0..=10000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    faces: u32,
    modifier: Option<DiceModifier>,
}

impl DiceRoll {
    pub fn new(faces: u32) -> Result<Self, ValidationError> {
        if faces > MAX_DICE_FACES {
            return Err(ValidationError::OutOfRange {
                field: "faces",
                min: 0,
                max: MAX_DICE_FACES,
                value: faces,
            });
        }
        Ok(Self {
            faces,
            modifier: None,
        })
    }

    pub fn with_modifier(self, operator: DiceOperator, value: u32) -> Result<Self, ValidationError> {
        if value > MAX_DICE_MODIFIER {
            return Err(ValidationError::OutOfRange {
                field: "modifier",
                min: 0,
                max: MAX_DICE_MODIFIER,
                value,
            });
        }
        Ok(Self {
            modifier: Some(DiceModifier { operator, value }),
            ..self
        })
    }

    pub fn faces(&self) -> u32 {
        self.faces
    }

    pub fn modifier(&self) -> Option<DiceModifier> {
        self.modifier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiceWire", into = "DiceWire")]
pub enum DiceRequest {
    Roll(DiceRoll),
    Shutdown,
}

impl DiceRequest {
    pub fn option(&self) -> u8 {
        match self {
            DiceRequest::Roll(roll) if roll.modifier.is_some() => OPTION_ROLL_MODIFIED,
            DiceRequest::Roll(_) => OPTION_ROLL,
            DiceRequest::Shutdown => OPTION_SHUTDOWN,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DiceWire {
    option: u8,
    #[serde(default)]
    n: Option<u32>,
    #[serde(default)]
    operation: Option<DiceOperator>,
    #[serde(default)]
    m: Option<u32>,
}

impl From<DiceRequest> for DiceWire {
    fn from(value: DiceRequest) -> Self {
        let option = value.option();
        match value {
            DiceRequest::Roll(roll) => DiceWire {
                option,
                n: Some(roll.faces),
                operation: roll.modifier.map(|modifier| modifier.operator),
                m: roll.modifier.map(|modifier| modifier.value),
            },
            DiceRequest::Shutdown => DiceWire {
                option,
                n: None,
                operation: None,
                m: None,
            },
        }
    }
}

impl TryFrom<DiceWire> for DiceRequest {
    type Error = ProtocolError;

    fn try_from(wire: DiceWire) -> Result<Self, Self::Error> {
        let faces = |request| {
            wire.n.ok_or(ProtocolError::MissingField {
                request,
                field: "n",
            })
        };
        match wire.option {
            OPTION_SHUTDOWN => Ok(DiceRequest::Shutdown),
            OPTION_ROLL => Ok(DiceRequest::Roll(DiceRoll::new(faces("dice roll")?)?)),
            OPTION_ROLL_MODIFIED => {
                let operator = wire.operation.ok_or(ProtocolError::MissingField {
                    request: "modified dice roll",
                    field: "operation",
                })?;
                let modifier = wire.m.ok_or(ProtocolError::MissingField {
                    request: "modified dice roll",
                    field: "m",
                })?;
                let roll = DiceRoll::new(faces("modified dice roll")?)?
                    .with_modifier(operator, modifier)?;
                Ok(DiceRequest::Roll(roll))
            }
            other => Err(ProtocolError::UnknownOption(other)),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
