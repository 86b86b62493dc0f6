use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SpellError;

pub const MAX_SPELL_LEVEL: u8 = 9;

/// Where a spell record came from. Absent on the wire means the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellOrigin {
    #[default]
    Catalog,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    pub index: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ApiReference {
    /// Reference for a user-supplied name, keyed by its slug.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            index: slugify(&name),
            name,
            url: None,
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query) || self.index.eq_ignore_ascii_case(&slugify(query))
    }
}

/// Damage keyed by slot or character level.
pub type DamageTable = BTreeMap<u8, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Damage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<ApiReference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub damage_at_slot_level: DamageTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub damage_at_character_level: DamageTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub index: String,
    pub name: String,
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(default)]
    pub higher_level: Vec<String>,
    pub range: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default)]
    pub ritual: bool,
    pub duration: String,
    #[serde(default)]
    pub concentration: bool,
    pub casting_time: String,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<Damage>,
    pub school: ApiReference,
    pub classes: Vec<ApiReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subclasses: Vec<ApiReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub origin: SpellOrigin,
}

impl Spell {
    pub fn slug(&self) -> &str {
        &self.index
    }

    pub fn is_custom(&self) -> bool {
        self.origin == SpellOrigin::Custom
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn castable_by(&self, class_name: &str) -> bool {
        self.classes.iter().any(|class| class.matches(class_name))
    }

    /// Checks the fields every consumer relies on.
    pub fn validate(&self) -> Result<(), SpellError> {
        if self.index.trim().is_empty() {
            return Err(SpellError::MissingSlug);
        }
        if self.name.trim().is_empty() {
            return Err(SpellError::MissingName {
                slug: self.index.clone(),
            });
        }
        if self.level > MAX_SPELL_LEVEL {
            return Err(SpellError::LevelOutOfRange {
                slug: self.index.clone(),
                level: self.level,
            });
        }
        if self.classes.is_empty() {
            return Err(SpellError::NoClasses {
                slug: self.index.clone(),
            });
        }
        Ok(())
    }
}

/// Entry of a keyword search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSummary {
    pub index: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Lowercases and joins whitespace-separated words with `-`.
///
/// Catalog lookups and custom spells share this rule: a custom spell named
/// "Acid Splash" gets the same slug as the catalog entry `acid-splash`.
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Query terms for the catalog name filter: lowercased tokens joined by `+`.
pub fn search_terms(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(|token| {
            url::form_urlencoded::byte_serialize(token.to_lowercase().as_bytes())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("+")
}

pub fn contains_slug(spells: &[Spell], slug: &str) -> bool {
    spells.iter().any(|spell| spell.index == slug)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
