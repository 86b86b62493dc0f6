//! Custom spell construction.
//!
//! Field answers arrive as raw strings. On an edit, a blank answer keeps the
//! target's current value; on a create, blank optional fields stay empty and
//! blank required fields (name, level, school, classes) reject the request.

use shared::{
    domain::{slugify, ApiReference, Damage, DamageTable, Spell, SpellOrigin},
    error::SpellError,
    protocol::{parse_flag, BuildRequest, ServiceKind, SpellFields},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::serve::{Step, Worker};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("level '{0}' is not a number between 0 and 9")]
    InvalidLevel(String),
    #[error("field '{field}' expects yes or no, got '{value}'")]
    InvalidFlag { field: &'static str, value: String },
    #[error("scaling type '{0}' is not slot or character")]
    UnknownScaling(String),
    #[error("scaling level '{0}' is not a number")]
    InvalidScalingLevel(String),
    #[error("spell '{0}' is not in the bookmark collection")]
    TargetMissing(String),
    #[error("another bookmarked spell already uses slug '{0}'")]
    SlugCollision(String),
    #[error(transparent)]
    Invalid(#[from] SpellError),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpellBuilderWorker;

impl Worker for SpellBuilderWorker {
    type Request = BuildRequest;

    fn kind(&self) -> ServiceKind {
        ServiceKind::SpellBuilder
    }

    fn handle(&mut self, request: BuildRequest) -> Step {
        let result = match request {
            BuildRequest::Create { bookmarks, fields } => create(bookmarks, &fields),
            BuildRequest::Edit {
                bookmarks,
                target,
                fields,
            } => target
                .validate()
                .map_err(BuildError::from)
                .and_then(|()| edit(bookmarks, &target.index, &fields)),
            BuildRequest::Shutdown => return Step::Shutdown(Vec::new()),
        };

        match result {
            Ok(bookmarks) => Step::collection(&bookmarks),
            Err(error) => {
                warn!(%error, "rejecting spell build");
                Step::empty()
            }
        }
    }
}

/// Adds a new custom spell, replacing in place a bookmark with the same slug.
pub fn create(mut bookmarks: Vec<Spell>, fields: &SpellFields) -> Result<Vec<Spell>, BuildError> {
    let spell = build_spell(fields, None)?;
    debug!(slug = %spell.index, "creating custom spell");
    match bookmarks.iter().position(|existing| existing.index == spell.index) {
        Some(position) => bookmarks[position] = spell,
        None => bookmarks.push(spell),
    }
    Ok(bookmarks)
}

/// Rebuilds the bookmark at `target_slug` from `fields`, keeping its position.
pub fn edit(
    mut bookmarks: Vec<Spell>,
    target_slug: &str,
    fields: &SpellFields,
) -> Result<Vec<Spell>, BuildError> {
    let position = bookmarks
        .iter()
        .position(|spell| spell.index == target_slug)
        .ok_or_else(|| BuildError::TargetMissing(target_slug.to_string()))?;

    let spell = build_spell(fields, Some(&bookmarks[position]))?;
    let collides = bookmarks
        .iter()
        .enumerate()
        .any(|(index, other)| index != position && other.index == spell.index);
    if collides {
        return Err(BuildError::SlugCollision(spell.index));
    }

    debug!(from = %target_slug, to = %spell.index, "editing spell");
    bookmarks[position] = spell;
    Ok(bookmarks)
}

pub fn build_spell(fields: &SpellFields, base: Option<&Spell>) -> Result<Spell, BuildError> {
    let name = answer(&fields.name)
        .map(str::to_string)
        .or_else(|| base.map(|spell| spell.name.clone()))
        .ok_or(BuildError::MissingField("name"))?;

    let level = match answer(&fields.level) {
        Some(raw) => raw
            .parse::<u8>()
            .ok()
            .filter(|level| *level <= shared::domain::MAX_SPELL_LEVEL)
            .ok_or_else(|| BuildError::InvalidLevel(raw.to_string()))?,
        None => base
            .map(|spell| spell.level)
            .ok_or(BuildError::MissingField("level"))?,
    };

    let school = answer(&fields.school)
        .map(ApiReference::named)
        .or_else(|| base.map(|spell| spell.school.clone()))
        .ok_or(BuildError::MissingField("school"))?;

    let classes = match answer(&fields.classes) {
        Some(raw) => split_list(raw).map(ApiReference::named).collect(),
        None => base.map(|spell| spell.classes.clone()).unwrap_or_default(),
    };
    if classes.is_empty() {
        return Err(BuildError::MissingField("classes"));
    }

    let components = match answer(&fields.components) {
        Some(raw) => split_list(raw).map(str::to_uppercase).collect(),
        None => base.map(|spell| spell.components.clone()).unwrap_or_default(),
    };

    let spell = Spell {
        index: slugify(&name),
        desc: paragraphs_or(&fields.desc, base.map(|spell| &spell.desc)),
        higher_level: paragraphs_or(&fields.higher_level, base.map(|spell| &spell.higher_level)),
        range: text_or(&fields.range, base.map(|spell| &spell.range)),
        casting_time: text_or(&fields.casting_time, base.map(|spell| &spell.casting_time)),
        duration: text_or(&fields.duration, base.map(|spell| &spell.duration)),
        components,
        material: base.and_then(|spell| spell.material.clone()),
        ritual: flag("ritual", &fields.ritual, base.map(|spell| spell.ritual))?,
        concentration: flag(
            "concentration",
            &fields.concentration,
            base.map(|spell| spell.concentration),
        )?,
        level,
        attack_type: answer(&fields.attack_type)
            .map(str::to_string)
            .or_else(|| base.and_then(|spell| spell.attack_type.clone())),
        damage: damage(fields, base)?,
        school,
        classes,
        subclasses: base.map(|spell| spell.subclasses.clone()).unwrap_or_default(),
        url: None,
        origin: SpellOrigin::Custom,
        name,
    };
    spell.validate()?;
    Ok(spell)
}

fn answer(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn text_or(raw: &str, current: Option<&String>) -> String {
    answer(raw)
        .map(str::to_string)
        .or_else(|| current.cloned())
        .unwrap_or_default()
}

fn paragraphs_or(raw: &str, current: Option<&Vec<String>>) -> Vec<String> {
    match answer(raw) {
        Some(text) => vec![text.to_string()],
        None => current.cloned().unwrap_or_default(),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn flag(field: &'static str, raw: &str, current: Option<bool>) -> Result<bool, BuildError> {
    let Some(value) = answer(raw) else {
        return Ok(current.unwrap_or(false));
    };
    parse_flag(value).ok_or_else(|| BuildError::InvalidFlag {
        field,
        value: value.to_string(),
    })
}

fn damage(fields: &SpellFields, base: Option<&Spell>) -> Result<Option<Damage>, BuildError> {
    let current = || base.and_then(|spell| spell.damage.clone());
    let deals_damage = match answer(&fields.has_damage) {
        None => return Ok(current()),
        Some(_) => flag("has_damage", &fields.has_damage, None)?,
    };
    if !deals_damage {
        return Ok(None);
    }

    let damage_type = fields
        .damage_type
        .as_deref()
        .and_then(answer)
        .map(ApiReference::named)
        .or_else(|| current().and_then(|damage| damage.damage_type));

    let table = fields
        .damage_values
        .iter()
        .map(|(level, dice)| {
            level
                .trim()
                .parse::<u8>()
                .map(|level| (level, dice.trim().to_string()))
                .map_err(|_| BuildError::InvalidScalingLevel(level.clone()))
        })
        .collect::<Result<DamageTable, _>>()?;

    let mut damage = Damage {
        damage_type,
        ..Damage::default()
    };
    match fields.scaling_type.as_deref().and_then(answer) {
        None => {}
        Some(scaling) if scaling.eq_ignore_ascii_case("slot") => damage.damage_at_slot_level = table,
        Some(scaling) if scaling.eq_ignore_ascii_case("character") => {
            damage.damage_at_character_level = table
        }
        Some(other) => return Err(BuildError::UnknownScaling(other.to_string())),
    }
    Ok(Some(damage))
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;
