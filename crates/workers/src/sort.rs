use std::cmp::Ordering;

use shared::{
    domain::Spell,
    protocol::{ServiceKind, SortAck, SortRequest},
};
use tracing::{debug, warn};

use crate::serve::{Step, Worker};

/// Reorders or filters the collection it is sent; keeps no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct SortWorker;

impl Worker for SortWorker {
    type Request = SortRequest;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Sort
    }

    fn handle(&mut self, request: SortRequest) -> Step {
        match request {
            SortRequest::ByLevel { descending, spells } => {
                debug!(descending, count = spells.len(), "sorting by level");
                checked(spells, |spells| by_level(spells, descending))
            }
            SortRequest::ByName { spells } => {
                debug!(count = spells.len(), "sorting by name");
                checked(spells, by_name)
            }
            SortRequest::ByClass { class_name, spells } => {
                debug!(%class_name, count = spells.len(), "filtering by class");
                checked(spells, |spells| by_class(spells, &class_name))
            }
            SortRequest::Shutdown => Step::shutdown_with(&SortAck { end_program: true }),
        }
    }
}

/// Applies `order` only when every spell in the collection is well formed.
fn checked(spells: Vec<Spell>, order: impl FnOnce(Vec<Spell>) -> Vec<Spell>) -> Step {
    if let Some(error) = spells.iter().find_map(|spell| spell.validate().err()) {
        warn!(%error, "rejecting sort of malformed collection");
        return Step::empty();
    }
    Step::collection(&order(spells))
}

fn name_order(a: &Spell, b: &Spell) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.index.cmp(&b.index))
}

pub fn by_level(mut spells: Vec<Spell>, descending: bool) -> Vec<Spell> {
    spells.sort_by(|a, b| {
        let level = a.level.cmp(&b.level);
        let level = if descending { level.reverse() } else { level };
        level.then_with(|| name_order(a, b))
    });
    spells
}

/// Case-insensitive by display name; slug breaks ties.
pub fn by_name(mut spells: Vec<Spell>) -> Vec<Spell> {
    spells.sort_by(name_order);
    spells
}

pub fn by_class(spells: Vec<Spell>, class_name: &str) -> Vec<Spell> {
    by_name(
        spells
            .into_iter()
            .filter(|spell| spell.castable_by(class_name))
            .collect(),
    )
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
