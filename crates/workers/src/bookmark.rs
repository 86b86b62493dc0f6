use shared::{
    domain::{contains_slug, Spell},
    protocol::{BookmarkRequest, ServiceKind},
};
use tracing::{debug, warn};

use crate::serve::{Step, Worker};

#[derive(Debug, Default, Clone, Copy)]
pub struct BookmarkWorker;

impl Worker for BookmarkWorker {
    type Request = BookmarkRequest;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Bookmark
    }

    fn handle(&mut self, request: BookmarkRequest) -> Step {
        match request {
            BookmarkRequest::Add { bookmarks, spell } => {
                if let Err(error) = spell.validate() {
                    warn!(%error, "rejecting bookmark add");
                    return Step::empty();
                }
                debug!(slug = %spell.index, "adding bookmark");
                Step::collection(&add(bookmarks, spell))
            }
            BookmarkRequest::Remove { bookmarks, spell } => {
                debug!(slug = %spell.index, "removing bookmark");
                Step::collection(&remove(bookmarks, &spell.index))
            }
            BookmarkRequest::Shutdown => Step::Shutdown(Vec::new()),
        }
    }
}

/// Appends `spell` unless its slug is already bookmarked.
pub fn add(mut bookmarks: Vec<Spell>, spell: Spell) -> Vec<Spell> {
    if !contains_slug(&bookmarks, &spell.index) {
        bookmarks.push(spell);
    }
    bookmarks
}

pub fn remove(mut bookmarks: Vec<Spell>, slug: &str) -> Vec<Spell> {
    bookmarks.retain(|spell| spell.index != slug);
    bookmarks
}

#[cfg(test)]
#[path = "tests/bookmark_tests.rs"]
mod tests;
