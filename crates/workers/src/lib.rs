pub mod bookmark;
pub mod builder;
pub mod config;
pub mod dice;
mod serve;
pub mod sort;

pub use bookmark::BookmarkWorker;
pub use builder::SpellBuilderWorker;
pub use dice::DiceWorker;
pub use serve::{serve, Step, Worker};
pub use sort::SortWorker;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
