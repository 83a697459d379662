//! Field-context scoring: clue gathering and title resolution.

mod clues;
mod title;

pub use clues::{compact_clues, gather_clues};
pub use title::{humanize, resolve_title};
