//! Round selection from the question catalog.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Category, CategoryChoice, Question};

/// Maximum number of rounds in one session.
pub const ROUNDS_PER_SESSION: usize = 10;

/// Pick up to [`ROUNDS_PER_SESSION`] playable questions matching `choice`,
/// in uniformly random order.
///
/// The catalog is only borrowed; the returned rounds are an owned copy.
pub fn select_rounds<R: Rng + ?Sized>(
    catalog: &[Question],
    choice: CategoryChoice,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<Question> = catalog
        .iter()
        .filter(|q| q.is_playable() && choice.matches(q.category))
        .cloned()
        .collect();

    // Fisher-Yates
    pool.shuffle(rng);
    pool.truncate(ROUNDS_PER_SESSION);
    pool
}

/// Categories that have at least one playable question, in canonical order.
pub fn active_categories(catalog: &[Question]) -> Vec<Category> {
    Category::ALL
        .iter()
        .copied()
        .filter(|c| catalog.iter().any(|q| q.category == *c && q.is_playable()))
        .collect()
}
