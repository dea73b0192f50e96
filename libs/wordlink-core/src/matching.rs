//! Typo-tolerant answer checking.

use serde::{Deserialize, Serialize};

/// Largest edit distance still accepted as a correct guess.
pub const MAX_TYPO_DISTANCE: usize = 2;

/// Result of judging a guess against the solution word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgement {
    /// Whether the guess is accepted.
    pub is_correct: bool,
    /// Levenshtein distance between the normalized strings.
    pub distance: usize,
    /// Normalized guess (for display).
    pub guess_normalized: String,
    /// Normalized solution (for display).
    pub solution_normalized: String,
}

/// Judge a guess, tolerating up to [`MAX_TYPO_DISTANCE`] edits.
///
/// Comparison ignores case and leading/trailing whitespace.
pub fn judge(guess: &str, solution: &str) -> Judgement {
    let guess_normalized = normalize(guess);
    let solution_normalized = normalize(solution);
    let distance = levenshtein_distance(&guess_normalized, &solution_normalized);

    Judgement {
        is_correct: distance <= MAX_TYPO_DISTANCE,
        distance,
        guess_normalized,
        solution_normalized,
    }
}

/// Shorthand for `judge(guess, solution).is_correct`.
pub fn is_correct(guess: &str, solution: &str) -> bool {
    judge(guess, solution).is_correct
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows are enough
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
