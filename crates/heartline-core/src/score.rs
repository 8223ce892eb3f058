//! Compatibility score.
//!
//! `score = (sum of code points of lowercase(name1 + name2) + jitter) mod 101`
//! where `jitter` is uniform in `[0, 30)`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{HeartlineError, Result};

/// Exclusive upper bound of the random jitter.
pub const JITTER_RANGE: u64 = 30;

const SCORE_MODULUS: u64 = 101;

/// Sum of the code points of both names, concatenated and then lower-cased.
///
/// Lower-casing the joined string keeps context-sensitive mappings such as
/// the word-final Greek sigma.
pub fn deterministic_sum(name1: &str, name2: &str) -> u64 {
    format!("{}{}", name1, name2)
        .to_lowercase()
        .chars()
        .map(|c| c as u64)
        .sum()
}

/// Score two names with an explicit jitter. `jitter` must be below
/// [`JITTER_RANGE`].
pub fn score_with_jitter(name1: &str, name2: &str, jitter: u64) -> u8 {
    debug_assert!(jitter < JITTER_RANGE);
    ((deterministic_sum(name1, name2) + jitter) % SCORE_MODULUS) as u8
}

/// Score two names, drawing the jitter from `rng`.
pub fn score<R: Rng>(name1: &str, name2: &str, rng: &mut R) -> u8 {
    score_with_jitter(name1, name2, rng.random_range(0..JITTER_RANGE))
}

/// Trim both names, rejecting empty ones.
pub fn validate_names<'a>(name1: &'a str, name2: &'a str) -> Result<(&'a str, &'a str)> {
    let first = name1.trim();
    let second = name2.trim();
    if first.is_empty() || second.is_empty() {
        return Err(HeartlineError::InvalidInput(
            "Please enter both names".to_string(),
        ));
    }
    Ok((first, second))
}

/// Verdict band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    PerfectMatch,
    GreatChemistry,
    GoodPotential,
    FriendshipFirst,
    BetterAsFriends,
}

impl Verdict {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90.. => Verdict::PerfectMatch,
            70..=89 => Verdict::GreatChemistry,
            50..=69 => Verdict::GoodPotential,
            30..=49 => Verdict::FriendshipFirst,
            _ => Verdict::BetterAsFriends,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::PerfectMatch => "Perfect Match! Soul Mates!",
            Verdict::GreatChemistry => "Great Chemistry! Love is in the air!",
            Verdict::GoodPotential => "Good Potential! Give it a try!",
            Verdict::FriendshipFirst => "Friendship First! Build it up!",
            Verdict::BetterAsFriends => "Better as friends! But who knows?",
        }
    }
}
