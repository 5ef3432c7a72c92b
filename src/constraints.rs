//! Turns the accumulated guess history into a single anchored filter pattern.

use crate::guess::{Token, WORD_LENGTH, parse_guess_result};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConstraintError {
    #[error("marker '{marker}' is not followed by a letter")]
    DanglingMarker { marker: char },
    #[error("'{found}' is not a letter")]
    InvalidCharacter { found: char },
    #[error("guess '{guess}' has more than {} letters", WORD_LENGTH)]
    TooManySlots { guess: String },
    #[error("generated pattern '{pattern}' does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// What to do with a letter that one guess marks absent and another marks
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ContradictionPolicy {
    /// The absent mark still applies everywhere.
    #[default]
    Keep,
    /// Letters known to be present are dropped from the global exclusions.
    PreferPresent,
}

/// Knowledge about one letter slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionConstraint {
    pub fixed: Option<char>,
    pub excluded: Vec<char>,
}

impl PositionConstraint {
    fn render(&self, global_excluded: &[char]) -> String {
        if let Some(c) = self.fixed {
            return c.to_string();
        }
        if global_excluded.is_empty() && self.excluded.is_empty() {
            return ".".to_string();
        }
        let class: String = global_excluded
            .iter()
            .chain(self.excluded.iter())
            .collect();
        format!("[^{class}]")
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    positions: [PositionConstraint; WORD_LENGTH],
    excluded: Vec<char>,
    found: Vec<char>,
    contradictions: Vec<char>,
    pattern: String,
}

impl Matcher {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn found(&self) -> &[char] {
        &self.found
    }

    /// Global exclusions as they went into the pattern.
    #[must_use]
    pub fn excluded(&self) -> &[char] {
        &self.excluded
    }

    #[must_use]
    pub fn positions(&self) -> &[PositionConstraint; WORD_LENGTH] {
        &self.positions
    }

    /// Letters marked absent by one guess and present or fixed by another.
    #[must_use]
    pub fn contradictions(&self) -> &[char] {
        &self.contradictions
    }
}

/// Replays every guess result in order and synthesizes the filter pattern.
///
/// # Errors
///
/// Fails when any guess is malformed or the resulting pattern does not compile.
pub fn build_matcher<S: AsRef<str>>(
    guesses: &[S],
    policy: ContradictionPolicy,
) -> Result<Matcher, ConstraintError> {
    let parsed = guesses
        .iter()
        .map(|guess| parse_guess_result(guess.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    matcher_from_tokens(parsed.iter().map(Vec::as_slice), policy)
}

/// Same as [`build_matcher`] for guesses that are already tokenized.
/// Tokens past [`WORD_LENGTH`] in one guess are ignored.
///
/// # Errors
///
/// Fails when the resulting pattern does not compile.
pub fn matcher_from_tokens<'a, I>(
    guesses: I,
    policy: ContradictionPolicy,
) -> Result<Matcher, ConstraintError>
where
    I: IntoIterator<Item = &'a [Token]>,
{
    let mut positions: [PositionConstraint; WORD_LENGTH] = Default::default();
    let mut excluded = Vec::new();
    let mut found = Vec::new();

    for tokens in guesses {
        for (position, token) in positions.iter_mut().zip(tokens) {
            match *token {
                Token::Absent(c) => excluded.push(c),
                Token::Present(c) => {
                    position.excluded.push(c);
                    if !found.contains(&c) {
                        found.push(c);
                    }
                }
                Token::Correct(c) => position.fixed = Some(c),
            }
        }
    }

    let known_present =
        |c: &char| found.contains(c) || positions.iter().any(|p| p.fixed == Some(*c));

    let mut contradictions: Vec<char> = Vec::new();
    for c in excluded.iter().filter(|c| known_present(c)) {
        if !contradictions.contains(c) {
            contradictions.push(*c);
        }
    }

    if policy == ContradictionPolicy::PreferPresent {
        excluded.retain(|c| !contradictions.contains(c));
    }

    let mut pattern = String::from("^");
    for position in &positions {
        pattern.push_str(&position.render(&excluded));
    }
    pattern.push('$');

    if let Err(source) = Regex::new(&pattern) {
        return Err(ConstraintError::InvalidPattern { pattern, source });
    }

    Ok(Matcher {
        positions,
        excluded,
        found,
        contradictions,
        pattern,
    })
}
