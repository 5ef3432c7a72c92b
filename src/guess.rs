//! Guess-result encoding.
//!
//! One guess result is written as a run of logical slots:
//! - `c`  the letter is not in the word
//! - `-c` the letter is in the word, but not at this slot
//! - `+c` the letter is at this slot

use crate::constraints::ConstraintError;
use std::fmt;

pub const WORD_LENGTH: usize = 5;

const PRESENT_MARKER: char = '-';
const CORRECT_MARKER: char = '+';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Absent(char),
    Present(char),
    Correct(char),
}

impl Token {
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Token::Absent(c) | Token::Present(c) | Token::Correct(c) => c,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Absent(c) => write!(f, "{c}"),
            Token::Present(c) => write!(f, "{PRESENT_MARKER}{c}"),
            Token::Correct(c) => write!(f, "{CORRECT_MARKER}{c}"),
        }
    }
}

/// Splits a raw guess result into one token per logical slot.
///
/// Fewer than [`WORD_LENGTH`] slots is accepted; the missing slots simply
/// carry no information.
///
/// # Errors
///
/// Returns a [`ConstraintError`] when a marker has no letter after it, when a
/// slot holds something other than an ASCII letter, or when the guess spans
/// more than [`WORD_LENGTH`] slots.
pub fn parse_guess_result(raw: &str) -> Result<Vec<Token>, ConstraintError> {
    let normalized = raw.trim().to_lowercase();
    let mut chars = normalized.chars();
    let mut tokens = Vec::with_capacity(WORD_LENGTH);

    while let Some(c) = chars.next() {
        let token = match c {
            PRESENT_MARKER | CORRECT_MARKER => {
                let letter = chars
                    .next()
                    .ok_or(ConstraintError::DanglingMarker { marker: c })?;
                let letter = expect_letter(letter)?;
                if c == PRESENT_MARKER {
                    Token::Present(letter)
                } else {
                    Token::Correct(letter)
                }
            }
            _ => Token::Absent(expect_letter(c)?),
        };

        if tokens.len() == WORD_LENGTH {
            return Err(ConstraintError::TooManySlots {
                guess: normalized.clone(),
            });
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Renders parsed tokens back into the encoded form, one space between slots.
#[must_use]
pub fn describe_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn expect_letter(c: char) -> Result<char, ConstraintError> {
    if c.is_ascii_alphabetic() {
        Ok(c)
    } else {
        Err(ConstraintError::InvalidCharacter { found: c })
    }
}
