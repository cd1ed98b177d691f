//! Roman-numeral rewriting for effect labels.
//!
//! Only standalone words that are well-formed numerals are rewritten:
//! `"Speed II"` becomes `"Speed 2"`, while `"XP"` or `"IIII"` stay put.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::error::{self, EffectsError};

/// Candidate numeral: a whole word made of numeral letters.
const CANDIDATE_PATTERN: &str = r"\b[MDCLXVI]+\b";

/// Well-formed numeral from 1 to 3999.
const VALID_PATTERN: &str = r"^M{0,3}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3})$";

/// Compiled numeral patterns.
#[derive(Debug, Clone)]
pub struct RomanNumerals {
    candidate: Regex,
    valid: Regex,
}

impl RomanNumerals {
    /// Compile the numeral patterns.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::Pattern`] if a built-in pattern is invalid.
    pub fn new() -> Result<Self, EffectsError> {
        Ok(Self {
            candidate: error::compile("roman candidate", CANDIDATE_PATTERN)?,
            valid: error::compile("roman validation", VALID_PATTERN)?,
        })
    }

    /// Whether `word` is a well-formed numeral.
    pub fn is_numeral(&self, word: &str) -> bool {
        !word.is_empty() && self.valid.is_match(word)
    }

    /// Rewrite every standalone numeral in `text` to its decimal value.
    pub fn replace_numerals_with_integers<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.candidate.replace_all(text, |caps: &Captures<'_>| {
            let word = caps.get(0).map_or("", |m| m.as_str());
            if self.is_numeral(word) {
                numeral_value(word).to_string()
            } else {
                word.to_owned()
            }
        })
    }
}

/// Decimal value of a numeral already known to be well formed.
fn numeral_value(numeral: &str) -> u32 {
    let mut total: u32 = 0;
    let mut values = numeral.chars().map(letter_value).peekable();
    while let Some(value) = values.next() {
        match values.peek() {
            Some(&next) if value < next => {
                values.next();
                total = total.saturating_add(next.saturating_sub(value));
            }
            _ => total = total.saturating_add(value),
        }
    }
    total
}

const fn letter_value(letter: char) -> u32 {
    match letter {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => 0,
    }
}
